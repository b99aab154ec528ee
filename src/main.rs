use awaken_console::{
    AppState,
    ai::{AiState, HttpAiClient},
    config::{AppConfig, Env},
    create_router,
    models::NewAdmin,
    password,
    repository::{PostgresRepository, Repository, RepositoryState},
    storage::{S3StorageClient, StorageState},
    token::TokenCodec,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SEED_EMAIL: &str = "admin@awaken.com";
const DEFAULT_SEED_PASSWORD: &str = "admin123";

/// main
///
/// Entry point: configuration, logging, database, storage, AI client and the
/// HTTP server, in that order. Any startup failure aborts the process.
#[tokio::main]
async fn main() {
    // 1. Configuration (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: Invalid configuration");

    // 2. Logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "awaken_console=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Token Codec
    let tokens = Arc::new(
        TokenCodec::new(&config.jwt_secret).expect("FATAL: Token signing secret rejected"),
    );

    // 4. Database (Postgres) and schema migrations
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("FATAL: Database migrations failed");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // LOCAL-ONLY: make sure there is an account to sign in with.
    if config.env == Env::Local {
        seed_admin(repo.as_ref()).await;
    }

    // 5. Storage (S3/MinIO)
    let s3_client = S3StorageClient::new(
        &config.s3_endpoint,
        &config.s3_region,
        &config.s3_key,
        &config.s3_secret,
        &config.s3_bucket,
    );

    if config.env == Env::Local {
        use awaken_console::storage::StorageService;
        s3_client.ensure_bucket_exists().await;
    }

    let storage = Arc::new(s3_client) as StorageState;

    // 6. AI Service
    let ai = Arc::new(HttpAiClient::new(&config.ai_service_url)) as AiState;

    // 7. Unified State Assembly
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        storage,
        ai,
        tokens,
        config,
    };

    // 8. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated");
}

/// seed_admin
///
/// Creates the first admin account when the table is empty. Credentials come
/// from `SEED_ADMIN_EMAIL` / `SEED_ADMIN_PASSWORD`, with well-known local
/// defaults. Failures are logged; the server still starts.
async fn seed_admin(repo: &dyn Repository) {
    match repo.count_admins().await {
        Ok(0) => {}
        Ok(_) => return,
        Err(e) => {
            tracing::error!(error = %e, "could not count admin accounts");
            return;
        }
    }

    let email =
        std::env::var("SEED_ADMIN_EMAIL").unwrap_or_else(|_| DEFAULT_SEED_EMAIL.to_string());
    let raw_password =
        std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| DEFAULT_SEED_PASSWORD.to_string());

    let password_hash = match password::hash_password(&raw_password) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::error!(error = %e, "could not hash seed admin password");
            return;
        }
    };

    match repo
        .create_admin(NewAdmin {
            email: email.clone(),
            password_hash,
            name: "Admin".to_string(),
        })
        .await
    {
        Ok(admin) => tracing::info!(admin_id = %admin.id, %email, "seeded local admin account"),
        Err(e) => tracing::error!(error = %e, "could not seed admin account"),
    }
}
