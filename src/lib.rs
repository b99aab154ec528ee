use axum::{Router, extract::FromRef, http::HeaderName, middleware};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session core: token signing, cookie transport, request gate.
pub mod auth;
pub mod cookies;
pub mod gate;
pub mod token;

// Console services and components.
pub mod ai;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod pages;
pub mod password;
pub mod repository;
pub mod storage;

pub mod routes;
use routes::{authenticated, pages as page_router, public};

// --- Public Re-exports ---

pub use ai::{AiState, HttpAiClient, MockAiService};
pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};
pub use token::TokenCodec;

/// TokenState
///
/// Shared handle to the process-wide token codec.
pub type TokenState = Arc<TokenCodec>;

/// ApiDoc
///
/// OpenAPI document for the admin API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::logout, handlers::get_profile,
        handlers::list_qa, handlers::create_qa, handlers::update_qa, handlers::delete_qa,
        handlers::list_files, handlers::create_file, handlers::delete_file,
        handlers::upload_file, handlers::delete_upload, handlers::chat
    ),
    components(
        schemas(
            models::QaPair, models::FileRecord, models::LoginRequest, models::CreateQaRequest,
            models::UpdateQaRequest, models::CreateFileRequest, models::ChatTurn,
            models::ChatRequest, models::SuccessResponse, models::AdminProfile,
            models::ProfileResponse, models::FileDeletedResponse, models::ChatResponse,
        )
    ),
    tags(
        (name = "awaken-console", description = "Awaken admin console API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single shared container of services and configuration, cloned into
/// every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence for admins, Q&A pairs and file metadata.
    pub repo: RepositoryState,
    /// Object storage for uploaded documents.
    pub storage: StorageState,
    /// Client for the external AI service.
    pub ai: AiState,
    /// Signs and verifies session tokens.
    pub tokens: TokenState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for AiState {
    fn from_ref(app_state: &AppState) -> AiState {
        app_state.ai.clone()
    }
}

// The gate and the `AuthUser` extractor only need the codec.
impl FromRef<AppState> for TokenState {
    fn from_ref(app_state: &AppState) -> TokenState {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles pages, public and authenticated routes behind the auth gate,
/// then wraps everything in the observability and CORS layers.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    // The gate is a plain layer over the merged tree so it also sees paths
    // that match no route (fallback 404s are classified like any other path).
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(page_router::page_routes())
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            gate::auth_gate,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying the method, URI and `x-request-id`, so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
