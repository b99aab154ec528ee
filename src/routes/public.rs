use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The login and logout paths sit
/// under the protected `/api/admin` prefix, so the gate carries an explicit
/// exemption for them.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for the load balancer.
        .route("/health", get(|| async { "ok" }))
        // POST /api/admin/login
        // Exchanges email/password for the session cookie.
        .route("/api/admin/login", post(handlers::login))
        // POST /api/admin/logout
        // Clears the session cookie. Succeeds with or without a session.
        .route("/api/admin/logout", post(handlers::logout))
}
