use crate::{AppState, pages};
use axum::{Router, routing::get};

/// Page Router Module
///
/// `/` and `/admin` are the login screen; everything under
/// `/admin/dashboard` requires a session (the gate redirects otherwise).
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::login_page))
        .route("/admin", get(pages::login_page))
        .route("/admin/dashboard", get(pages::dashboard_home))
        .route("/admin/dashboard/{section}", get(pages::dashboard_section))
}
