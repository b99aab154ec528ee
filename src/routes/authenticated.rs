use crate::{AppState, handlers};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Request body ceiling for the upload route: the 10 MiB document limit plus
/// room for the multipart envelope.
const UPLOAD_BODY_LIMIT: usize = handlers::MAX_UPLOAD_BYTES + 1024 * 1024;

/// Authenticated Router Module
///
/// The admin JSON API. The gate rejects anonymous requests to this prefix
/// with 401 before routing; each handler re-verifies through `AuthUser`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/admin/profile
        .route("/api/admin/profile", get(handlers::get_profile))
        // --- Q&A Training Pairs ---
        // Every write is forwarded to the AI service before touching the database.
        .route(
            "/api/admin/qa",
            get(handlers::list_qa)
                .post(handlers::create_qa)
                .put(handlers::update_qa)
                .delete(handlers::delete_qa),
        )
        // --- File Metadata ---
        .route(
            "/api/admin/files",
            get(handlers::list_files)
                .post(handlers::create_file)
                .delete(handlers::delete_file),
        )
        // --- Upload Relay ---
        // POST stores the document and requests embeddings; DELETE is Owner-Only.
        .route(
            "/api/admin/upload",
            post(handlers::upload_file)
                .delete(handlers::delete_upload)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // POST /api/admin/chat
        .route("/api/admin/chat", post(handlers::chat))
}
