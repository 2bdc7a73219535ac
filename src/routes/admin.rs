use crate::{AppState, handlers::trash};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// Staff-only access to soft-deleted rows, nested under `/v1/admin`. `{kind}` is an
/// entity type such as `company`, `job_offer` or `core_skill`.
///
/// Access Control:
/// The router sits behind the same authentication layer as the authenticated routes;
/// each handler then requires `is_staff`.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /v1/admin/{kind}/{id}/restore
        // Reactivates a deleted row and closes its latest open deletion fact.
        .route("/{kind}/{id}/restore", post(trash::restore_entity))
        // GET /v1/admin/{kind}/{id}/history
        // Audit trail of a row, newest deletion first.
        .route("/{kind}/{id}/history", get(trash::deletion_history))
}
