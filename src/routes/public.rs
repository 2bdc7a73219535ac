use crate::{AppState, handlers::auth};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without credentials: the health probe and the two token
/// issuing endpoints.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /v1/auth/social
        // Exchanges a provider authorization code for our own token pair, registering
        // the user on first login.
        .route("/v1/auth/social", post(auth::social_login))
        // POST /v1/auth/refresh
        // Rotates an access/refresh pair from a valid refresh token.
        .route("/v1/auth/refresh", post(auth::refresh_tokens))
}
