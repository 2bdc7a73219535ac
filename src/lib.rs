use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
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

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod repository;
pub mod soft_delete;

// Routing segregated by access level (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use oauth::{HttpOAuthGateway, MockOAuthGateway, OAuthState};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::social_login, handlers::auth::refresh_tokens, handlers::auth::test_auth,
        handlers::companies::list_companies, handlers::companies::get_company,
        handlers::companies::create_company, handlers::companies::update_company,
        handlers::companies::delete_company,
        handlers::job_offers::list_job_offers, handlers::job_offers::get_job_offer,
        handlers::job_offers::create_job_offer, handlers::job_offers::update_job_offer,
        handlers::job_offers::delete_job_offer,
        handlers::internal_users::list_internal_users, handlers::internal_users::get_internal_user,
        handlers::internal_users::update_internal_user, handlers::internal_users::delete_internal_user,
        handlers::internal_users::list_user_applications, handlers::internal_users::get_user_skillset,
        handlers::internal_users::put_user_skillset,
        handlers::applications::create_job_application, handlers::applications::get_job_application,
        handlers::applications::update_application_status,
        handlers::applications::withdraw_job_application,
        handlers::skills::list_skills, handlers::skills::create_skill, handlers::skills::delete_skill,
        handlers::skills::delete_skillset,
        handlers::trash::restore_entity, handlers::trash::deletion_history
    ),
    components(
        schemas(
            models::User, models::InternalUser, models::Company, models::JobOffer,
            models::JobApplication, models::InternalUserSkillset, models::Skill,
            models::SkillsetDetail, models::SkillLevel, models::WorkMode, models::SkillKind,
            models::NewCompany, models::CompanyPatch, models::NewJobOffer, models::JobOfferPatch,
            models::InternalUserPatch, models::NewJobApplication, models::ApplicationStatusUpdate,
            models::NewSkill, models::SkillsetRequest,
            models::SocialAuthRequest, models::AuthResponse, models::AuthUserInfo,
            models::TokenPair, models::RefreshRequest, models::TestAuthResponse,
            soft_delete::EntityKind, soft_delete::Scope, soft_delete::SoftDeleteFact,
            soft_delete::SoftDeleteOutcome, error::ErrorBody,
        )
    ),
    tags(
        (name = "neofindr", description = "neofindr recruiting API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request needs, cloned cheaply per request.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    /// OAuth provider access used by the social login flow.
    pub oauth: OAuthState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for OAuthState {
    fn from_ref(app_state: &AppState) -> OAuthState {
        app_state.oauth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless an `AuthUser` can be resolved from it.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// log_error_responses
///
/// Logs every client error at `warn` and every server error at `error`, tagged with
/// the method and path. Runs inside the request span, so the request id is attached.
async fn log_error_responses(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();

    let response = next.run(request).await;
    let status = response.status();

    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), "request failed");
    } else if status.is_client_error() {
        tracing::warn!(%method, %path, status = status.as_u16(), "request rejected");
    }
    response
}

/// create_router
///
/// Assembles the routers, their authentication layers, the observability stack and CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .nest(
            "/v1/admin",
            admin::admin_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    // Outermost first: request id, then the span, then propagation back to the client.
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
                .layer(PropagateRequestIdLayer::new(x_request_id))
                .layer(middleware::from_fn(log_error_responses)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// One span per request carrying method, uri and the `x-request-id` set above.
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
