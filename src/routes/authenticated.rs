use crate::{
    AppState,
    handlers::{applications, auth, companies, internal_users, job_offers, skills},
};
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

/// Authenticated Router Module
///
/// Routes that require a resolved `AuthUser`. The auth middleware layered over this
/// router in `create_router` rejects anonymous requests before any handler runs; staff
/// and owner checks happen inside the handlers.
///
/// Every DELETE here is a soft delete recorded in the audit trail.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/test-auth
        .route("/api/test-auth", get(auth::test_auth))
        // --- Companies ---
        .route(
            "/v1/companies",
            get(companies::list_companies).post(companies::create_company),
        )
        .route(
            "/v1/companies/{id}",
            get(companies::get_company)
                .patch(companies::update_company)
                .delete(companies::delete_company),
        )
        // --- Job Offers ---
        // GET /v1/job-offers?company_id=&scope=
        .route(
            "/v1/job-offers",
            get(job_offers::list_job_offers).post(job_offers::create_job_offer),
        )
        .route(
            "/v1/job-offers/{id}",
            get(job_offers::get_job_offer)
                .patch(job_offers::update_job_offer)
                .delete(job_offers::delete_job_offer),
        )
        // --- Internal Users ---
        .route(
            "/v1/internal-users",
            get(internal_users::list_internal_users),
        )
        .route(
            "/v1/internal-users/{id}",
            get(internal_users::get_internal_user)
                .patch(internal_users::update_internal_user)
                .delete(internal_users::delete_internal_user),
        )
        .route(
            "/v1/internal-users/{id}/applications",
            get(internal_users::list_user_applications),
        )
        .route(
            "/v1/internal-users/{id}/skillset",
            get(internal_users::get_user_skillset).put(internal_users::put_user_skillset),
        )
        // --- Job Applications ---
        .route(
            "/v1/job-applications",
            post(applications::create_job_application),
        )
        .route(
            "/v1/job-applications/{id}",
            get(applications::get_job_application).delete(applications::withdraw_job_application),
        )
        .route(
            "/v1/job-applications/{id}/status",
            patch(applications::update_application_status),
        )
        // --- Skills & Skillsets ---
        // {kind} is `core` or `secondary`.
        .route(
            "/v1/skills/{kind}",
            get(skills::list_skills).post(skills::create_skill),
        )
        .route("/v1/skills/{kind}/{id}", delete(skills::delete_skill))
        .route("/v1/skillsets/{id}", delete(skills::delete_skillset))
}
