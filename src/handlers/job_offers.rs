use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{Json, Path, Query},
    handlers::{JobOfferFilter, acting_internal_user, authorize_scope, validated},
    models::{JobOffer, JobOfferPatch, NewJobOffer},
    soft_delete::EntityKind,
};

/// list_job_offers
///
/// [Authenticated Route] Lists job offers, newest first, optionally for one company.
#[utoipa::path(
    get,
    path = "/v1/job-offers",
    params(JobOfferFilter),
    responses(
        (status = 200, description = "Job offers", body = [JobOffer]),
        (status = 403, description = "Scope restricted to staff")
    )
)]
pub async fn list_job_offers(
    user: AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<JobOfferFilter>,
) -> ApiResult<Json<Vec<JobOffer>>> {
    authorize_scope(&user, filter.scope)?;
    let offers = state
        .repo
        .list_job_offers(filter.scope, filter.company_id)
        .await?;
    Ok(Json(offers))
}

/// get_job_offer
///
/// [Authenticated Route] One active job offer.
#[utoipa::path(
    get,
    path = "/v1/job-offers/{id}",
    params(("id" = i64, Path, description = "Job offer id")),
    responses(
        (status = 200, description = "Job offer", body = JobOffer),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn get_job_offer(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<JobOffer>> {
    Ok(Json(state.repo.get_job_offer(id).await?))
}

/// create_job_offer
///
/// [Staff Route] Publishes a job offer for an active company. Referencing a missing or
/// deleted company is a validation error (400).
#[utoipa::path(
    post,
    path = "/v1/job-offers",
    request_body = NewJobOffer,
    responses(
        (status = 201, description = "Created", body = JobOffer),
        (status = 400, description = "Invalid payload or company")
    )
)]
pub async fn create_job_offer(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<NewJobOffer>,
) -> ApiResult<(StatusCode, Json<JobOffer>)> {
    user.require_staff()?;
    let offer = state.repo.create_job_offer(validated(payload)?).await?;
    tracing::debug!(job_offer_id = offer.id, company_id = offer.company_id, "job offer created");
    Ok((StatusCode::CREATED, Json(offer)))
}

/// update_job_offer
///
/// [Staff Route] Partially updates an active job offer; absent fields are kept.
#[utoipa::path(
    patch,
    path = "/v1/job-offers/{id}",
    params(("id" = i64, Path, description = "Job offer id")),
    request_body = JobOfferPatch,
    responses(
        (status = 200, description = "Updated", body = JobOffer),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn update_job_offer(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<JobOfferPatch>,
) -> ApiResult<Json<JobOffer>> {
    user.require_staff()?;
    Ok(Json(
        state.repo.update_job_offer(id, validated(payload)?).await?,
    ))
}

/// delete_job_offer
///
/// [Staff Route] Soft deletes a job offer. Its applications stay untouched.
#[utoipa::path(
    delete,
    path = "/v1/job-offers/{id}",
    params(("id" = i64, Path, description = "Job offer id")),
    responses(
        (status = 204, description = "Soft deleted"),
        (status = 404, description = "Not found or already deleted")
    )
)]
pub async fn delete_job_offer(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    user.require_staff()?;
    let actor = acting_internal_user(&state.repo, &user).await?;
    state.repo.soft_delete(EntityKind::JobOffer, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
