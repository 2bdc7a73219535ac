use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    extract::{Json, Path},
    handlers::{acting_internal_user, require_owner_or_staff, validated},
    models::{ApplicationStatusUpdate, JobApplication, NewJobApplication},
    soft_delete::EntityKind,
};

/// create_job_application
///
/// [Authenticated Route] Applies to a job offer with the caller's own profile.
/// Callers without an active profile get 403; a missing or deleted offer is a 400.
#[utoipa::path(
    post,
    path = "/v1/job-applications",
    request_body = NewJobApplication,
    responses(
        (status = 201, description = "Submitted", body = JobApplication),
        (status = 400, description = "Job offer missing or deleted"),
        (status = 403, description = "Caller has no internal user profile")
    )
)]
pub async fn create_job_application(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<NewJobApplication>,
) -> ApiResult<(StatusCode, Json<JobApplication>)> {
    let applicant = state
        .repo
        .internal_user_for(user.id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("An internal user profile is required.".to_string()))?;

    let application = state
        .repo
        .create_job_application(applicant.id, payload.job_offer_id)
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// get_job_application
///
/// [Owner Route] One active application, visible to its applicant and to staff.
#[utoipa::path(
    get,
    path = "/v1/job-applications/{id}",
    params(("id" = i64, Path, description = "Job application id")),
    responses(
        (status = 200, description = "Application", body = JobApplication),
        (status = 403, description = "Not the applicant"),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn get_job_application(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<JobApplication>> {
    let application = state.repo.get_job_application(id).await?;
    require_owner_or_staff(&state.repo, &user, application.internal_user_id).await?;
    Ok(Json(application))
}

/// update_application_status
///
/// [Staff Route] Moves an application to another pipeline stage.
#[utoipa::path(
    patch,
    path = "/v1/job-applications/{id}/status",
    params(("id" = i64, Path, description = "Job application id")),
    request_body = ApplicationStatusUpdate,
    responses(
        (status = 200, description = "Updated", body = JobApplication),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn update_application_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ApplicationStatusUpdate>,
) -> ApiResult<Json<JobApplication>> {
    user.require_staff()?;
    let payload = validated(payload)?;
    Ok(Json(
        state
            .repo
            .update_application_status(id, payload.status)
            .await?,
    ))
}

/// withdraw_job_application
///
/// [Owner Route] Soft deletes an application.
#[utoipa::path(
    delete,
    path = "/v1/job-applications/{id}",
    params(("id" = i64, Path, description = "Job application id")),
    responses(
        (status = 204, description = "Soft deleted"),
        (status = 403, description = "Not the applicant"),
        (status = 404, description = "Not found or already deleted")
    )
)]
pub async fn withdraw_job_application(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let application = state.repo.get_job_application(id).await?;
    require_owner_or_staff(&state.repo, &user, application.internal_user_id).await?;

    let actor = acting_internal_user(&state.repo, &user).await?;
    state
        .repo
        .soft_delete(EntityKind::JobApplication, id, actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
