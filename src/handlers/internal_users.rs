use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{Json, Path, Query},
    handlers::{
        ScopeQuery, acting_internal_user, authorize_scope, require_owner_or_staff, validated,
    },
    models::{InternalUser, InternalUserPatch, JobApplication, SkillsetDetail, SkillsetRequest},
    soft_delete::EntityKind,
};

/// list_internal_users
///
/// [Authenticated Route] Lists internal user profiles ordered by name. Non-active
/// scopes are staff-only.
#[utoipa::path(
    get,
    path = "/v1/internal-users",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Internal users", body = [InternalUser]),
        (status = 403, description = "Scope restricted to staff")
    )
)]
pub async fn list_internal_users(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<InternalUser>>> {
    authorize_scope(&user, query.scope)?;
    Ok(Json(state.repo.list_internal_users(query.scope).await?))
}

/// get_internal_user
///
/// [Authenticated Route] One active internal user profile.
#[utoipa::path(
    get,
    path = "/v1/internal-users/{id}",
    params(("id" = i64, Path, description = "Internal user id")),
    responses(
        (status = 200, description = "Internal user", body = InternalUser),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn get_internal_user(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<InternalUser>> {
    Ok(Json(state.repo.get_internal_user(id).await?))
}

/// update_internal_user
///
/// [Owner Route] Updates a profile. Staff may update any profile.
#[utoipa::path(
    patch,
    path = "/v1/internal-users/{id}",
    params(("id" = i64, Path, description = "Internal user id")),
    request_body = InternalUserPatch,
    responses(
        (status = 200, description = "Updated", body = InternalUser),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn update_internal_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<InternalUserPatch>,
) -> ApiResult<Json<InternalUser>> {
    require_owner_or_staff(&state.repo, &user, id).await?;
    Ok(Json(
        state
            .repo
            .update_internal_user(id, validated(payload)?)
            .await?,
    ))
}

/// delete_internal_user
///
/// [Owner Route] Soft deletes a profile. The linked login stays, but the profile
/// disappears from every default read.
#[utoipa::path(
    delete,
    path = "/v1/internal-users/{id}",
    params(("id" = i64, Path, description = "Internal user id")),
    responses(
        (status = 204, description = "Soft deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found or already deleted")
    )
)]
pub async fn delete_internal_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    require_owner_or_staff(&state.repo, &user, id).await?;
    let actor = acting_internal_user(&state.repo, &user).await?;
    state
        .repo
        .soft_delete(EntityKind::InternalUser, id, actor)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// list_user_applications
///
/// [Owner Route] Active job applications submitted by an internal user.
#[utoipa::path(
    get,
    path = "/v1/internal-users/{id}/applications",
    params(("id" = i64, Path, description = "Internal user id")),
    responses(
        (status = 200, description = "Applications", body = [JobApplication]),
        (status = 404, description = "Internal user not found or deleted")
    )
)]
pub async fn list_user_applications(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<JobApplication>>> {
    require_owner_or_staff(&state.repo, &user, id).await?;
    state.repo.get_internal_user(id).await?;
    Ok(Json(state.repo.applications_for(id).await?))
}

/// get_user_skillset
///
/// [Authenticated Route] A profile's active skillset with its active core and secondary
/// skills.
#[utoipa::path(
    get,
    path = "/v1/internal-users/{id}/skillset",
    params(("id" = i64, Path, description = "Internal user id")),
    responses(
        (status = 200, description = "Skillset with its active skills", body = SkillsetDetail),
        (status = 404, description = "No active skillset")
    )
)]
pub async fn get_user_skillset(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SkillsetDetail>> {
    state.repo.get_internal_user(id).await?;
    Ok(Json(state.repo.get_skillset(id).await?))
}

/// put_user_skillset
///
/// [Owner Route] Replaces the skills of a profile, creating its skillset on first use.
#[utoipa::path(
    put,
    path = "/v1/internal-users/{id}/skillset",
    params(("id" = i64, Path, description = "Internal user id")),
    request_body = SkillsetRequest,
    responses(
        (status = 200, description = "Updated skillset", body = SkillsetDetail),
        (status = 400, description = "Unknown or deleted skill"),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn put_user_skillset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SkillsetRequest>,
) -> ApiResult<Json<SkillsetDetail>> {
    require_owner_or_staff(&state.repo, &user, id).await?;
    Ok(Json(state.repo.set_skillset(id, payload).await?))
}
