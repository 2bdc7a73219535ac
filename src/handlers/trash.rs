use axum::extract::State;

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{Json, Path},
    handlers::acting_internal_user,
    soft_delete::{EntityKind, SoftDeleteFact, SoftDeleteOutcome},
};

/// restore_entity
///
/// [Admin Route] Reactivates a soft-deleted row and closes its most recent open
/// deletion fact. Restoring a row that is not deleted is a 404. Related rows deleted
/// alongside it are not restored. A skillset whose owner already has an active one is
/// a 409.
#[utoipa::path(
    post,
    path = "/v1/admin/{kind}/{id}/restore",
    params(
        ("kind" = EntityKind, Path, description = "Entity type, e.g. company or job_offer"),
        ("id" = i64, Path, description = "Entity id")
    ),
    responses(
        (status = 200, description = "Restored", body = SoftDeleteOutcome),
        (status = 403, description = "Not staff"),
        (status = 404, description = "Not found or not deleted"),
        (status = 409, description = "Owner already has an active skillset")
    )
)]
pub async fn restore_entity(
    user: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i64)>,
) -> ApiResult<Json<SoftDeleteOutcome>> {
    user.require_staff()?;
    let actor = acting_internal_user(&state.repo, &user).await?;
    Ok(Json(state.repo.restore(kind, id, actor).await?))
}

/// deletion_history
///
/// [Admin Route] Every deletion recorded for a row, newest first.
#[utoipa::path(
    get,
    path = "/v1/admin/{kind}/{id}/history",
    params(
        ("kind" = EntityKind, Path, description = "Entity type"),
        ("id" = i64, Path, description = "Entity id")
    ),
    responses(
        (status = 200, description = "Deletion facts", body = [SoftDeleteFact]),
        (status = 403, description = "Not staff")
    )
)]
pub async fn deletion_history(
    user: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(EntityKind, i64)>,
) -> ApiResult<Json<Vec<SoftDeleteFact>>> {
    user.require_staff()?;
    Ok(Json(state.repo.deletion_history(kind, id).await?))
}
