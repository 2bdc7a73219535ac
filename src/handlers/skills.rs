use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{Json, Path, Query},
    handlers::{ScopeQuery, acting_internal_user, authorize_scope, require_owner_or_staff, validated},
    models::{NewSkill, Skill, SkillKind},
    soft_delete::EntityKind,
};

/// list_skills
///
/// [Authenticated Route] Lists the core or secondary skill catalog, sorted by name.
#[utoipa::path(
    get,
    path = "/v1/skills/{kind}",
    params(
        ("kind" = SkillKind, Path, description = "core or secondary"),
        ScopeQuery
    ),
    responses((status = 200, description = "Skills", body = [Skill]))
)]
pub async fn list_skills(
    user: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<SkillKind>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<Skill>>> {
    authorize_scope(&user, query.scope)?;
    Ok(Json(state.repo.list_skills(kind, query.scope).await?))
}

/// create_skill
///
/// [Staff Route] Adds a skill to the core or secondary catalog.
#[utoipa::path(
    post,
    path = "/v1/skills/{kind}",
    params(("kind" = SkillKind, Path, description = "core or secondary")),
    request_body = NewSkill,
    responses(
        (status = 201, description = "Created", body = Skill),
        (status = 403, description = "Not staff")
    )
)]
pub async fn create_skill(
    user: AuthUser,
    State(state): State<AppState>,
    Path(kind): Path<SkillKind>,
    Json(payload): Json<NewSkill>,
) -> ApiResult<(StatusCode, Json<Skill>)> {
    user.require_staff()?;
    let skill = state.repo.create_skill(kind, validated(payload)?).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

/// delete_skill
///
/// [Staff Route] Soft deletes a skill. Skillsets keep their links, but deleted skills
/// are left out when a skillset is read.
#[utoipa::path(
    delete,
    path = "/v1/skills/{kind}/{id}",
    params(
        ("kind" = SkillKind, Path, description = "core or secondary"),
        ("id" = i64, Path, description = "Skill id")
    ),
    responses(
        (status = 204, description = "Soft deleted"),
        (status = 404, description = "Not found or already deleted")
    )
)]
pub async fn delete_skill(
    user: AuthUser,
    State(state): State<AppState>,
    Path((kind, id)): Path<(SkillKind, i64)>,
) -> ApiResult<StatusCode> {
    user.require_staff()?;
    let actor = acting_internal_user(&state.repo, &user).await?;
    state.repo.soft_delete(kind.entity_kind(), id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// delete_skillset
///
/// [Owner Route] Soft deletes a skillset. The next PUT on the owner's skillset starts a new one.
#[utoipa::path(
    delete,
    path = "/v1/skillsets/{id}",
    params(("id" = i64, Path, description = "Skillset id")),
    responses(
        (status = 204, description = "Soft deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Not found or already deleted")
    )
)]
pub async fn delete_skillset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let skillset = state.repo.get_skillset_by_id(id).await?;
    require_owner_or_staff(&state.repo, &user, skillset.internal_user_id).await?;

    let actor = acting_internal_user(&state.repo, &user).await?;
    state.repo.soft_delete(EntityKind::Skillset, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
