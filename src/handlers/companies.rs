use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::AuthUser,
    error::ApiResult,
    extract::{Json, Path, Query},
    handlers::{ScopeQuery, acting_internal_user, authorize_scope, validated},
    models::{Company, CompanyPatch, NewCompany},
    soft_delete::EntityKind,
};

/// list_companies
///
/// [Authenticated Route] Lists companies, active ones unless a staff member asks for
/// another scope.
#[utoipa::path(
    get,
    path = "/v1/companies",
    params(ScopeQuery),
    responses(
        (status = 200, description = "Companies", body = [Company]),
        (status = 403, description = "Scope restricted to staff")
    )
)]
pub async fn list_companies(
    user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> ApiResult<Json<Vec<Company>>> {
    authorize_scope(&user, query.scope)?;
    Ok(Json(state.repo.list_companies(query.scope).await?))
}

/// get_company
///
/// [Authenticated Route] One active company. Deleted companies are a 404.
#[utoipa::path(
    get,
    path = "/v1/companies/{id}",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 200, description = "Company", body = Company),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn get_company(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Company>> {
    Ok(Json(state.repo.get_company(id).await?))
}

/// create_company
///
/// [Staff Route] Registers a new company.
#[utoipa::path(
    post,
    path = "/v1/companies",
    request_body = NewCompany,
    responses(
        (status = 201, description = "Created", body = Company),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Not staff")
    )
)]
pub async fn create_company(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<NewCompany>,
) -> ApiResult<(StatusCode, Json<Company>)> {
    user.require_staff()?;
    let company = state.repo.create_company(validated(payload)?).await?;
    Ok((StatusCode::CREATED, Json(company)))
}

/// update_company
///
/// [Staff Route] Partially updates an active company.
#[utoipa::path(
    patch,
    path = "/v1/companies/{id}",
    params(("id" = i64, Path, description = "Company id")),
    request_body = CompanyPatch,
    responses(
        (status = 200, description = "Updated", body = Company),
        (status = 404, description = "Not found or deleted")
    )
)]
pub async fn update_company(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CompanyPatch>,
) -> ApiResult<Json<Company>> {
    user.require_staff()?;
    Ok(Json(
        state.repo.update_company(id, validated(payload)?).await?,
    ))
}

/// delete_company
///
/// [Staff Route] Soft deletes a company. Its job offers stay as they are.
#[utoipa::path(
    delete,
    path = "/v1/companies/{id}",
    params(("id" = i64, Path, description = "Company id")),
    responses(
        (status = 204, description = "Soft deleted"),
        (status = 404, description = "Not found or already deleted")
    )
)]
pub async fn delete_company(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    user.require_staff()?;
    let actor = acting_internal_user(&state.repo, &user).await?;
    state.repo.soft_delete(EntityKind::Company, id, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
