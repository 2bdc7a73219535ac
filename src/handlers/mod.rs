use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    repository::RepositoryState,
    soft_delete::Scope,
};

pub mod applications;
pub mod auth;
pub mod companies;
pub mod internal_users;
pub mod job_offers;
pub mod skills;
pub mod trash;

// --- Query Structs ---

/// ScopeQuery
///
/// `?scope=` on list endpoints. Anything other than `active` is restricted to staff.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ScopeQuery {
    #[serde(default)]
    pub scope: Scope,
}

/// JobOfferFilter
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct JobOfferFilter {
    #[serde(default)]
    pub scope: Scope,
    /// Only offers published by this company.
    pub company_id: Option<i64>,
}

// --- Shared Checks ---

pub(crate) fn authorize_scope(user: &AuthUser, scope: Scope) -> ApiResult<()> {
    match scope {
        Scope::Active => Ok(()),
        Scope::Deleted | Scope::All => user.require_staff(),
    }
}

/// Runs the `validator` rules of a payload, turning failures into a 400.
pub(crate) fn validated<T: Validate>(payload: T) -> ApiResult<T> {
    payload.validate()?;
    Ok(payload)
}

/// The internal user recorded as the actor of a delete or restore. Users without an
/// active profile act anonymously.
pub(crate) async fn acting_internal_user(
    repo: &RepositoryState,
    user: &AuthUser,
) -> ApiResult<Option<i64>> {
    Ok(repo.internal_user_for(user.id).await?.map(|iu| iu.id))
}

/// Staff may act on any profile; everyone else only on their own.
pub(crate) async fn require_owner_or_staff(
    repo: &RepositoryState,
    user: &AuthUser,
    internal_user_id: i64,
) -> ApiResult<()> {
    if user.is_staff {
        return Ok(());
    }
    match repo.internal_user_for(user.id).await? {
        Some(own) if own.id == internal_user_id => Ok(()),
        _ => Err(ApiError::forbidden()),
    }
}
