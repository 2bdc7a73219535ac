use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use crate::soft_delete::{EntityKind, SoftDeletable};

/// Implements the sqlx Postgres traits for a closed set of choices stored as TEXT.
///
/// The type must provide `as_str()` and a `FromStr` impl whose error converts into
/// `BoxDynError`. Rows holding an unknown value fail to decode instead of being coerced.
macro_rules! pg_text_enum {
    ($ty:ty) => {
        impl sqlx::Type<sqlx::Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $ty {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let raw = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                Ok(raw.parse::<$ty>()?)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $ty {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode(self.as_str(), buf)
            }
        }
    };
}

pub(crate) use pg_text_enum;

/// Raised when a stored or submitted choice value is not one of the known variants.
#[derive(Debug, Error)]
#[error("unknown {field} value `{value}`")]
pub struct ParseChoiceError {
    pub field: &'static str,
    pub value: String,
}

// --- Choices ---

/// SkillLevel
///
/// Seniority ladder shared by job offers (required level) and internal users (own level).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SkillLevel {
    Intern,
    #[default]
    Junior,
    Mid,
    Senior,
    Lead,
}

impl SkillLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkillLevel::Intern => "intern",
            SkillLevel::Junior => "junior",
            SkillLevel::Mid => "mid",
            SkillLevel::Senior => "senior",
            SkillLevel::Lead => "lead",
        }
    }
}

impl FromStr for SkillLevel {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "intern" => Ok(SkillLevel::Intern),
            "junior" => Ok(SkillLevel::Junior),
            "mid" => Ok(SkillLevel::Mid),
            "senior" => Ok(SkillLevel::Senior),
            "lead" => Ok(SkillLevel::Lead),
            other => Err(ParseChoiceError {
                field: "skill_level",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pg_text_enum!(SkillLevel);

/// WorkMode
///
/// Where the work for a job offer happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum WorkMode {
    Remote,
    Hybrid,
    Onsite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Onsite => "onsite",
        }
    }
}

impl FromStr for WorkMode {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remote" => Ok(WorkMode::Remote),
            "hybrid" => Ok(WorkMode::Hybrid),
            "onsite" => Ok(WorkMode::Onsite),
            other => Err(ParseChoiceError {
                field: "work_mode",
                value: other.to_string(),
            }),
        }
    }
}

pg_text_enum!(WorkMode);

/// SkillKind
///
/// Core and secondary skills share one shape but live in separate tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SkillKind {
    Core,
    Secondary,
}

impl SkillKind {
    pub fn entity_kind(&self) -> EntityKind {
        match self {
            SkillKind::Core => EntityKind::CoreSkill,
            SkillKind::Secondary => EntityKind::SecondarySkill,
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// The authentication identity stored in `users`. Created on first social login and
/// referenced by the `sub` claim of issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    // Grants access to deleted rows, restores and audit history.
    pub is_staff: bool,
    pub is_active: bool,
    #[ts(type = "string")]
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// InternalUser
///
/// The business profile of a candidate, linked one-to-one to a `User`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct InternalUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    // Unset until the candidate fills in their profile.
    pub skill_level: Option<SkillLevel>,
    pub user_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub modified_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Company
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub company_bio: String,
    pub company_website: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub modified_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// JobOffer
///
/// A position published by a `Company`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct JobOffer {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub skill_level: SkillLevel,
    // Free-form, comma separated.
    pub tags: String,
    pub salary_offer: i32,
    pub location: String,
    pub work_mode: Option<WorkMode>,
    pub url: String,
    pub company_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub modified_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// JobApplication
///
/// Links an `InternalUser` to a `JobOffer`. `status` is an opaque pipeline stage, 0 on submission.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct JobApplication {
    pub id: i64,
    pub job_offer_id: i64,
    pub internal_user_id: i64,
    pub status: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub modified_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// InternalUserSkillset
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct InternalUserSkillset {
    pub id: i64,
    pub internal_user_id: i64,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub modified_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Skill
///
/// Row shape of both `core_skills` and `secondary_skills`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Skill {
    pub id: i64,
    pub name: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub modified_at: DateTime<Utc>,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// SkillsetDetail
///
/// A skillset joined with its active core and secondary skills (ordered by name).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SkillsetDetail {
    pub skillset: InternalUserSkillset,
    pub core_skills: Vec<Skill>,
    pub secondary_skills: Vec<Skill>,
}

macro_rules! soft_deletable {
    ($ty:ty) => {
        impl SoftDeletable for $ty {
            fn id(&self) -> i64 {
                self.id
            }

            fn is_deleted(&self) -> bool {
                self.is_deleted
            }

            fn deleted_at(&self) -> Option<DateTime<Utc>> {
                self.deleted_at
            }

            fn mark_deleted(&mut self, at: DateTime<Utc>) {
                self.is_deleted = true;
                self.deleted_at = Some(at);
                self.modified_at = at;
            }

            fn mark_restored(&mut self, at: DateTime<Utc>) {
                self.is_deleted = false;
                self.deleted_at = None;
                self.modified_at = at;
            }
        }
    };
}

soft_deletable!(InternalUser);
soft_deletable!(Company);
soft_deletable!(JobOffer);
soft_deletable!(JobApplication);
soft_deletable!(InternalUserSkillset);
soft_deletable!(Skill);

/// SocialProfile
///
/// The normalized identity returned by an OAuth provider's userinfo endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SocialProfile {
    pub email: Option<String>,
    pub given_name: String,
    pub family_name: String,
}

// --- Request Payloads (Input Schemas) ---

/// NewCompany
///
/// Input payload for POST /v1/companies.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct NewCompany {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[serde(default)]
    pub company_bio: String,
    #[validate(url)]
    pub company_website: Option<String>,
}

/// CompanyPatch
///
/// Partial update payload for PATCH /v1/companies/{id}. Absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct CompanyPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_bio: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub company_website: Option<String>,
}

/// NewJobOffer
///
/// Input payload for POST /v1/job-offers. The referenced company must be active.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct NewJobOffer {
    #[validate(length(min = 1, max = 128))]
    pub title: String,
    pub description: String,
    pub skill_level: SkillLevel,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub tags: String,
    #[serde(default)]
    #[validate(range(min = 0))]
    pub salary_offer: i32,
    #[serde(default)]
    #[validate(length(max = 255))]
    pub location: String,
    pub work_mode: Option<WorkMode>,
    #[validate(url)]
    pub url: Option<String>,
    pub company_id: i64,
}

/// JobOfferPatch
///
/// Partial update payload for PATCH /v1/job-offers/{id}. The owning company cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct JobOfferPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub tags: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub salary_offer: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_mode: Option<WorkMode>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub url: Option<String>,
}

/// InternalUserPatch
///
/// Profile update payload for PATCH /v1/internal-users/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct InternalUserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 128))]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 128))]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email, length(max = 128))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skill_level: Option<SkillLevel>,
}

/// NewJobApplication
///
/// Input payload for POST /v1/job-applications. The applicant is the authenticated user's profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct NewJobApplication {
    pub job_offer_id: i64,
}

/// ApplicationStatusUpdate
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct ApplicationStatusUpdate {
    #[validate(range(min = 0))]
    pub status: i32,
}

/// NewSkill
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[ts(export)]
pub struct NewSkill {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// SkillsetRequest
///
/// Replaces the skill links of an internal user's skillset (PUT /v1/internal-users/{id}/skillset).
/// Every referenced skill must be active.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SkillsetRequest {
    #[serde(default)]
    pub core_skill_ids: Vec<i64>,
    #[serde(default)]
    pub secondary_skill_ids: Vec<i64>,
}

// --- Authentication Schemas ---

/// SocialAuthRequest
///
/// Input payload for POST /v1/auth/social: an authorization code obtained by the client
/// from the provider's consent screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct SocialAuthRequest {
    #[validate(length(min = 1))]
    pub provider: String,
    #[validate(length(min = 1))]
    pub code: String,
    // PKCE verifier, forwarded to the token endpoint when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
}

/// AuthUserInfo
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthUserInfo {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// TokenPair
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// AuthResponse
///
/// Output schema of a successful social login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub refresh: String,
    pub access: String,
    pub user: AuthUserInfo,
}

/// RefreshRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// TestAuthResponse
///
/// Output schema of GET /api/test-auth.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TestAuthResponse {
    pub message: String,
    pub user_id: i64,
    pub email: String,
}
