//! Soft deletion and its audit trail.
//!
//! Soft-deletable rows carry `is_deleted` and `deleted_at`. Every deletion appends a
//! [`SoftDeleteFact`] keyed by `(entity_type, object_id)`; a restoration closes the most
//! recent open fact for that entity. At most one open fact per entity is expected, but
//! nothing enforces it beyond always closing the latest one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::{ParseChoiceError, pg_text_enum};

/// EntityKind
///
/// The closed set of soft-deletable entity types. Its string form is what the audit
/// table stores in `entity_type`, and it is the only source of table names used in
/// dynamically built SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EntityKind {
    Company,
    JobOffer,
    InternalUser,
    JobApplication,
    Skillset,
    CoreSkill,
    SecondarySkill,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Company,
        EntityKind::JobOffer,
        EntityKind::InternalUser,
        EntityKind::JobApplication,
        EntityKind::Skillset,
        EntityKind::CoreSkill,
        EntityKind::SecondarySkill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Company => "company",
            EntityKind::JobOffer => "job_offer",
            EntityKind::InternalUser => "internal_user",
            EntityKind::JobApplication => "job_application",
            EntityKind::Skillset => "skillset",
            EntityKind::CoreSkill => "core_skill",
            EntityKind::SecondarySkill => "secondary_skill",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Company => "companies",
            EntityKind::JobOffer => "job_offers",
            EntityKind::InternalUser => "internal_users",
            EntityKind::JobApplication => "job_applications",
            EntityKind::Skillset => "internal_user_skillsets",
            EntityKind::CoreSkill => "core_skills",
            EntityKind::SecondarySkill => "secondary_skills",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseChoiceError {
                field: "entity_type",
                value: s.to_string(),
            })
    }
}

pg_text_enum!(EntityKind);

/// Scope
///
/// Which rows a read sees. `Active` is the default for every read in the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    #[default]
    Active,
    Deleted,
    All,
}

impl Scope {
    pub fn admits(&self, is_deleted: bool) -> bool {
        match self {
            Scope::Active => !is_deleted,
            Scope::Deleted => is_deleted,
            Scope::All => true,
        }
    }

    /// SQL predicate over the `is_deleted` column of the row being filtered.
    pub fn sql_filter(&self) -> &'static str {
        match self {
            Scope::Active => "is_deleted = false",
            Scope::Deleted => "is_deleted = true",
            Scope::All => "TRUE",
        }
    }
}

/// SoftDeletable
///
/// Row-level state transitions shared by every soft-deletable model.
/// Whether a transition is allowed is decided by the repository, not here.
pub trait SoftDeletable {
    fn id(&self) -> i64;
    fn is_deleted(&self) -> bool;
    fn deleted_at(&self) -> Option<DateTime<Utc>>;
    /// Sets the flag, stamps `deleted_at` and bumps `modified_at`.
    fn mark_deleted(&mut self, at: DateTime<Utc>);
    /// Clears the flag and `deleted_at`, bumps `modified_at`.
    fn mark_restored(&mut self, at: DateTime<Utc>);
}

/// SoftDeleteFact
///
/// One deletion of one entity, closed when the entity is restored.
/// `deleted_by` / `restored_by` reference internal users and become null if that user row goes away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct SoftDeleteFact {
    pub id: i64,
    pub entity_type: EntityKind,
    pub object_id: i64,
    #[ts(type = "string")]
    pub deleted_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub restored_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<i64>,
    pub restored_by: Option<i64>,
}

impl SoftDeleteFact {
    pub fn is_open(&self) -> bool {
        self.restored_at.is_none()
    }

    pub fn concerns(&self, kind: EntityKind, object_id: i64) -> bool {
        self.entity_type == kind && self.object_id == object_id
    }

    pub fn close(&mut self, actor: Option<i64>, at: DateTime<Utc>) {
        self.restored_at = Some(at);
        self.restored_by = actor;
    }
}

/// Picks the fact a restoration must close: the open one with the latest `deleted_at`,
/// ties going to the highest fact id.
pub fn latest_open_fact<'a, I>(facts: I) -> Option<&'a mut SoftDeleteFact>
where
    I: IntoIterator<Item = &'a mut SoftDeleteFact>,
{
    facts
        .into_iter()
        .filter(|fact| fact.is_open())
        .max_by_key(|fact| (fact.deleted_at, fact.id))
}

/// SoftDeleteOutcome
///
/// Result of a delete or restore: the entity's new deletion state and the fact that was
/// written (delete) or closed (restore). A restore with no open fact carries `fact: None`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SoftDeleteOutcome {
    pub entity_type: EntityKind,
    pub object_id: i64,
    pub is_deleted: bool,
    #[ts(type = "string | null")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub fact: Option<SoftDeleteFact>,
}
