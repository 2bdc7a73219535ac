use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    error::RepoResult,
    models::{
        Company, CompanyPatch, InternalUser, InternalUserPatch, InternalUserSkillset, JobApplication,
        JobOffer, JobOfferPatch, NewCompany, NewJobOffer, NewSkill, Skill, SkillKind,
        SkillsetDetail, SkillsetRequest, SocialProfile, User,
    },
    soft_delete::{EntityKind, Scope, SoftDeleteFact, SoftDeleteOutcome},
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// Repository Trait
///
/// Persistence contract shared by the Postgres and in-memory implementations.
///
/// Unless a method takes a `Scope`, reads only see active (not soft-deleted) rows and
/// single-row lookups of a deleted row fail with `RepoError::NotFound`.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users & Authentication ---
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;

    /// Returns the user registered under `email`, creating it (and its internal user
    /// profile) in one transaction when it does not exist. The flag is true on creation.
    async fn get_or_create_social_user(
        &self,
        email: &str,
        profile: &SocialProfile,
    ) -> RepoResult<(User, bool)>;

    /// The active internal user profile linked to `user_id`, if any.
    async fn internal_user_for(&self, user_id: i64) -> RepoResult<Option<InternalUser>>;

    // --- Companies ---
    async fn list_companies(&self, scope: Scope) -> RepoResult<Vec<Company>>;
    async fn get_company(&self, id: i64) -> RepoResult<Company>;
    async fn create_company(&self, req: NewCompany) -> RepoResult<Company>;
    async fn update_company(&self, id: i64, patch: CompanyPatch) -> RepoResult<Company>;

    // --- Job Offers ---
    async fn list_job_offers(
        &self,
        scope: Scope,
        company_id: Option<i64>,
    ) -> RepoResult<Vec<JobOffer>>;
    async fn get_job_offer(&self, id: i64) -> RepoResult<JobOffer>;
    /// The referenced company must be active.
    async fn create_job_offer(&self, req: NewJobOffer) -> RepoResult<JobOffer>;
    async fn update_job_offer(&self, id: i64, patch: JobOfferPatch) -> RepoResult<JobOffer>;

    // --- Internal Users ---
    async fn list_internal_users(&self, scope: Scope) -> RepoResult<Vec<InternalUser>>;
    async fn get_internal_user(&self, id: i64) -> RepoResult<InternalUser>;
    async fn update_internal_user(
        &self,
        id: i64,
        patch: InternalUserPatch,
    ) -> RepoResult<InternalUser>;

    // --- Job Applications ---
    async fn get_job_application(&self, id: i64) -> RepoResult<JobApplication>;
    /// The applicant and the job offer must both be active.
    async fn create_job_application(
        &self,
        internal_user_id: i64,
        job_offer_id: i64,
    ) -> RepoResult<JobApplication>;
    async fn update_application_status(&self, id: i64, status: i32)
    -> RepoResult<JobApplication>;
    /// Active applications of an internal user, oldest first.
    async fn applications_for(&self, internal_user_id: i64) -> RepoResult<Vec<JobApplication>>;

    // --- Skills & Skillsets ---
    async fn list_skills(&self, kind: SkillKind, scope: Scope) -> RepoResult<Vec<Skill>>;
    async fn create_skill(&self, kind: SkillKind, req: NewSkill) -> RepoResult<Skill>;
    async fn get_skillset_by_id(&self, id: i64) -> RepoResult<InternalUserSkillset>;
    /// The active skillset of an internal user with its active skills.
    /// Fails with `MultipleReturned` if more than one active skillset exists.
    async fn get_skillset(&self, internal_user_id: i64) -> RepoResult<SkillsetDetail>;
    /// Creates the skillset if needed and replaces its skill links.
    async fn set_skillset(
        &self,
        internal_user_id: i64,
        req: SkillsetRequest,
    ) -> RepoResult<SkillsetDetail>;

    // --- Soft Delete & Audit ---
    /// Marks an active row deleted and appends an open fact, atomically.
    async fn soft_delete(
        &self,
        kind: EntityKind,
        id: i64,
        actor: Option<i64>,
    ) -> RepoResult<SoftDeleteOutcome>;
    /// Reactivates a deleted row and closes its most recent open fact, atomically.
    async fn restore(
        &self,
        kind: EntityKind,
        id: i64,
        actor: Option<i64>,
    ) -> RepoResult<SoftDeleteOutcome>;
    /// All facts recorded for one entity, newest first.
    async fn deletion_history(&self, kind: EntityKind, id: i64) -> RepoResult<Vec<SoftDeleteFact>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
