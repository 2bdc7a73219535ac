use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::Repository;
use crate::{
    error::{RepoError, RepoResult},
    models::{
        Company, CompanyPatch, InternalUser, InternalUserPatch, InternalUserSkillset, JobApplication,
        JobOffer, JobOfferPatch, NewCompany, NewJobOffer, NewSkill, Skill, SkillKind,
        SkillsetDetail, SkillsetRequest, SocialProfile, User,
    },
    soft_delete::{
        EntityKind, Scope, SoftDeletable, SoftDeleteFact, SoftDeleteOutcome, latest_open_fact,
    },
};

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: Vec<User>,
    internal_users: Vec<InternalUser>,
    companies: Vec<Company>,
    job_offers: Vec<JobOffer>,
    applications: Vec<JobApplication>,
    skillsets: Vec<InternalUserSkillset>,
    core_skills: Vec<Skill>,
    secondary_skills: Vec<Skill>,
    // (skillset_id, skill_id)
    core_links: Vec<(i64, i64)>,
    secondary_links: Vec<(i64, i64)>,
    facts: Vec<SoftDeleteFact>,
}

fn active<T: SoftDeletable>(rows: &[T], kind: EntityKind, id: i64) -> RepoResult<&T> {
    rows.iter()
        .find(|row| row.id() == id && !row.is_deleted())
        .ok_or(RepoError::not_found(kind, id))
}

fn active_mut<T: SoftDeletable>(
    rows: &mut [T],
    kind: EntityKind,
    id: i64,
) -> RepoResult<&mut T> {
    rows.iter_mut()
        .find(|row| row.id() == id && !row.is_deleted())
        .ok_or(RepoError::not_found(kind, id))
}

fn scoped<T: SoftDeletable + Clone>(rows: &[T], scope: Scope) -> Vec<T> {
    rows.iter()
        .filter(|row| scope.admits(row.is_deleted()))
        .cloned()
        .collect()
}

fn require_reference<T: SoftDeletable>(rows: &[T], kind: EntityKind, id: i64) -> RepoResult<()> {
    active(rows, kind, id)
        .map(|_| ())
        .map_err(|_| RepoError::Validation(format!("{kind} {id} does not exist or is deleted")))
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn skills(&self, kind: SkillKind) -> &Vec<Skill> {
        match kind {
            SkillKind::Core => &self.core_skills,
            SkillKind::Secondary => &self.secondary_skills,
        }
    }

    fn skills_mut(&mut self, kind: SkillKind) -> &mut Vec<Skill> {
        match kind {
            SkillKind::Core => &mut self.core_skills,
            SkillKind::Secondary => &mut self.secondary_skills,
        }
    }

    fn links_mut(&mut self, kind: SkillKind) -> &mut Vec<(i64, i64)> {
        match kind {
            SkillKind::Core => &mut self.core_links,
            SkillKind::Secondary => &mut self.secondary_links,
        }
    }

    fn entity_mut(&mut self, kind: EntityKind, id: i64) -> Option<&mut dyn SoftDeletable> {
        fn find<T: SoftDeletable>(rows: &mut [T], id: i64) -> Option<&mut dyn SoftDeletable> {
            rows.iter_mut()
                .find(|row| row.id() == id)
                .map(|row| row as &mut dyn SoftDeletable)
        }

        match kind {
            EntityKind::Company => find(&mut self.companies, id),
            EntityKind::JobOffer => find(&mut self.job_offers, id),
            EntityKind::InternalUser => find(&mut self.internal_users, id),
            EntityKind::JobApplication => find(&mut self.applications, id),
            EntityKind::Skillset => find(&mut self.skillsets, id),
            EntityKind::CoreSkill => find(&mut self.core_skills, id),
            EntityKind::SecondarySkill => find(&mut self.secondary_skills, id),
        }
    }

    fn active_skillset(&self, internal_user_id: i64) -> RepoResult<Option<InternalUserSkillset>> {
        let mut matching = self
            .skillsets
            .iter()
            .filter(|s| s.internal_user_id == internal_user_id && !s.is_deleted);
        let first = matching.next().cloned();
        if matching.next().is_some() {
            return Err(RepoError::MultipleReturned {
                kind: EntityKind::Skillset,
                id: internal_user_id,
            });
        }
        Ok(first)
    }

    /// A deleted skillset may only come back while its owner has no other active one.
    fn ensure_skillset_restorable(&self, id: i64) -> RepoResult<()> {
        let Some(deleted) = self.skillsets.iter().find(|s| s.id == id && s.is_deleted) else {
            return Ok(());
        };
        match self.active_skillset(deleted.internal_user_id)? {
            None => Ok(()),
            Some(other) => Err(RepoError::Conflict(format!(
                "internal user {} already has active skillset {}",
                deleted.internal_user_id, other.id
            ))),
        }
    }

    fn linked_skills(&self, kind: SkillKind, skillset_id: i64) -> Vec<Skill> {
        let links = match kind {
            SkillKind::Core => &self.core_links,
            SkillKind::Secondary => &self.secondary_links,
        };
        let mut skills: Vec<Skill> = self
            .skills(kind)
            .iter()
            .filter(|skill| !skill.is_deleted)
            .filter(|skill| links.contains(&(skillset_id, skill.id)))
            .cloned()
            .collect();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        skills
    }

    fn skillset_detail(&self, skillset: InternalUserSkillset) -> SkillsetDetail {
        SkillsetDetail {
            core_skills: self.linked_skills(SkillKind::Core, skillset.id),
            secondary_skills: self.linked_skills(SkillKind::Secondary, skillset.id),
            skillset,
        }
    }

    fn insert_user(
        &mut self,
        email: &str,
        profile: &SocialProfile,
        is_staff: bool,
    ) -> (User, InternalUser) {
        let now = Utc::now();
        let user = User {
            id: self.next_id(),
            username: email.to_string(),
            email: email.to_string(),
            first_name: profile.given_name.clone(),
            last_name: profile.family_name.clone(),
            is_staff,
            is_active: true,
            date_joined: now,
        };
        let internal = InternalUser {
            id: self.next_id(),
            first_name: profile.given_name.clone(),
            last_name: profile.family_name.clone(),
            email: email.to_string(),
            skill_level: None,
            user_id: user.id,
            created_at: now,
            modified_at: now,
            is_deleted: false,
            deleted_at: None,
        };
        self.users.push(user.clone());
        self.internal_users.push(internal.clone());
        (user, internal)
    }
}

/// InMemoryRepository
///
/// A `Repository` kept entirely in process memory, used by the router tests and for
/// running the API without a database. One lock guards all tables, so every operation
/// is atomic with respect to the others.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and its internal user profile, as a first social login would.
    pub async fn seed_user(&self, email: &str, is_staff: bool) -> (User, InternalUser) {
        let profile = SocialProfile {
            email: Some(email.to_string()),
            given_name: "Test".to_string(),
            family_name: "User".to_string(),
        };
        self.tables.write().await.insert_user(email, &profile, is_staff)
    }

    pub async fn set_user_active(&self, user_id: i64, is_active: bool) {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.is_active = is_active;
        }
    }

    /// Appends an open fact without touching the entity row.
    pub async fn record_fact(
        &self,
        kind: EntityKind,
        object_id: i64,
        deleted_at: DateTime<Utc>,
        deleted_by: Option<i64>,
    ) -> SoftDeleteFact {
        let mut tables = self.tables.write().await;
        let fact = SoftDeleteFact {
            id: tables.next_id(),
            entity_type: kind,
            object_id,
            deleted_at,
            restored_at: None,
            deleted_by,
            restored_by: None,
        };
        tables.facts.push(fact.clone());
        fact
    }

    /// Drops every fact recorded for one entity, leaving the row itself untouched.
    pub async fn purge_facts(&self, kind: EntityKind, object_id: i64) {
        let mut tables = self.tables.write().await;
        tables.facts.retain(|f| !f.concerns(kind, object_id));
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }

    pub async fn internal_user_count(&self) -> usize {
        self.tables.read().await.internal_users.len()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_or_create_social_user(
        &self,
        email: &str,
        profile: &SocialProfile,
    ) -> RepoResult<(User, bool)> {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter().find(|u| u.email == email) {
            return Ok((user.clone(), false));
        }
        if tables.internal_users.iter().any(|iu| iu.email == email) {
            return Err(RepoError::Conflict(format!(
                "an internal user with email {email} already exists"
            )));
        }
        let (user, _) = tables.insert_user(email, profile, false);
        Ok((user, true))
    }

    async fn internal_user_for(&self, user_id: i64) -> RepoResult<Option<InternalUser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .internal_users
            .iter()
            .find(|iu| iu.user_id == user_id && !iu.is_deleted)
            .cloned())
    }

    // --- Companies ---

    async fn list_companies(&self, scope: Scope) -> RepoResult<Vec<Company>> {
        let mut companies = scoped(&self.tables.read().await.companies, scope);
        companies.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(companies)
    }

    async fn get_company(&self, id: i64) -> RepoResult<Company> {
        let tables = self.tables.read().await;
        active(&tables.companies, EntityKind::Company, id).cloned()
    }

    async fn create_company(&self, req: NewCompany) -> RepoResult<Company> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let company = Company {
            id: tables.next_id(),
            name: req.name,
            company_bio: req.company_bio,
            company_website: req.company_website.unwrap_or_default(),
            created_at: now,
            modified_at: now,
            is_deleted: false,
            deleted_at: None,
        };
        tables.companies.push(company.clone());
        Ok(company)
    }

    async fn update_company(&self, id: i64, patch: CompanyPatch) -> RepoResult<Company> {
        let mut tables = self.tables.write().await;
        let company = active_mut(&mut tables.companies, EntityKind::Company, id)?;
        if let Some(name) = patch.name {
            company.name = name;
        }
        if let Some(bio) = patch.company_bio {
            company.company_bio = bio;
        }
        if let Some(website) = patch.company_website {
            company.company_website = website;
        }
        company.modified_at = Utc::now();
        Ok(company.clone())
    }

    // --- Job Offers ---

    async fn list_job_offers(
        &self,
        scope: Scope,
        company_id: Option<i64>,
    ) -> RepoResult<Vec<JobOffer>> {
        let mut offers: Vec<JobOffer> = scoped(&self.tables.read().await.job_offers, scope)
            .into_iter()
            .filter(|offer| company_id.is_none_or(|cid| offer.company_id == cid))
            .collect();
        offers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(offers)
    }

    async fn get_job_offer(&self, id: i64) -> RepoResult<JobOffer> {
        let tables = self.tables.read().await;
        active(&tables.job_offers, EntityKind::JobOffer, id).cloned()
    }

    async fn create_job_offer(&self, req: NewJobOffer) -> RepoResult<JobOffer> {
        let mut tables = self.tables.write().await;
        require_reference(&tables.companies, EntityKind::Company, req.company_id)?;

        let now = Utc::now();
        let offer = JobOffer {
            id: tables.next_id(),
            title: req.title,
            description: req.description,
            skill_level: req.skill_level,
            tags: req.tags,
            salary_offer: req.salary_offer,
            location: req.location,
            work_mode: req.work_mode,
            url: req.url.unwrap_or_default(),
            company_id: req.company_id,
            created_at: now,
            modified_at: now,
            is_deleted: false,
            deleted_at: None,
        };
        tables.job_offers.push(offer.clone());
        Ok(offer)
    }

    async fn update_job_offer(&self, id: i64, patch: JobOfferPatch) -> RepoResult<JobOffer> {
        let mut tables = self.tables.write().await;
        let offer = active_mut(&mut tables.job_offers, EntityKind::JobOffer, id)?;
        if let Some(title) = patch.title {
            offer.title = title;
        }
        if let Some(description) = patch.description {
            offer.description = description;
        }
        if let Some(level) = patch.skill_level {
            offer.skill_level = level;
        }
        if let Some(tags) = patch.tags {
            offer.tags = tags;
        }
        if let Some(salary) = patch.salary_offer {
            offer.salary_offer = salary;
        }
        if let Some(location) = patch.location {
            offer.location = location;
        }
        if patch.work_mode.is_some() {
            offer.work_mode = patch.work_mode;
        }
        if let Some(url) = patch.url {
            offer.url = url;
        }
        offer.modified_at = Utc::now();
        Ok(offer.clone())
    }

    // --- Internal Users ---

    async fn list_internal_users(&self, scope: Scope) -> RepoResult<Vec<InternalUser>> {
        let mut users = scoped(&self.tables.read().await.internal_users, scope);
        users.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(users)
    }

    async fn get_internal_user(&self, id: i64) -> RepoResult<InternalUser> {
        let tables = self.tables.read().await;
        active(&tables.internal_users, EntityKind::InternalUser, id).cloned()
    }

    async fn update_internal_user(
        &self,
        id: i64,
        patch: InternalUserPatch,
    ) -> RepoResult<InternalUser> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &patch.email {
            if tables
                .internal_users
                .iter()
                .any(|iu| iu.id != id && &iu.email == email)
            {
                return Err(RepoError::Conflict(format!(
                    "an internal user with email {email} already exists"
                )));
            }
        }

        let internal = active_mut(&mut tables.internal_users, EntityKind::InternalUser, id)?;
        if let Some(first_name) = patch.first_name {
            internal.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            internal.last_name = last_name;
        }
        if let Some(email) = patch.email {
            internal.email = email;
        }
        if patch.skill_level.is_some() {
            internal.skill_level = patch.skill_level;
        }
        internal.modified_at = Utc::now();
        Ok(internal.clone())
    }

    // --- Job Applications ---

    async fn get_job_application(&self, id: i64) -> RepoResult<JobApplication> {
        let tables = self.tables.read().await;
        active(&tables.applications, EntityKind::JobApplication, id).cloned()
    }

    async fn create_job_application(
        &self,
        internal_user_id: i64,
        job_offer_id: i64,
    ) -> RepoResult<JobApplication> {
        let mut tables = self.tables.write().await;
        require_reference(
            &tables.internal_users,
            EntityKind::InternalUser,
            internal_user_id,
        )?;
        require_reference(&tables.job_offers, EntityKind::JobOffer, job_offer_id)?;

        let now = Utc::now();
        let application = JobApplication {
            id: tables.next_id(),
            job_offer_id,
            internal_user_id,
            status: 0,
            created_at: now,
            modified_at: now,
            is_deleted: false,
            deleted_at: None,
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    async fn update_application_status(
        &self,
        id: i64,
        status: i32,
    ) -> RepoResult<JobApplication> {
        let mut tables = self.tables.write().await;
        let application = active_mut(&mut tables.applications, EntityKind::JobApplication, id)?;
        application.status = status;
        application.modified_at = Utc::now();
        Ok(application.clone())
    }

    async fn applications_for(&self, internal_user_id: i64) -> RepoResult<Vec<JobApplication>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.internal_user_id == internal_user_id && !a.is_deleted)
            .cloned()
            .collect())
    }

    // --- Skills & Skillsets ---

    async fn list_skills(&self, kind: SkillKind, scope: Scope) -> RepoResult<Vec<Skill>> {
        let tables = self.tables.read().await;
        let mut skills = scoped(tables.skills(kind), scope);
        skills.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(skills)
    }

    async fn create_skill(&self, kind: SkillKind, req: NewSkill) -> RepoResult<Skill> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let skill = Skill {
            id: tables.next_id(),
            name: req.name,
            created_at: now,
            modified_at: now,
            is_deleted: false,
            deleted_at: None,
        };
        tables.skills_mut(kind).push(skill.clone());
        Ok(skill)
    }

    async fn get_skillset_by_id(&self, id: i64) -> RepoResult<InternalUserSkillset> {
        let tables = self.tables.read().await;
        active(&tables.skillsets, EntityKind::Skillset, id).cloned()
    }

    async fn get_skillset(&self, internal_user_id: i64) -> RepoResult<SkillsetDetail> {
        let tables = self.tables.read().await;
        let skillset = tables
            .active_skillset(internal_user_id)?
            .ok_or(RepoError::not_found(EntityKind::Skillset, internal_user_id))?;
        Ok(tables.skillset_detail(skillset))
    }

    async fn set_skillset(
        &self,
        internal_user_id: i64,
        req: SkillsetRequest,
    ) -> RepoResult<SkillsetDetail> {
        let mut tables = self.tables.write().await;
        active(
            &tables.internal_users,
            EntityKind::InternalUser,
            internal_user_id,
        )?;

        for (kind, ids) in [
            (SkillKind::Core, &req.core_skill_ids),
            (SkillKind::Secondary, &req.secondary_skill_ids),
        ] {
            let skills = tables.skills(kind);
            if !ids.iter().all(|id| active(skills, kind.entity_kind(), *id).is_ok()) {
                return Err(RepoError::Validation(format!(
                    "every {} must exist and be active",
                    kind.entity_kind()
                )));
            }
        }

        let now = Utc::now();
        let skillset_id = match tables.active_skillset(internal_user_id)? {
            Some(existing) => existing.id,
            None => {
                let id = tables.next_id();
                tables.skillsets.push(InternalUserSkillset {
                    id,
                    internal_user_id,
                    created_at: now,
                    modified_at: now,
                    is_deleted: false,
                    deleted_at: None,
                });
                id
            }
        };

        for (kind, ids) in [
            (SkillKind::Core, req.core_skill_ids),
            (SkillKind::Secondary, req.secondary_skill_ids),
        ] {
            let links = tables.links_mut(kind);
            links.retain(|(set, _)| *set != skillset_id);
            for id in ids {
                if !links.contains(&(skillset_id, id)) {
                    links.push((skillset_id, id));
                }
            }
        }

        let skillset = active_mut(&mut tables.skillsets, EntityKind::Skillset, skillset_id)?;
        skillset.modified_at = now;
        let skillset = skillset.clone();
        Ok(tables.skillset_detail(skillset))
    }

    // --- Soft Delete & Audit ---

    async fn soft_delete(
        &self,
        kind: EntityKind,
        id: i64,
        actor: Option<i64>,
    ) -> RepoResult<SoftDeleteOutcome> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        let row = tables
            .entity_mut(kind, id)
            .filter(|row| !row.is_deleted())
            .ok_or(RepoError::not_found(kind, id))?;
        row.mark_deleted(now);
        let deleted_at = row.deleted_at();

        let fact = SoftDeleteFact {
            id: tables.next_id(),
            entity_type: kind,
            object_id: id,
            deleted_at: now,
            restored_at: None,
            deleted_by: actor,
            restored_by: None,
        };
        tables.facts.push(fact.clone());

        Ok(SoftDeleteOutcome {
            entity_type: kind,
            object_id: id,
            is_deleted: true,
            deleted_at,
            fact: Some(fact),
        })
    }

    async fn restore(
        &self,
        kind: EntityKind,
        id: i64,
        actor: Option<i64>,
    ) -> RepoResult<SoftDeleteOutcome> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if kind == EntityKind::Skillset {
            tables.ensure_skillset_restorable(id)?;
        }

        let row = tables
            .entity_mut(kind, id)
            .filter(|row| row.is_deleted())
            .ok_or(RepoError::not_found(kind, id))?;
        row.mark_restored(now);

        let fact = latest_open_fact(tables.facts.iter_mut().filter(|f| f.concerns(kind, id)))
            .map(|fact| {
                fact.close(actor, now);
                fact.clone()
            });

        Ok(SoftDeleteOutcome {
            entity_type: kind,
            object_id: id,
            is_deleted: false,
            deleted_at: None,
            fact,
        })
    }

    async fn deletion_history(&self, kind: EntityKind, id: i64) -> RepoResult<Vec<SoftDeleteFact>> {
        let tables = self.tables.read().await;
        let mut facts: Vec<SoftDeleteFact> = tables
            .facts
            .iter()
            .filter(|f| f.concerns(kind, id))
            .cloned()
            .collect();
        facts.sort_by(|a, b| (b.deleted_at, b.id).cmp(&(a.deleted_at, a.id)));
        Ok(facts)
    }
}
