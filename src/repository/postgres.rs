use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection, PgPool, postgres::PgRow, query_builder::QueryBuilder};

use super::Repository;
use crate::{
    error::{RepoError, RepoResult},
    models::{
        Company, CompanyPatch, InternalUser, InternalUserPatch, InternalUserSkillset, JobApplication,
        JobOffer, JobOfferPatch, NewCompany, NewJobOffer, NewSkill, Skill, SkillKind,
        SkillsetDetail, SkillsetRequest, SocialProfile, User,
    },
    soft_delete::{EntityKind, Scope, SoftDeleteFact, SoftDeleteOutcome},
};

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, is_staff, is_active, date_joined";
const INTERNAL_USER_COLUMNS: &str = "id, first_name, last_name, email, skill_level, user_id, \
     created_at, modified_at, is_deleted, deleted_at";
const COMPANY_COLUMNS: &str =
    "id, name, company_bio, company_website, created_at, modified_at, is_deleted, deleted_at";
const JOB_OFFER_COLUMNS: &str = "id, title, description, skill_level, tags, salary_offer, \
     location, work_mode, url, company_id, created_at, modified_at, is_deleted, deleted_at";
const APPLICATION_COLUMNS: &str = "id, job_offer_id, internal_user_id, status, created_at, \
     modified_at, is_deleted, deleted_at";
const SKILLSET_COLUMNS: &str =
    "id, internal_user_id, created_at, modified_at, is_deleted, deleted_at";
const SKILL_COLUMNS: &str = "id, name, created_at, modified_at, is_deleted, deleted_at";
const FACT_COLUMNS: &str =
    "id, entity_type, object_id, deleted_at, restored_at, deleted_by, restored_by";

fn link_table(kind: SkillKind) -> &'static str {
    match kind {
        SkillKind::Core => "skillset_core_skills",
        SkillKind::Secondary => "skillset_secondary_skills",
    }
}

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. Table names in dynamic SQL
/// always come from `EntityKind::table()`; every value is bound.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// One active row by id, or `NotFound`.
    async fn fetch_active<T>(&self, kind: EntityKind, columns: &str, id: i64) -> RepoResult<T>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT {columns} FROM {} WHERE id = $1 AND is_deleted = false",
            kind.table()
        );
        sqlx::query_as::<_, T>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::not_found(kind, id))
    }

    async fn list_scoped<T>(
        &self,
        kind: EntityKind,
        columns: &str,
        scope: Scope,
        order_by: &str,
    ) -> RepoResult<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
    {
        let sql = format!(
            "SELECT {columns} FROM {} WHERE {} ORDER BY {order_by}",
            kind.table(),
            scope.sql_filter()
        );
        Ok(sqlx::query_as::<_, T>(&sql).fetch_all(&self.pool).await?)
    }
}

/// Fails with `Validation` unless the referenced row exists and is active. The row is
/// share-locked so it cannot be soft-deleted before the surrounding transaction commits.
async fn ensure_active(conn: &mut PgConnection, kind: EntityKind, id: i64) -> RepoResult<()> {
    let sql = format!(
        "SELECT id FROM {} WHERE id = $1 AND is_deleted = false FOR SHARE",
        kind.table()
    );
    let found: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    found
        .map(|_| ())
        .ok_or_else(|| RepoError::Validation(format!("{kind} {id} does not exist or is deleted")))
}

async fn active_skillset(
    conn: &mut PgConnection,
    internal_user_id: i64,
) -> RepoResult<Option<InternalUserSkillset>> {
    let sql = format!(
        "SELECT {SKILLSET_COLUMNS} FROM internal_user_skillsets \
         WHERE internal_user_id = $1 AND is_deleted = false ORDER BY id LIMIT 2"
    );
    let mut rows: Vec<InternalUserSkillset> = sqlx::query_as(&sql)
        .bind(internal_user_id)
        .fetch_all(&mut *conn)
        .await?;

    if rows.len() > 1 {
        return Err(RepoError::MultipleReturned {
            kind: EntityKind::Skillset,
            id: internal_user_id,
        });
    }
    Ok(rows.pop())
}

/// A deleted skillset may only come back while its owner has no other active one. The
/// owner row is locked for update, which waits out a concurrent `set_skillset`.
async fn ensure_skillset_restorable(conn: &mut PgConnection, id: i64) -> RepoResult<()> {
    let sql = format!(
        "SELECT iu.id FROM {} iu JOIN {} s ON s.internal_user_id = iu.id \
         WHERE s.id = $1 AND s.is_deleted = true FOR UPDATE OF iu",
        EntityKind::InternalUser.table(),
        EntityKind::Skillset.table()
    );
    let owner: Option<i64> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    let Some(owner) = owner else {
        return Ok(());
    };

    match active_skillset(conn, owner).await? {
        None => Ok(()),
        Some(other) => Err(RepoError::Conflict(format!(
            "internal user {owner} already has active skillset {}",
            other.id
        ))),
    }
}

async fn linked_skills(
    conn: &mut PgConnection,
    kind: SkillKind,
    skillset_id: i64,
) -> RepoResult<Vec<Skill>> {
    let sql = format!(
        "SELECT s.id, s.name, s.created_at, s.modified_at, s.is_deleted, s.deleted_at \
         FROM {} s JOIN {} l ON l.skill_id = s.id \
         WHERE l.skillset_id = $1 AND s.is_deleted = false ORDER BY s.name",
        kind.entity_kind().table(),
        link_table(kind)
    );
    Ok(sqlx::query_as(&sql)
        .bind(skillset_id)
        .fetch_all(&mut *conn)
        .await?)
}

async fn skillset_detail(
    conn: &mut PgConnection,
    skillset: InternalUserSkillset,
) -> RepoResult<SkillsetDetail> {
    let core_skills = linked_skills(conn, SkillKind::Core, skillset.id).await?;
    let secondary_skills = linked_skills(conn, SkillKind::Secondary, skillset.id).await?;
    Ok(SkillsetDetail {
        skillset,
        core_skills,
        secondary_skills,
    })
}

async fn replace_links(
    conn: &mut PgConnection,
    kind: SkillKind,
    skillset_id: i64,
    skill_ids: &[i64],
) -> RepoResult<()> {
    let mut ids = skill_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE id = ANY($1) AND is_deleted = false",
        kind.entity_kind().table()
    );
    let active: i64 = sqlx::query_scalar(&sql)
        .bind(&ids)
        .fetch_one(&mut *conn)
        .await?;
    if active != ids.len() as i64 {
        return Err(RepoError::Validation(format!(
            "every {} must exist and be active",
            kind.entity_kind()
        )));
    }

    let table = link_table(kind);
    sqlx::query(&format!("DELETE FROM {table} WHERE skillset_id = $1"))
        .bind(skillset_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(&format!(
        "INSERT INTO {table} (skillset_id, skill_id) SELECT $1, UNNEST($2::bigint[])"
    ))
    .bind(skillset_id)
    .bind(&ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// get_or_create_social_user
    ///
    /// `ON CONFLICT DO NOTHING` keeps two concurrent first logins for the same email
    /// from failing: the loser reads the winner's row and reports `created = false`.
    async fn get_or_create_social_user(
        &self,
        email: &str,
        profile: &SocialProfile,
    ) -> RepoResult<(User, bool)> {
        let mut tx = self.pool.begin().await?;

        let insert = format!(
            "INSERT INTO users (username, email, first_name, last_name) \
             VALUES ($1, $1, $2, $3) ON CONFLICT (email) DO NOTHING \
             RETURNING {USER_COLUMNS}"
        );
        let inserted: Option<User> = sqlx::query_as(&insert)
            .bind(email)
            .bind(&profile.given_name)
            .bind(&profile.family_name)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepoError::from_db)?;

        let Some(user) = inserted else {
            let select = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
            let user: User = sqlx::query_as(&select)
                .bind(email)
                .fetch_one(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok((user, false));
        };

        sqlx::query(
            "INSERT INTO internal_users (first_name, last_name, email, user_id) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&profile.given_name)
        .bind(&profile.family_name)
        .bind(email)
        .bind(user.id)
        .execute(&mut *tx)
        .await
        .map_err(RepoError::from_db)?;

        tx.commit().await?;
        Ok((user, true))
    }

    async fn internal_user_for(&self, user_id: i64) -> RepoResult<Option<InternalUser>> {
        let sql = format!(
            "SELECT {INTERNAL_USER_COLUMNS} FROM internal_users \
             WHERE user_id = $1 AND is_deleted = false"
        );
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    // --- Companies ---

    async fn list_companies(&self, scope: Scope) -> RepoResult<Vec<Company>> {
        self.list_scoped(EntityKind::Company, COMPANY_COLUMNS, scope, "name, id")
            .await
    }

    async fn get_company(&self, id: i64) -> RepoResult<Company> {
        self.fetch_active(EntityKind::Company, COMPANY_COLUMNS, id)
            .await
    }

    async fn create_company(&self, req: NewCompany) -> RepoResult<Company> {
        let sql = format!(
            "INSERT INTO companies (name, company_bio, company_website) VALUES ($1, $2, $3) \
             RETURNING {COMPANY_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(req.name)
            .bind(req.company_bio)
            .bind(req.company_website.unwrap_or_default())
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_db)
    }

    async fn update_company(&self, id: i64, patch: CompanyPatch) -> RepoResult<Company> {
        let sql = format!(
            "UPDATE companies SET \
                name = COALESCE($2, name), \
                company_bio = COALESCE($3, company_bio), \
                company_website = COALESCE($4, company_website), \
                modified_at = now() \
             WHERE id = $1 AND is_deleted = false \
             RETURNING {COMPANY_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.name)
            .bind(patch.company_bio)
            .bind(patch.company_website)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_db)?
            .ok_or(RepoError::not_found(EntityKind::Company, id))
    }

    // --- Job Offers ---

    async fn list_job_offers(
        &self,
        scope: Scope,
        company_id: Option<i64>,
    ) -> RepoResult<Vec<JobOffer>> {
        let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
            "SELECT {JOB_OFFER_COLUMNS} FROM job_offers WHERE {}",
            scope.sql_filter()
        ));
        if let Some(company_id) = company_id {
            builder.push(" AND company_id = ");
            builder.push_bind(company_id);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        Ok(builder
            .build_query_as::<JobOffer>()
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_job_offer(&self, id: i64) -> RepoResult<JobOffer> {
        self.fetch_active(EntityKind::JobOffer, JOB_OFFER_COLUMNS, id)
            .await
    }

    async fn create_job_offer(&self, req: NewJobOffer) -> RepoResult<JobOffer> {
        let mut tx = self.pool.begin().await?;
        ensure_active(&mut tx, EntityKind::Company, req.company_id).await?;

        let sql = format!(
            "INSERT INTO job_offers \
                (title, description, skill_level, tags, salary_offer, location, work_mode, url, company_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {JOB_OFFER_COLUMNS}"
        );
        let offer: JobOffer = sqlx::query_as(&sql)
            .bind(req.title)
            .bind(req.description)
            .bind(req.skill_level)
            .bind(req.tags)
            .bind(req.salary_offer)
            .bind(req.location)
            .bind(req.work_mode)
            .bind(req.url.unwrap_or_default())
            .bind(req.company_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepoError::from_db)?;

        tx.commit().await?;
        Ok(offer)
    }

    async fn update_job_offer(&self, id: i64, patch: JobOfferPatch) -> RepoResult<JobOffer> {
        let sql = format!(
            "UPDATE job_offers SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                skill_level = COALESCE($4, skill_level), \
                tags = COALESCE($5, tags), \
                salary_offer = COALESCE($6, salary_offer), \
                location = COALESCE($7, location), \
                work_mode = COALESCE($8, work_mode), \
                url = COALESCE($9, url), \
                modified_at = now() \
             WHERE id = $1 AND is_deleted = false \
             RETURNING {JOB_OFFER_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.title)
            .bind(patch.description)
            .bind(patch.skill_level)
            .bind(patch.tags)
            .bind(patch.salary_offer)
            .bind(patch.location)
            .bind(patch.work_mode)
            .bind(patch.url)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_db)?
            .ok_or(RepoError::not_found(EntityKind::JobOffer, id))
    }

    // --- Internal Users ---

    async fn list_internal_users(&self, scope: Scope) -> RepoResult<Vec<InternalUser>> {
        self.list_scoped(
            EntityKind::InternalUser,
            INTERNAL_USER_COLUMNS,
            scope,
            "last_name, first_name, id",
        )
        .await
    }

    async fn get_internal_user(&self, id: i64) -> RepoResult<InternalUser> {
        self.fetch_active(EntityKind::InternalUser, INTERNAL_USER_COLUMNS, id)
            .await
    }

    async fn update_internal_user(
        &self,
        id: i64,
        patch: InternalUserPatch,
    ) -> RepoResult<InternalUser> {
        let sql = format!(
            "UPDATE internal_users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                email = COALESCE($4, email), \
                skill_level = COALESCE($5, skill_level), \
                modified_at = now() \
             WHERE id = $1 AND is_deleted = false \
             RETURNING {INTERNAL_USER_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(patch.first_name)
            .bind(patch.last_name)
            .bind(patch.email)
            .bind(patch.skill_level)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepoError::from_db)?
            .ok_or(RepoError::not_found(EntityKind::InternalUser, id))
    }

    // --- Job Applications ---

    async fn get_job_application(&self, id: i64) -> RepoResult<JobApplication> {
        self.fetch_active(EntityKind::JobApplication, APPLICATION_COLUMNS, id)
            .await
    }

    async fn create_job_application(
        &self,
        internal_user_id: i64,
        job_offer_id: i64,
    ) -> RepoResult<JobApplication> {
        let mut tx = self.pool.begin().await?;
        ensure_active(&mut tx, EntityKind::InternalUser, internal_user_id).await?;
        ensure_active(&mut tx, EntityKind::JobOffer, job_offer_id).await?;

        let sql = format!(
            "INSERT INTO job_applications (job_offer_id, internal_user_id) VALUES ($1, $2) \
             RETURNING {APPLICATION_COLUMNS}"
        );
        let application: JobApplication = sqlx::query_as(&sql)
            .bind(job_offer_id)
            .bind(internal_user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepoError::from_db)?;

        tx.commit().await?;
        Ok(application)
    }

    async fn update_application_status(
        &self,
        id: i64,
        status: i32,
    ) -> RepoResult<JobApplication> {
        let sql = format!(
            "UPDATE job_applications SET status = $2, modified_at = now() \
             WHERE id = $1 AND is_deleted = false RETURNING {APPLICATION_COLUMNS}"
        );
        sqlx::query_as(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(RepoError::not_found(EntityKind::JobApplication, id))
    }

    async fn applications_for(&self, internal_user_id: i64) -> RepoResult<Vec<JobApplication>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM job_applications \
             WHERE internal_user_id = $1 AND is_deleted = false ORDER BY created_at, id"
        );
        Ok(sqlx::query_as(&sql)
            .bind(internal_user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    // --- Skills & Skillsets ---

    async fn list_skills(&self, kind: SkillKind, scope: Scope) -> RepoResult<Vec<Skill>> {
        self.list_scoped(kind.entity_kind(), SKILL_COLUMNS, scope, "name, id")
            .await
    }

    async fn create_skill(&self, kind: SkillKind, req: NewSkill) -> RepoResult<Skill> {
        let sql = format!(
            "INSERT INTO {} (name) VALUES ($1) RETURNING {SKILL_COLUMNS}",
            kind.entity_kind().table()
        );
        sqlx::query_as(&sql)
            .bind(req.name)
            .fetch_one(&self.pool)
            .await
            .map_err(RepoError::from_db)
    }

    async fn get_skillset_by_id(&self, id: i64) -> RepoResult<InternalUserSkillset> {
        self.fetch_active(EntityKind::Skillset, SKILLSET_COLUMNS, id)
            .await
    }

    async fn get_skillset(&self, internal_user_id: i64) -> RepoResult<SkillsetDetail> {
        let mut conn = self.pool.acquire().await?;
        let skillset = active_skillset(&mut conn, internal_user_id)
            .await?
            .ok_or(RepoError::not_found(EntityKind::Skillset, internal_user_id))?;
        skillset_detail(&mut conn, skillset).await
    }

    async fn set_skillset(
        &self,
        internal_user_id: i64,
        req: SkillsetRequest,
    ) -> RepoResult<SkillsetDetail> {
        let mut tx = self.pool.begin().await?;
        ensure_active(&mut tx, EntityKind::InternalUser, internal_user_id)
            .await
            .map_err(|_| RepoError::not_found(EntityKind::InternalUser, internal_user_id))?;

        let skillset = match active_skillset(&mut tx, internal_user_id).await? {
            Some(existing) => existing,
            None => {
                let sql = format!(
                    "INSERT INTO internal_user_skillsets (internal_user_id) VALUES ($1) \
                     RETURNING {SKILLSET_COLUMNS}"
                );
                sqlx::query_as(&sql)
                    .bind(internal_user_id)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(RepoError::from_db)?
            }
        };

        replace_links(&mut tx, SkillKind::Core, skillset.id, &req.core_skill_ids).await?;
        replace_links(
            &mut tx,
            SkillKind::Secondary,
            skillset.id,
            &req.secondary_skill_ids,
        )
        .await?;

        let sql = format!(
            "UPDATE internal_user_skillsets SET modified_at = now() WHERE id = $1 \
             RETURNING {SKILLSET_COLUMNS}"
        );
        let skillset: InternalUserSkillset = sqlx::query_as(&sql)
            .bind(skillset.id)
            .fetch_one(&mut *tx)
            .await?;

        let detail = skillset_detail(&mut tx, skillset).await?;
        tx.commit().await?;
        Ok(detail)
    }

    // --- Soft Delete & Audit ---

    async fn soft_delete(
        &self,
        kind: EntityKind,
        id: i64,
        actor: Option<i64>,
    ) -> RepoResult<SoftDeleteOutcome> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "UPDATE {} SET is_deleted = true, deleted_at = $1, modified_at = $1 \
             WHERE id = $2 AND is_deleted = false RETURNING deleted_at",
            kind.table()
        );
        let deleted_at: Option<DateTime<Utc>> = sqlx::query_scalar(&sql)
            .bind(now)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepoError::not_found(kind, id))?;

        let sql = format!(
            "INSERT INTO soft_delete_facts (entity_type, object_id, deleted_at, deleted_by) \
             VALUES ($1, $2, $3, $4) RETURNING {FACT_COLUMNS}"
        );
        let fact: SoftDeleteFact = sqlx::query_as(&sql)
            .bind(kind)
            .bind(id)
            .bind(now)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await
            .map_err(RepoError::from_db)?;

        tx.commit().await?;
        tracing::info!(entity_type = %kind, object_id = id, ?actor, "soft deleted");

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
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        if kind == EntityKind::Skillset {
            ensure_skillset_restorable(&mut tx, id).await?;
        }

        let sql = format!(
            "UPDATE {} SET is_deleted = false, deleted_at = NULL, modified_at = $1 \
             WHERE id = $2 AND is_deleted = true RETURNING id",
            kind.table()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(now)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepoError::not_found(kind, id))?;

        // Only the most recent open fact is closed; older ones are left as they are.
        let sql = format!(
            "UPDATE soft_delete_facts SET restored_at = $1, restored_by = $2 \
             WHERE id = ( \
                SELECT id FROM soft_delete_facts \
                WHERE entity_type = $3 AND object_id = $4 AND restored_at IS NULL \
                ORDER BY deleted_at DESC, id DESC LIMIT 1 \
             ) RETURNING {FACT_COLUMNS}"
        );
        let fact: Option<SoftDeleteFact> = sqlx::query_as(&sql)
            .bind(now)
            .bind(actor)
            .bind(kind)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepoError::from_db)?;

        tx.commit().await?;
        if fact.is_none() {
            tracing::warn!(entity_type = %kind, object_id = id, "restored without an open deletion fact");
        }
        tracing::info!(entity_type = %kind, object_id = id, ?actor, "restored");

        Ok(SoftDeleteOutcome {
            entity_type: kind,
            object_id: id,
            is_deleted: false,
            deleted_at: None,
            fact,
        })
    }

    async fn deletion_history(&self, kind: EntityKind, id: i64) -> RepoResult<Vec<SoftDeleteFact>> {
        let sql = format!(
            "SELECT {FACT_COLUMNS} FROM soft_delete_facts \
             WHERE entity_type = $1 AND object_id = $2 ORDER BY deleted_at DESC, id DESC"
        );
        Ok(sqlx::query_as(&sql)
            .bind(kind)
            .bind(id)
            .fetch_all(&self.pool)
            .await?)
    }
}
