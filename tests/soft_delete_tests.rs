use chrono::{Duration, Utc};
use neofindr::{
    error::RepoError,
    models::{NewCompany, NewJobOffer, NewSkill, SkillKind, SkillLevel, SkillsetRequest},
    repository::{InMemoryRepository, Repository},
    soft_delete::{EntityKind, Scope},
};

async fn repo_with_company() -> (InMemoryRepository, i64) {
    let repo = InMemoryRepository::new();
    let company = repo
        .create_company(NewCompany {
            name: "Acme".to_string(),
            ..NewCompany::default()
        })
        .await
        .unwrap();
    (repo, company.id)
}

#[tokio::test]
async fn delete_marks_row_and_records_one_open_fact() {
    let (repo, company_id) = repo_with_company().await;
    let (_, actor) = repo.seed_user("staff@example.com", true).await;

    let outcome = repo
        .soft_delete(EntityKind::Company, company_id, Some(actor.id))
        .await
        .unwrap();

    assert!(outcome.is_deleted);
    assert!(outcome.deleted_at.is_some());
    let fact = outcome.fact.expect("delete always records a fact");
    assert_eq!(fact.entity_type, EntityKind::Company);
    assert_eq!(fact.object_id, company_id);
    assert_eq!(fact.deleted_by, Some(actor.id));
    assert!(fact.is_open());

    let history = repo
        .deletion_history(EntityKind::Company, company_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);

    assert!(matches!(
        repo.get_company(company_id).await,
        Err(RepoError::NotFound { .. })
    ));
    let deleted = repo.list_companies(Scope::Deleted).await.unwrap();
    assert_eq!(deleted.len(), 1);
    assert!(repo.list_companies(Scope::Active).await.unwrap().is_empty());
    assert_eq!(repo.list_companies(Scope::All).await.unwrap().len(), 1);
}

#[tokio::test]
async fn deleting_twice_fails_without_a_second_fact() {
    let (repo, company_id) = repo_with_company().await;

    repo.soft_delete(EntityKind::Company, company_id, None)
        .await
        .unwrap();
    let second = repo.soft_delete(EntityKind::Company, company_id, None).await;

    assert!(matches!(second, Err(RepoError::NotFound { .. })));
    let history = repo
        .deletion_history(EntityKind::Company, company_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn deleting_unknown_row_is_not_found() {
    let repo = InMemoryRepository::new();
    let result = repo.soft_delete(EntityKind::JobOffer, 404, None).await;
    assert!(matches!(
        result,
        Err(RepoError::NotFound {
            kind: EntityKind::JobOffer,
            id: 404
        })
    ));
}

#[tokio::test]
async fn restore_closes_only_the_most_recent_open_fact() {
    let (repo, company_id) = repo_with_company().await;
    let (_, restorer) = repo.seed_user("staff@example.com", true).await;

    // An older fact left open by an earlier, unrecorded restore.
    let stale = repo
        .record_fact(
            EntityKind::Company,
            company_id,
            Utc::now() - Duration::days(3),
            None,
        )
        .await;

    let deleted = repo
        .soft_delete(EntityKind::Company, company_id, None)
        .await
        .unwrap();
    let latest = deleted.fact.unwrap();

    let restored = repo
        .restore(EntityKind::Company, company_id, Some(restorer.id))
        .await
        .unwrap();

    assert!(!restored.is_deleted);
    assert!(restored.deleted_at.is_none());
    let closed = restored.fact.expect("an open fact existed");
    assert_eq!(closed.id, latest.id);
    assert_eq!(closed.restored_by, Some(restorer.id));

    let history = repo
        .deletion_history(EntityKind::Company, company_id)
        .await
        .unwrap();
    let stale_after = history.iter().find(|f| f.id == stale.id).unwrap();
    assert!(stale_after.is_open());

    let company = repo.get_company(company_id).await.unwrap();
    assert!(!company.is_deleted);
}

#[tokio::test]
async fn restore_without_open_fact_still_reactivates() {
    let (repo, company_id) = repo_with_company().await;

    repo.soft_delete(EntityKind::Company, company_id, None)
        .await
        .unwrap();
    repo.purge_facts(EntityKind::Company, company_id).await;

    let outcome = repo
        .restore(EntityKind::Company, company_id, None)
        .await
        .unwrap();

    assert!(!outcome.is_deleted);
    assert!(outcome.fact.is_none());
    assert!(!repo.get_company(company_id).await.unwrap().is_deleted);
}

#[tokio::test]
async fn restoring_an_active_row_is_not_found() {
    let (repo, company_id) = repo_with_company().await;
    let result = repo.restore(EntityKind::Company, company_id, None).await;
    assert!(matches!(result, Err(RepoError::NotFound { .. })));
}

#[tokio::test]
async fn delete_does_not_cascade() {
    let (repo, company_id) = repo_with_company().await;
    let offer = repo
        .create_job_offer(NewJobOffer {
            title: "Engineer".to_string(),
            description: String::new(),
            skill_level: SkillLevel::Junior,
            tags: String::new(),
            salary_offer: 0,
            location: String::new(),
            work_mode: None,
            url: None,
            company_id,
        })
        .await
        .unwrap();

    repo.soft_delete(EntityKind::Company, company_id, None)
        .await
        .unwrap();

    let offer = repo.get_job_offer(offer.id).await.unwrap();
    assert!(!offer.is_deleted);
    assert!(
        repo.deletion_history(EntityKind::JobOffer, offer.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn history_is_newest_first() {
    let (repo, company_id) = repo_with_company().await;

    repo.record_fact(
        EntityKind::Company,
        company_id,
        Utc::now() - Duration::days(10),
        None,
    )
    .await;
    repo.record_fact(
        EntityKind::Company,
        company_id,
        Utc::now() - Duration::days(1),
        None,
    )
    .await;
    repo.soft_delete(EntityKind::Company, company_id, None)
        .await
        .unwrap();

    let history = repo
        .deletion_history(EntityKind::Company, company_id)
        .await
        .unwrap();
    assert_eq!(history.len(), 3);
    assert!(
        history
            .windows(2)
            .all(|pair| pair[0].deleted_at >= pair[1].deleted_at)
    );

    // Facts of other entities with the same id are not included.
    assert!(
        repo.deletion_history(EntityKind::JobOffer, company_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn skills_are_soft_deleted_per_kind() {
    let repo = InMemoryRepository::new();
    let core = repo
        .create_skill(
            SkillKind::Core,
            NewSkill {
                name: "Rust".to_string(),
            },
        )
        .await
        .unwrap();

    // The same id under the other skill table does not exist.
    let wrong_table = repo
        .soft_delete(EntityKind::SecondarySkill, core.id, None)
        .await;
    assert!(matches!(wrong_table, Err(RepoError::NotFound { .. })));

    repo.soft_delete(EntityKind::CoreSkill, core.id, None)
        .await
        .unwrap();
    let deleted = repo
        .list_skills(SkillKind::Core, Scope::Deleted)
        .await
        .unwrap();
    assert_eq!(deleted.len(), 1);
}

#[tokio::test]
async fn skillset_restore_conflicts_with_a_newer_active_skillset() {
    let repo = InMemoryRepository::new();
    let (_, owner) = repo.seed_user("dev@example.com", false).await;

    let first = repo
        .set_skillset(owner.id, SkillsetRequest::default())
        .await
        .unwrap();
    repo.soft_delete(EntityKind::Skillset, first.skillset.id, None)
        .await
        .unwrap();
    let second = repo
        .set_skillset(owner.id, SkillsetRequest::default())
        .await
        .unwrap();
    assert_ne!(second.skillset.id, first.skillset.id);

    let result = repo
        .restore(EntityKind::Skillset, first.skillset.id, None)
        .await;
    assert!(matches!(result, Err(RepoError::Conflict(_))));

    // The rejected restore leaves both the row and its open fact as they were.
    let history = repo
        .deletion_history(EntityKind::Skillset, first.skillset.id)
        .await
        .unwrap();
    assert!(history[0].is_open());
    let current = repo.get_skillset(owner.id).await.unwrap();
    assert_eq!(current.skillset.id, second.skillset.id);

    // Once the newer skillset is gone, the older one can come back.
    repo.soft_delete(EntityKind::Skillset, second.skillset.id, None)
        .await
        .unwrap();
    let restored = repo
        .restore(EntityKind::Skillset, first.skillset.id, None)
        .await
        .unwrap();
    assert!(!restored.is_deleted);
    assert_eq!(
        repo.get_skillset(owner.id).await.unwrap().skillset.id,
        first.skillset.id
    );
}
