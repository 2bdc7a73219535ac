use chrono::Utc;
use neofindr::{
    models::{
        InternalUserPatch, JobOffer, NewCompany, NewJobOffer, NewSkill, SkillKind, SkillLevel,
        SkillsetRequest, SocialAuthRequest, User, WorkMode,
    },
    soft_delete::{EntityKind, Scope},
};
use serde_json::json;
use validator::Validate;

// --- Validation Rules ---

#[test]
fn test_new_company_requires_name_and_valid_website() {
    let valid = NewCompany {
        name: "Acme".to_string(),
        company_bio: String::new(),
        company_website: Some("https://acme.example".to_string()),
    };
    assert!(valid.validate().is_ok());

    let bad_website = NewCompany {
        company_website: Some("not a url".to_string()),
        ..valid.clone()
    };
    let errors = bad_website.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("company_website"));

    let no_name = NewCompany {
        name: String::new(),
        ..valid
    };
    assert!(no_name.validate().is_err());
}

#[test]
fn test_new_job_offer_rejects_negative_salary() {
    let offer = NewJobOffer {
        title: "Engineer".to_string(),
        description: String::new(),
        skill_level: SkillLevel::Junior,
        tags: String::new(),
        salary_offer: -1,
        location: String::new(),
        work_mode: Some(WorkMode::Remote),
        url: None,
        company_id: 1,
    };
    let errors = offer.validate().unwrap_err();
    assert!(errors.field_errors().contains_key("salary_offer"));
}

#[test]
fn test_internal_user_patch_checks_email_only_when_present() {
    assert!(InternalUserPatch::default().validate().is_ok());

    let patch = InternalUserPatch {
        email: Some("nobody".to_string()),
        ..InternalUserPatch::default()
    };
    assert!(patch.validate().is_err());
}

#[test]
fn test_skill_name_length_limit() {
    let skill = NewSkill {
        name: "x".repeat(129),
    };
    assert!(skill.validate().is_err());
}

// --- Serialization Shapes ---

#[test]
fn test_choice_enums_use_snake_case_labels() {
    assert_eq!(json!(SkillLevel::Senior), json!("senior"));
    assert_eq!(json!(WorkMode::Onsite), json!("onsite"));
    assert_eq!(json!(SkillKind::Secondary), json!("secondary"));
    assert_eq!(json!(EntityKind::JobApplication), json!("job_application"));
    assert_eq!(SkillLevel::default(), SkillLevel::Junior);
}

#[test]
fn test_scope_parses_lowercase_and_defaults_to_active() {
    let scope: Scope = serde_json::from_value(json!("deleted")).unwrap();
    assert_eq!(scope, Scope::Deleted);
    assert_eq!(Scope::default(), Scope::Active);
    assert!(serde_json::from_value::<Scope>(json!("trash")).is_err());
}

#[test]
fn test_entity_kind_parses_route_labels() {
    assert_eq!(
        "internal_user".parse::<EntityKind>().unwrap(),
        EntityKind::InternalUser
    );
    assert_eq!(EntityKind::Skillset.table(), "internal_user_skillsets");
    assert!("project".parse::<EntityKind>().is_err());
}

#[test]
fn test_skillset_request_lists_default_to_empty() {
    let req: SkillsetRequest = serde_json::from_value(json!({ "core_skill_ids": [1, 2] })).unwrap();
    assert_eq!(req.core_skill_ids, vec![1, 2]);
    assert!(req.secondary_skill_ids.is_empty());
}

#[test]
fn test_social_auth_request_code_verifier_is_optional() {
    let req: SocialAuthRequest =
        serde_json::from_value(json!({ "provider": "google", "code": "abc" })).unwrap();
    assert_eq!(req.code_verifier, None);
    assert!(req.validate().is_ok());

    let empty_code: SocialAuthRequest =
        serde_json::from_value(json!({ "provider": "google", "code": "" })).unwrap();
    assert!(empty_code.validate().is_err());
}

#[test]
fn test_job_offer_serializes_work_mode_and_deletion_fields() {
    let now = Utc::now();
    let offer = JobOffer {
        id: 3,
        title: "Engineer".to_string(),
        description: String::new(),
        skill_level: SkillLevel::Lead,
        tags: String::new(),
        salary_offer: 0,
        location: String::new(),
        work_mode: Some(WorkMode::Hybrid),
        url: String::new(),
        company_id: 1,
        created_at: now,
        modified_at: now,
        is_deleted: false,
        deleted_at: None,
    };

    let value = serde_json::to_value(&offer).unwrap();
    assert_eq!(value["skill_level"], "lead");
    assert_eq!(value["work_mode"], "hybrid");
    assert_eq!(value["is_deleted"], false);
    assert!(value["deleted_at"].is_null());
}

#[test]
fn test_user_full_name_trims_missing_parts() {
    let user = User {
        id: 1,
        username: "ada@example.com".to_string(),
        email: "ada@example.com".to_string(),
        first_name: "Ada".to_string(),
        last_name: String::new(),
        is_staff: false,
        is_active: true,
        date_joined: Utc::now(),
    };
    assert_eq!(user.full_name(), "Ada");
}
