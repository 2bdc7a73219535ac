use axum::{
    extract::FromRequestParts,
    http::{Method, Request, header, request::Parts},
};
use neofindr::{
    AppState,
    auth::{AuthUser, TokenType, decode_token, encode_token, issue_tokens},
    config::{AppConfig, Env},
    error::ApiError,
    oauth::{MockOAuthGateway, OAuthState},
    repository::{InMemoryRepository, RepositoryState},
};
use std::sync::Arc;

const TEST_SECRET: &str = "auth-tests-secret";

// --- Utility Functions ---

fn create_app_state(env: Env, repo: Arc<InMemoryRepository>) -> AppState {
    let config = AppConfig {
        env,
        jwt_secret: TEST_SECRET.to_string(),
        ..AppConfig::default()
    };

    AppState {
        repo: repo as RepositoryState,
        oauth: Arc::new(MockOAuthGateway::new()) as OAuthState,
        config,
    }
}

fn get_request_parts(headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().method(Method::GET).uri("/api/test-auth");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let (parts, _) = builder.body(()).unwrap().into_parts();
    parts
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

async fn extract(state: &AppState, headers: &[(&str, &str)]) -> Result<AuthUser, ApiError> {
    let mut parts = get_request_parts(headers);
    AuthUser::from_request_parts(&mut parts, state).await
}

// --- Extractor Tests ---

#[tokio::test]
async fn test_valid_access_token_resolves_user() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("ana@example.com", true).await;
    let state = create_app_state(Env::Production, repo);

    let token = encode_token(user.id, TokenType::Access, 300, TEST_SECRET).unwrap();
    let header_value = bearer(&token);

    let auth = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)])
        .await
        .expect("token should authenticate");

    assert_eq!(auth.id, user.id);
    assert_eq!(auth.email, "ana@example.com");
    assert!(auth.is_staff);
}

#[tokio::test]
async fn test_missing_authorization_header_is_unauthorized() {
    let repo = Arc::new(InMemoryRepository::new());
    let state = create_app_state(Env::Production, repo);

    let result = extract(&state, &[]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_non_bearer_scheme_is_unauthorized() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("ana@example.com", false).await;
    let state = create_app_state(Env::Production, repo);

    let token = encode_token(user.id, TokenType::Access, 300, TEST_SECRET).unwrap();
    let header_value = format!("Token {token}");

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("ana@example.com", false).await;
    let state = create_app_state(Env::Production, repo);

    // Well past the validation leeway.
    let token = encode_token(user.id, TokenType::Access, -3600, TEST_SECRET).unwrap();
    let header_value = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_unauthorized() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("ana@example.com", false).await;
    let state = create_app_state(Env::Production, repo);

    let token = encode_token(user.id, TokenType::Access, 300, "some-other-secret").unwrap();
    let header_value = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_refresh_token_cannot_authenticate_requests() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("ana@example.com", false).await;
    let state = create_app_state(Env::Production, repo);

    let token = encode_token(user.id, TokenType::Refresh, 300, TEST_SECRET).unwrap();
    let header_value = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_token_for_unknown_user_is_unauthorized() {
    let repo = Arc::new(InMemoryRepository::new());
    let state = create_app_state(Env::Production, repo);

    let token = encode_token(9_999, TokenType::Access, 300, TEST_SECRET).unwrap();
    let header_value = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_token_for_deactivated_user_is_unauthorized() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("ana@example.com", false).await;
    repo.set_user_active(user.id, false).await;
    let state = create_app_state(Env::Production, repo);

    let token = encode_token(user.id, TokenType::Access, 300, TEST_SECRET).unwrap();
    let header_value = bearer(&token);

    let result = extract(&state, &[(header::AUTHORIZATION.as_str(), &header_value)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

// --- Local Bypass ---

#[tokio::test]
async fn test_local_env_accepts_user_id_header() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("dev@example.com", false).await;
    let state = create_app_state(Env::Local, repo);

    let id = user.id.to_string();
    let auth = extract(&state, &[("x-user-id", &id)])
        .await
        .expect("local bypass should authenticate");

    assert_eq!(auth.id, user.id);
    assert!(!auth.is_staff);
}

#[tokio::test]
async fn test_production_ignores_user_id_header() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("dev@example.com", false).await;
    let state = create_app_state(Env::Production, repo);

    let id = user.id.to_string();
    let result = extract(&state, &[("x-user-id", &id)]).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn test_local_bypass_falls_back_to_token() {
    let repo = Arc::new(InMemoryRepository::new());
    let (user, _) = repo.seed_user("dev@example.com", false).await;
    let state = create_app_state(Env::Local, repo);

    let token = encode_token(user.id, TokenType::Access, 300, TEST_SECRET).unwrap();
    let header_value = bearer(&token);

    // An unparsable header id is ignored and the bearer token is used instead.
    let auth = extract(
        &state,
        &[
            ("x-user-id", "not-a-number"),
            (header::AUTHORIZATION.as_str(), &header_value),
        ],
    )
    .await
    .expect("token should authenticate");

    assert_eq!(auth.id, user.id);
}

// --- Token Issuing ---

#[test]
fn test_encode_token_rejects_overflowing_ttl() {
    let result = encode_token(1, TokenType::Access, i64::MAX, TEST_SECRET);
    assert!(matches!(result, Err(ApiError::Internal(_))));
}

#[test]
fn test_issue_tokens_produces_typed_pair() {
    let config = AppConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..AppConfig::default()
    };

    let pair = issue_tokens(42, &config).unwrap();
    assert_ne!(pair.access, pair.refresh);

    let access = decode_token(&pair.access, TEST_SECRET, TokenType::Access).unwrap();
    assert_eq!(access.user_id(), Some(42));
    assert_eq!(access.exp - access.iat, config.access_token_ttl_secs);

    let refresh = decode_token(&pair.refresh, TEST_SECRET, TokenType::Refresh).unwrap();
    assert_eq!(refresh.exp - refresh.iat, config.refresh_token_ttl_secs);

    assert!(decode_token(&pair.refresh, TEST_SECRET, TokenType::Access).is_err());
}

#[test]
fn test_tokens_issued_together_are_unique() {
    let config = AppConfig::default();
    let first = issue_tokens(7, &config).unwrap();
    let second = issue_tokens(7, &config).unwrap();
    assert_ne!(first.access, second.access);
}
