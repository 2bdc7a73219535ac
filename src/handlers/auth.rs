use axum::extract::State;

use crate::{
    AppState,
    auth::{AuthUser, TokenType, decode_token, issue_tokens},
    error::{ApiError, ApiResult, RepoError},
    extract::Json,
    handlers::validated,
    models::{
        AuthResponse, AuthUserInfo, RefreshRequest, SocialAuthRequest, TestAuthResponse, TokenPair,
    },
    oauth::{OAuthError, Provider},
};

/// social_login
///
/// [Public Route] Completes a social login: exchanges the authorization code with the
/// provider, reads the user's profile, registers the user on first login and issues a
/// token pair. Every failure along the way is reported as a 400.
#[utoipa::path(
    post,
    path = "/v1/auth/social",
    request_body = SocialAuthRequest,
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 400, description = "Provider, code or profile rejected", body = crate::error::ErrorBody)
    )
)]
pub async fn social_login(
    State(state): State<AppState>,
    Json(payload): Json<SocialAuthRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let payload = validated(payload)?;
    let provider: Provider = payload.provider.parse()?;

    let access_token = state
        .oauth
        .exchange_code(provider, &payload.code, payload.code_verifier.as_deref())
        .await?;
    let profile = state.oauth.fetch_profile(provider, &access_token).await?;

    let email = profile
        .email
        .clone()
        .filter(|email| !email.trim().is_empty())
        .ok_or(OAuthError::MissingEmail)?;

    let (user, created) = state
        .repo
        .get_or_create_social_user(&email, &profile)
        .await
        .map_err(|err| match err {
            RepoError::Database(_) => {
                tracing::error!(error = %err, "social login could not register the user");
                ApiError::BadRequest("Could not complete the social login.".to_string())
            }
            other => ApiError::BadRequest(other.to_string()),
        })?;

    if !user.is_active {
        return Err(ApiError::BadRequest("User account is disabled.".to_string()));
    }

    tracing::info!(%provider, user_id = user.id, created, "social login succeeded");

    let tokens = issue_tokens(user.id, &state.config)?;
    Ok(Json(AuthResponse {
        refresh: tokens.refresh,
        access: tokens.access,
        user: AuthUserInfo {
            id: user.id,
            name: user.full_name(),
            email: user.email,
        },
    }))
}

/// refresh_tokens
///
/// [Public Route] Trades a valid refresh token for a new access/refresh pair.
#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Rotated tokens", body = TokenPair),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
pub async fn refresh_tokens(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = decode_token(&payload.refresh, &state.config.jwt_secret, TokenType::Refresh)?;
    let user_id = claims.user_id().ok_or(ApiError::Unauthorized)?;

    state
        .repo
        .get_user(user_id)
        .await?
        .filter(|user| user.is_active)
        .ok_or(ApiError::Unauthorized)?;

    Ok(Json(issue_tokens(user_id, &state.config)?))
}

/// test_auth
///
/// [Authenticated Route] Echoes the identity resolved from the request credentials.
#[utoipa::path(
    get,
    path = "/api/test-auth",
    responses(
        (status = 200, description = "Authenticated", body = TestAuthResponse),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn test_auth(user: AuthUser) -> Json<TestAuthResponse> {
    Json(TestAuthResponse {
        message: "Authentication successful!".to_string(),
        user_id: user.id,
        email: user.email,
    })
}
