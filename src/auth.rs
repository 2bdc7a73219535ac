use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::{ApiError, ApiResult},
    models::TokenPair,
    repository::RepositoryState,
};

/// TokenType
///
/// Access tokens authenticate requests; refresh tokens are only accepted by
/// `POST /v1/auth/refresh`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims
///
/// Payload of every token this service signs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the `User` id, as a string.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per token, so two tokens issued in the same second still differ.
    pub jti: Uuid,
    pub token_type: TokenType,
}

impl Claims {
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// encode_token
///
/// Signs a single HS256 token for `user_id` valid for `ttl_secs` from now. An expiry
/// past the range of a timestamp is an internal error.
pub fn encode_token(
    user_id: i64,
    token_type: TokenType,
    ttl_secs: i64,
    secret: &str,
) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let exp = now
        .checked_add(ttl_secs)
        .ok_or_else(|| ApiError::Internal(format!("token ttl {ttl_secs}s overflows")))?;
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp,
        jti: Uuid::new_v4(),
        token_type,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// issue_tokens
///
/// Issues a fresh access/refresh pair using the TTLs from the configuration.
pub fn issue_tokens(user_id: i64, config: &AppConfig) -> ApiResult<TokenPair> {
    let sign = |token_type, ttl| encode_token(user_id, token_type, ttl, &config.jwt_secret);

    Ok(TokenPair {
        access: sign(TokenType::Access, config.access_token_ttl_secs)?,
        refresh: sign(TokenType::Refresh, config.refresh_token_ttl_secs)?,
    })
}

/// decode_token
///
/// Verifies signature and expiry and checks the token is of the `expected` type.
/// Every failure collapses into `ApiError::Unauthorized`.
pub fn decode_token(token: &str, secret: &str, expected: TokenType) -> ApiResult<Claims> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "rejected token");
        ApiError::Unauthorized
    })?;

    if data.claims.token_type != expected {
        tracing::debug!(?expected, "rejected token of the wrong type");
        return Err(ApiError::Unauthorized);
    }
    Ok(data.claims)
}

/// AuthUser
///
/// The resolved identity of an authenticated request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// `users.id`, not the internal user profile id.
    pub id: i64,
    pub email: String,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn require_staff(&self) -> ApiResult<()> {
        if self.is_staff {
            Ok(())
        } else {
            Err(ApiError::forbidden())
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Resolves the caller from a Bearer access token. In `Env::Local` a numeric
/// `x-user-id` header naming an existing user is accepted instead. In both cases the
/// user must exist and be active.
///
/// Rejection: `ApiError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        // Local development bypass. A bad or unknown header falls through to the token check.
        if config.env == Env::Local {
            let header_id = parts
                .headers
                .get("x-user-id")
                .and_then(|value| value.to_str().ok())
                .and_then(|raw| raw.trim().parse::<i64>().ok());

            if let Some(user_id) = header_id {
                if let Some(user) = repo.get_user(user_id).await? {
                    if user.is_active {
                        return Ok(AuthUser {
                            id: user.id,
                            email: user.email,
                            is_staff: user.is_staff,
                        });
                    }
                }
            }
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthorized)?;

        let claims = decode_token(token, &config.jwt_secret, TokenType::Access)?;
        let user_id = claims.user_id().ok_or(ApiError::Unauthorized)?;

        // The user may have been removed or deactivated after the token was issued.
        let user = repo
            .get_user(user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or(ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            is_staff: user.is_staff,
        })
    }
}
