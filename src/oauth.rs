use async_trait::async_trait;
use reqwest::{StatusCode, header};
use serde::Deserialize;
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};
use thiserror::Error;

use crate::{
    config::{OAuthSettings, ProviderCredentials},
    models::SocialProfile,
};

/// Provider
///
/// The social identity providers a client may log in with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    Google,
    Github,
    Facebook,
    Linkedin,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::Github => "github",
            Provider::Facebook => "facebook",
            Provider::Linkedin => "linkedin",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = OAuthError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        match name.as_str() {
            "google" => Ok(Provider::Google),
            "github" => Ok(Provider::Github),
            "facebook" => Ok(Provider::Facebook),
            "linkedin" => Ok(Provider::Linkedin),
            _ => Err(OAuthError::UnsupportedProvider(name)),
        }
    }
}

/// OAuthError
#[derive(Debug, Error)]
pub enum OAuthError {
    #[error(
        "Unsupported authentication provider: '{0}'. Supported providers are: google, github, facebook, linkedin."
    )]
    UnsupportedProvider(String),

    #[error("{0} authentication is not configured on this server.")]
    NotConfigured(Provider),

    #[error("{0} did not return an access token.")]
    MissingAccessToken(Provider),

    #[error("Profile retrieval is not implemented for {0}.")]
    NotImplemented(Provider),

    #[error("Cannot proceed further without email address.")]
    MissingEmail,

    #[error("{provider} responded with {status}")]
    Upstream {
        provider: Provider,
        status: StatusCode,
    },

    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// OAuthGateway
///
/// The two provider calls the social login flow needs. `HttpOAuthGateway` talks to the
/// real providers; `MockOAuthGateway` serves canned profiles in tests.
#[async_trait]
pub trait OAuthGateway: Send + Sync {
    /// Trades an authorization code for the provider's bearer token.
    async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<String, OAuthError>;

    /// Fetches the user's identity with a bearer token from `exchange_code`.
    async fn fetch_profile(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<SocialProfile, OAuthError>;
}

pub type OAuthState = Arc<dyn OAuthGateway>;

/// ProviderEndpoints
///
/// Every URL the HTTP gateway calls. Tests point these at a local mock server.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub google_token: String,
    pub google_userinfo: String,
    pub github_token: String,
    pub github_api: String,
    pub facebook_token: String,
    pub linkedin_token: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            google_token: "https://oauth2.googleapis.com/token".to_string(),
            google_userinfo: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
            github_token: "https://github.com/login/oauth/access_token".to_string(),
            github_api: "https://api.github.com".to_string(),
            facebook_token: "https://graph.facebook.com/oauth/access_token".to_string(),
            linkedin_token: "https://www.linkedin.com/oauth/v2/accessToken".to_string(),
        }
    }
}

impl ProviderEndpoints {
    /// Same paths as the real providers, all served from `base`.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            google_token: format!("{base}/token"),
            google_userinfo: format!("{base}/oauth2/v3/userinfo"),
            github_token: format!("{base}/login/oauth/access_token"),
            github_api: base.to_string(),
            facebook_token: format!("{base}/oauth/access_token"),
            linkedin_token: format!("{base}/oauth/v2/accessToken"),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Deserialize)]
struct GoogleUserInfo {
    email: Option<String>,
    #[serde(default)]
    given_name: String,
    #[serde(default)]
    family_name: String,
}

#[derive(Deserialize)]
struct GithubUser {
    name: Option<String>,
}

/// GithubEmail
///
/// One entry of GitHub's `/user/emails` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

/// Picks the address to register a GitHub user with: the primary verified one, else the
/// first verified one, else the first listed.
pub fn select_github_email(emails: &[GithubEmail]) -> Option<String> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.verified))
        .or_else(|| emails.first())
        .map(|e| e.email.clone())
}

/// Splits a display name on its first space.
fn split_name(name: &str) -> (String, String) {
    match name.trim().split_once(' ') {
        Some((given, family)) => (given.to_string(), family.trim().to_string()),
        None => (name.trim().to_string(), String::new()),
    }
}

const USER_AGENT: &str = "neofindr";

/// HttpOAuthGateway
///
/// Authorization-code exchange and profile retrieval over HTTPS with `reqwest`.
pub struct HttpOAuthGateway {
    client: reqwest::Client,
    settings: OAuthSettings,
    endpoints: ProviderEndpoints,
}

impl HttpOAuthGateway {
    pub fn new(settings: OAuthSettings) -> Self {
        Self::with_endpoints(settings, ProviderEndpoints::default())
    }

    pub fn with_endpoints(settings: OAuthSettings, endpoints: ProviderEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            settings,
            endpoints,
        }
    }

    fn credentials(&self, provider: Provider) -> Result<&ProviderCredentials, OAuthError> {
        let creds = match provider {
            Provider::Google => &self.settings.google,
            Provider::Github => &self.settings.github,
            Provider::Facebook => &self.settings.facebook,
            Provider::Linkedin => &self.settings.linkedin,
        };
        creds.as_ref().ok_or(OAuthError::NotConfigured(provider))
    }

    fn token_url(&self, provider: Provider) -> &str {
        match provider {
            Provider::Google => &self.endpoints.google_token,
            Provider::Github => &self.endpoints.github_token,
            Provider::Facebook => &self.endpoints.facebook_token,
            Provider::Linkedin => &self.endpoints.linkedin_token,
        }
    }

    async fn google_profile(&self, access_token: &str) -> Result<SocialProfile, OAuthError> {
        let info: GoogleUserInfo = self
            .client
            .get(&self.endpoints.google_userinfo)
            .bearer_auth(access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(SocialProfile {
            email: info.email,
            given_name: info.given_name,
            family_name: info.family_name,
        })
    }

    async fn github_profile(&self, access_token: &str) -> Result<SocialProfile, OAuthError> {
        let user: GithubUser = self
            .client
            .get(format!("{}/user", self.endpoints.github_api))
            .header(header::AUTHORIZATION, format!("token {access_token}"))
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let (given_name, family_name) = split_name(user.name.as_deref().unwrap_or_default());

        Ok(SocialProfile {
            email: self.github_email(access_token).await?,
            given_name,
            family_name,
        })
    }

    // A failed listing is not fatal: the flow continues without an email and is
    // rejected later on that ground.
    async fn github_email(&self, access_token: &str) -> Result<Option<String>, OAuthError> {
        let response = self
            .client
            .get(format!("{}/user/emails", self.endpoints.github_api))
            .header(header::AUTHORIZATION, format!("token {access_token}"))
            .header(header::ACCEPT, "application/json")
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, %body, "github email listing failed");
            return Ok(None);
        }

        let emails: Vec<GithubEmail> = response.json().await?;
        Ok(select_github_email(&emails))
    }
}

#[async_trait]
impl OAuthGateway for HttpOAuthGateway {
    async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        code_verifier: Option<&str>,
    ) -> Result<String, OAuthError> {
        let creds = self.credentials(provider)?;

        let mut form: Vec<(&str, &str)> = vec![
            ("code", code),
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("redirect_uri", creds.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];
        if let Some(verifier) = code_verifier {
            form.push(("code_verifier", verifier));
        }

        let mut request = self.client.post(self.token_url(provider)).form(&form);
        if provider == Provider::Github {
            request = request.header(header::ACCEPT, "application/json");
        }

        let response = request.send().await?;
        let status = response.status();
        let body: TokenResponse = response.json().await?;

        body.access_token.ok_or_else(|| {
            tracing::warn!(%provider, %status, "token endpoint returned no access_token");
            OAuthError::MissingAccessToken(provider)
        })
    }

    async fn fetch_profile(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<SocialProfile, OAuthError> {
        match provider {
            Provider::Google => self.google_profile(access_token).await,
            Provider::Github => self.github_profile(access_token).await,
            Provider::Facebook | Provider::Linkedin => Err(OAuthError::NotImplemented(provider)),
        }
    }
}

/// MockOAuthGateway
///
/// Serves canned profiles keyed by authorization code. Unknown codes fail the exchange
/// the same way a provider that returns no token would.
#[derive(Clone, Default)]
pub struct MockOAuthGateway {
    profiles: HashMap<String, SocialProfile>,
    /// When true, every exchange fails as if the provider answered 502.
    pub should_fail: bool,
}

impl MockOAuthGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn with_profile(mut self, code: &str, profile: SocialProfile) -> Self {
        self.profiles.insert(code.to_string(), profile);
        self
    }
}

#[async_trait]
impl OAuthGateway for MockOAuthGateway {
    async fn exchange_code(
        &self,
        provider: Provider,
        code: &str,
        _code_verifier: Option<&str>,
    ) -> Result<String, OAuthError> {
        if self.should_fail {
            return Err(OAuthError::Upstream {
                provider,
                status: StatusCode::BAD_GATEWAY,
            });
        }
        if self.profiles.contains_key(code) {
            Ok(format!("mock-token:{code}"))
        } else {
            Err(OAuthError::MissingAccessToken(provider))
        }
    }

    async fn fetch_profile(
        &self,
        provider: Provider,
        access_token: &str,
    ) -> Result<SocialProfile, OAuthError> {
        if matches!(provider, Provider::Facebook | Provider::Linkedin) {
            return Err(OAuthError::NotImplemented(provider));
        }
        access_token
            .strip_prefix("mock-token:")
            .and_then(|code| self.profiles.get(code))
            .cloned()
            .ok_or(OAuthError::Upstream {
                provider,
                status: StatusCode::UNAUTHORIZED,
            })
    }
}
