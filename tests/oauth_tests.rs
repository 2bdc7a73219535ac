use neofindr::{
    config::{OAuthSettings, ProviderCredentials},
    oauth::{HttpOAuthGateway, OAuthError, OAuthGateway, Provider, ProviderEndpoints},
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path},
};

fn credentials(name: &str) -> Option<ProviderCredentials> {
    Some(ProviderCredentials {
        client_id: format!("{name}-client"),
        client_secret: format!("{name}-secret"),
        redirect_uri: "http://localhost:5173/callback".to_string(),
    })
}

fn all_configured() -> OAuthSettings {
    OAuthSettings {
        google: credentials("google"),
        github: credentials("github"),
        facebook: credentials("facebook"),
        linkedin: credentials("linkedin"),
    }
}

fn gateway(server: &MockServer, settings: OAuthSettings) -> HttpOAuthGateway {
    HttpOAuthGateway::with_endpoints(settings, ProviderEndpoints::with_base_url(&server.uri()))
}

#[tokio::test]
async fn google_exchange_posts_form_and_reads_profile() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("code=auth-code"))
        .and(body_string_contains("client_id=google-client"))
        .and(body_string_contains("client_secret=google-secret"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "google-token",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/oauth2/v3/userinfo"))
        .and(header("authorization", "Bearer google-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "1234",
            "email": "ada@example.com",
            "given_name": "Ada",
            "family_name": "Lovelace"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server, all_configured());
    let token = gateway
        .exchange_code(Provider::Google, "auth-code", None)
        .await
        .unwrap();
    assert_eq!(token, "google-token");

    let profile = gateway.fetch_profile(Provider::Google, &token).await.unwrap();
    assert_eq!(profile.email.as_deref(), Some("ada@example.com"));
    assert_eq!(profile.given_name, "Ada");
    assert_eq!(profile.family_name, "Lovelace");
}

#[tokio::test]
async fn code_verifier_is_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("code_verifier=pkce-verifier"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "pkce-token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = gateway(&server, all_configured())
        .exchange_code(Provider::Google, "auth-code", Some("pkce-verifier"))
        .await
        .unwrap();
    assert_eq!(token, "pkce-token");
}

#[tokio::test]
async fn github_exchange_asks_for_json_and_picks_primary_email() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login/oauth/access_token"))
        .and(header("accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "gh-token" })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .and(header("authorization", "token gh-token"))
        .and(header("user-agent", "neofindr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "login": "octo",
            "name": "Mona Lisa Octocat"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "email": "old@example.com", "primary": false, "verified": true },
            { "email": "mona@example.com", "primary": true, "verified": true }
        ])))
        .mount(&server)
        .await;

    let gateway = gateway(&server, all_configured());
    let token = gateway
        .exchange_code(Provider::Github, "gh-code", None)
        .await
        .unwrap();
    let profile = gateway.fetch_profile(Provider::Github, &token).await.unwrap();

    assert_eq!(profile.email.as_deref(), Some("mona@example.com"));
    assert_eq!(profile.given_name, "Mona");
    assert_eq!(profile.family_name, "Lisa Octocat");
}

#[tokio::test]
async fn github_email_listing_failure_yields_no_email() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Octo" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/user/emails"))
        .respond_with(ResponseTemplate::new(403).set_body_string("scope missing"))
        .mount(&server)
        .await;

    let profile = gateway(&server, all_configured())
        .fetch_profile(Provider::Github, "gh-token")
        .await
        .unwrap();

    assert_eq!(profile.email, None);
    assert_eq!(profile.given_name, "Octo");
    assert_eq!(profile.family_name, "");
}

#[tokio::test]
async fn token_response_without_access_token_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant"
        })))
        .mount(&server)
        .await;

    let result = gateway(&server, all_configured())
        .exchange_code(Provider::Google, "expired-code", None)
        .await;

    assert!(matches!(
        result,
        Err(OAuthError::MissingAccessToken(Provider::Google))
    ));
}

#[tokio::test]
async fn unconfigured_provider_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let settings = OAuthSettings {
        google: credentials("google"),
        ..OAuthSettings::default()
    };
    let result = gateway(&server, settings)
        .exchange_code(Provider::Linkedin, "code", None)
        .await;

    assert!(matches!(
        result,
        Err(OAuthError::NotConfigured(Provider::Linkedin))
    ));
}

#[tokio::test]
async fn facebook_exchanges_code_but_profile_is_not_implemented() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "fb-token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway(&server, all_configured());
    let token = gateway
        .exchange_code(Provider::Facebook, "fb-code", None)
        .await
        .unwrap();
    assert_eq!(token, "fb-token");

    let result = gateway.fetch_profile(Provider::Facebook, &token).await;
    assert!(matches!(
        result,
        Err(OAuthError::NotImplemented(Provider::Facebook))
    ));
}

#[tokio::test]
async fn linkedin_exchange_uses_its_token_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/oauth/v2/accessToken"))
        .and(body_string_contains("client_id=linkedin-client"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": "li-token" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = gateway(&server, all_configured())
        .exchange_code(Provider::Linkedin, "li-code", None)
        .await
        .unwrap();
    assert_eq!(token, "li-token");
}
