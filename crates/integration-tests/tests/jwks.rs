//! Token verification with keys fetched from a mock JWKS endpoint.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use food_admin::config::AuthConfig;
use food_admin::services::auth::{AuthError, TokenValidator};
use food_admin_integration_tests::{ISSUER, KEYS, claims};

const JWKS_PATH: &str = "/.well-known/jwks.json";

fn validator(server: &MockServer) -> TokenValidator {
    let config = AuthConfig {
        jwks_url: Url::parse(&format!("{}{JWKS_PATH}", server.uri())).unwrap(),
        issuer: Some(ISSUER.to_string()),
        authorized_parties: vec![],
    };
    TokenValidator::from_config(&config, false).unwrap()
}

#[tokio::test]
async fn test_key_fetched_once_and_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(KEYS.jwks()))
        .expect(1)
        .mount(&server)
        .await;

    let validator = validator(&server);
    for subject in ["user_a", "user_b"] {
        let user = validator.authenticate(&KEYS.sign(&claims(subject))).await.unwrap();
        assert_eq!(user.user_id, subject);
    }
}

#[tokio::test]
async fn test_unknown_kid_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
        .mount(&server)
        .await;

    let err = validator(&server)
        .authenticate(&KEYS.sign(&claims("user_a")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::UnknownKey(_)));
    assert_eq!(err.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_provider_outage_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = validator(&server)
        .authenticate(&KEYS.sign(&claims("user_a")))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::KeySetUnavailable(_)));
    assert_eq!(err.code(), "AUTH_UNAVAILABLE");
}

#[tokio::test]
async fn test_unknown_kids_do_not_refetch_within_cooldown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(KEYS.jwks()))
        .expect(1)
        .mount(&server)
        .await;

    let validator = validator(&server);
    let user = validator.authenticate(&KEYS.sign(&claims("user_a"))).await.unwrap();
    assert_eq!(user.user_id, "user_a");

    for kid in ["forged-1", "forged-2", "forged-3"] {
        let err = validator
            .authenticate(&KEYS.sign_with_kid(&claims("user_a"), kid))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownKey(_)));
    }
}

#[tokio::test]
async fn test_repeated_unknown_kid_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let validator = validator(&server);
    for _ in 0..2 {
        let err = validator
            .authenticate(&KEYS.sign(&claims("user_a")))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UnknownKey(_)));
    }
}
