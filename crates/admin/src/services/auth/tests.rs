#![allow(clippy::unwrap_used)]

use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderMap, HeaderValue, header::AUTHORIZATION};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use rsa::RsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use serde_json::json;

use food_admin_core::UserRole;

use super::{AuthError, MOCK_TOKEN, MOCK_USER_ID, TokenValidator, bearer_token};

const ISSUER: &str = "https://clerk.alifood.app";

struct TestKeys {
    encoding: EncodingKey,
    public_pem: String,
}

static KEYS: LazyLock<TestKeys> = LazyLock::new(|| {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).unwrap();
    let private_pem = private_key.to_pkcs8_pem(LineEnding::LF).unwrap();
    let public_pem = private_key
        .to_public_key()
        .to_public_key_pem(LineEnding::LF)
        .unwrap();

    TestKeys {
        encoding: EncodingKey::from_rsa_pem(private_pem.as_bytes()).unwrap(),
        public_pem,
    }
});

fn now() -> i64 {
    i64::try_from(SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()).unwrap()
}

fn sign(claims: &serde_json::Value) -> String {
    encode(&Header::new(Algorithm::RS256), claims, &KEYS.encoding).unwrap()
}

fn validator() -> TokenValidator {
    TokenValidator::with_static_key(DecodingKey::from_rsa_pem(KEYS.public_pem.as_bytes()).unwrap())
        .issuer(ISSUER)
}

fn claims() -> serde_json::Value {
    json!({
        "sub": "user_2abc",
        "sid": "sess_9xyz",
        "iss": ISSUER,
        "azp": "https://admin.alifood.app",
        "iat": now(),
        "exp": now() + 600,
    })
}

#[tokio::test]
async fn test_valid_token_authenticates() {
    let user = validator().authenticate(&sign(&claims())).await.unwrap();
    assert_eq!(user.user_id, "user_2abc");
    assert_eq!(user.session_id.as_deref(), Some("sess_9xyz"));
    assert!(!user.is_mock);
    assert_eq!(user.token_role, None);
    assert!(user.expires_at.is_some());
}

#[tokio::test]
async fn test_expired_token_reports_expiry() {
    let mut expired = claims();
    expired["exp"] = json!(now() - 3600);
    let err = validator().authenticate(&sign(&expired)).await.unwrap_err();
    assert!(matches!(err, AuthError::Expired));
    assert_eq!(err.code(), "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_wrong_issuer_rejected() {
    let mut foreign = claims();
    foreign["iss"] = json!("https://evil.example");
    let err = validator().authenticate(&sign(&foreign)).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_missing_exp_rejected() {
    let mut no_exp = claims();
    no_exp.as_object_mut().unwrap().remove("exp");
    let err = validator().authenticate(&sign(&no_exp)).await.unwrap_err();
    assert!(matches!(err, AuthError::Invalid(_)));
}

#[tokio::test]
async fn test_authorized_party_enforced() {
    let strict = validator().authorized_parties(vec!["https://other.app".to_string()]);
    let err = strict.authenticate(&sign(&claims())).await.unwrap_err();
    assert!(err.to_string().contains("unauthorized party"));

    let lenient = validator().authorized_parties(vec!["https://admin.alifood.app".to_string()]);
    assert!(lenient.authenticate(&sign(&claims())).await.is_ok());
}

#[tokio::test]
async fn test_symmetric_algorithm_rejected() {
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims(),
        &EncodingKey::from_secret(b"shared-secret-not-allowed"),
    )
    .unwrap();
    let err = validator().authenticate(&token).await.unwrap_err();
    assert!(err.to_string().contains("HS256"));
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let err = validator().authenticate("not.a.jwt").await.unwrap_err();
    assert_eq!(err.code(), "INVALID_TOKEN");
}

#[tokio::test]
async fn test_role_read_from_public_metadata() {
    let mut admin = claims();
    admin["public_metadata"] = json!({ "role": "admin" });
    let user = validator().authenticate(&sign(&admin)).await.unwrap();
    assert_eq!(user.token_role, Some(UserRole::Admin));

    let mut legacy = claims();
    legacy["metadata"] = json!({ "role": "customer" });
    let user = validator().authenticate(&sign(&legacy)).await.unwrap();
    assert_eq!(user.token_role, Some(UserRole::Customer));
}

#[tokio::test]
async fn test_mock_token_only_when_allowed() {
    let user = validator().allow_mock(true).authenticate(MOCK_TOKEN).await.unwrap();
    assert_eq!(user.user_id, MOCK_USER_ID);
    assert!(user.is_mock);
    assert_eq!(user.token_role, Some(UserRole::Admin));

    let err = validator().authenticate(MOCK_TOKEN).await.unwrap_err();
    assert_eq!(err.code(), "INVALID_TOKEN");
}

#[test]
fn test_bearer_token_parsing() {
    let mut headers = HeaderMap::new();
    assert!(matches!(bearer_token(&headers), Err(AuthError::NoToken)));

    headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
    assert!(matches!(bearer_token(&headers), Err(AuthError::NoToken)));

    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
    assert!(matches!(bearer_token(&headers), Err(AuthError::NoToken)));

    headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
    assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");
}
