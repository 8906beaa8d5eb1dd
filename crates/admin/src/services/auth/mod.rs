//! Bearer token authentication against the hosted identity provider.
//!
//! Tokens are RS256 JWTs signed by the provider. Verification keys come from
//! the provider's JWKS endpoint (see [`jwks`]). Outside production a fixed
//! mock token is accepted so the mobile app can be exercised without a real
//! sign-in.

mod error;
pub mod jwks;

#[cfg(test)]
mod tests;

pub use error::AuthError;
pub use jwks::JwksProvider;

use std::sync::Arc;

use axum::http::{HeaderMap, header::AUTHORIZATION};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::{Deserialize, Serialize};

use food_admin_core::UserRole;

use crate::config::AuthConfig;

/// Literal token accepted outside production.
pub const MOCK_TOKEN: &str = "mock_dev_token";
/// Subject reported for the mock token.
pub const MOCK_USER_ID: &str = "dev_user_123";
/// Session reported for the mock token.
pub const MOCK_SESSION_ID: &str = "dev_session_456";

const CLOCK_SKEW_SECS: u64 = 5;

/// Claims read from a verified session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
    /// Authorized party (the frontend origin that requested the token).
    #[serde(default)]
    pub azp: Option<String>,
    /// Provider session id.
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub public_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl Claims {
    /// Role embedded in the token by the provider, if any.
    #[must_use]
    pub fn role(&self) -> Option<UserRole> {
        [&self.public_metadata, &self.metadata]
            .into_iter()
            .flatten()
            .find_map(|meta| meta.get("role").and_then(serde_json::Value::as_str))
            .and_then(|role| role.parse().ok())
    }
}

/// The authenticated caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Identity provider subject, used as the local `external_id`.
    pub user_id: String,
    pub session_id: Option<String>,
    pub is_mock: bool,
    /// Role claimed by the token itself.
    #[serde(skip)]
    pub token_role: Option<UserRole>,
    /// Token expiry (seconds since the epoch).
    #[serde(skip)]
    pub expires_at: Option<i64>,
}

impl AuthUser {
    fn mock() -> Self {
        Self {
            user_id: MOCK_USER_ID.to_string(),
            session_id: Some(MOCK_SESSION_ID.to_string()),
            is_mock: true,
            token_role: Some(UserRole::Admin),
            expires_at: None,
        }
    }
}

enum KeySource {
    Jwks(JwksProvider),
    Static(Arc<DecodingKey>),
}

/// Verifies bearer tokens and turns them into an [`AuthUser`].
pub struct TokenValidator {
    keys: KeySource,
    issuer: Option<String>,
    authorized_parties: Vec<String>,
    allow_mock: bool,
}

impl TokenValidator {
    /// Build a validator that fetches keys from the configured JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the key provider cannot be created.
    pub fn from_config(config: &AuthConfig, allow_mock: bool) -> Result<Self, AuthError> {
        Ok(Self {
            keys: KeySource::Jwks(JwksProvider::new(config.jwks_url.clone())?),
            issuer: config.issuer.clone(),
            authorized_parties: config.authorized_parties.clone(),
            allow_mock,
        })
    }

    /// Build a validator that trusts a single verification key.
    #[must_use]
    pub fn with_static_key(key: DecodingKey) -> Self {
        Self {
            keys: KeySource::Static(Arc::new(key)),
            issuer: None,
            authorized_parties: Vec::new(),
            allow_mock: false,
        }
    }

    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn authorized_parties(mut self, parties: Vec<String>) -> Self {
        self.authorized_parties = parties;
        self
    }

    #[must_use]
    pub const fn allow_mock(mut self, allow: bool) -> Self {
        self.allow_mock = allow;
        self
    }

    /// Authenticate a raw bearer token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the token is missing, expired or fails verification.
    pub async fn authenticate(&self, token: &str) -> Result<AuthUser, AuthError> {
        if token.is_empty() {
            return Err(AuthError::NoToken);
        }
        if token == MOCK_TOKEN {
            if self.allow_mock {
                tracing::debug!("Accepted development mock token");
                return Ok(AuthUser::mock());
            }
            return Err(AuthError::Invalid("mock tokens are disabled".to_string()));
        }

        let claims = self.verify(token).await?;
        Ok(AuthUser {
            token_role: claims.role(),
            expires_at: Some(claims.exp),
            session_id: claims.sid,
            user_id: claims.sub,
            is_mock: false,
        })
    }

    /// Verify signature and standard claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Expired` for expired tokens and `AuthError::Invalid`
    /// for any other verification failure.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::Invalid(format!(
                "algorithm {:?} not allowed",
                header.alg
            )));
        }

        let key = match &self.keys {
            KeySource::Static(key) => Arc::clone(key),
            KeySource::Jwks(provider) => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AuthError::Invalid("token header has no kid".to_string()))?;
                provider.get_key(kid).await?
            }
        };

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let claims = decode::<Claims>(token, &key, &validation)?.claims;

        if !self.authorized_parties.is_empty() {
            let allowed = claims
                .azp
                .as_ref()
                .is_some_and(|azp| self.authorized_parties.iter().any(|p| p == azp));
            if !allowed {
                return Err(AuthError::Invalid("unauthorized party".to_string()));
            }
        }

        Ok(claims)
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns `AuthError::NoToken` when the header is absent, not a bearer
/// credential, or empty.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::NoToken)
}
