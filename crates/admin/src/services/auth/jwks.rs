//! Identity provider signing keys (JWKS) with an in-memory cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::DecodingKey;
use moka::future::Cache;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::AuthError;

const MAX_KEYS: u64 = 100;
const KEY_TTL: Duration = Duration::from_secs(3600);
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_JWKS_BYTES: u64 = 512 * 1024;
/// Minimum spacing between refetches triggered by unknown `kid`s.
pub const REFRESH_COOLDOWN: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

/// Resolves `kid` values to RSA verification keys.
///
/// Keys live for an hour; an unknown `kid` triggers a refetch so rotated
/// keys are picked up without a restart. Refetches are serialized and at
/// most one successful fetch happens per [`REFRESH_COOLDOWN`].
#[derive(Clone)]
pub struct JwksProvider {
    cache: Cache<String, Arc<DecodingKey>>,
    client: Client,
    jwks_url: Url,
    /// When the key set was last fetched successfully.
    last_refresh: Arc<Mutex<Option<Instant>>>,
}

impl JwksProvider {
    /// Create a provider for the given JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::KeySetUnavailable` if the HTTP client cannot be built.
    pub fn new(jwks_url: Url) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(concat!("food-admin/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        Ok(Self {
            cache: Cache::builder()
                .max_capacity(MAX_KEYS)
                .time_to_live(KEY_TTL)
                .build(),
            client,
            jwks_url,
            last_refresh: Arc::new(Mutex::new(None)),
        })
    }

    /// Look up the verification key for `kid`, fetching the key set on a miss.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UnknownKey` if the provider does not publish the
    /// key, or `AuthError::KeySetUnavailable` if the key set cannot be fetched.
    pub async fn get_key(&self, kid: &str) -> Result<Arc<DecodingKey>, AuthError> {
        if let Some(key) = self.cache.get(kid).await {
            return Ok(key);
        }

        {
            let mut last_refresh = self.last_refresh.lock().await;
            // Another request may have fetched while this one waited.
            if let Some(key) = self.cache.get(kid).await {
                return Ok(key);
            }
            if last_refresh.is_some_and(|at| at.elapsed() < REFRESH_COOLDOWN) {
                tracing::debug!(kid = %kid, "Unknown kid within refresh cooldown");
                return Err(AuthError::UnknownKey(kid.to_string()));
            }
            self.refresh().await?;
            *last_refresh = Some(Instant::now());
        }

        self.cache
            .get(kid)
            .await
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    async fn refresh(&self) -> Result<(), AuthError> {
        tracing::info!(url = %self.jwks_url, "Refreshing JWKS");

        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "JWKS endpoint returned {}",
                response.status()
            )));
        }
        if response.content_length().is_some_and(|len| len > MAX_JWKS_BYTES) {
            return Err(AuthError::KeySetUnavailable(
                "JWKS response too large".to_string(),
            ));
        }

        let jwks: JwksResponse = response
            .json()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(format!("malformed JWKS: {e}")))?;

        let mut loaded = 0_usize;
        for key in jwks.keys {
            let (Some(kid), Some(n), Some(e)) = (key.kid, key.n, key.e) else {
                continue;
            };
            if key.kty != "RSA" {
                continue;
            }
            match DecodingKey::from_rsa_components(&n, &e) {
                Ok(decoding_key) => {
                    self.cache.insert(kid, Arc::new(decoding_key)).await;
                    loaded += 1;
                }
                Err(err) => tracing::warn!(kid = %kid, error = %err, "Skipping unusable JWK"),
            }
        }

        tracing::debug!(loaded, "JWKS refreshed");
        Ok(())
    }
}
