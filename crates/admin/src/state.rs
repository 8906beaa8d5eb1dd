//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::auth::{AuthError, TokenValidator};
use crate::services::images::{CloudinaryClient, ImageError};

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("auth setup failed: {0}")]
    Auth(#[from] AuthError),

    #[error("image client setup failed: {0}")]
    Image(#[from] ImageError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    tokens: TokenValidator,
    images: CloudinaryClient,
}

impl AppState {
    /// Build state from configuration: JWKS-backed token validation and the
    /// image CDN client.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if an HTTP client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, StateError> {
        let tokens = TokenValidator::from_config(&config.auth, config.allows_mock_token())?;
        let images = CloudinaryClient::new(&config.cloudinary)?;
        Ok(Self::from_parts(config, pool, tokens, images))
    }

    /// Build state from already constructed services.
    #[must_use]
    pub fn from_parts(
        config: AppConfig,
        pool: PgPool,
        tokens: TokenValidator,
        images: CloudinaryClient,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                tokens,
                images,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenValidator {
        &self.inner.tokens
    }

    #[must_use]
    pub fn images(&self) -> &CloudinaryClient {
        &self.inner.images
    }
}
