//! Authentication extractors.
//!
//! ```rust,ignore
//! async fn handler(RequireAdmin(admin): RequireAdmin) -> Result<Json<Value>> {
//!     tracing::info!(user_id = %admin.user_id, "admin action");
//!     ...
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use food_admin_core::UserRole;

use crate::db::UserRepository;
use crate::error::{AppError, set_sentry_user};
use crate::services::auth::{AuthUser, bearer_token};
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// The verified user is cached in request extensions so stacking
/// extractors verifies the token only once.
#[derive(Debug, Clone)]
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(Self(user.clone()));
        }

        let token = bearer_token(&parts.headers)?;
        let user = state.tokens().authenticate(token).await?;

        set_sentry_user(&user.user_id);
        tracing::Span::current().record("user_id", user.user_id.as_str());

        parts.extensions.insert(user.clone());
        Ok(Self(user))
    }
}

/// Extractor that requires an authenticated admin.
///
/// The role claimed in the token wins; otherwise the local `users.role`
/// for the token subject decides.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;

        if user.token_role == Some(UserRole::Admin) {
            return Ok(Self(user));
        }

        let stored = UserRepository::new(state.pool())
            .role_of(&user.user_id)
            .await?;
        if stored == Some(UserRole::Admin) {
            return Ok(Self(user));
        }

        tracing::warn!(user_id = %user.user_id, "Non-admin denied access to admin route");
        Err(AppError::Forbidden("Access denied. Admins only.".to_string()))
    }
}
