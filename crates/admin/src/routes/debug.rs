//! Token diagnostics for the mobile apps.

use axum::{Json, Router, response::IntoResponse, routing::get};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::middleware::RequireAuth;
use crate::services::auth::AuthUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/test/auth", get(auth))
        .route("/test/token-debug", get(token_debug))
}

fn auth_summary(user: &AuthUser) -> Value {
    json!({
        "userId": user.user_id,
        "sessionId": user.session_id,
        "isMock": user.is_mock,
    })
}

/// `GET /api/test/auth`
pub async fn auth(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Authentication successful",
        "auth": auth_summary(&user),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// `GET /api/test/token-debug`
pub async fn token_debug(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    let now = Utc::now();
    let expiry = user
        .expires_at
        .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0));

    Json(json!({
        "success": true,
        "auth": auth_summary(&user),
        "tokenExpiry": expiry.map(|exp| exp.to_rfc3339()),
        "expiresInSeconds": expiry.map(|exp| (exp - now).num_seconds()),
        "currentTime": now.to_rfc3339(),
    }))
}
