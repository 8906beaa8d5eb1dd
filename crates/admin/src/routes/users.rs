//! Identity sync: mirror the signed-in user into the local `users` table.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use serde::Deserialize;
use serde_json::json;

use food_admin_core::Email;

use crate::db::UserRepository;
use crate::error::{AppError, FieldError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::UserProfile;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 100;
const MAX_PHONE_LEN: usize = 32;

pub fn router() -> Router<AppState> {
    Router::new().route("/users/sync", post(sync))
}

/// Body of `POST /api/users/sync`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl SyncRequest {
    /// Validate into a profile for `external_id`.
    fn into_profile(self, external_id: &str) -> std::result::Result<UserProfile, Vec<FieldError>> {
        let mut errors = Vec::new();

        let email = match self.email.as_deref().map(Email::parse) {
            Some(Ok(email)) => Some(email),
            Some(Err(e)) => {
                errors.push(FieldError::new("email", e.to_string()));
                None
            }
            None => {
                errors.push(FieldError::new("email", "email is required"));
                None
            }
        };

        let name = non_empty(self.name);
        if name.as_ref().is_some_and(|n| n.chars().count() > MAX_NAME_LEN) {
            errors.push(FieldError::new(
                "name",
                format!("name must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        let phone_number = non_empty(self.phone_number);
        if phone_number.as_ref().is_some_and(|p| p.len() > MAX_PHONE_LEN) {
            errors.push(FieldError::new(
                "phoneNumber",
                format!("phoneNumber must be at most {MAX_PHONE_LEN} characters"),
            ));
        }

        match email {
            Some(email) if errors.is_empty() => Ok(UserProfile {
                external_id: external_id.to_owned(),
                email,
                name,
                profile_image: non_empty(self.profile_image),
                phone_number,
            }),
            _ => Err(errors),
        }
    }
}

/// `POST /api/users/sync`
pub async fn sync(
    State(state): State<AppState>,
    RequireAuth(auth): RequireAuth,
    ApiJson(body): ApiJson<SyncRequest>,
) -> Result<impl IntoResponse> {
    let profile = body
        .into_profile(&auth.user_id)
        .map_err(AppError::Validation)?;

    let user = UserRepository::new(state.pool()).upsert(&profile).await?;

    tracing::info!(user_id = %auth.user_id, role = %user.role, "User synced");
    Ok(Json(json!({
        "success": true,
        "message": "User synced successfully",
        "user": user,
    })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> SyncRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_profile_from_minimal_body() {
        let profile = request(json!({ "email": "Asha@Example.COM" }))
            .into_profile("user_2abc")
            .unwrap();
        assert_eq!(profile.external_id, "user_2abc");
        assert_eq!(profile.email.as_str(), "Asha@example.com");
        assert_eq!(profile.name, None);
        assert_eq!(profile.phone_number, None);
    }

    #[test]
    fn test_blank_optionals_are_dropped() {
        let profile = request(json!({
            "email": "asha@example.com",
            "name": "  ",
            "profileImage": "",
            "phoneNumber": " +92 300 1234567 ",
        }))
        .into_profile("user_2abc")
        .unwrap();
        assert_eq!(profile.name, None);
        assert_eq!(profile.profile_image, None);
        assert_eq!(profile.phone_number.as_deref(), Some("+92 300 1234567"));
    }

    #[test]
    fn test_email_required_and_checked() {
        let errors = request(json!({})).into_profile("u").unwrap_err();
        assert_eq!(errors[0].field, "email");

        let errors = request(json!({ "email": "not-an-email" }))
            .into_profile("u")
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }
}
