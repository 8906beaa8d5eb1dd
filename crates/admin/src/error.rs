//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{ "success": false, "error": { "code", "message", "details"? } }` so
//! the mobile clients can branch on `code`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use food_admin_core::OrderStatus;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::images::ImageError;

/// One failed input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Image CDN operation failed.
    #[error("Image upload error: {0}")]
    Image(#[from] ImageError),

    /// Input failed validation.
    #[error("Validation failed ({} field(s))", .0.len())]
    Validation(Vec<FieldError>),

    /// Path id is not a UUID.
    #[error("Invalid id: {0}")]
    InvalidId(String),

    /// Request was understood but cannot be carried out.
    #[error("Bad request: {message}")]
    BadRequest {
        code: &'static str,
        message: String,
    },

    /// Resource not found.
    #[error("Not found: {message}")]
    NotFound {
        code: &'static str,
        message: String,
    },

    /// Caller lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Order status change not allowed from the current status.
    #[error("Cannot change order status from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Plain HTTP reached the server in production.
    #[error("HTTPS required")]
    HttpsRequired,

    /// Too many requests from this client.
    #[error("Rate limited")]
    RateLimited,

    /// Request body over the configured limit.
    #[error("Payload too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// 404 for a missing resource, e.g. `AppError::not_found("Item")`.
    #[must_use]
    pub fn not_found(resource: &str) -> Self {
        Self::NotFound {
            code: "NOT_FOUND",
            message: format!("{resource} not found"),
        }
    }

    /// 400 with a single field error.
    #[must_use]
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    fn details(&self) -> Option<Vec<FieldError>> {
        match self {
            Self::Validation(details) => Some(details.clone()),
            Self::Database(RepositoryError::InvalidInput { field, message }) => {
                Some(vec![FieldError::new(*field, message.clone())])
            }
            _ => None,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            Self::Database(RepositoryError::Conflict(_)) | Self::InvalidTransition { .. } => {
                StatusCode::CONFLICT
            }
            Self::Database(RepositoryError::InvalidInput { .. })
            | Self::Validation(_)
            | Self::InvalidId(_)
            | Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(AuthError::KeySetUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Image(_) => StatusCode::BAD_GATEWAY,
            Self::Forbidden(_) | Self::HttpsRequired => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    /// Machine-readable code for the response envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(RepositoryError::NotFound) => "NOT_FOUND",
            Self::Database(RepositoryError::Conflict(_)) => "DUPLICATE_ENTRY",
            Self::Database(RepositoryError::InvalidInput { .. }) | Self::Validation(_) => {
                "VALIDATION_ERROR"
            }
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
            Self::Auth(err) => err.code(),
            Self::Image(_) => "UPLOAD_FAILED",
            Self::InvalidId(_) => "INVALID_ID",
            Self::BadRequest { code, .. } | Self::NotFound { code, .. } => *code,
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::HttpsRequired => "HTTPS_REQUIRED",
            Self::RateLimited => "RATE_LIMIT_EXCEEDED",
            Self::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Resource not found".to_string(),
            Self::Database(RepositoryError::Conflict(_)) => {
                "A record with these details already exists".to_string()
            }
            Self::Database(RepositoryError::InvalidInput { .. }) | Self::Validation(_) => {
                "Validation failed".to_string()
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Auth(err) => err.public_message().to_string(),
            Self::Image(_) => "Image upload failed, please try again".to_string(),
            Self::InvalidId(id) => format!("'{id}' is not a valid id"),
            Self::BadRequest { message, .. } | Self::NotFound { message, .. } => message.clone(),
            Self::Forbidden(reason) => reason.clone(),
            Self::InvalidTransition { .. } => self.to_string(),
            Self::HttpsRequired => "HTTPS is required for all API requests".to_string(),
            Self::RateLimited => "Too many requests, please try again later".to_string(),
            Self::PayloadTooLarge => "Request body is too large".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(RepositoryError::Database(_) | RepositoryError::DataCorruption(_))
                | Self::Internal(_)
                | Self::Image(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else if let Self::Auth(err) = &self {
            tracing::debug!(error = %err, "Authentication rejected");
        }

        let status = self.status();
        let mut error = json!({
            "code": self.code(),
            "message": self.public_message(),
        });
        if let Some(details) = self.details() {
            error["details"] = json!(details);
        }

        (status, Json(json!({ "success": false, "error": error }))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return Self::PayloadTooLarge;
        }
        Self::BadRequest {
            code: "INVALID_JSON",
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest {
            code: "INVALID_QUERY",
            message: rejection.body_text(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from the identity provider subject.
pub fn set_sentry_user(user_id: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_validation_envelope_includes_details() {
        let (status, json) = body(AppError::Validation(vec![
            FieldError::new("Name", "Name is required"),
            FieldError::new("price", "price must be a number"),
        ]))
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"][1]["field"], "price");
    }

    #[tokio::test]
    async fn test_internal_errors_do_not_leak() {
        let (status, json) = body(AppError::Internal("pool exhausted at 10.0.0.3".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"]["message"], "Internal server error");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_repository_errors_map_to_codes() {
        let (status, json) = body(AppError::Database(RepositoryError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "NOT_FOUND");

        let (status, json) =
            body(AppError::Database(RepositoryError::Conflict("users_email_key".into()))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "DUPLICATE_ENTRY");
        assert!(!json["error"]["message"].as_str().unwrap().contains("users_email_key"));
    }

    #[tokio::test]
    async fn test_out_of_range_input_is_a_validation_error() {
        let (status, json) = body(AppError::Database(RepositoryError::InvalidInput {
            field: "quantity",
            message: "A cart line can hold at most 999 of an item".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"][0]["field"], "quantity");
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (status, json) = body(AppError::Auth(AuthError::NoToken)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "NO_TOKEN");

        let (status, json) = body(AppError::Auth(AuthError::Expired)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "TOKEN_EXPIRED");

        let (status, _) = body(AppError::Auth(AuthError::KeySetUnavailable("timeout".into()))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_transition_and_upload_errors() {
        let (status, json) = body(AppError::InvalidTransition {
            from: OrderStatus::Delivered,
            to: OrderStatus::Pending,
        })
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
        assert_eq!(
            json["error"]["message"],
            "Cannot change order status from delivered to pending"
        );

        let (status, json) = body(AppError::Image(ImageError::Api {
            status: 401,
            message: "Invalid Signature".into(),
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPLOAD_FAILED");
    }

    #[test]
    fn test_not_found_helper() {
        let err = AppError::not_found("Order");
        assert_eq!(err.code(), "NOT_FOUND");
        assert_eq!(err.to_string(), "Not found: Order not found");
    }
}
