//! Request extractors that reject with the JSON error envelope.

use std::str::FromStr;

use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use food_admin_core::IdError;

use crate::error::AppError;

/// `axum::Json` with `AppError` rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Query` with `AppError` rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Parse a path segment into a typed id, rejecting with `INVALID_ID`.
///
/// # Errors
///
/// Returns `AppError::InvalidId` if the segment is not a UUID.
pub fn parse_id<T>(raw: &str) -> Result<T, AppError>
where
    T: FromStr<Err = IdError>,
{
    raw.parse().map_err(|_| AppError::InvalidId(raw.to_string()))
}
