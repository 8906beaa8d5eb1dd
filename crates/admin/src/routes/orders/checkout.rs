//! Customer checkout: turn the caller's cart into an order.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::db::{CheckoutOutcome, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::types::CheckoutRequest;

/// `POST /api/orders`
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let delivery = body.validate().map_err(AppError::Validation)?;

    match OrderRepository::new(state.pool())
        .checkout(&user.user_id, delivery)
        .await?
    {
        CheckoutOutcome::Placed(order) => Ok((
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Order placed successfully",
                "order": order,
            })),
        )),
        CheckoutOutcome::EmptyCart => Err(AppError::BadRequest {
            code: "CART_EMPTY",
            message: "Your cart is empty".to_string(),
        }),
        CheckoutOutcome::Unavailable(names) => Err(AppError::BadRequest {
            code: "ITEM_UNAVAILABLE",
            message: format!("No longer available: {}", names.join(", ")),
        }),
        CheckoutOutcome::TotalTooLarge(total) => Err(AppError::BadRequest {
            code: "ORDER_TOO_LARGE",
            message: format!("Order total {} is above the allowed maximum", total.display()),
        }),
    }
}
