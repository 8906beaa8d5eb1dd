//! Single order handlers: view and status changes.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use food_admin_core::OrderId;

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, parse_id};
use crate::middleware::RequireAdmin;
use crate::state::AppState;

use super::types::StatusUpdateRequest;

/// `GET /api/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: OrderId = parse_id(&id)?;
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    Ok(Json(json!({ "success": true, "order": order })))
}

/// `PATCH /api/orders/{id}`
///
/// Orders only move forward. Setting the current status again is a no-op.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<StatusUpdateRequest>,
) -> Result<impl IntoResponse> {
    let id: OrderId = parse_id(&id)?;
    let next = body.validate().map_err(AppError::Validation)?;

    let orders = OrderRepository::new(state.pool());
    let current = orders
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    if current.status == next {
        return Ok(Json(json!({ "success": true, "order": current })));
    }
    if !current.status.can_transition_to(next) {
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: next,
        });
    }

    // Lost a race with another admin: the row is no longer in `current.status`.
    let order = orders
        .update_status(id, current.status, next)
        .await?
        .ok_or(AppError::InvalidTransition {
            from: current.status,
            to: next,
        })?;

    tracing::info!(
        order_id = %id,
        from = %current.status,
        to = %next,
        admin = %admin.user_id,
        "Order status changed"
    );
    Ok(Json(json!({ "success": true, "order": order })))
}
