//! Orders report handler.

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::db::{OrderFilter, OrderRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiQuery;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

use super::types::OrdersQuery;

/// `GET /api/orders`
///
/// Count and revenue cover every order matching the filter; `orders` is the
/// requested page, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiQuery(query): ApiQuery<OrdersQuery>,
) -> Result<impl IntoResponse> {
    let request = query.validate().map_err(AppError::Validation)?;

    let filter = OrderFilter {
        period: request.period,
        store_offset: state.config().store_offset,
        status: request.status,
    };
    let report = OrderRepository::new(state.pool())
        .report(&filter, request.pagination)
        .await?;

    tracing::debug!(
        admin = %admin.user_id,
        period = %request.period.label(),
        total_count = report.total_count,
        "Orders report"
    );

    Ok(Json(json!({
        "success": true,
        "orders": report.orders,
        "totalCount": report.total_count,
        "totalRevenue": report.total_revenue,
        "page": request.pagination.page(),
        "limit": request.pagination.limit(),
        "hasMore": request.pagination.has_more(report.total_count),
    })))
}
