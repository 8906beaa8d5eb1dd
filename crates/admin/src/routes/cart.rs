//! Customer cart handlers. Every route acts on the caller's own cart.

use axum::{
    Json, Router,
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
};
use serde::Deserialize;
use serde_json::json;

use food_admin_core::{CartItemId, ItemId, ItemSize};

use crate::db::carts::MAX_LINE_QUANTITY;
use crate::db::{CartRepository, ItemRepository};
use crate::error::{AppError, FieldError, Result};
use crate::extract::{ApiJson, parse_id};
use crate::middleware::RequireAuth;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(show).post(add))
        .route("/cart/{id}", put(update).delete(remove))
}

/// Body of `POST /api/cart`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub item_id: Option<String>,
    pub quantity: Option<i64>,
    pub size: Option<String>,
}

/// Body of `PUT /api/cart/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: Option<i64>,
}

fn quantity(value: Option<i64>, errors: &mut Vec<FieldError>) -> Option<u32> {
    match value {
        Some(q) if (1..=i64::from(MAX_LINE_QUANTITY)).contains(&q) => u32::try_from(q).ok(),
        Some(_) => {
            errors.push(FieldError::new(
                "quantity",
                format!("Quantity must be between 1 and {MAX_LINE_QUANTITY}"),
            ));
            None
        }
        None => {
            errors.push(FieldError::new("quantity", "Quantity must be at least 1"));
            None
        }
    }
}

impl AddToCartRequest {
    fn validate(&self) -> std::result::Result<(ItemId, u32, Option<ItemSize>), Vec<FieldError>> {
        let mut errors = Vec::new();

        let item_id = self
            .item_id
            .as_deref()
            .and_then(|id| ItemId::parse(id).ok());
        if item_id.is_none() {
            errors.push(FieldError::new("itemId", "Invalid item ID"));
        }
        let quantity = quantity(self.quantity, &mut errors);
        let size = match self.size.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(size) => match size.parse::<ItemSize>() {
                Ok(size) => Some(Some(size)),
                Err(e) => {
                    errors.push(FieldError::new("size", e.to_string()));
                    None
                }
            },
            None => Some(None),
        };

        match (item_id, quantity, size) {
            (Some(item_id), Some(quantity), Some(size)) if errors.is_empty() => {
                Ok((item_id, quantity, size))
            }
            _ => Err(errors),
        }
    }
}

fn cart_not_found() -> AppError {
    AppError::NotFound {
        code: "CART_NOT_FOUND",
        message: "Cart not found".to_string(),
    }
}

/// `GET /api/cart`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let cart = CartRepository::new(state.pool()).load(&user.user_id).await?;
    Ok(Json(json!({ "success": true, "cart": cart })))
}

/// `POST /api/cart`
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<AddToCartRequest>,
) -> Result<impl IntoResponse> {
    let (item_id, quantity, size) = body.validate().map_err(AppError::Validation)?;

    let item = ItemRepository::new(state.pool())
        .get(item_id)
        .await?
        .ok_or_else(|| AppError::NotFound {
            code: "ITEM_NOT_FOUND",
            message: "Item not found".to_string(),
        })?;
    if !item.available {
        return Err(AppError::BadRequest {
            code: "ITEM_UNAVAILABLE",
            message: "Item is not available".to_string(),
        });
    }
    if let Some(size) = size
        && !item.sizes.is_empty()
        && !item.sizes.contains(&size)
    {
        return Err(AppError::invalid_field(
            "size",
            format!("{} is not offered in size {size}", item.name),
        ));
    }

    let carts = CartRepository::new(state.pool());
    let cart_id = carts.get_or_create_id(&user.user_id).await?;
    let line_id = carts.add(cart_id, item_id, quantity, size).await?;

    tracing::debug!(cart_id = %cart_id, line_id = %line_id, "Cart line added");
    Ok(Json(json!({
        "success": true,
        "message": "Item added to cart",
    })))
}

/// `PUT /api/cart/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateCartRequest>,
) -> Result<impl IntoResponse> {
    let line_id: CartItemId = parse_id(&id)?;
    let mut errors = Vec::new();
    let quantity = quantity(body.quantity, &mut errors).ok_or(AppError::Validation(errors))?;

    let carts = CartRepository::new(state.pool());
    let cart_id = carts
        .find_id(&user.user_id)
        .await?
        .ok_or_else(cart_not_found)?;

    if !carts.set_quantity(cart_id, line_id, quantity).await? {
        return Err(AppError::NotFound {
            code: "NOT_FOUND",
            message: "Cart item not found".to_string(),
        });
    }

    Ok(Json(json!({
        "success": true,
        "message": "Cart item updated",
    })))
}

/// `DELETE /api/cart/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let line_id: CartItemId = parse_id(&id)?;

    let carts = CartRepository::new(state.pool());
    let cart_id = carts
        .find_id(&user.user_id)
        .await?
        .ok_or_else(cart_not_found)?;

    if !carts.remove(cart_id, line_id).await? {
        tracing::debug!(line_id = %line_id, "Cart line already gone");
    }

    Ok(Json(json!({
        "success": true,
        "message": "Item removed from cart",
    })))
}
