//! Catalog item handlers.
//!
//! Reads need any signed-in user; writes need an admin. Images arrive as
//! data URIs and are uploaded to the CDN before the row is written.

pub mod types;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use food_admin_core::ItemId;

use crate::db::{ItemFilter, ItemRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiQuery, parse_id};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Item, NewItem};
use crate::sanitize::sanitize_json;
use crate::services::images::{COVER_FOLDER, DETAIL_FOLDER, DataUri};
use crate::state::AppState;

pub use types::{CreateItemRequest, ItemsQuery, UpdateItemRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/items", get(list).post(create))
        .route("/items/admin/all", get(list_all))
        .route("/items/{id}", get(show).put(update).delete(destroy))
}

fn list_response(items: &[Item]) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "items": items,
        "count": items.len(),
    }))
}

/// `GET /api/items`
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    ApiQuery(query): ApiQuery<ItemsQuery>,
) -> Result<impl IntoResponse> {
    let filter = ItemFilter {
        category: query
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        available: query.available,
    };
    let items = ItemRepository::new(state.pool()).list(&filter).await?;
    Ok(list_response(&items))
}

/// `GET /api/items/admin/all`
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<impl IntoResponse> {
    let items = ItemRepository::new(state.pool())
        .list(&ItemFilter::default())
        .await?;
    Ok(list_response(&items))
}

/// `GET /api/items/{id}`
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ItemId = parse_id(&id)?;
    let item = ItemRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Item"))?;

    Ok(Json(json!({ "success": true, "item": item })))
}

/// Debug-log an item payload with inline images shortened.
fn log_payload(action: &str, body: &impl serde::Serialize) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let payload = serde_json::to_value(body).unwrap_or_default();
        tracing::debug!(action, payload = %sanitize_json(&payload), "Item payload");
    }
}

async fn upload_details(state: &AppState, details: &[DataUri]) -> Result<Vec<String>> {
    Ok(state
        .images()
        .upload_all(details, DETAIL_FOLDER)
        .await?
        .into_iter()
        .map(|image| image.url)
        .collect())
}

/// `POST /api/items`
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateItemRequest>,
) -> Result<impl IntoResponse> {
    log_payload("create", &body);
    let draft = body
        .validate(state.config().max_image_bytes)
        .map_err(AppError::Validation)?;

    let cover = state.images().upload(&draft.cover, COVER_FOLDER).await?;
    let detail_image_urls = upload_details(&state, &draft.details).await?;

    let item = ItemRepository::new(state.pool())
        .create(&NewItem {
            name: draft.name,
            price: draft.price,
            category: draft.category,
            description: draft.description,
            cover_image_url: cover.url,
            detail_image_urls,
            sizes: draft.sizes,
            available: true,
        })
        .await?;

    tracing::info!(item_id = %item.id, user_id = %admin.user_id, "Item created");
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Item added successfully",
            "item": item,
        })),
    ))
}

/// `PUT /api/items/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateItemRequest>,
) -> Result<impl IntoResponse> {
    let id: ItemId = parse_id(&id)?;
    log_payload("update", &body);
    let mut update = body
        .validate(state.config().max_image_bytes)
        .map_err(AppError::Validation)?;

    let repo = ItemRepository::new(state.pool());
    let mut item = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Item"))?;

    if let Some(cover) = &update.cover {
        update.changes.cover_image_url = Some(state.images().upload(cover, COVER_FOLDER).await?.url);
    }
    if !update.details.is_empty() {
        update.changes.detail_image_urls = Some(upload_details(&state, &update.details).await?);
    }

    if update.changes.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "message": "Nothing to update",
            "item": item,
        })));
    }

    item.apply(update.changes);
    let item = repo.update(&item).await?;

    tracing::info!(item_id = %item.id, user_id = %admin.user_id, "Item updated");
    Ok(Json(json!({
        "success": true,
        "message": "Item updated successfully",
        "item": item,
    })))
}

/// `DELETE /api/items/{id}`
pub async fn destroy(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let id: ItemId = parse_id(&id)?;

    if !ItemRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::not_found("Item"));
    }

    tracing::info!(item_id = %id, user_id = %admin.user_id, "Item deleted");
    Ok(Json(json!({
        "success": true,
        "message": "Item deleted permanently from database",
        "id": id,
    })))
}
