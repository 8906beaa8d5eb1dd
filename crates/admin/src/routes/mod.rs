//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness (no dependencies)
//! GET    /health/ready            - Readiness (database reachable)
//!
//! # Catalog (reads: any user, writes: admin)
//! GET    /api/items               - Items, filterable by category/availability
//! POST   /api/items               - Create item (uploads images)
//! GET    /api/items/admin/all     - Every item (admin)
//! GET    /api/items/{id}          - Item detail
//! PUT    /api/items/{id}          - Partial update (admin)
//! DELETE /api/items/{id}          - Delete (admin)
//!
//! # Orders
//! GET    /api/orders              - Period report with totals (admin)
//! POST   /api/orders              - Checkout the caller's cart
//! GET    /api/orders/{id}         - Order detail (admin)
//! PATCH  /api/orders/{id}         - Advance status (admin)
//!
//! # Cart (caller's own)
//! GET    /api/cart                - Cart with totals
//! POST   /api/cart                - Add item
//! PUT    /api/cart/{id}           - Set line quantity
//! DELETE /api/cart/{id}           - Remove line
//!
//! # Users
//! POST   /api/users/sync          - Mirror the signed-in user locally
//!
//! # Diagnostics
//! GET    /api/test/auth           - Echo the authenticated identity
//! GET    /api/test/token-debug    - Identity plus token expiry
//! ```

pub mod cart;
pub mod debug;
pub mod health;
pub mod items;
pub mod orders;
pub mod users;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Health checks. Mounted outside `/api` so they skip rate limiting and
/// HTTPS enforcement.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

/// Everything under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(items::router())
        .merge(orders::router())
        .merge(cart::router())
        .merge(users::router())
        .merge(debug::router())
}
