//! Order route handlers.
//!
//! The report, detail and status endpoints are admin-only; checkout is
//! open to any signed-in customer.

mod checkout;
mod detail;
mod list;
pub mod types;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::state::AppState;

pub use checkout::create;
pub use detail::{show, update_status};
pub use list::index;
pub use types::{CheckoutRequest, OrdersQuery, StatusUpdateRequest};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(index).post(create))
        .route("/orders/{id}", patch(update_status).get(show))
}
