//! Domain models for the admin API.
//!
//! Models carry validated core types ([`Price`](food_admin_core::Price),
//! [`ItemSize`](food_admin_core::ItemSize), ...) and serialize to the JSON
//! shape the mobile apps already consume. Row structs that map database
//! columns onto these live next to their repositories in [`crate::db`].

pub mod cart;
pub mod item;
pub mod order;
pub mod user;

pub use cart::{Cart, CartLine};
pub use item::{Item, ItemChanges, NewItem};
pub use order::{DeliveryDetails, NewOrder, Order, OrderLine, OrdersReport};
pub use user::{User, UserProfile};
