//! Database operations for the food admin `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Local mirror of identity provider users (role lives here)
//! - `items` - Menu catalog
//! - `carts` / `cart_items` - One cart per customer, lines cascade with items
//! - `orders` - Customer orders with a JSONB line snapshot
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p food-admin-cli -- migrate
//! ```
//!
//! They are never applied on server start.

pub mod carts;
pub mod items;
pub mod orders;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use items::{ItemFilter, ItemRepository};
pub use orders::{CheckoutOutcome, OrderFilter, OrderRepository};
pub use users::UserRepository;

/// Embedded schema migrations, applied by `fa-cli migrate`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique external id).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// A value the schema cannot hold, reported against a request field.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },
}

impl RepositoryError {
    /// Map unique violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            let constraint = db_err.constraint().unwrap_or("unique").to_owned();
            return Self::Conflict(constraint);
        }
        Self::Database(err)
    }

    pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> Self {
        Self::DataCorruption(format!("invalid {what} in database: {err}"))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options()
        .connect(database_url.expose_secret())
        .await
}

/// Create a pool that connects on first use. Used by router tests.
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL cannot be parsed.
pub fn create_lazy_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    pool_options().connect_lazy(database_url.expose_secret())
}

fn pool_options() -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
}
