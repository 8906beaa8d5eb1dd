//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! fa-cli migrate
//! ```
//!
//! Applies the migrations embedded from `crates/admin/migrations/`. The API
//! server never runs them itself.

use super::{ConnectError, connect};

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    let embedded = food_admin::db::MIGRATOR.iter().count();
    tracing::info!(embedded, "Running food admin migrations...");
    food_admin::db::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
