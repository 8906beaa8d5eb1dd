//! `fa-cli` subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;

/// Errors shared by commands that talk to the database.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Missing environment variable: FOOD_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Database URL from `FOOD_DATABASE_URL`, falling back to `DATABASE_URL`.
fn database_url() -> Result<SecretString, ConnectError> {
    dotenvy::dotenv().ok();

    ["FOOD_DATABASE_URL", "DATABASE_URL"]
        .iter()
        .find_map(|name| std::env::var(name).ok().filter(|v| !v.is_empty()))
        .map(SecretString::from)
        .ok_or(ConnectError::MissingDatabaseUrl)
}

/// Connect to the food admin database.
///
/// # Errors
///
/// Returns `ConnectError` if the URL is missing or the connection fails.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let url = database_url()?;
    tracing::info!("Connecting to food admin database...");
    Ok(food_admin::db::create_pool(&url).await?)
}
