//! Admin role management.
//!
//! Users appear in the local `users` table after their first identity sync
//! from the customer or admin app. These commands only flip the role.

use food_admin::db::{RepositoryError, UserRepository};
use food_admin_core::UserRole;

use super::{ConnectError, connect};

/// Admin command errors.
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("No synced user with id {0}; they must sign in to the app first")]
    UnknownUser(String),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

async fn set_role(external_id: &str, role: UserRole) -> Result<(), AdminError> {
    let pool = connect().await?;

    let user = match UserRepository::new(&pool).set_role(external_id, role).await {
        Ok(user) => user,
        Err(RepositoryError::NotFound) => return Err(AdminError::UnknownUser(external_id.to_owned())),
        Err(e) => return Err(e.into()),
    };

    tracing::info!(
        "Role updated: {} <{}> is now {}",
        user.external_id,
        user.email,
        user.role
    );
    Ok(())
}

/// Grant the admin role to a synced user.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if no user has that identity provider id.
pub async fn grant(external_id: &str) -> Result<(), AdminError> {
    set_role(external_id, UserRole::Admin).await
}

/// Demote an admin back to customer.
///
/// # Errors
///
/// Returns `AdminError::UnknownUser` if no user has that identity provider id.
pub async fn revoke(external_id: &str) -> Result<(), AdminError> {
    set_role(external_id, UserRole::Customer).await
}

/// Log every current admin.
///
/// # Errors
///
/// Returns `AdminError` if the query fails.
pub async fn list() -> Result<(), AdminError> {
    let pool = connect().await?;
    let admins = UserRepository::new(&pool).list_admins().await?;

    if admins.is_empty() {
        tracing::info!("No admins. Grant one with: fa-cli admin grant --user <id>");
        return Ok(());
    }

    tracing::info!("{} admin(s):", admins.len());
    for admin in &admins {
        tracing::info!(
            "  {} <{}> {} (since {})",
            admin.external_id,
            admin.email,
            admin.name,
            admin.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}
