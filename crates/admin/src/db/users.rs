//! Local user repository.
//!
//! Rows are keyed by the identity provider subject (`external_id`). Syncs
//! never touch `role`; roles change only through `fa-cli admin`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use food_admin_core::{Email, UserId, UserRole};

use super::RepositoryError;
use crate::models::{User, UserProfile};

const USER_COLUMNS: &str = "id, external_id, email, name, profile_image, phone_number, \
                            role, is_deleted, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    external_id: String,
    email: String,
    name: String,
    profile_image: Option<String>,
    phone_number: Option<String>,
    role: UserRole,
    is_deleted: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| RepositoryError::corrupt("email", e))?;

        Ok(Self {
            id: UserId::new(row.id),
            external_id: row.external_id,
            email,
            name: row.name,
            profile_image: row.profile_image,
            phone_number: row.phone_number,
            role: row.role,
            is_deleted: row.is_deleted,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for local users.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a user from an identity sync.
    ///
    /// Optional fields that are absent keep their stored values. A
    /// previously deleted user is restored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(&self, profile: &UserProfile) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (external_id, email, name, profile_image, phone_number) \
             VALUES ($1, $2, COALESCE($3, 'User'), $4, $5) \
             ON CONFLICT (external_id) DO UPDATE SET \
                 email = EXCLUDED.email, \
                 name = COALESCE($3, users.name), \
                 profile_image = COALESCE($4, users.profile_image), \
                 phone_number = COALESCE($5, users.phone_number), \
                 is_deleted = FALSE \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&profile.external_id)
        .bind(profile.email.as_str())
        .bind(profile.name.as_deref())
        .bind(profile.profile_image.as_deref())
        .bind(profile.phone_number.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_write)?;

        User::try_from(row)
    }

    /// Get a user by identity provider subject.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_external_id(&self, external_id: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Role of an active user, `None` when unknown or deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn role_of(&self, external_id: &str) -> Result<Option<UserRole>, RepositoryError> {
        let role = sqlx::query_scalar::<_, UserRole>(
            "SELECT role FROM users WHERE external_id = $1 AND NOT is_deleted",
        )
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(role)
    }

    /// Set a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no such user exists.
    pub async fn set_role(&self, external_id: &str, role: UserRole) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET role = $2 WHERE external_id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(external_id)
        .bind(role)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        User::try_from(row)
    }

    /// All active admins, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_admins(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE role = 'admin' AND NOT is_deleted \
             ORDER BY created_at"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }
}
