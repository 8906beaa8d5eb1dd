//! Local user records mirrored from the identity provider.

use chrono::{DateTime, Utc};
use serde::Serialize;

use food_admin_core::{Email, UserId, UserRole};

/// A local user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    /// Identity provider subject.
    pub external_id: String,
    pub email: Email,
    pub name: String,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
    pub role: UserRole,
    #[serde(skip)]
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin && !self.is_deleted
    }
}

/// Profile fields written by a sync. Role is never part of a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub external_id: String,
    pub email: Email,
    /// `None` keeps the stored name (`User` for new rows).
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub phone_number: Option<String>,
}
