//! Login (credential) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Credential record pairing a username with a password hash.
///
/// Exactly one login exists per user. `username` mirrors
/// `User::username`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Login {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    /// Argon2id PHC string. The raw password is never stored.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateLogin {
    pub user_id: Uuid,
    pub username: String,
    /// Already-hashed password.
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateLogin {
    pub password_hash: Option<String>,
}
