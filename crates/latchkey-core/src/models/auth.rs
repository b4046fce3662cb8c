//! Auth (session) domain model.
//!
//! The existence of an [`Auth`] row for a user is what makes that user
//! signed in. Deleting it signs the user out, and every token bound to
//! it stops authenticating.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Auth {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateAuth {
    pub user_id: Uuid,
}

/// Identity of an authenticated request: the session the bearer token
/// is bound to and the user owning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthIdentity {
    pub auth_id: Uuid,
    pub user_id: Uuid,
}

impl AuthIdentity {
    /// `true` if either identifier is the nil UUID.
    pub fn is_empty(&self) -> bool {
        self.auth_id.is_nil() || self.user_id.is_nil()
    }
}

impl From<&Auth> for AuthIdentity {
    fn from(auth: &Auth) -> Self {
        Self {
            auth_id: auth.id,
            user_id: auth.user_id,
        }
    }
}
