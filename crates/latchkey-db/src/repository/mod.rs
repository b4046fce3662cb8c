//! SurrealDB repository implementations.
//!
//! Every repository can be rebound to a [`SurrealTransaction`]. Bound
//! repositories still read straight from the database, but their writes
//! are queued on the transaction until it commits.
//!
//! [`SurrealTransaction`]: crate::SurrealTransaction

mod auth;
mod login;
mod user;

pub use auth::SurrealAuthRepository;
pub use login::SurrealLoginRepository;
pub use user::SurrealUserRepository;

use chrono::{DateTime, SecondsFormat, Utc};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::InvalidRow(format!("invalid {field} UUID: {e}")))
}

/// Render a timestamp the way it is bound into `<datetime>` casts.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
