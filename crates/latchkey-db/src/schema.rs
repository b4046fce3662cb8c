//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings. Auth records live in the `session` table.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

#[derive(Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "credentials_and_sessions",
    sql: SCHEMA_V1,
}];

const SCHEMA_V1: &str = "\
-- user: one row per registered account
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON user TYPE string ASSERT string::len($value) > 0;
DEFINE FIELD created_at ON user TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON user TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_user_username ON user FIELDS username UNIQUE;

-- login: the credential of a user, exactly one per user
DEFINE TABLE login SCHEMAFULL;
DEFINE FIELD user_id ON login TYPE string;
DEFINE FIELD username ON login TYPE string ASSERT string::len($value) > 0;
DEFINE FIELD password_hash ON login TYPE string;
DEFINE FIELD created_at ON login TYPE datetime DEFAULT time::now();
DEFINE FIELD updated_at ON login TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_login_user_id ON login FIELDS user_id UNIQUE;
DEFINE INDEX idx_login_username ON login FIELDS username UNIQUE;

-- session: auth records, at most one per user
DEFINE TABLE session SCHEMAFULL;
DEFINE FIELD user_id ON session TYPE string;
DEFINE FIELD created_at ON session TYPE datetime DEFAULT time::now();
DEFINE INDEX idx_session_user_id ON session FIELDS user_id UNIQUE;
";

/// Bring the database schema up to date.
///
/// Ensures the `_migration` bookkeeping table exists, then applies, in
/// order, every migration newer than the last recorded one.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let applied = applied_version(db).await?;
    for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
        apply(db, migration).await?;
    }

    Ok(())
}

async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    Ok(records.first().map_or(0, |r| r.version))
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let Migration { version, name, sql } = *migration;
    info!(version, name, "Applying migration");

    db.query(sql)
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("v{version} ({name}): {e}")))?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", version))
        .bind(("name", name))
        .await?
        .check()
        .map_err(|e| DbError::Migration(format!("recording v{version}: {e}")))?;

    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
