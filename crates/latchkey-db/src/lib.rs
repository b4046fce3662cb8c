//! Latchkey Database: SurrealDB connection management, schema
//! migrations, transactions and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Deferred-write transactions ([`SurrealTransaction`],
//!   [`SurrealTransactionManager`])
//! - Repository implementations of the `latchkey-core` traits
//! - Error types ([`DbError`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod transaction;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use transaction::{SurrealTransaction, SurrealTransactionManager};
