//! Deferred-write transactions.
//!
//! A [`SurrealTransaction`] collects the write statements issued by
//! every repository scoped to it. Nothing touches the database until
//! [`SurrealTransactionManager::commit`] sends the whole batch wrapped
//! in `BEGIN TRANSACTION; ... COMMIT TRANSACTION;`, so the writes land
//! together or not at all. Reads are never deferred.

use std::sync::Arc;

use latchkey_core::error::LatchkeyResult;
use latchkey_core::repository::TransactionManager;
use parking_lot::Mutex;
use surrealdb::{Connection, Surreal};
use tracing::debug;

use crate::error::DbError;

/// A single SurrealQL write with its bound parameters.
///
/// Parameters are written as `$_name` in the SQL text. When statements
/// are batched, each one gets its parameters renamed to `$s<n>_name` so
/// that bindings from different statements never collide.
#[derive(Debug)]
pub(crate) struct Statement {
    sql: String,
    bindings: Vec<(&'static str, String)>,
}

impl Statement {
    pub(crate) fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            bindings: Vec::new(),
        }
    }

    pub(crate) fn bind(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.bindings.push((name, value.into()));
        self
    }

    fn scoped(self, ordinal: usize) -> (String, Vec<(String, String)>) {
        let prefix = format!("s{ordinal}_");
        let sql = self.sql.replace("$_", &format!("${prefix}"));
        let bindings = self
            .bindings
            .into_iter()
            .map(|(name, value)| (format!("{prefix}{name}"), value))
            .collect();
        (sql, bindings)
    }
}

/// Handle for one unit of work. Cloning shares the same pending writes.
#[derive(Debug, Clone, Default)]
pub struct SurrealTransaction {
    pending: Arc<Mutex<Vec<Statement>>>,
}

impl SurrealTransaction {
    pub(crate) fn push(&self, statement: Statement) {
        self.pending.lock().push(statement);
    }

    fn take(&self) -> Vec<Statement> {
        std::mem::take(&mut *self.pending.lock())
    }

    /// Number of writes waiting for commit.
    pub fn pending_writes(&self) -> usize {
        self.pending.lock().len()
    }
}

/// Run `statements` as a single SurrealDB transaction.
pub(crate) async fn execute<C: Connection>(
    db: &Surreal<C>,
    statements: Vec<Statement>,
) -> Result<(), DbError> {
    if statements.is_empty() {
        return Ok(());
    }

    let mut sql = String::from("BEGIN TRANSACTION;\n");
    let mut bindings = Vec::new();
    for (ordinal, statement) in statements.into_iter().enumerate() {
        let (text, binds) = statement.scoped(ordinal);
        sql.push_str(&text);
        sql.push_str(";\n");
        bindings.extend(binds);
    }
    sql.push_str("COMMIT TRANSACTION;");

    let mut query = db.query(&sql);
    for binding in bindings {
        query = query.bind(binding);
    }

    let mut response = query.await?;
    let mut errors: Vec<(usize, String)> = response
        .take_errors()
        .into_iter()
        .map(|(index, e)| (index, e.to_string()))
        .collect();
    if errors.is_empty() {
        return Ok(());
    }

    // Statements cancelled by the failing one report a generic error,
    // so look for the statement that actually failed.
    errors.sort_by_key(|(index, _)| *index);
    let message = errors
        .iter()
        .find(|(_, message)| !message.contains("not executed"))
        .or_else(|| errors.first())
        .map(|(_, message)| message.clone())
        .unwrap_or_default();

    Err(DbError::from_statement(message))
}

/// Apply `statement` now, or defer it into `tx` when one is given.
pub(crate) async fn write<C: Connection>(
    db: &Surreal<C>,
    tx: Option<&SurrealTransaction>,
    statement: Statement,
) -> Result<(), DbError> {
    match tx {
        Some(tx) => {
            tx.push(statement);
            Ok(())
        }
        None => execute(db, vec![statement]).await,
    }
}

/// Opens and commits [`SurrealTransaction`]s against one database.
pub struct SurrealTransactionManager<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealTransactionManager<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealTransactionManager<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TransactionManager for SurrealTransactionManager<C> {
    type Transaction = SurrealTransaction;

    fn begin(&self) -> SurrealTransaction {
        SurrealTransaction::default()
    }

    async fn commit(&self, tx: SurrealTransaction) -> LatchkeyResult<()> {
        let statements = tx.take();
        debug!(statements = statements.len(), "Committing transaction");
        execute(&self.db, statements).await.map_err(Into::into)
    }

    fn rollback(&self, tx: SurrealTransaction) {
        let discarded = tx.take().len();
        debug!(discarded, "Rolled back transaction");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoping_renames_every_parameter() {
        let statement = Statement::new(
            "CREATE type::record('session', $_id) SET user_id = $_user_id",
        )
        .bind("id", "a")
        .bind("user_id", "b");

        let (sql, bindings) = statement.scoped(3);
        assert_eq!(
            sql,
            "CREATE type::record('session', $s3_id) SET user_id = $s3_user_id"
        );
        assert_eq!(
            bindings,
            vec![
                ("s3_id".to_string(), "a".to_string()),
                ("s3_user_id".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn clones_share_pending_writes() {
        let tx = SurrealTransaction::default();
        let scoped = tx.clone();
        scoped.push(Statement::new("DELETE type::record('session', $_id)").bind("id", "x"));

        assert_eq!(tx.pending_writes(), 1);
        assert_eq!(tx.take().len(), 1);
        assert_eq!(scoped.pending_writes(), 0);
    }
}
