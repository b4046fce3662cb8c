//! SurrealDB implementation of [`AuthRepository`].
//!
//! Auth records are stored in the `session` table.

use chrono::{DateTime, Utc};
use latchkey_core::error::LatchkeyResult;
use latchkey_core::models::auth::{Auth, CreateAuth};
use latchkey_core::repository::{AuthRepository, Transactional};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, timestamp};
use crate::error::DbError;
use crate::transaction::{self, Statement, SurrealTransaction};

#[derive(Debug, SurrealValue)]
struct AuthRow {
    record_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl AuthRow {
    fn try_into_auth(self) -> Result<Auth, DbError> {
        Ok(Auth {
            id: parse_uuid("session", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            created_at: self.created_at,
        })
    }
}

/// SurrealDB implementation of the Auth (session) repository.
pub struct SurrealAuthRepository<C: Connection> {
    db: Surreal<C>,
    tx: Option<SurrealTransaction>,
}

impl<C: Connection> Clone for SurrealAuthRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<C: Connection> SurrealAuthRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, tx: None }
    }

    async fn fetch_one(&self, filter: &str, key: &'static str, value: String) -> LatchkeyResult<Auth> {
        let mut result = self
            .db
            .query(format!(
                "SELECT record::id(id) AS record_id, user_id, created_at {filter}"
            ))
            .bind((key, value.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuthRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "auth".into(),
            id: value,
        })?;

        row.try_into_auth().map_err(Into::into)
    }
}

impl<C: Connection> Transactional for SurrealAuthRepository<C> {
    type Transaction = SurrealTransaction;

    fn with_transaction(&self, tx: &SurrealTransaction) -> Self {
        Self {
            db: self.db.clone(),
            tx: Some(tx.clone()),
        }
    }
}

impl<C: Connection> AuthRepository for SurrealAuthRepository<C> {
    async fn create(&self, input: CreateAuth) -> LatchkeyResult<Auth> {
        let auth = Auth {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            created_at: Utc::now(),
        };

        let statement = Statement::new(
            "CREATE type::record('session', $_id) SET \
             user_id = $_user_id, \
             created_at = <datetime> $_now",
        )
        .bind("id", auth.id.to_string())
        .bind("user_id", auth.user_id.to_string())
        .bind("now", timestamp(auth.created_at));

        transaction::write(&self.db, self.tx.as_ref(), statement).await?;
        Ok(auth)
    }

    async fn get_by_id(&self, id: Uuid) -> LatchkeyResult<Auth> {
        self.fetch_one("FROM type::record('session', $id)", "id", id.to_string())
            .await
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> LatchkeyResult<Auth> {
        self.fetch_one("FROM session WHERE user_id = $user_id", "user_id", user_id.to_string())
            .await
    }

    async fn delete(&self, id: Uuid) -> LatchkeyResult<()> {
        self.get_by_id(id).await?;

        let statement =
            Statement::new("DELETE type::record('session', $_id)").bind("id", id.to_string());
        transaction::write(&self.db, self.tx.as_ref(), statement).await?;

        Ok(())
    }
}
