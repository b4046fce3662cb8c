//! SurrealDB implementation of [`UserRepository`].

use chrono::{DateTime, Utc};
use latchkey_core::error::LatchkeyResult;
use latchkey_core::models::user::{CreateUser, User};
use latchkey_core::repository::{PaginatedResult, Pagination, Transactional, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid, timestamp};
use crate::error::DbError;
use crate::transaction::{self, Statement, SurrealTransaction};

const SELECT_USER: &str = "SELECT record::id(id) AS record_id, username, created_at, updated_at";

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    username: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        Ok(User {
            id: parse_uuid("user", &self.record_id)?,
            username: self.username,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the User repository.
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    tx: Option<SurrealTransaction>,
}

impl<C: Connection> Clone for SurrealUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, tx: None }
    }

    async fn fetch_one(&self, filter: &str, key: &'static str, value: String) -> LatchkeyResult<User> {
        let mut result = self
            .db
            .query(format!("{SELECT_USER} {filter}"))
            .bind((key, value.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: value,
        })?;

        row.try_into_user().map_err(Into::into)
    }
}

impl<C: Connection> Transactional for SurrealUserRepository<C> {
    type Transaction = SurrealTransaction;

    fn with_transaction(&self, tx: &SurrealTransaction) -> Self {
        Self {
            db: self.db.clone(),
            tx: Some(tx.clone()),
        }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> LatchkeyResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: input.username,
            created_at: now,
            updated_at: now,
        };

        let statement = Statement::new(
            "CREATE type::record('user', $_id) SET \
             username = $_username, \
             created_at = <datetime> $_now, \
             updated_at = <datetime> $_now",
        )
        .bind("id", user.id.to_string())
        .bind("username", user.username.clone())
        .bind("now", timestamp(user.created_at));

        transaction::write(&self.db, self.tx.as_ref(), statement).await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> LatchkeyResult<User> {
        self.fetch_one("FROM type::record('user', $id)", "id", id.to_string())
            .await
    }

    async fn get_by_username(&self, username: &str) -> LatchkeyResult<User> {
        self.fetch_one("FROM user WHERE username = $username", "username", username.to_string())
            .await
    }

    async fn list(&self, pagination: Pagination) -> LatchkeyResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(format!(
                "{SELECT_USER} FROM user ORDER BY created_at ASC LIMIT $limit START $offset"
            ))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(UserRow::try_into_user)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
