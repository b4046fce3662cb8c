//! SurrealDB implementation of [`LoginRepository`].

use chrono::{DateTime, Utc};
use latchkey_core::error::LatchkeyResult;
use latchkey_core::models::login::{CreateLogin, Login, UpdateLogin};
use latchkey_core::repository::{LoginRepository, Transactional};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_uuid, timestamp};
use crate::error::DbError;
use crate::transaction::{self, Statement, SurrealTransaction};

const SELECT_LOGIN: &str = "SELECT record::id(id) AS record_id, user_id, username, \
                            password_hash, created_at, updated_at";

#[derive(Debug, SurrealValue)]
struct LoginRow {
    record_id: String,
    user_id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LoginRow {
    fn try_into_login(self) -> Result<Login, DbError> {
        Ok(Login {
            id: parse_uuid("login", &self.record_id)?,
            user_id: parse_uuid("user", &self.user_id)?,
            username: self.username,
            password_hash: self.password_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Login repository.
pub struct SurrealLoginRepository<C: Connection> {
    db: Surreal<C>,
    tx: Option<SurrealTransaction>,
}

impl<C: Connection> Clone for SurrealLoginRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            tx: self.tx.clone(),
        }
    }
}

impl<C: Connection> SurrealLoginRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db, tx: None }
    }

    async fn fetch_one(&self, filter: &str, key: &'static str, value: String) -> LatchkeyResult<Login> {
        let mut result = self
            .db
            .query(format!("{SELECT_LOGIN} {filter}"))
            .bind((key, value.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LoginRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "login".into(),
            id: value,
        })?;

        row.try_into_login().map_err(Into::into)
    }
}

impl<C: Connection> Transactional for SurrealLoginRepository<C> {
    type Transaction = SurrealTransaction;

    fn with_transaction(&self, tx: &SurrealTransaction) -> Self {
        Self {
            db: self.db.clone(),
            tx: Some(tx.clone()),
        }
    }
}

impl<C: Connection> LoginRepository for SurrealLoginRepository<C> {
    async fn create(&self, input: CreateLogin) -> LatchkeyResult<Login> {
        let now = Utc::now();
        let login = Login {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            username: input.username,
            password_hash: input.password_hash,
            created_at: now,
            updated_at: now,
        };

        let statement = Statement::new(
            "CREATE type::record('login', $_id) SET \
             user_id = $_user_id, \
             username = $_username, \
             password_hash = $_password_hash, \
             created_at = <datetime> $_now, \
             updated_at = <datetime> $_now",
        )
        .bind("id", login.id.to_string())
        .bind("user_id", login.user_id.to_string())
        .bind("username", login.username.clone())
        .bind("password_hash", login.password_hash.clone())
        .bind("now", timestamp(now));

        transaction::write(&self.db, self.tx.as_ref(), statement).await?;
        Ok(login)
    }

    async fn get_by_id(&self, id: Uuid) -> LatchkeyResult<Login> {
        self.fetch_one("FROM type::record('login', $id)", "id", id.to_string())
            .await
    }

    async fn get_by_user_id(&self, user_id: Uuid) -> LatchkeyResult<Login> {
        self.fetch_one("FROM login WHERE user_id = $user_id", "user_id", user_id.to_string())
            .await
    }

    async fn get_by_username(&self, username: &str) -> LatchkeyResult<Login> {
        self.fetch_one("FROM login WHERE username = $username", "username", username.to_string())
            .await
    }

    async fn update(&self, id: Uuid, input: UpdateLogin) -> LatchkeyResult<Login> {
        let current = self.get_by_id(id).await?;

        let now = Utc::now();
        let mut statement = Statement::new(match input.password_hash {
            Some(_) => {
                "UPDATE type::record('login', $_id) SET \
                 password_hash = $_password_hash, \
                 updated_at = <datetime> $_now"
            }
            None => "UPDATE type::record('login', $_id) SET updated_at = <datetime> $_now",
        })
        .bind("id", id.to_string())
        .bind("now", timestamp(now));
        if let Some(ref hash) = input.password_hash {
            statement = statement.bind("password_hash", hash.clone());
        }

        transaction::write(&self.db, self.tx.as_ref(), statement).await?;

        Ok(Login {
            password_hash: input.password_hash.unwrap_or(current.password_hash),
            updated_at: now,
            ..current
        })
    }
}
