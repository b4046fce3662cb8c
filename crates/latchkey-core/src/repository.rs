//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Multi-step workflows share a
//! transaction handle: [`TransactionManager::begin`] opens it, each
//! repository is rebound to it through [`Transactional::with_transaction`],
//! and [`TransactionManager::commit`] applies every write at once.

use uuid::Uuid;

use crate::error::LatchkeyResult;
use crate::models::{
    auth::{Auth, CreateAuth},
    login::{CreateLogin, Login, UpdateLogin},
    user::{CreateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Opens and finalizes storage transactions.
pub trait TransactionManager: Send + Sync {
    type Transaction: Send + Sync;

    fn begin(&self) -> Self::Transaction;

    /// Apply every write recorded against `tx` atomically.
    fn commit(&self, tx: Self::Transaction) -> impl Future<Output = LatchkeyResult<()>> + Send;

    /// Discard every write recorded against `tx`.
    fn rollback(&self, tx: Self::Transaction);
}

/// A repository that can be scoped to a caller-supplied transaction.
///
/// `with_transaction` builds a new repository bound to `tx`; the
/// receiver is left untouched.
pub trait Transactional: Sized {
    type Transaction;

    fn with_transaction(&self, tx: &Self::Transaction) -> Self;
}

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub trait UserRepository: Transactional + Send + Sync {
    /// Fails with `Conflict` if the username is taken.
    fn create(&self, input: CreateUser) -> impl Future<Output = LatchkeyResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LatchkeyResult<User>> + Send;
    fn get_by_username(&self, username: &str)
    -> impl Future<Output = LatchkeyResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = LatchkeyResult<PaginatedResult<User>>> + Send;
}

pub trait LoginRepository: Transactional + Send + Sync {
    /// Fails with `Conflict` if the user already has a login.
    fn create(&self, input: CreateLogin) -> impl Future<Output = LatchkeyResult<Login>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LatchkeyResult<Login>> + Send;
    fn get_by_user_id(&self, user_id: Uuid)
    -> impl Future<Output = LatchkeyResult<Login>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = LatchkeyResult<Login>> + Send;
    /// Fails with `NotFound` if no login has this id.
    fn update(
        &self,
        id: Uuid,
        input: UpdateLogin,
    ) -> impl Future<Output = LatchkeyResult<Login>> + Send;
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

pub trait AuthRepository: Transactional + Send + Sync {
    /// Fails with `Conflict` if the user already has a session.
    fn create(&self, input: CreateAuth) -> impl Future<Output = LatchkeyResult<Auth>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = LatchkeyResult<Auth>> + Send;
    fn get_by_user_id(&self, user_id: Uuid) -> impl Future<Output = LatchkeyResult<Auth>> + Send;
    /// Fails with `NotFound` if no session has this id.
    fn delete(&self, id: Uuid) -> impl Future<Output = LatchkeyResult<()>> + Send;
}
