//! Authentication service: sign-up, sign-in, sign-out, token renewal
//! and password rotation.
//!
//! Every workflow that writes opens one transaction, runs all of its
//! steps through repositories scoped to it, and commits only once every
//! step has succeeded. A failing step rolls the transaction back, so no
//! partial write is ever observable.

use latchkey_core::error::{LatchkeyError, LatchkeyResult};
use latchkey_core::models::auth::{AuthIdentity, CreateAuth};
use latchkey_core::models::login::{CreateLogin, UpdateLogin};
use latchkey_core::models::user::{CreateUser, User};
use latchkey_core::repository::{
    AuthRepository, LoginRepository, PaginatedResult, Pagination, TransactionManager,
    Transactional, UserRepository,
};
use latchkey_core::validation::{Passwords, Validator};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::password::PasswordHasher;
use crate::token;

/// Input for the sign-up flow.
#[derive(Debug)]
pub struct SignUpInput {
    pub username: String,
    pub password: String,
}

/// Input for the sign-in flow.
#[derive(Debug)]
pub struct SignInInput {
    pub username: String,
    pub password: String,
}

/// Input for the password rotation flow.
#[derive(Debug)]
pub struct ModifyPasswordInput {
    /// Identifier of the user owning the login, as received from the
    /// caller (validated as a UUID).
    pub id: String,
    pub passwords: Passwords,
}

/// Authentication service.
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct AuthService<U, L, A, M> {
    user_repo: U,
    login_repo: L,
    auth_repo: A,
    tx_manager: M,
    hasher: PasswordHasher,
    validator: Validator,
    config: AuthConfig,
}

impl<U, L, A, M> AuthService<U, L, A, M>
where
    M: TransactionManager + Clone,
    U: UserRepository + Transactional<Transaction = M::Transaction>,
    L: LoginRepository + Transactional<Transaction = M::Transaction>,
    A: AuthRepository + Transactional<Transaction = M::Transaction>,
{
    pub fn new(user_repo: U, login_repo: L, auth_repo: A, tx_manager: M, config: AuthConfig) -> Self {
        Self {
            user_repo,
            login_repo,
            auth_repo,
            tx_manager,
            hasher: PasswordHasher::new(config.pepper.clone()),
            validator: Validator::new(config.min_password_length),
            config,
        }
    }

    /// Build a service whose repositories are all bound to `tx`.
    pub fn with_transaction(&self, tx: &M::Transaction) -> Self {
        Self {
            user_repo: self.user_repo.with_transaction(tx),
            login_repo: self.login_repo.with_transaction(tx),
            auth_repo: self.auth_repo.with_transaction(tx),
            tx_manager: self.tx_manager.clone(),
            hasher: self.hasher.clone(),
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }

    /// Commit `tx` if `result` is a success, roll it back otherwise.
    async fn finish<T>(&self, tx: M::Transaction, result: LatchkeyResult<T>) -> LatchkeyResult<T> {
        match result {
            Ok(value) => {
                self.tx_manager.commit(tx).await?;
                Ok(value)
            }
            Err(e) => {
                self.tx_manager.rollback(tx);
                Err(e)
            }
        }
    }

    /// Register a new user with a login and sign them in.
    ///
    /// Returns a token bound to the freshly created session.
    pub async fn sign_up(&self, input: SignUpInput) -> LatchkeyResult<String> {
        self.validator.validate_username(&input.username)?;
        self.validator.validate_password("password", &input.password)?;

        match self.user_repo.get_by_username(&input.username).await {
            Ok(_) => {
                return Err(LatchkeyError::Conflict {
                    entity: format!("user with username {}", input.username),
                });
            }
            Err(LatchkeyError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let password_hash = self.hasher.hash(&input.password)?;

        let tx = self.tx_manager.begin();
        let result = self
            .with_transaction(&tx)
            .register(input.username, password_hash)
            .await;
        let (user, token) = self.finish(tx, result).await?;

        info!(user_id = %user.id, username = %user.username, "User signed up");
        Ok(token)
    }

    async fn register(&self, username: String, password_hash: String) -> LatchkeyResult<(User, String)> {
        let user = self
            .user_repo
            .create(CreateUser {
                username: username.clone(),
            })
            .await?;

        self.login_repo
            .create(CreateLogin {
                user_id: user.id,
                username,
                password_hash,
            })
            .await?;

        let token = self.open_session(user.id).await?;
        Ok((user, token))
    }

    /// Authenticate with username + password and open a session.
    ///
    /// A user holds at most one session: signing in again replaces the
    /// previous one, which invalidates every token issued for it.
    pub async fn sign_in(&self, input: SignInInput) -> LatchkeyResult<String> {
        self.validator.validate("username", &input.username)?;
        self.validator.validate("password", &input.password)?;

        let login = self.login_repo.get_by_username(&input.username).await?;

        if let Err(e) = self.hasher.verify(&login.password_hash, &input.password) {
            warn!(username = %input.username, "Sign-in rejected: {e}");
            return Err(e.into());
        }

        let tx = self.tx_manager.begin();
        let result = self.with_transaction(&tx).open_session(login.user_id).await;
        let token = self.finish(tx, result).await?;

        info!(user_id = %login.user_id, "User signed in");
        Ok(token)
    }

    async fn open_session(&self, user_id: Uuid) -> LatchkeyResult<String> {
        match self.auth_repo.get_by_user_id(user_id).await {
            Ok(previous) => {
                debug!(auth_id = %previous.id, %user_id, "Replacing existing session");
                self.auth_repo.delete(previous.id).await?;
            }
            Err(LatchkeyError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let auth = self.auth_repo.create(CreateAuth { user_id }).await?;

        let token = token::issue_access_token(
            auth.id,
            user_id,
            self.config.access_token_lifetime_secs,
            &self.config,
        )?;
        Ok(token)
    }

    /// Issue a fresh token for the session the caller is authenticated
    /// with.
    pub async fn renew_token(&self, identity: AuthIdentity) -> LatchkeyResult<String> {
        if identity.is_empty() {
            return Err(LatchkeyError::Internal(
                "request carries no authenticated identity".into(),
            ));
        }

        let auth = self
            .auth_repo
            .get_by_id(identity.auth_id)
            .await
            .map_err(|e| match e {
                LatchkeyError::NotFound { .. } => LatchkeyError::bad_request(
                    "you are not logged in, then perform a login to get a token before proceeding",
                ),
                other => other,
            })?;

        if auth.user_id != identity.user_id {
            return Err(LatchkeyError::bad_request(
                "the token's auth_id and user_id are not associated",
            ));
        }

        let token = token::issue_access_token(
            auth.id,
            auth.user_id,
            self.config.access_token_lifetime_secs,
            &self.config,
        )?;
        debug!(auth_id = %auth.id, "Token renewed");
        Ok(token)
    }

    /// Close the session the caller is authenticated with.
    ///
    /// Signing out of a session that no longer exists succeeds.
    pub async fn sign_out(&self, identity: AuthIdentity) -> LatchkeyResult<()> {
        if identity.is_empty() {
            return Err(LatchkeyError::Internal(
                "request carries no authenticated identity".into(),
            ));
        }

        let tx = self.tx_manager.begin();
        let result = match self.with_transaction(&tx).auth_repo.delete(identity.auth_id).await {
            Err(LatchkeyError::NotFound { .. }) => {
                debug!(auth_id = %identity.auth_id, "Session already closed");
                Ok(())
            }
            other => other,
        };
        self.finish(tx, result).await?;

        info!(user_id = %identity.user_id, "User signed out");
        Ok(())
    }

    /// Replace the password of the login owned by `input.id`.
    pub async fn modify_password(&self, input: ModifyPasswordInput) -> LatchkeyResult<()> {
        let user_id = self.validator.validate_id("id", &input.id)?;
        self.validator.validate_passwords(&input.passwords)?;

        let login = self.login_repo.get_by_user_id(user_id).await?;

        if let Err(e) = self
            .hasher
            .verify(&login.password_hash, &input.passwords.current_password)
        {
            warn!(login_id = %login.id, "Password change rejected: {e}");
            return Err(e.into());
        }

        if input.passwords.new_password == input.passwords.current_password {
            return Err(LatchkeyError::bad_request(
                "the new password must be different from the current one",
            ));
        }

        let password_hash = self.hasher.hash(&input.passwords.new_password)?;

        let tx = self.tx_manager.begin();
        let result = self
            .with_transaction(&tx)
            .login_repo
            .update(
                login.id,
                UpdateLogin {
                    password_hash: Some(password_hash),
                },
            )
            .await;
        self.finish(tx, result).await?;

        info!(login_id = %login.id, "Password modified");
        Ok(())
    }

    pub async fn list_users(&self, pagination: Pagination) -> LatchkeyResult<PaginatedResult<User>> {
        self.user_repo.list(pagination).await
    }
}
