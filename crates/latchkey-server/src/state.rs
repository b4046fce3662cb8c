//! Shared application state.

use latchkey_auth::{AuthConfig, AuthService, Authenticator};
use latchkey_db::SurrealTransactionManager;
use latchkey_db::repository::{
    SurrealAuthRepository, SurrealLoginRepository, SurrealUserRepository,
};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;

pub type Service = AuthService<
    SurrealUserRepository<Any>,
    SurrealLoginRepository<Any>,
    SurrealAuthRepository<Any>,
    SurrealTransactionManager<Any>,
>;

/// State shared by every handler. Read-only apart from the storage
/// client behind the repositories.
pub struct AppState {
    pub auth_service: Service,
    pub authenticator: Authenticator<SurrealAuthRepository<Any>>,
}

impl AppState {
    pub fn new(db: Surreal<Any>, auth_config: AuthConfig) -> Self {
        let auth_service = AuthService::new(
            SurrealUserRepository::new(db.clone()),
            SurrealLoginRepository::new(db.clone()),
            SurrealAuthRepository::new(db.clone()),
            SurrealTransactionManager::new(db.clone()),
            auth_config.clone(),
        );
        let authenticator = Authenticator::new(SurrealAuthRepository::new(db), auth_config);

        Self {
            auth_service,
            authenticator,
        }
    }
}
