//! Latchkey Auth: password hashing, JWT issuance/validation, session
//! lifecycle and request authentication.

pub mod config;
pub mod error;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

pub use config::AuthConfig;
pub use error::AuthError;
pub use middleware::Authenticator;
pub use password::PasswordHasher;
pub use service::{AuthService, ModifyPasswordInput, SignInInput, SignUpInput};
pub use token::{AccessTokenClaims, ValidatedClaims};
