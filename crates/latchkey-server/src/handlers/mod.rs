//! HTTP handlers.

pub mod auth;
pub mod health;
pub mod users;

pub use auth::{modify_password, refresh_token, sign_in, sign_out, sign_up};
pub use health::status;
pub use users::list_users;
