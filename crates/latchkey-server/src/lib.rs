//! Latchkey Server: HTTP surface for the user and authentication
//! endpoints.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
