//! Latchkey Core: domain models, error types, storage contracts and
//! input validation shared by every crate in the workspace.

pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

pub use error::{LatchkeyError, LatchkeyResult};
