//! Domain models for Latchkey.
//!
//! Identifiers are assigned by the repository that persists the
//! entity, never by the model itself.

pub mod auth;
pub mod login;
pub mod user;
