//! Request authentication: bearer token decoding plus the session
//! existence check that makes sign-out effective.
//!
//! Tokens stay cryptographically valid until they expire. A token whose
//! session row is gone is rejected here, which is the only revocation
//! mechanism the system has.

use latchkey_core::error::{LatchkeyError, LatchkeyResult};
use latchkey_core::models::auth::AuthIdentity;
use latchkey_core::repository::AuthRepository;
use tracing::{debug, error};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Validates `Authorization` header values against the token codec and
/// the session store. Holds no per-request state and never writes.
#[derive(Clone)]
pub struct Authenticator<A> {
    auth_repo: A,
    config: AuthConfig,
}

impl<A: AuthRepository> Authenticator<A> {
    pub fn new(auth_repo: A, config: AuthConfig) -> Self {
        Self { auth_repo, config }
    }

    /// Authenticate a request given the raw value of its
    /// `Authorization` header, if any.
    pub async fn authenticate(&self, header: Option<&str>) -> LatchkeyResult<AuthIdentity> {
        let header = match header {
            Some(h) if !h.is_empty() => h,
            _ => {
                return Err(LatchkeyError::bad_request(
                    "the auth header must be informed along with the token",
                ));
            }
        };

        let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
            [scheme, token] if scheme.eq_ignore_ascii_case("Bearer") => *token,
            _ => {
                return Err(LatchkeyError::bad_request(
                    "the token must be associated with the auth header",
                ));
            }
        };

        let claims = token::validate_access_token(token, &self.config).map_err(|e| match e {
            AuthError::Crypto(msg) => {
                error!("Token verification key unusable: {msg}");
                LatchkeyError::Internal(msg)
            }
            other => LatchkeyError::unauthorized(other.to_string()),
        })?;

        // The signature is ours, so malformed ids point at a bug on
        // the issuing side rather than at the client.
        let identity = claims
            .identity()
            .map_err(|e| LatchkeyError::Internal(e.to_string()))?;

        let auth = match self.auth_repo.get_by_id(identity.auth_id).await {
            Ok(auth) => auth,
            Err(LatchkeyError::NotFound { .. }) => {
                debug!(auth_id = %identity.auth_id, "Token refers to a closed session");
                return Err(LatchkeyError::bad_request(
                    "you are not logged in, then perform a login to get a token before proceeding",
                ));
            }
            Err(e) => {
                error!(auth_id = %identity.auth_id, "Session lookup failed: {e}");
                return Err(LatchkeyError::Internal(e.to_string()));
            }
        };

        if auth.user_id != identity.user_id {
            return Err(LatchkeyError::bad_request(
                "the token's auth_id and user_id are not associated",
            ));
        }

        Ok(identity)
    }
}
