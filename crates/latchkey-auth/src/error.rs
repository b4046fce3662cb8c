//! Authentication error types.

use latchkey_core::error::LatchkeyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token has expired")]
    TokenExpired,

    #[error("invalid token: {0}")]
    TokenInvalid(String),

    #[error("cryptography error: {0}")]
    Crypto(String),
}

impl From<AuthError> for LatchkeyError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::TokenExpired
            | AuthError::TokenInvalid(_) => LatchkeyError::Unauthorized {
                reason: err.to_string(),
            },
            AuthError::Crypto(msg) => LatchkeyError::Crypto(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_failures_are_unauthorized() {
        for err in [
            AuthError::InvalidCredentials,
            AuthError::TokenExpired,
            AuthError::TokenInvalid("InvalidSignature".into()),
        ] {
            assert!(matches!(
                LatchkeyError::from(err),
                LatchkeyError::Unauthorized { .. }
            ));
        }
    }

    #[test]
    fn crypto_failures_keep_their_message() {
        let err = LatchkeyError::from(AuthError::Crypto("bad private key".into()));
        assert!(matches!(err, LatchkeyError::Crypto(ref m) if m == "bad private key"));
    }
}
