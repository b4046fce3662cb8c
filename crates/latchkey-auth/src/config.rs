//! Authentication settings.

/// Keys, token lifetime and password policy used by the auth layer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Ed25519 signing key, PKCS#8 PEM.
    pub jwt_private_key_pem: String,
    /// Ed25519 verification key, SPKI PEM.
    pub jwt_public_key_pem: String,
    /// Seconds a freshly issued token stays valid.
    pub access_token_lifetime_secs: u64,
    /// Value of the `iss` claim; tokens from other issuers are refused.
    pub jwt_issuer: String,
    /// Server-side secret mixed into every password before hashing.
    pub pepper: Option<String>,
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_private_key_pem: String::new(),
            jwt_public_key_pem: String::new(),
            access_token_lifetime_secs: 15 * 60,
            jwt_issuer: "latchkey".into(),
            pepper: None,
            min_password_length: 8,
        }
    }
}
