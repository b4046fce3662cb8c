//! Server configuration loaded from `LATCHKEY_*` environment variables.

use std::env;
use std::fs;

use latchkey_auth::AuthConfig;
use latchkey_db::DbConfig;

/// Longest accepted access token lifetime: one year.
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (0.0.0.0 for LAN, 127.0.0.1 for localhost)
    pub bind_addr: String,
    /// Port to listen on
    pub port: u16,
    pub db: DbConfig,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment, after reading
    /// a `.env` file if one is present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_defaults = DbConfig::default();
        let auth_defaults = AuthConfig::default();

        let db = DbConfig {
            url: var("LATCHKEY_DB_URL").unwrap_or(db_defaults.url),
            namespace: var("LATCHKEY_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: var("LATCHKEY_DB_DATABASE").unwrap_or(db_defaults.database),
            username: optional(&var, "LATCHKEY_DB_USERNAME", db_defaults.username),
            password: optional(&var, "LATCHKEY_DB_PASSWORD", db_defaults.password),
        };

        let auth = AuthConfig {
            jwt_private_key_pem: pem(&var, "LATCHKEY_JWT_PRIVATE_KEY")?,
            jwt_public_key_pem: pem(&var, "LATCHKEY_JWT_PUBLIC_KEY")?,
            access_token_lifetime_secs: parse_or(
                &var,
                "LATCHKEY_TOKEN_LIFETIME_SECS",
                auth_defaults.access_token_lifetime_secs,
            )?,
            jwt_issuer: var("LATCHKEY_JWT_ISSUER").unwrap_or(auth_defaults.jwt_issuer),
            pepper: var("LATCHKEY_PASSWORD_PEPPER").filter(|p| !p.is_empty()),
            min_password_length: parse_or(
                &var,
                "LATCHKEY_MIN_PASSWORD_LENGTH",
                auth_defaults.min_password_length,
            )?,
        };

        if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&auth.access_token_lifetime_secs) {
            return Err(ConfigError::InvalidValue(format!(
                "LATCHKEY_TOKEN_LIFETIME_SECS must be between 1 and {MAX_TOKEN_LIFETIME_SECS}"
            )));
        }

        Ok(Self {
            bind_addr: var("LATCHKEY_BIND_ADDR").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("LATCHKEY_PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            db,
            auth,
        })
    }

    /// Get the full bind address (addr:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

/// Read a PEM key either inline from `name` or from the file named by
/// `{name}_FILE`.
fn pem(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<String, ConfigError> {
    let file_var = format!("{name}_FILE");
    if let Some(path) = var(&file_var) {
        return fs::read_to_string(&path)
            .map_err(|e| ConfigError::InvalidValue(format!("{file_var}: cannot read {path}: {e}")));
    }
    var(name)
        .map(|pem| pem.replace("\\n", "\n"))
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

/// An empty value clears the setting.
fn optional(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: Option<String>,
) -> Option<String> {
    match var(name) {
        Some(value) if value.is_empty() => None,
        Some(value) => Some(value),
        None => default,
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match var(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{name}: {raw}"))),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const KEYS: [(&str, &str); 2] = [
        ("LATCHKEY_JWT_PRIVATE_KEY", "private"),
        ("LATCHKEY_JWT_PUBLIC_KEY", "public"),
    ];

    #[test]
    fn defaults_apply_when_only_keys_are_set() {
        let config = ServerConfig::from_lookup(lookup(&KEYS)).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.db.url, "ws://127.0.0.1:8000");
        assert_eq!(config.auth.jwt_private_key_pem, "private");
        assert_eq!(config.auth.access_token_lifetime_secs, 900);
        assert_eq!(config.auth.min_password_length, 8);
        assert!(config.auth.pepper.is_none());
    }

    #[test]
    fn overrides_are_read() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("LATCHKEY_PORT", "9000"),
            ("LATCHKEY_DB_URL", "mem://"),
            ("LATCHKEY_TOKEN_LIFETIME_SECS", "60"),
            ("LATCHKEY_PASSWORD_PEPPER", "pepper"),
        ]);
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.db.url, "mem://");
        assert_eq!(config.auth.access_token_lifetime_secs, 60);
        assert_eq!(config.auth.pepper.as_deref(), Some("pepper"));
    }

    #[test]
    fn empty_db_credentials_disable_sign_in() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([("LATCHKEY_DB_USERNAME", ""), ("LATCHKEY_DB_PASSWORD", "")]);
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();

        assert!(config.db.username.is_none());
        assert!(config.db.password.is_none());
    }

    #[test]
    fn escaped_newlines_in_keys_are_expanded() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("LATCHKEY_JWT_PRIVATE_KEY", "-----BEGIN-----\\nabc\\n-----END-----"),
            ("LATCHKEY_JWT_PUBLIC_KEY", "public"),
        ]))
        .unwrap();
        assert_eq!(config.auth.jwt_private_key_pem, "-----BEGIN-----\nabc\n-----END-----");
    }

    #[test]
    fn missing_key_is_reported() {
        let err = ServerConfig::from_lookup(lookup(&[("LATCHKEY_JWT_PUBLIC_KEY", "public")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref v) if v == "LATCHKEY_JWT_PRIVATE_KEY"));
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("LATCHKEY_PORT", "http"));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidPort)
        ));

        let mut pairs = KEYS.to_vec();
        pairs.push(("LATCHKEY_TOKEN_LIFETIME_SECS", "0"));
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&pairs)),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn token_lifetime_is_capped() {
        let too_long = (MAX_TOKEN_LIFETIME_SECS + 1).to_string();
        let huge = u64::MAX.to_string();
        for raw in [too_long.as_str(), huge.as_str()] {
            let mut pairs = KEYS.to_vec();
            pairs.push(("LATCHKEY_TOKEN_LIFETIME_SECS", raw));
            assert!(matches!(
                ServerConfig::from_lookup(lookup(&pairs)),
                Err(ConfigError::InvalidValue(_))
            ));
        }

        let max = MAX_TOKEN_LIFETIME_SECS.to_string();
        let mut pairs = KEYS.to_vec();
        pairs.push(("LATCHKEY_TOKEN_LIFETIME_SECS", max.as_str()));
        let config = ServerConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(config.auth.access_token_lifetime_secs, MAX_TOKEN_LIFETIME_SECS);
    }
}
