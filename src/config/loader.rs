//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the JWT secret.
pub const AUTH_SECRET_ENV_VAR: &str = "GUILDHQ_AUTH_SECRET";
/// Overrides the admin API key.
pub const ADMIN_KEY_ENV_VAR: &str = "GUILDHQ_ADMIN_API_KEY";
/// Overrides the primary RPC URL.
pub const RPC_URL_ENV_VAR: &str = "GUILDHQ_RPC_URL";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse, apply environment overrides, and validate a TOML document.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let mut config: AppConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Load `path` if it exists, otherwise start from defaults (still applying
/// environment overrides and validation).
pub fn load_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::warn!(path = ?path, "Config file not found, using defaults");
        parse_config("")
    }
}

/// Secrets are taken from the environment when present so they never need
/// to live in the config file.
pub fn apply_env_overrides(config: &mut AppConfig) {
    if let Ok(secret) = std::env::var(AUTH_SECRET_ENV_VAR) {
        config.auth.jwt_secret = secret;
    }
    if let Ok(key) = std::env::var(ADMIN_KEY_ENV_VAR) {
        config.admin.api_key = key;
    }
    if let Ok(url) = std::env::var(RPC_URL_ENV_VAR) {
        config.blockchain.rpc_url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [prayer]
            tx_delay_ms = 250

            [prayer.scholars]
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266" = [
                "0x70997970c51812dc3a010c7d01b50e0d17dc79c8",
            ]
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.prayer.tx_delay_ms, 250);
        assert_eq!(config.prayer.scholars.len(), 1);
        // Untouched sections keep their defaults.
        assert_eq!(config.blockchain.chain_id, 2020);
        assert_eq!(config.guilds.proposal_window_hours, 72);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("[listener\nbind_address = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_lists_fields() {
        let err = parse_config("[timeouts]\nrequest_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeouts.request_secs"));
    }
}
