//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! All errors are collected, not just the first.

use alloy::primitives::Address;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path are required",
            ));
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::new("auth.jwt_secret", "must not be empty"));
    }

    if config.guilds.proposal_window_hours == 0 {
        errors.push(ValidationError::new("guilds.proposal_window_hours", "must be > 0"));
    }
    if !(0.0..=1.0).contains(&config.guilds.proposal_quorum) {
        errors.push(ValidationError::new(
            "guilds.proposal_quorum",
            "must be between 0 and 1",
        ));
    }
    if config.guilds.chat_buffer == 0 {
        errors.push(ValidationError::new("guilds.chat_buffer", "must be > 0"));
    }

    if config.admin.enabled {
        let key = config.admin.api_key.trim();
        if key.is_empty() || key == "CHANGE_ME_IN_PRODUCTION" {
            errors.push(ValidationError::new(
                "admin.api_key",
                "placeholder key must be replaced when admin is enabled",
            ));
        }
    }

    let chain = &config.blockchain;
    for url in std::iter::once(&chain.rpc_url).chain(chain.failover_urls.iter()) {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.rpc_url",
                format!("invalid URL '{}'", url),
            ));
        }
    }
    if chain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be > 0"));
    }
    if chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be > 0"));
    }
    if chain.streak_contract.parse::<Address>().is_err() {
        errors.push(ValidationError::new(
            "blockchain.streak_contract",
            "not an address",
        ));
    }

    // Checked even when disabled: `guildhq-blessings --daemon` reads it too.
    if config.prayer.interval_secs == 0 {
        errors.push(ValidationError::new("prayer.interval_secs", "must be > 0"));
    }
    for (manager, scholars) in &config.prayer.scholars {
        if manager.parse::<Address>().is_err() {
            errors.push(ValidationError::new(
                "prayer.scholars",
                format!("manager '{}' is not an address", manager),
            ));
        }
        for scholar in scholars {
            if scholar.parse::<Address>().is_err() {
                errors.push(ValidationError::new(
                    "prayer.scholars",
                    format!("scholar '{}' is not an address", scholar),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.timeouts.request_secs = 0;
        config.guilds.proposal_quorum = 1.5;
        config.blockchain.streak_contract = "0x123".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "timeouts.request_secs",
                "guilds.proposal_quorum",
                "blockchain.streak_contract",
            ]
        );
    }

    #[test]
    fn test_admin_placeholder_rejected_when_enabled() {
        let mut config = AppConfig::default();
        config.admin.enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "admin.api_key");

        config.admin.api_key = "s3cret".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_prayer_interval_rejected_even_when_disabled() {
        let mut config = AppConfig::default();
        config.prayer.interval_secs = 0;
        assert!(!config.prayer.enabled);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "prayer.interval_secs");
    }

    #[test]
    fn test_static_scholar_addresses_checked() {
        let mut config = AppConfig::default();
        config.prayer.scholars.insert(
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266".into(),
            vec!["0x4d...".into()],
        );
        let errors = validate_config(&config).unwrap_err();
        assert!(errors[0].message.contains("0x4d..."));
    }
}
