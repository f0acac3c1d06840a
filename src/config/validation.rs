//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, tick offset >= 1)
//! - Check that the wallet seed derives the configured source identity
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::blockchain::identity::{IdentityScheme, QubicScheme};
use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("node.rpc_url: {0}")]
    InvalidNodeUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("wallet.source_identity: {0}")]
    InvalidSourceIdentity(String),

    #[error("wallet.seed: {0}")]
    InvalidSeed(String),
}

/// Validate a loaded configuration, collecting every error.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "server.bind_address", &config.server.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    match url::Url::parse(&config.node.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidNodeUrl(format!(
            "unsupported scheme '{}'",
            url.scheme()
        ))),
        Err(e) => errors.push(ValidationError::InvalidNodeUrl(e.to_string())),
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("server.request_timeout_secs"));
    }
    if config.server.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("server.max_body_bytes"));
    }
    if config.node.rpc_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("node.rpc_timeout_secs"));
    }
    if config.pipeline.tick_offset == 0 {
        errors.push(ValidationError::ZeroValue("pipeline.tick_offset"));
    }

    let scheme = QubicScheme;
    let source = match scheme.decode_identity(&config.wallet.source_identity) {
        Ok(key) => Some(key),
        Err(e) => {
            errors.push(ValidationError::InvalidSourceIdentity(e.to_string()));
            None
        }
    };

    match &config.wallet.seed {
        None => errors.push(ValidationError::InvalidSeed("not set".into())),
        Some(seed) => match scheme.public_key_from_seed(seed) {
            Ok(derived) => {
                if source.is_some_and(|expected| expected != derived) {
                    errors.push(ValidationError::InvalidSeed(
                        "does not derive wallet.source_identity".into(),
                    ));
                }
            }
            Err(e) => errors.push(ValidationError::InvalidSeed(e.to_string())),
        },
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::identity::SeedPhrase;

    const SEED: &str = "qxotemickgexwfmrdniukihtuhwmvotnuwtyzfrqmchrqoljndjnetv";
    const IDENTITY: &str = "FDVORCTKJZVEBFYUXRVUHMPXLMADKSQKAOXLEXUASDGNXXGSXDIACIGHPYSF";
    const OTHER: &str = "BZBQFLLBNCXEMGLOBHUVFTLUPLVCPQUASSILFABOFFBCADQSSUPNWLZBQEXK";

    fn valid_config() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.wallet.source_identity = IDENTITY.to_string();
        config.wallet.seed = Some(SeedPhrase::new(SEED));
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(validate_config(&valid_config()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = valid_config();
        config.server.bind_address = "not-an-address".into();
        config.node.rpc_url = "ftp://node".into();
        config.node.rpc_timeout_secs = 0;
        config.pipeline.tick_offset = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroValue("pipeline.tick_offset")));
        assert!(errors.contains(&ValidationError::ZeroValue("node.rpc_timeout_secs")));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidNodeUrl(msg) if msg.contains("ftp"))));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid_config();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors.as_slice(),
            [ValidationError::InvalidAddress { field: "observability.metrics_address", .. }]
        ));
    }

    #[test]
    fn test_wallet_checks() {
        let mut config = valid_config();
        config.wallet.seed = None;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidSeed("not set".into())]
        );

        let mut config = valid_config();
        config.wallet.source_identity = OTHER.into();
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidSeed(
                "does not derive wallet.source_identity".into()
            )]
        );

        let mut config = valid_config();
        config.wallet.source_identity = "SHORT".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors.as_slice(), [ValidationError::InvalidSourceIdentity(_)]));
    }
}
