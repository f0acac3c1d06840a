//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use crate::blockchain::identity::SeedPhrase;
use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Seed phrase for the source wallet.
pub const SEED_ENV_VAR: &str = "SENDMANY_SEED";
/// Source identity override.
pub const SOURCE_IDENTITY_ENV_VAR: &str = "SENDMANY_SOURCE_IDENTITY";
/// Ledger node URL override.
pub const NODE_URL_ENV_VAR: &str = "SENDMANY_NODE_URL";
/// Bind address override.
pub const BIND_ADDRESS_ENV_VAR: &str = "SENDMANY_BIND_ADDRESS";

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

/// Parse a TOML file without applying overrides or validating.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load the file (or defaults), apply environment overrides, and validate.
pub fn load(path: Option<&Path>) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay values from `lookup` (normally the process environment).
pub fn apply_env_overrides<F>(config: &mut RelayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(seed) = lookup(SEED_ENV_VAR) {
        config.wallet.seed = Some(SeedPhrase::new(seed));
    }
    if let Some(identity) = lookup(SOURCE_IDENTITY_ENV_VAR) {
        config.wallet.source_identity = identity;
    }
    if let Some(url) = lookup(NODE_URL_ENV_VAR) {
        config.node.rpc_url = url;
    }
    if let Some(addr) = lookup(BIND_ADDRESS_ENV_VAR) {
        config.server.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SEED: &str = "qxotemickgexwfmrdniukihtuhwmvotnuwtyzfrqmchrqoljndjnetv";
    const IDENTITY: &str = "FDVORCTKJZVEBFYUXRVUHMPXLMADKSQKAOXLEXUASDGNXXGSXDIACIGHPYSF";

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_from_file() {
        let file = write_config(&format!(
            r#"
            [server]
            bind_address = "127.0.0.1:9000"

            [node]
            rpc_url = "https://node.example:443"

            [wallet]
            source_identity = "{}"
            seed = "{}"
            "#,
            IDENTITY, SEED
        ));

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:9000");
        assert_eq!(config.node.rpc_url, "https://node.example:443");
        assert_eq!(config.wallet.seed.as_ref().map(|s| s.expose_secret()), Some(SEED));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_parse_error() {
        let file = write_config("[server\nbind_address = 1");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/relay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_env_overrides_win() {
        let mut config = RelayConfig::default();
        config.node.rpc_url = "http://file-value".into();

        let env: HashMap<&str, &str> = [
            (SEED_ENV_VAR, SEED),
            (SOURCE_IDENTITY_ENV_VAR, IDENTITY),
            (NODE_URL_ENV_VAR, "http://10.0.0.1:8000"),
        ]
        .into_iter()
        .collect();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.node.rpc_url, "http://10.0.0.1:8000");
        assert_eq!(config.wallet.source_identity, IDENTITY);
        assert_eq!(config.server.bind_address, "0.0.0.0:8000");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validation_error_display_lists_all() {
        let err = ConfigError::Validation(vec![
            ValidationError::ZeroValue("pipeline.tick_offset"),
            ValidationError::InvalidSeed("not set".into()),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: pipeline.tick_offset must be greater than zero, wallet.seed: not set"
        );
    }
}
