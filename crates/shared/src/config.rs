//! Application configuration management.

use serde::Deserialize;

pub use config::ConfigError;

/// Decimal places the store keeps for journal amounts (`NUMERIC(19, 4)`).
pub const MAX_CURRENCY_SCALE: u32 = 4;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Decimal places of the smallest currency unit. Line amounts are rounded
    /// to this scale before the balance check.
    #[serde(default = "default_currency_scale")]
    pub currency_scale: u32,
    /// Code-prefix classification rules. Empty means the built-in table.
    #[serde(default)]
    pub classification_rules: Vec<ClassificationRuleConfig>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency_scale: default_currency_scale(),
            classification_rules: Vec::new(),
        }
    }
}

fn default_currency_scale() -> u32 {
    2
}

impl LedgerConfig {
    /// Rejects settings the store cannot honour.
    ///
    /// # Errors
    ///
    /// Returns an error if `currency_scale` exceeds [`MAX_CURRENCY_SCALE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.currency_scale > MAX_CURRENCY_SCALE {
            return Err(ConfigError::Message(format!(
                "ledger.currency_scale {} exceeds the stored scale of {MAX_CURRENCY_SCALE}",
                self.currency_scale
            )));
        }
        Ok(())
    }
}

/// One `code_prefix -> bucket` row of the statement classification table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClassificationRuleConfig {
    /// Account code prefix, e.g. `"1-10"`.
    pub code_prefix: String,
    /// Bucket name in snake case, e.g. `"cash"` or `"current_liability"`.
    pub bucket: String,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones: `config/default.toml`,
    /// `config/{RUN_MODE}.toml`, then `KOPERASI__SECTION__KEY` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KOPERASI").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.ledger.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("KOPERASI__DATABASE__URL", Some("postgres://localhost/koperasi")),
                ("KOPERASI__SERVER__PORT", Some("9090")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/koperasi");
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.ledger.currency_scale, 2);
                assert!(config.ledger.classification_rules.is_empty());
            },
        );
    }

    #[test]
    fn test_currency_scale_override() {
        temp_env::with_vars(
            [
                ("KOPERASI__DATABASE__URL", Some("postgres://localhost/koperasi")),
                ("KOPERASI__LEDGER__CURRENCY_SCALE", Some("0")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.currency_scale, 0);
            },
        );
    }

    #[test]
    fn test_currency_scale_beyond_store_is_rejected() {
        temp_env::with_vars(
            [
                ("KOPERASI__DATABASE__URL", Some("postgres://localhost/koperasi")),
                ("KOPERASI__LEDGER__CURRENCY_SCALE", Some("6")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let err = AppConfig::load().unwrap_err();
                assert!(err.to_string().contains("currency_scale"));
            },
        );
    }

    #[test]
    fn test_ledger_validate_accepts_store_scale() {
        let at_limit = LedgerConfig {
            currency_scale: MAX_CURRENCY_SCALE,
            ..LedgerConfig::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_fine = LedgerConfig {
            currency_scale: MAX_CURRENCY_SCALE + 1,
            ..LedgerConfig::default()
        };
        assert!(too_fine.validate().is_err());
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("KOPERASI__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_ledger_config_deserializes_rules() {
        let ledger: LedgerConfig = serde_json::from_str(
            r#"{"classification_rules":[{"code_prefix":"1-10","bucket":"cash"}]}"#,
        )
        .unwrap();
        assert_eq!(ledger.currency_scale, 2);
        assert_eq!(
            ledger.classification_rules,
            vec![ClassificationRuleConfig {
                code_prefix: "1-10".into(),
                bucket: "cash".into(),
            }]
        );
    }
}
