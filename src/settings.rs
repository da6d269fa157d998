//! Runtime settings. Values come from, in order of precedence: command line
//! flags, `FINTRACK_*` environment variables, the TOML config file
//! (`fintrack.toml` by default) and finally the built-in defaults.
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::DEFAULT_BUDGET_LIMIT;

pub const DEFAULT_CONFIG_PATH: &str = "fintrack.toml";
pub const DEFAULT_LEDGER_PATH: &str = "transactions.csv";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the ledger is saved to and loaded from.
    pub ledger_path: PathBuf,
    /// Total expenses above this value raise a budget alert.
    pub budget_limit: f64,
    /// Log level for this crate (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            budget_limit: DEFAULT_BUDGET_LIMIT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings. An explicit `config_path` must exist; the default
    /// config file is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("FINTRACK").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
