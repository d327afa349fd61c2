//! Configuration types and parsing for tidemark.yml
//!
//! A [`Config`] is loaded and validated once at start-up and then handed by
//! value to the platform constructors. Nothing mutates it afterwards.

use crate::error::{CoreError, CoreResult};
use crate::sql_utils::is_plain_identifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Run configuration from tidemark.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Target database platform
    pub platform: PlatformKind,

    /// Connection settings for the target database
    pub connection: ConnectionConfig,

    /// Ledger table placement
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Database platform selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// Microsoft SQL Server
    SqlServer,
    /// DuckDB
    DuckDb,
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformKind::SqlServer => write!(f, "sqlserver"),
            PlatformKind::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Server host name
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port; the platform default is used when absent
    #[serde(default)]
    pub port: Option<u16>,

    /// Database (catalog) the ledger lives in
    pub database: String,

    /// Database file for file-based engines, or `:memory:`
    #[serde(default = "default_path")]
    pub path: String,

    /// Login name for SQL authentication
    #[serde(default)]
    pub username: Option<String>,

    /// Password for SQL authentication
    #[serde(default)]
    pub password: Option<String>,

    /// Accept the server certificate without validation
    #[serde(default)]
    pub trust_cert: bool,
}

impl ConnectionConfig {
    /// Settings for `database` on `host` with every other field defaulted.
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            database: database.into(),
            path: default_path(),
            username: None,
            password: None,
            trust_cert: false,
        }
    }

    /// Same settings, pointed at a file-based database at `path`.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Same settings, pointed at a different catalog.
    ///
    /// Used to derive the administrative connection from the run connection.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..self.clone()
        }
    }

    /// Whether `path` names an in-memory database.
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_path() -> String {
    ":memory:".to_string()
}

/// Ledger table placement; absent fields fall back to platform defaults
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Schema holding the ledger table
    #[serde(default)]
    pub schema: Option<String>,

    /// Ledger table name
    #[serde(default)]
    pub table: Option<String>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!(
            "Loaded {} config for database '{}' from {}",
            config.platform,
            config.connection.database,
            path.display()
        );
        Ok(config)
    }

    /// Load configuration from a directory (looks for tidemark.yml or tidemark.yaml)
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("tidemark.yml");
        let yaml_path = dir.join("tidemark.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.connection.database.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "connection.database cannot be empty".to_string(),
            });
        }

        let names = [
            ("connection.database", Some(&self.connection.database)),
            ("ledger.schema", self.ledger.schema.as_ref()),
            ("ledger.table", self.ledger.table.as_ref()),
        ];
        for (field, value) in names {
            if let Some(value) = value {
                if !is_plain_identifier(value) {
                    return Err(CoreError::ConfigInvalid {
                        message: format!(
                            "{field} '{value}' must contain only ASCII letters, digits and '_', and must not start with a digit"
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
