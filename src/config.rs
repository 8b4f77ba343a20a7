//! Deployment configuration
//!
//! Read once at startup and passed by reference into the router and gateway.
//! Sources, later wins:
//!
//! 1. built-in defaults
//! 2. a JSON file (`Config::load`)
//! 3. environment variables (`apply_env`); empty values are ignored
//!
//! | Variable                               | Field                |
//! |----------------------------------------|----------------------|
//! | `ZOOKEEPER_QUORUM`                     | `zookeeper_quorum`   |
//! | `ZOOKEEPER_PORT`                       | `zookeeper_port`     |
//! | `ZOOKEEPER_PARENT`                     | `zookeeper_parent`   |
//! | `FAMILY`                               | `family`             |
//! | `COLUMN`                               | `column`             |
//! | `TABLE`                                | `default_table`      |
//! | `TABLE_PER_TOPIC`                      | `table_per_topic`    |
//! | `CLEAR_BATCH_SIZE`                     | `clear_batch_size`   |

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, Event};
use crate::store::{Column, DEFAULT_CLEAR_BATCH_SIZE};
use crate::table::TableNameResolver;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Store coordinates and the column/table this deployment addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// ZooKeeper quorum host(s) of the store cluster
    pub zookeeper_quorum: String,
    /// ZooKeeper client port
    pub zookeeper_port: u16,
    /// Root znode of the store cluster
    pub zookeeper_parent: String,
    /// Rows deleted per call while clearing a column
    pub clear_batch_size: usize,
    /// Column family read and cleared
    pub family: String,
    /// Column qualifier read and cleared
    pub column: String,
    /// Table used when topics do not select one
    pub default_table: String,
    /// Derive the table from every topic, regardless of the request flag
    pub table_per_topic: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            zookeeper_quorum: "zookeeper".to_string(),
            zookeeper_port: 2181,
            zookeeper_parent: "/hbase".to_string(),
            clear_batch_size: DEFAULT_CLEAR_BATCH_SIZE,
            family: "cf".to_string(),
            column: "record".to_string(),
            default_table: "data".to_string(),
            table_per_topic: false,
        }
    }
}

impl Config {
    /// Load from a JSON file, overlay the environment and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let mut config = Self::read_file(path)?;
        config.apply_env();
        config.validate()?;
        config.log_loaded();
        Ok(config)
    }

    /// Parse a JSON file; missing fields take their defaults.
    pub fn read_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Defaults overlaid with the environment, validated.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Config::default();
        config.apply_env();
        config.validate()?;
        config.log_loaded();
        Ok(config)
    }

    /// Overlay process environment variables.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Overlay variables from `lookup`. Empty values are ignored and
    /// unparseable numbers keep the current value.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        if let Some(v) = get("ZOOKEEPER_QUORUM") {
            self.zookeeper_quorum = v;
        }
        if let Some(v) = get("ZOOKEEPER_PORT").and_then(|v| v.parse().ok()) {
            self.zookeeper_port = v;
        }
        if let Some(v) = get("ZOOKEEPER_PARENT") {
            self.zookeeper_parent = v;
        }
        if let Some(v) = get("CLEAR_BATCH_SIZE").and_then(|v| v.parse().ok()) {
            self.clear_batch_size = v;
        }
        if let Some(v) = get("FAMILY") {
            self.family = v;
        }
        if let Some(v) = get("COLUMN") {
            self.column = v;
        }
        if let Some(v) = get("TABLE") {
            self.default_table = v;
        }
        if let Some(v) = get("TABLE_PER_TOPIC").and_then(|v| parse_flag(&v)) {
            self.table_per_topic = v;
        }
    }

    /// Reject values the store would refuse.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.family.is_empty() {
            return Err(ConfigError::Invalid("family must not be empty".to_string()));
        }
        if self.column.is_empty() {
            return Err(ConfigError::Invalid("column must not be empty".to_string()));
        }
        if self.default_table.is_empty() {
            return Err(ConfigError::Invalid("default_table must not be empty".to_string()));
        }
        if self.zookeeper_port == 0 {
            return Err(ConfigError::Invalid("zookeeper_port must be > 0".to_string()));
        }
        if self.clear_batch_size == 0 {
            return Err(ConfigError::Invalid("clear_batch_size must be > 0".to_string()));
        }
        Ok(())
    }

    /// The (family, qualifier) pair this deployment addresses.
    pub fn data_column(&self) -> Column {
        Column::new(self.family.as_bytes(), self.column.as_bytes())
    }

    pub fn table_resolver(&self) -> TableNameResolver {
        TableNameResolver::new(&self.default_table, self.table_per_topic)
    }

    /// `host:port/parent`, for logs.
    pub fn store_endpoint(&self) -> String {
        format!(
            "{}:{}{}",
            self.zookeeper_quorum, self.zookeeper_port, self.zookeeper_parent
        )
    }

    fn log_loaded(&self) {
        let per_topic = self.table_per_topic.to_string();
        log_event(
            Event::ConfigLoaded,
            &[
                ("store_endpoint", &self.store_endpoint()),
                ("hbase_family", &self.family),
                ("hbase_column", &self.column),
                ("default_table", &self.default_table),
                ("table_per_topic", &per_topic),
            ],
        );
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
