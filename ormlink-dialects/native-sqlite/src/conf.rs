use ormlink_core::{
    config,
    err::{Context, Result},
};
use ormlink_dialects_base::common::sequence::SequenceStoreConfig;
use serde::{Deserialize, Serialize};

/// The connection config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqliteConnectionConfig {
    /// Path to the database file.
    /// Set to ":memory:" for an in-memory db.
    pub path: String,
    /// How long to wait for locks held by other connections
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl SqliteConnectionConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }

    pub fn parse(options: config::Value) -> Result<Self> {
        config::from_value::<Self>(options)
            .context("Failed to parse connection configuration options")
    }
}

/// The sqlite dialect config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SqliteDialectConfig {
    /// Assigns auto-increment keys from a pseudo sequence store rather than
    /// relying on sqlite's rowid allocation
    #[serde(default)]
    pub sequence_store: Option<SequenceStoreConfig>,
}

impl SqliteDialectConfig {
    pub fn parse(options: config::Value) -> Result<Self> {
        config::parse_options::<Self>(options).context("Failed to parse sqlite dialect options")
    }
}
