use ormlink_core::{
    config,
    err::{Context, Result},
};
use ormlink_dialects_base::common::sequence::SequenceStoreConfig;
use serde::{Deserialize, Serialize};

/// The Oracle dialect config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleDialectConfig {
    /// The store backing pseudo sequences
    #[serde(default)]
    pub sequence_store: SequenceStoreConfig,
    /// How row limits are expressed in queries
    #[serde(default)]
    pub row_limit: RowLimitMode,
    /// Strings longer than this are mapped to CLOB
    #[serde(default = "default_max_varchar_length")]
    pub max_varchar_length: u32,
}

fn default_max_varchar_length() -> u32 {
    4000
}

impl Default for OracleDialectConfig {
    fn default() -> Self {
        Self {
            sequence_store: SequenceStoreConfig::default(),
            row_limit: RowLimitMode::default(),
            max_varchar_length: default_max_varchar_length(),
        }
    }
}

impl OracleDialectConfig {
    pub fn parse(options: config::Value) -> Result<Self> {
        config::parse_options::<Self>(options).context("Failed to parse oracle dialect options")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RowLimitMode {
    /// Limits are applied as a ROWNUM predicate in the WHERE clause
    #[default]
    RowNum,
    /// Limits are applied with OFFSET .. FETCH FIRST, requires Oracle 12c+
    FetchFirst,
}
