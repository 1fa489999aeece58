use ormlink_core::{
    config,
    err::{Context, Result},
};
use ormlink_dialects_base::interface::Dialect;
use ormlink_logging::debug;

pub use ormlink_dialects_native_sqlite::{SqliteDialect, SqliteDialectConfig};
pub use ormlink_dialects_oracle::{OracleDialect, OracleDialectConfig};

/// The built-in dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialects {
    Oracle,
    NativeSqlite,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DialectConfigs {
    Oracle(OracleDialectConfig),
    NativeSqlite(SqliteDialectConfig),
}

impl Dialects {
    pub fn all() -> Vec<Self> {
        vec![Dialects::Oracle, Dialects::NativeSqlite]
    }

    /// Resolves a dialect by name, accepting the names used by common drivers
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_lowercase().as_str() {
            OracleDialect::NAME | "goracle" | "godror" => Dialects::Oracle,
            SqliteDialect::NAME | "sqlite" => Dialects::NativeSqlite,
            _ => return None,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dialects::Oracle => OracleDialect::NAME,
            Dialects::NativeSqlite => SqliteDialect::NAME,
        }
    }

    pub fn parse_options(&self, options: config::Value) -> Result<DialectConfigs> {
        Ok(match self {
            Dialects::Oracle => DialectConfigs::Oracle(OracleDialectConfig::parse(options)?),
            Dialects::NativeSqlite => {
                DialectConfigs::NativeSqlite(SqliteDialectConfig::parse(options)?)
            }
        })
    }

    pub fn create_dialect(options: DialectConfigs) -> Box<dyn Dialect> {
        match options {
            DialectConfigs::Oracle(conf) => Box::new(OracleDialect::new(conf)),
            DialectConfigs::NativeSqlite(conf) => Box::new(SqliteDialect::new(conf)),
        }
    }

    /// Parses the options and creates the dialect
    pub fn build(&self, options: config::Value) -> Result<Box<dyn Dialect>> {
        debug!("Creating dialect {}", self.name());
        let options = self
            .parse_options(options)
            .with_context(|| format!("Invalid options for dialect {}", self.name()))?;

        Ok(Self::create_dialect(options))
    }
}
