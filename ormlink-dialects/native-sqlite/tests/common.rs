#![allow(dead_code)]

use ormlink_dialects_base::common::{
    query::{query_count, Query},
    sequence::SequenceStoreConfig,
};
use ormlink_dialects_native_sqlite::{
    SqliteConnection, SqliteConnectionConfig, SqliteConnectionUnpool, SqliteDialect,
    SqliteDialectConfig,
};
use tempfile::TempDir;

/// A database file which is removed when dropped
pub struct TestDb {
    _dir: TempDir,
    pub conf: SqliteConnectionConfig,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");

        Self {
            conf: SqliteConnectionConfig::new(path.to_str().unwrap()),
            _dir: dir,
        }
    }

    pub fn connect(&self) -> SqliteConnection {
        SqliteConnection::open(&self.conf).unwrap()
    }

    pub fn pool(&self) -> SqliteConnectionUnpool {
        SqliteConnectionUnpool::new(self.conf.clone())
    }
}

pub fn connect_to_memory() -> SqliteConnection {
    SqliteConnection::open(&SqliteConnectionConfig::new(":memory:")).unwrap()
}

/// A dialect which assigns keys from the default sequence store
pub fn sequenced_dialect() -> SqliteDialect {
    SqliteDialect::new(SqliteDialectConfig {
        sequence_store: Some(SequenceStoreConfig::default()),
    })
}

pub fn count(con: &mut SqliteConnection, sql: &str) -> u64 {
    query_count(con, Query::sql(sql)).unwrap()
}
