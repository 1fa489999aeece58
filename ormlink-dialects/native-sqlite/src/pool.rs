use ormlink_dialects_base::interface::ConnectionPool;
use ormlink_core::err::Result;

use crate::{SqliteConnection, SqliteConnectionConfig};

/// We do not require currently pool connections for sqlite,
/// every acquire opens a new connection to the database file.
#[derive(Debug, Clone)]
pub struct SqliteConnectionUnpool {
    conf: SqliteConnectionConfig,
}

impl SqliteConnectionUnpool {
    pub fn new(conf: SqliteConnectionConfig) -> Self {
        Self { conf }
    }

    pub fn conf(&self) -> &SqliteConnectionConfig {
        &self.conf
    }
}

impl ConnectionPool for SqliteConnectionUnpool {
    type TConnection = SqliteConnection;

    fn acquire(&mut self) -> Result<Self::TConnection> {
        SqliteConnection::open(&self.conf)
    }
}
