use std::time::Duration;

use ormlink_core::{
    data::DataValue,
    err::{ensure, Context, Result},
};
use ormlink_dialects_base::{
    common::query::Query,
    interface::{Connection, TransactionManager},
};
use ormlink_logging::{trace, MaxLogLength};
use rusqlite::{params_from_iter, types::Value, OpenFlags};

use crate::{from_sqlite, to_sqlite, SqliteConnectionConfig};

/// Connection to a sqlite database
pub struct SqliteConnection {
    con: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn new(con: rusqlite::Connection) -> Self {
        Self { con }
    }

    /// Opens the database file, creating it if it does not exist
    pub fn open(conf: &SqliteConnectionConfig) -> Result<Self> {
        let con = rusqlite::Connection::open_with_flags(&conf.path, OpenFlags::default())
            .with_context(|| format!("Failed to connect to sqlite database {}", conf.path))?;

        con.busy_timeout(Duration::from_millis(conf.busy_timeout_ms))
            .context("Failed to set busy timeout")?;

        Ok(Self::new(con))
    }

    pub fn con(&self) -> &rusqlite::Connection {
        &self.con
    }

    fn prepare<'a>(&'a self, query: &Query) -> Result<rusqlite::Statement<'a>> {
        trace!(
            "Executing query {} with params {:?}",
            query.sql,
            MaxLogLength::new(Some(256), &query.params)
        );

        let stmt = self
            .con
            .prepare(&query.sql)
            .with_context(|| format!("Failed to prepare query: {}", query.sql))?;

        ensure!(
            stmt.parameter_count() == query.params.len(),
            "Query parameter count mismatch: expected {}, found {}",
            stmt.parameter_count(),
            query.params.len()
        );

        Ok(stmt)
    }
}

impl Connection for SqliteConnection {
    fn execute(&mut self, query: Query) -> Result<u64> {
        let mut stmt = self.prepare(&query)?;
        let params = query.params.into_iter().map(to_sqlite).collect::<Vec<_>>();

        let affected = stmt
            .execute(params_from_iter(params.iter()))
            .with_context(|| format!("Failed to execute query: {}", query.sql))?;

        Ok(affected as u64)
    }

    fn query_row(&mut self, query: Query) -> Result<Option<Vec<DataValue>>> {
        let mut stmt = self.prepare(&query)?;
        let cols = stmt.column_count();
        let params = query.params.into_iter().map(to_sqlite).collect::<Vec<_>>();

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .with_context(|| format!("Failed to execute query: {}", query.sql))?;

        let row = match rows.next().context("Failed to read row")? {
            Some(row) => row,
            None => return Ok(None),
        };

        let values = (0..cols)
            .map(|i| {
                row.get::<_, Value>(i)
                    .map(from_sqlite)
                    .with_context(|| format!("Failed to read column {}", i))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(values))
    }

    fn transaction_manager(&mut self) -> Option<&mut dyn TransactionManager> {
        Some(self)
    }
}

impl TransactionManager for SqliteConnection {
    fn is_in_transaction(&mut self) -> Result<bool> {
        Ok(!self.con.is_autocommit())
    }

    /// Transactions take the write lock up front so concurrent writers wait on
    /// the busy timeout rather than failing when upgrading their lock
    fn begin_transaction(&mut self) -> Result<()> {
        self.con
            .execute("BEGIN IMMEDIATE", [])
            .context("Failed to begin transaction")?;
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        self.con
            .execute("ROLLBACK", [])
            .context("Failed to rollback transaction")?;
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.con
            .execute("COMMIT", [])
            .context("Failed to commit transaction")?;
        Ok(())
    }
}
