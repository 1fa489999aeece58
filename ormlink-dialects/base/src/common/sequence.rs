use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use once_cell::sync::OnceCell;
use ormlink_core::{
    data::{DataType, DataValue, StringOptions},
    err::{Context, Result},
};
use ormlink_logging::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::interface::{with_transaction, Connection, Dialect};

use super::{
    query::Query,
    schema::{FieldSchema, TableSchema, TAG_AUTO_INCREMENT},
};

pub const DEFAULT_STORE_TABLE: &str = "SEQUENCE_STORES";
pub const COLUMN_TABLE_NAME: &str = "TABLE_NAME";
pub const COLUMN_SEQUENCE: &str = "SEQUENCE";

/// Options for the table backing pseudo sequences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceStoreConfig {
    /// The name of the counter table
    #[serde(default = "default_store_table")]
    pub table_name: String,
}

fn default_store_table() -> String {
    DEFAULT_STORE_TABLE.into()
}

impl Default for SequenceStoreConfig {
    fn default() -> Self {
        Self {
            table_name: default_store_table(),
        }
    }
}

/// A row of the sequence store
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceCounter {
    /// The quoted table identifier the counter belongs to
    pub table_identifier: String,
    /// The last value handed out
    pub current_value: u64,
}

impl SequenceCounter {
    pub fn schema(store_table: &str) -> TableSchema {
        TableSchema::new(
            store_table,
            vec![
                FieldSchema::new(
                    COLUMN_TABLE_NAME,
                    DataType::Utf8String(StringOptions::new(Some(255))),
                )
                .with_tags("PRIMARY_KEY"),
                FieldSchema::new(COLUMN_SEQUENCE, DataType::Int64).with_tags("NOT NULL"),
            ],
        )
    }
}

/// Allocates auto-increment values for databases without identity columns.
///
/// One counter row per table is kept in the store table. Every allocation
/// increments the row and reads it back in a single transaction, so values
/// are unique across sessions sharing the store. Allocations for the same
/// table from this process are additionally serialised by a per-table lock.
#[derive(Debug)]
pub struct PseudoSequenceAllocator {
    conf: SequenceStoreConfig,
    store_ready: OnceCell<()>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PseudoSequenceAllocator {
    pub fn new(conf: SequenceStoreConfig) -> Self {
        Self {
            conf,
            store_ready: OnceCell::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn conf(&self) -> &SequenceStoreConfig {
        &self.conf
    }

    /// Returns the next value for the table if the marker requests a pseudo
    /// sequence. Any other marker names a native sequence, for which `None`
    /// is returned without touching the database.
    pub fn allocate_next(
        &self,
        dialect: &dyn Dialect,
        con: &mut dyn Connection,
        marker: &str,
        table_identifier: &str,
    ) -> Result<Option<u64>> {
        if marker != TAG_AUTO_INCREMENT {
            return Ok(None);
        }

        warn!(
            "Table {} uses a pseudo sequence stored in {}, this is slow and \
            should be replaced with a native sequence",
            table_identifier, self.conf.table_name
        );

        self.ensure_store(dialect, con)?;

        // Within a caller's transaction the counter row stays locked by the
        // database until the caller commits, so the local lock adds nothing
        // and could deadlock against it.
        let joined = match con.transaction_manager() {
            Some(tm) => tm.is_in_transaction()?,
            None => false,
        };
        let lock = self.lock_for(table_identifier);
        let _guard = if joined {
            None
        } else {
            Some(lock.lock().unwrap_or_else(PoisonError::into_inner))
        };

        let value = with_transaction(con, |con| self.increment(dialect, con, table_identifier))
            .with_context(|| {
                format!(
                    "Failed to allocate next value of pseudo sequence for {}",
                    table_identifier
                )
            })?;

        debug!("Allocated value {} for {}", value, table_identifier);
        Ok(Some(value))
    }

    /// Creates the store table if it does not exist yet.
    ///
    /// Once the store is known to exist the check is skipped. Losing a
    /// creation race to another session is not an error.
    pub fn ensure_store(&self, dialect: &dyn Dialect, con: &mut dyn Connection) -> Result<()> {
        if self.store_ready.get().is_some() {
            return Ok(());
        }

        // created outside the cell so a session holding the database lock can
        // still create the store while another session waits for that lock
        self.create_store(dialect, con)?;
        let _ = self.store_ready.set(());

        Ok(())
    }

    /// Reads the counter for the table without modifying it
    pub fn current_value(
        &self,
        dialect: &dyn Dialect,
        con: &mut dyn Connection,
        table_identifier: &str,
    ) -> Result<Option<u64>> {
        let query = Query::new(
            format!(
                "SELECT {} FROM {} WHERE {} = {}",
                dialect.quote(COLUMN_SEQUENCE),
                self.store(dialect),
                dialect.quote(COLUMN_TABLE_NAME),
                dialect.bind_var(1)
            ),
            vec![table_identifier.into()],
        );

        match con.query_row(query)?.and_then(|r| r.into_iter().next()) {
            Some(val) => Ok(Some(val.try_into_u64().with_context(|| {
                format!("Invalid sequence value stored for {}", table_identifier)
            })?)),
            None => Ok(None),
        }
    }

    fn create_store(&self, dialect: &dyn Dialect, con: &mut dyn Connection) -> Result<()> {
        let table = &self.conf.table_name;

        if dialect.has_table(con, table)? {
            debug!("Sequence store {} already exists", table);
            return Ok(());
        }

        info!("Creating sequence store {}", table);
        let ddl = dialect.create_table_sql(&SequenceCounter::schema(table))?;

        if let Err(err) = con.execute(Query::sql(ddl)) {
            if dialect.has_table(con, table)? {
                debug!("Sequence store {} was created by another session", table);
                return Ok(());
            }

            return Err(err).with_context(|| format!("Failed to create sequence store {}", table));
        }

        Ok(())
    }

    fn increment(
        &self,
        dialect: &dyn Dialect,
        con: &mut dyn Connection,
        table_identifier: &str,
    ) -> Result<u64> {
        let updated = match self.bump(dialect, con, table_identifier) {
            Ok(updated) => updated,
            Err(err) => {
                if dialect.has_table(con, &self.conf.table_name)? {
                    return Err(err);
                }

                // the store was created in a transaction which was rolled back
                debug!("Sequence store {} is missing, recreating", self.conf.table_name);
                self.create_store(dialect, con)?;
                self.bump(dialect, con, table_identifier)?
            }
        };

        if updated == 0 {
            let insert = Query::new(
                format!(
                    "INSERT INTO {} ({}, {}) VALUES ({}, {})",
                    self.store(dialect),
                    dialect.quote(COLUMN_TABLE_NAME),
                    dialect.quote(COLUMN_SEQUENCE),
                    dialect.bind_var(1),
                    dialect.bind_var(2)
                ),
                vec![table_identifier.into(), DataValue::Int64(1)],
            );

            if let Err(err) = con.execute(insert) {
                // another session inserted the counter first
                debug!(
                    "Failed to insert counter for {}, retrying update: {:?}",
                    table_identifier, err
                );

                if self.bump(dialect, con, table_identifier)? == 0 {
                    return Err(err).context("Failed to initialise sequence counter");
                }
            }
        }

        self.current_value(dialect, con, table_identifier)?
            .with_context(|| format!("Sequence counter for {} is missing", table_identifier))
    }

    fn bump(
        &self,
        dialect: &dyn Dialect,
        con: &mut dyn Connection,
        table_identifier: &str,
    ) -> Result<u64> {
        con.execute(Query::new(
            format!(
                "UPDATE {} SET {} = {} + 1 WHERE {} = {}",
                self.store(dialect),
                dialect.quote(COLUMN_SEQUENCE),
                dialect.quote(COLUMN_SEQUENCE),
                dialect.quote(COLUMN_TABLE_NAME),
                dialect.bind_var(1)
            ),
            vec![table_identifier.into()],
        ))
    }

    fn store(&self, dialect: &dyn Dialect) -> String {
        dialect.quote(&self.conf.table_name)
    }

    fn lock_for(&self, table_identifier: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        Arc::clone(
            locks
                .entry(table_identifier.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

impl Default for PseudoSequenceAllocator {
    fn default() -> Self {
        Self::new(SequenceStoreConfig::default())
    }
}
