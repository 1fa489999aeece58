use std::collections::HashMap;

use ormlink_core::{data::DataValue, err::Result};

use crate::interface::{Connection, Dialect};

use super::record::Record;

/// The state of a single write operation as it passes through the callbacks
pub struct Scope<'a> {
    dialect: &'a dyn Dialect,
    con: &'a mut dyn Connection,
    record: &'a mut Record,
    /// Values shared between the callbacks of this operation only
    instance: HashMap<String, DataValue>,
    pub(crate) began_transaction: bool,
    rows_affected: Option<u64>,
}

impl<'a> Scope<'a> {
    pub fn new(dialect: &'a dyn Dialect, con: &'a mut dyn Connection, record: &'a mut Record) -> Self {
        Self {
            dialect,
            con,
            record,
            instance: HashMap::new(),
            began_transaction: false,
            rows_affected: None,
        }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn con(&mut self) -> &mut dyn Connection {
        &mut *self.con
    }

    pub fn record(&self) -> &Record {
        self.record
    }

    /// The table name as it should appear in SQL
    pub fn quoted_table_name(&self) -> String {
        self.dialect.quote(&self.record.table_name)
    }

    pub fn set_column(&mut self, column: &str, value: impl Into<DataValue>) -> Result<()> {
        self.record.set_column(column, value)
    }

    pub fn instance_set(&mut self, key: impl Into<String>, value: impl Into<DataValue>) {
        self.instance.insert(key.into(), value.into());
    }

    pub fn instance_get(&self, key: &str) -> Option<&DataValue> {
        self.instance.get(key)
    }

    /// Whether a flag was set to true on this operation
    pub fn instance_flag(&self, key: &str) -> bool {
        self.instance_get(key) == Some(&DataValue::Boolean(true))
    }

    pub fn began_transaction(&self) -> bool {
        self.began_transaction
    }

    pub fn rows_affected(&self) -> Option<u64> {
        self.rows_affected
    }

    pub(crate) fn set_rows_affected(&mut self, rows: u64) {
        self.rows_affected = Some(rows);
    }
}
