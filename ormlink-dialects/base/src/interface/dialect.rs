use std::fmt::Debug;

use itertools::Itertools;
use ormlink_core::err::{bail, Result};

use crate::common::{
    callback::{Callbacks, BEGIN_TRANSACTION},
    identity::set_identity_insert,
    schema::{FieldSchema, TableSchema},
    sequence::PseudoSequenceAllocator,
};

use super::Connection;

/// The database-specific behaviour of the ORM
///
/// Dialects are shared between threads, any per-connection state is passed
/// in through the `con` argument.
pub trait Dialect: Debug + Send + Sync {
    /// The name of the dialect, eg 'oracle'
    fn name(&self) -> &'static str;

    /// The placeholder for the i-th (1-based) positional parameter
    fn bind_var(&self, i: usize) -> String;

    /// Formats an identifier for use in SQL
    fn quote(&self, key: &str) -> String;

    /// The SQL column type for the field, including its constraints
    fn data_type_of(&self, field: &FieldSchema) -> Result<String>;

    fn has_index(&self, con: &mut dyn Connection, table_name: &str, index_name: &str)
        -> Result<bool>;

    fn remove_index(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        index_name: &str,
    ) -> Result<()>;

    fn has_foreign_key(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        foreign_key_name: &str,
    ) -> Result<bool>;

    fn has_table(&self, con: &mut dyn Connection, table_name: &str) -> Result<bool>;

    fn has_column(&self, con: &mut dyn Connection, table_name: &str, column_name: &str)
        -> Result<bool>;

    /// The name of the database the connection is attached to
    fn current_database(&self, con: &mut dyn Connection) -> Result<String>;

    /// A predicate appended to the WHERE clause to limit the number of rows
    fn limit_where_sql(&self, _limit: Option<i64>) -> String {
        String::new()
    }

    /// A clause appended to the end of the query to limit and offset rows
    fn limit_and_offset_sql(&self, limit: Option<i64>, offset: Option<i64>) -> String;

    /// The FROM clause required to select constants, if any
    fn select_from_dummy_table(&self) -> &'static str {
        ""
    }

    /// A clause appended to INSERT statements to return the generated key
    fn last_insert_id_returning_suffix(&self, _table_name: &str, _key: &str) -> String {
        String::new()
    }

    /// A query returning the next value of a native sequence
    fn sequence_next_value_sql(&self, sequence: &str) -> String {
        format!("SELECT NEXT VALUE FOR {}", self.quote(sequence))
    }

    /// Builds a constraint or index name such as `fk_orders_customer_id`,
    /// collapsing every run of non-alphanumeric characters into `_`
    fn build_key_name(&self, kind: &str, table_name: &str, fields: &[&str]) -> String {
        let name = format!("{}_{}_{}", kind, table_name, fields.join("_"));
        let mut key = String::with_capacity(name.len());

        for c in name.chars() {
            if c.is_ascii_alphanumeric() {
                key.push(c);
            } else if !key.ends_with('_') {
                key.push('_');
            }
        }

        key
    }

    fn create_table_sql(&self, schema: &TableSchema) -> Result<String> {
        if schema.fields.is_empty() {
            bail!("Cannot create table {} without columns", schema.name);
        }

        let mut columns = schema
            .fields
            .iter()
            .map(|f| Ok(format!("{} {}", self.quote(&f.name), self.data_type_of(f)?)))
            .collect::<Result<Vec<_>>>()?;

        let keys = schema.primary_fields().map(|f| self.quote(&f.name)).join(", ");
        if !keys.is_empty() {
            columns.push(format!("PRIMARY KEY ({})", keys));
        }

        Ok(format!(
            "CREATE TABLE {} ({})",
            self.quote(&schema.name),
            columns.join(", ")
        ))
    }

    /// The allocator used for tables without native identity support
    fn sequence_allocator(&self) -> Option<&PseudoSequenceAllocator> {
        None
    }

    /// Adds the dialect's own steps to the write pipeline
    fn register_callbacks(&self, callbacks: &mut Callbacks) -> Result<()> {
        if self.sequence_allocator().is_some() {
            callbacks.register_after(
                BEGIN_TRANSACTION,
                &format!("{}:set_identity_insert", self.name()),
                set_identity_insert,
            )?;
        }

        Ok(())
    }
}
