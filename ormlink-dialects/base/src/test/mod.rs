//! Scripted doubles for testing dialects without a database

use std::collections::VecDeque;

use ormlink_core::{
    data::{DataType, DataValue},
    err::{anyhow, bail, Result},
};

use crate::{
    common::{
        query::{query_count, query_string, Query},
        schema::FieldSchema,
        sequence::{PseudoSequenceAllocator, SequenceStoreConfig},
    },
    interface::{Connection, Dialect, TransactionManager},
};

/// The scripted outcome of a single statement
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// The statement affected n rows
    Affected(u64),
    /// The query returned the row, if any
    Row(Option<Vec<DataValue>>),
    /// The statement failed with the message
    Error(String),
}

/// A connection which records every statement and replays queued responses.
///
/// Once the queue is exhausted statements affect no rows and queries return
/// no rows.
#[derive(Debug, Default)]
pub struct MockConnection {
    responses: VecDeque<MockResponse>,
    executed: Vec<Query>,
    in_transaction: bool,
    transaction_log: Vec<&'static str>,
    transactions_supported: bool,
}

impl MockConnection {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: responses.into(),
            transactions_supported: true,
            ..Default::default()
        }
    }

    /// Starts the connection inside an externally managed transaction
    pub fn in_transaction(mut self) -> Self {
        self.in_transaction = true;
        self
    }

    pub fn without_transactions(mut self) -> Self {
        self.transactions_supported = false;
        self
    }

    pub fn push(&mut self, response: MockResponse) {
        self.responses.push_back(response);
    }

    pub fn executed(&self) -> &[Query] {
        &self.executed
    }

    pub fn sql(&self) -> Vec<&str> {
        self.executed.iter().map(|q| q.sql.as_str()).collect()
    }

    /// The BEGIN, COMMIT and ROLLBACK calls made on the connection
    pub fn transaction_log(&self) -> Vec<&'static str> {
        self.transaction_log.clone()
    }

    fn next(&mut self, query: Query) -> Option<MockResponse> {
        self.executed.push(query);
        self.responses.pop_front()
    }
}

impl Connection for MockConnection {
    fn execute(&mut self, query: Query) -> Result<u64> {
        match self.next(query) {
            Some(MockResponse::Affected(n)) => Ok(n),
            Some(MockResponse::Error(msg)) => Err(anyhow!(msg)),
            Some(other) => bail!("Expected statement response, found {:?}", other),
            None => Ok(0),
        }
    }

    fn query_row(&mut self, query: Query) -> Result<Option<Vec<DataValue>>> {
        match self.next(query) {
            Some(MockResponse::Row(row)) => Ok(row),
            Some(MockResponse::Error(msg)) => Err(anyhow!(msg)),
            Some(other) => bail!("Expected query response, found {:?}", other),
            None => Ok(None),
        }
    }

    fn transaction_manager(&mut self) -> Option<&mut dyn TransactionManager> {
        if self.transactions_supported {
            Some(self)
        } else {
            None
        }
    }
}

impl TransactionManager for MockConnection {
    fn is_in_transaction(&mut self) -> Result<bool> {
        Ok(self.in_transaction)
    }

    fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction {
            bail!("Transaction already started");
        }

        self.in_transaction = true;
        self.transaction_log.push("BEGIN");
        Ok(())
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        self.in_transaction = false;
        self.transaction_log.push("ROLLBACK");
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.in_transaction = false;
        self.transaction_log.push("COMMIT");
        Ok(())
    }
}

/// A minimal dialect emitting predictable SQL
#[derive(Debug, Default)]
pub struct MockDialect {
    sequences: Option<PseudoSequenceAllocator>,
}

impl MockDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// A dialect which allocates keys using pseudo sequences
    pub fn with_sequences() -> Self {
        Self {
            sequences: Some(PseudoSequenceAllocator::new(SequenceStoreConfig::default())),
        }
    }
}

impl Dialect for MockDialect {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn bind_var(&self, i: usize) -> String {
        format!("?{}", i)
    }

    fn quote(&self, key: &str) -> String {
        key.to_string()
    }

    fn data_type_of(&self, field: &FieldSchema) -> Result<String> {
        let sql_type = match (field.sql_type_override(), &field.r#type) {
            (Some(t), _) => t.to_string(),
            (None, DataType::Boolean) => "boolean".into(),
            (None, DataType::Int32) => "integer".into(),
            (None, DataType::Int64) => "bigint".into(),
            (None, DataType::Utf8String(_)) => match field.size() {
                Some(size) => format!("varchar({})", size),
                None => "text".into(),
            },
            (None, other) => bail!("Unsupported type {:?} for column {}", other, field.name),
        };

        let additional = field.additional_type();
        Ok(if additional.is_empty() {
            sql_type
        } else {
            format!("{} {}", sql_type, additional)
        })
    }

    fn has_index(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        index_name: &str,
    ) -> Result<bool> {
        Ok(query_count(
            con,
            Query::new(
                "SELECT COUNT(*) FROM indexes WHERE table_name = ?1 AND name = ?2",
                vec![table_name.into(), index_name.into()],
            ),
        )? > 0)
    }

    fn remove_index(
        &self,
        con: &mut dyn Connection,
        _table_name: &str,
        index_name: &str,
    ) -> Result<()> {
        con.execute(Query::sql(format!("DROP INDEX {}", index_name)))?;
        Ok(())
    }

    fn has_foreign_key(
        &self,
        _con: &mut dyn Connection,
        _table_name: &str,
        _foreign_key_name: &str,
    ) -> Result<bool> {
        Ok(false)
    }

    fn has_table(&self, con: &mut dyn Connection, table_name: &str) -> Result<bool> {
        Ok(query_count(
            con,
            Query::new(
                "SELECT COUNT(*) FROM tables WHERE name = ?1",
                vec![table_name.into()],
            ),
        )? > 0)
    }

    fn has_column(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        column_name: &str,
    ) -> Result<bool> {
        Ok(query_count(
            con,
            Query::new(
                "SELECT COUNT(*) FROM columns WHERE table_name = ?1 AND name = ?2",
                vec![table_name.into(), column_name.into()],
            ),
        )? > 0)
    }

    fn current_database(&self, con: &mut dyn Connection) -> Result<String> {
        Ok(query_string(con, Query::sql("SELECT current_database()"))?.unwrap_or_default())
    }

    fn limit_and_offset_sql(&self, limit: Option<i64>, offset: Option<i64>) -> String {
        let mut sql = String::new();

        if let Some(limit) = limit.filter(|l| *l >= 0) {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        if let Some(offset) = offset.filter(|o| *o > 0) {
            sql.push_str(&format!(" OFFSET {}", offset));
        }

        sql
    }

    fn sequence_allocator(&self) -> Option<&PseudoSequenceAllocator> {
        self.sequences.as_ref()
    }
}
