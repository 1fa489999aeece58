use ormlink_core::{
    config,
    data::DataType,
    err::{bail, Result},
};
use ormlink_dialects_base::{
    common::{
        query::{query_count, query_string, Query},
        schema::FieldSchema,
        sequence::PseudoSequenceAllocator,
    },
    interface::{Connection, Dialect},
};

use crate::SqliteDialectConfig;

/// The dialect for sqlite databases
#[derive(Debug, Default)]
pub struct SqliteDialect {
    sequences: Option<PseudoSequenceAllocator>,
}

impl SqliteDialect {
    pub const NAME: &'static str = "sqlite3";

    pub fn new(conf: SqliteDialectConfig) -> Self {
        Self {
            sequences: conf.sequence_store.map(PseudoSequenceAllocator::new),
        }
    }

    pub fn parse(options: config::Value) -> Result<Self> {
        Ok(Self::new(SqliteDialectConfig::parse(options)?))
    }

    fn sql_type_of(&self, field: &FieldSchema) -> Result<String> {
        if let Some(sql_type) = field.sql_type_override() {
            return Ok(sql_type.to_string());
        }

        // an integer primary key aliases the rowid, which sqlite assigns itself
        if field.r#type.is_integral()
            && field.is_primary_key()
            && field.auto_increment().is_some()
        {
            return Ok("integer".into());
        }

        Ok(match &field.r#type {
            DataType::Boolean => "bool".into(),
            DataType::Int8
            | DataType::UInt8
            | DataType::Int16
            | DataType::UInt16
            | DataType::Int32
            | DataType::UInt32 => "integer".into(),
            DataType::Int64 | DataType::UInt64 => "bigint".into(),
            DataType::Float32 | DataType::Float64 => "real".into(),
            DataType::Decimal(_) => "decimal".into(),
            DataType::Utf8String(_) => match field.size() {
                Some(size) if size > 0 => format!("varchar({})", size),
                _ => "text".into(),
            },
            DataType::JSON => "text".into(),
            DataType::Date | DataType::Time | DataType::DateTime => "datetime".into(),
            DataType::Binary => "blob".into(),
            DataType::Uuid => "varchar(36)".into(),
            DataType::Null => bail!("Invalid type for column {} on sqlite", field.name),
        })
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bind_var(&self, i: usize) -> String {
        format!("?{}", i)
    }

    fn quote(&self, key: &str) -> String {
        format!("\"{}\"", key.replace('"', "\"\""))
    }

    fn data_type_of(&self, field: &FieldSchema) -> Result<String> {
        let sql_type = self.sql_type_of(field)?;
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
        let count = query_count(
            con,
            Query::new(
                "SELECT count(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = ?1 AND name = ?2",
                vec![table_name.into(), index_name.into()],
            ),
        )?;

        Ok(count > 0)
    }

    fn remove_index(
        &self,
        con: &mut dyn Connection,
        _table_name: &str,
        index_name: &str,
    ) -> Result<()> {
        con.execute(Query::sql(format!("DROP INDEX {}", self.quote(index_name))))?;
        Ok(())
    }

    /// Foreign keys are unnamed in sqlite
    fn has_foreign_key(
        &self,
        _con: &mut dyn Connection,
        _table_name: &str,
        _foreign_key_name: &str,
    ) -> Result<bool> {
        Ok(false)
    }

    fn has_table(&self, con: &mut dyn Connection, table_name: &str) -> Result<bool> {
        let count = query_count(
            con,
            Query::new(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                vec![table_name.into()],
            ),
        )?;

        Ok(count > 0)
    }

    fn has_column(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        column_name: &str,
    ) -> Result<bool> {
        let count = query_count(
            con,
            Query::new(
                "SELECT count(*) FROM pragma_table_info(?1) WHERE name = ?2",
                vec![table_name.into(), column_name.into()],
            ),
        )?;

        Ok(count > 0)
    }

    fn current_database(&self, con: &mut dyn Connection) -> Result<String> {
        let file = query_string(
            con,
            Query::sql("SELECT file FROM pragma_database_list WHERE name = 'main'"),
        )?;

        // in-memory databases have no file
        Ok(file
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| "main".into()))
    }

    fn limit_and_offset_sql(&self, limit: Option<i64>, offset: Option<i64>) -> String {
        let limit = limit.filter(|l| *l >= 0);
        let offset = offset.filter(|o| *o > 0);

        match (limit, offset) {
            (Some(limit), Some(offset)) => format!(" LIMIT {} OFFSET {}", limit, offset),
            (Some(limit), None) => format!(" LIMIT {}", limit),
            (None, Some(offset)) => format!(" LIMIT -1 OFFSET {}", offset),
            (None, None) => String::new(),
        }
    }

    fn sequence_allocator(&self) -> Option<&PseudoSequenceAllocator> {
        self.sequences.as_ref()
    }
}
