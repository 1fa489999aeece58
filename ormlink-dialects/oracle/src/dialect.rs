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
use ormlink_logging::debug;

use crate::{OracleDialectConfig, RowLimitMode};

/// The dialect for Oracle databases.
///
/// Oracle (before 12c) has no identity columns, so auto-increment keys are
/// assigned before the insert from either a native sequence or a pseudo
/// sequence kept in a counter table.
#[derive(Debug)]
pub struct OracleDialect {
    conf: OracleDialectConfig,
    sequences: PseudoSequenceAllocator,
}

impl OracleDialect {
    pub const NAME: &'static str = "oracle";

    pub fn new(conf: OracleDialectConfig) -> Self {
        let sequences = PseudoSequenceAllocator::new(conf.sequence_store.clone());

        Self { conf, sequences }
    }

    pub fn parse(options: config::Value) -> Result<Self> {
        Ok(Self::new(OracleDialectConfig::parse(options)?))
    }

    pub fn conf(&self) -> &OracleDialectConfig {
        &self.conf
    }

    fn sql_type_of(&self, field: &FieldSchema) -> Result<String> {
        if let Some(sql_type) = field.sql_type_override() {
            return Ok(sql_type.to_string());
        }

        let sql_type = match &field.r#type {
            DataType::Boolean => "CHAR(1)".into(),
            DataType::Int8
            | DataType::UInt8
            | DataType::Int16
            | DataType::UInt16
            | DataType::Int32
            | DataType::UInt32 => "INTEGER".into(),
            DataType::Int64 | DataType::UInt64 => "NUMBER".into(),
            DataType::Float32 | DataType::Float64 => "FLOAT".into(),
            DataType::Utf8String(_) => match field.size() {
                Some(size) if size > 0 && size < self.conf.max_varchar_length => {
                    format!("VARCHAR({})", size)
                }
                _ => "CLOB".into(),
            },
            DataType::Date | DataType::DateTime => "DATE".into(),
            DataType::Binary => "BLOB".into(),
            DataType::Decimal(opts) => match (opts.precision, opts.scale) {
                (Some(p), Some(s)) => format!("NUMBER({}, {})", p, s),
                (Some(p), None) => format!("NUMBER({})", p),
                _ => "NUMBER".into(),
            },
            other => bail!(
                "Invalid type {:?} for column {} on oracle, declare its SQL type explicitly",
                other,
                field.name
            ),
        };

        Ok(sql_type)
    }
}

impl Default for OracleDialect {
    fn default() -> Self {
        Self::new(OracleDialectConfig::default())
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn bind_var(&self, i: usize) -> String {
        format!(":{}", i)
    }

    fn quote(&self, key: &str) -> String {
        key.to_uppercase()
    }

    fn data_type_of(&self, field: &FieldSchema) -> Result<String> {
        let sql_type = self.sql_type_of(field)?;
        let additional = field.additional_type();

        Ok(if additional.trim().is_empty() {
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
                "SELECT COUNT(1) FROM USER_INDEXES WHERE TABLE_NAME = :1 AND INDEX_NAME = :2",
                vec![table_name.to_uppercase().into(), index_name.to_uppercase().into()],
            ),
        )?;

        Ok(count > 0)
    }

    fn remove_index(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        index_name: &str,
    ) -> Result<()> {
        debug!("Dropping index {} on {}", index_name, table_name);
        con.execute(Query::sql(format!("DROP INDEX {}", index_name)))?;
        Ok(())
    }

    fn has_foreign_key(
        &self,
        con: &mut dyn Connection,
        table_name: &str,
        foreign_key_name: &str,
    ) -> Result<bool> {
        let count = query_count(
            con,
            Query::new(
                "SELECT COUNT(1) FROM USER_CONSTRAINTS WHERE CONSTRAINT_TYPE = 'R' AND TABLE_NAME = :1 AND CONSTRAINT_NAME = :2",
                vec![
                    table_name.to_uppercase().into(),
                    foreign_key_name.to_uppercase().into(),
                ],
            ),
        )?;

        Ok(count > 0)
    }

    fn has_table(&self, con: &mut dyn Connection, table_name: &str) -> Result<bool> {
        let count = query_count(
            con,
            Query::new(
                "SELECT COUNT(1) FROM USER_TABLES WHERE TABLE_NAME = :1",
                vec![table_name.to_uppercase().into()],
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
                "SELECT COUNT(1) FROM USER_TAB_COLUMNS WHERE TABLE_NAME = :1 AND COLUMN_NAME = :2",
                vec![table_name.to_uppercase().into(), column_name.to_uppercase().into()],
            ),
        )?;

        Ok(count > 0)
    }

    fn current_database(&self, con: &mut dyn Connection) -> Result<String> {
        Ok(query_string(con, Query::sql("SELECT GLOBAL_NAME FROM GLOBAL_NAME"))?
            .unwrap_or_default())
    }

    fn limit_where_sql(&self, limit: Option<i64>) -> String {
        match (self.conf.row_limit, limit) {
            (RowLimitMode::RowNum, Some(limit)) if limit >= 0 => {
                format!(" AND (ROWNUM <= {})", limit)
            }
            _ => String::new(),
        }
    }

    fn limit_and_offset_sql(&self, limit: Option<i64>, offset: Option<i64>) -> String {
        if self.conf.row_limit != RowLimitMode::FetchFirst {
            return String::new();
        }

        let mut parts = vec![];

        if let Some(offset) = offset.filter(|o| *o > 0) {
            parts.push(format!("OFFSET {} ROWS", offset));
        }

        if let Some(limit) = limit.filter(|l| *l >= 0) {
            parts.push(format!("FETCH FIRST {} ROWS ONLY", limit));
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" {}", parts.join(" "))
        }
    }

    fn select_from_dummy_table(&self) -> &'static str {
        "FROM dual"
    }

    fn sequence_next_value_sql(&self, sequence: &str) -> String {
        format!(
            "SELECT {}.NEXTVAL {}",
            self.quote(sequence),
            self.select_from_dummy_table()
        )
    }

    fn sequence_allocator(&self) -> Option<&PseudoSequenceAllocator> {
        Some(&self.sequences)
    }
}
