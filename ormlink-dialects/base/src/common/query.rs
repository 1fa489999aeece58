use ormlink_core::{
    data::{DataType, DataValue},
    err::{bail, Context, Result},
};

use crate::interface::Connection;

/// A SQL statement along with its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub sql: String,
    pub params: Vec<DataValue>,
}

impl Query {
    pub fn new(sql: impl Into<String>, params: Vec<DataValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// A statement without parameters
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::new(sql, vec![])
    }
}

/// Runs a COUNT(*)-style query and returns the first column of the first row
pub fn query_count(con: &mut dyn Connection, query: Query) -> Result<u64> {
    let sql = query.sql.clone();
    let row = con
        .query_row(query)
        .with_context(|| format!("Failed to run query: {}", sql))?;

    match row.and_then(|r| r.into_iter().next()) {
        Some(val) => val
            .try_into_u64()
            .with_context(|| format!("Unexpected count returned from query: {}", sql)),
        None => Ok(0),
    }
}

/// Runs the query and returns the first column of the first row as a string
pub fn query_string(con: &mut dyn Connection, query: Query) -> Result<Option<String>> {
    let sql = query.sql.clone();
    let row = con
        .query_row(query)
        .with_context(|| format!("Failed to run query: {}", sql))?;

    Ok(match row.and_then(|r| r.into_iter().next()) {
        Some(DataValue::Null) | None => None,
        Some(DataValue::Utf8String(s)) => Some(s),
        Some(other) => match other.try_coerce_into(&DataType::rust_string())? {
            DataValue::Utf8String(s) => Some(s),
            other => bail!("Expected string result from query {}, found {:?}", sql, other),
        },
    })
}
