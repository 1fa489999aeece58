use ormlink_core::data::DataValue;
use rusqlite::{types::Value, ToSql};

pub fn to_sqlite(val: DataValue) -> Box<dyn ToSql> {
    match val {
        DataValue::Null => Box::new(rusqlite::types::Null),
        DataValue::Utf8String(d) => Box::new(d),
        DataValue::Binary(d) => Box::new(d),
        DataValue::Boolean(d) => Box::new(d),
        DataValue::Int8(d) => Box::new(d),
        DataValue::UInt8(d) => Box::new(d),
        DataValue::Int16(d) => Box::new(d),
        DataValue::UInt16(d) => Box::new(d),
        DataValue::Int32(d) => Box::new(d),
        DataValue::UInt32(d) => Box::new(d),
        DataValue::Int64(d) => Box::new(d),
        DataValue::UInt64(d) => Box::new(d),
        DataValue::Float32(d) => Box::new(d),
        DataValue::Float64(d) => Box::new(d),
        DataValue::Decimal(d) => Box::new(d.to_string()),
        DataValue::JSON(d) => Box::new(d),
        DataValue::Date(d) => Box::new(d),
        DataValue::Time(d) => Box::new(d),
        DataValue::DateTime(d) => Box::new(d),
        DataValue::Uuid(d) => Box::new(d.to_string()),
    }
}

/// Sqlite values are dynamically typed, so they are returned in their
/// storage class and coerced by the caller where needed
pub fn from_sqlite(val: Value) -> DataValue {
    match val {
        Value::Null => DataValue::Null,
        Value::Integer(d) => DataValue::Int64(d),
        Value::Real(d) => DataValue::Float64(d),
        Value::Text(d) => DataValue::Utf8String(d),
        Value::Blob(d) => DataValue::Binary(d),
    }
}
