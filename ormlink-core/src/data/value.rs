use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Data container for respective types
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum DataValue {
    Null,
    Utf8String(String),
    Binary(Vec<u8>),
    Boolean(bool),
    Int8(i8),
    UInt8(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Decimal(Decimal),
    JSON(String),
    Date(chrono::NaiveDate),
    Time(chrono::NaiveTime),
    DateTime(chrono::NaiveDateTime),
    Uuid(uuid::Uuid),
}

impl DataValue {
    pub fn is_null(&self) -> bool {
        *self == DataValue::Null
    }

    /// Returns true if the value is null or the zero value of its type.
    ///
    /// A field holding a zero value is treated as not having been supplied
    /// by the caller.
    pub fn is_zero(&self) -> bool {
        match self {
            DataValue::Null => true,
            DataValue::Utf8String(d) => d.is_empty(),
            DataValue::Binary(d) => d.is_empty(),
            DataValue::Boolean(d) => !*d,
            DataValue::Int8(d) => *d == 0,
            DataValue::UInt8(d) => *d == 0,
            DataValue::Int16(d) => *d == 0,
            DataValue::UInt16(d) => *d == 0,
            DataValue::Int32(d) => *d == 0,
            DataValue::UInt32(d) => *d == 0,
            DataValue::Int64(d) => *d == 0,
            DataValue::UInt64(d) => *d == 0,
            DataValue::Float32(d) => *d == 0.0,
            DataValue::Float64(d) => *d == 0.0,
            DataValue::Decimal(d) => d.is_zero(),
            DataValue::JSON(d) => d.is_empty(),
            DataValue::Date(_) | DataValue::Time(_) | DataValue::DateTime(_) => false,
            DataValue::Uuid(d) => d.is_nil(),
        }
    }
}

impl From<&str> for DataValue {
    fn from(str: &str) -> Self {
        DataValue::Utf8String(str.to_string())
    }
}

impl From<String> for DataValue {
    fn from(str: String) -> Self {
        DataValue::Utf8String(str)
    }
}

impl From<bool> for DataValue {
    fn from(v: bool) -> Self {
        DataValue::Boolean(v)
    }
}

impl From<i32> for DataValue {
    fn from(v: i32) -> Self {
        DataValue::Int32(v)
    }
}

impl From<i64> for DataValue {
    fn from(v: i64) -> Self {
        DataValue::Int64(v)
    }
}

impl From<u64> for DataValue {
    fn from(v: u64) -> Self {
        DataValue::UInt64(v)
    }
}

impl<T: Into<DataValue>> From<Option<T>> for DataValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(DataValue::Null)
    }
}
