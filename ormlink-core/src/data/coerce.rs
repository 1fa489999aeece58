use anyhow::{anyhow, bail, Result};
use rust_decimal::{prelude::ToPrimitive, Decimal};

use super::{DataType, DataValue};

impl DataValue {
    /// Tries to coerce the data value into the supplied type.
    ///
    /// Coercions must not lose data:
    ///     COERCE(COERCE(A, NEW_TYPE), ORIG_TYPE) == A
    ///
    /// Whenever that cannot hold, eg narrowing an out-of-range integer or
    /// truncating a fractional number, we bail out.
    pub fn try_coerce_into(self, r#type: &DataType) -> Result<Self> {
        // Nulls are type-independent
        if self.is_null() {
            return Ok(self);
        }

        match self {
            DataValue::Int8(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::UInt8(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::Int16(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::UInt16(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::Int32(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::UInt32(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::Int64(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::UInt64(d) => Self::try_coerce_integral(d as i128, r#type),
            DataValue::Decimal(d) => Self::try_coerce_decimal(d, r#type),
            DataValue::Float32(d) => Self::try_coerce_float(d as f64, r#type),
            DataValue::Float64(d) => Self::try_coerce_float(d, r#type),
            DataValue::Utf8String(d) => Self::try_coerce_utf8_string(d, r#type),
            DataValue::Boolean(d) => match r#type {
                DataType::Boolean => Ok(DataValue::Boolean(d)),
                DataType::Utf8String(_) => Ok(DataValue::Utf8String(if d { "1" } else { "0" }.into())),
                t if t.is_integral() => Self::try_coerce_integral(d as i128, t),
                _ => bail!("No type coercion exists from type 'boolean' to {:?}", r#type),
            },
            other => {
                if &DataType::from(&other) == r#type {
                    Ok(other)
                } else {
                    bail!("No type coercion exists from {:?} to {:?}", other, r#type)
                }
            }
        }
    }

    /// Reads the value as an unsigned 64-bit integer
    pub fn try_into_u64(self) -> Result<u64> {
        match self.try_coerce_into(&DataType::UInt64)? {
            DataValue::UInt64(v) => Ok(v),
            DataValue::Null => bail!("Cannot convert null to an unsigned integer"),
            other => bail!("Unexpected value {:?} after coercion", other),
        }
    }

    fn try_coerce_integral(data: i128, r#type: &DataType) -> Result<DataValue> {
        let coerced = match r#type {
            DataType::Int8 => i8::try_from(data).ok().map(DataValue::Int8),
            DataType::UInt8 => u8::try_from(data).ok().map(DataValue::UInt8),
            DataType::Int16 => i16::try_from(data).ok().map(DataValue::Int16),
            DataType::UInt16 => u16::try_from(data).ok().map(DataValue::UInt16),
            DataType::Int32 => i32::try_from(data).ok().map(DataValue::Int32),
            DataType::UInt32 => u32::try_from(data).ok().map(DataValue::UInt32),
            DataType::Int64 => i64::try_from(data).ok().map(DataValue::Int64),
            DataType::UInt64 => u64::try_from(data).ok().map(DataValue::UInt64),
            DataType::Boolean if data == 0 => Some(DataValue::Boolean(false)),
            DataType::Boolean if data == 1 => Some(DataValue::Boolean(true)),
            DataType::Float32 if (data as f32) as i128 == data => {
                Some(DataValue::Float32(data as f32))
            }
            DataType::Float64 if (data as f64) as i128 == data => {
                Some(DataValue::Float64(data as f64))
            }
            DataType::Decimal(_) => i64::try_from(data)
                .ok()
                .map(|d| DataValue::Decimal(Decimal::from(d))),
            DataType::Utf8String(_) => Some(DataValue::Utf8String(data.to_string())),
            _ => None,
        };

        coerced.ok_or_else(|| {
            anyhow!(
                "No type coercion exists from integer ({}) to {:?}",
                data,
                r#type
            )
        })
    }

    fn try_coerce_decimal(data: Decimal, r#type: &DataType) -> Result<DataValue> {
        match r#type {
            DataType::Decimal(_) => return Ok(DataValue::Decimal(data)),
            DataType::Utf8String(_) => return Ok(DataValue::Utf8String(data.to_string())),
            DataType::Float64 => {
                if let Some(val) = data.to_f64() {
                    return Ok(DataValue::Float64(val));
                }
            }
            t if data.fract().is_zero() => {
                if let Some(val) = data.to_i128() {
                    return Self::try_coerce_integral(val, t);
                }
            }
            _ => {}
        }

        bail!(
            "No type coercion exists from type 'decimal' ({}) to {:?}",
            data,
            r#type
        )
    }

    fn try_coerce_float(data: f64, r#type: &DataType) -> Result<DataValue> {
        match r#type {
            DataType::Float64 => return Ok(DataValue::Float64(data)),
            DataType::Float32 if (data as f32) as f64 == data => {
                return Ok(DataValue::Float32(data as f32))
            }
            DataType::Utf8String(_) => return Ok(DataValue::Utf8String(data.to_string())),
            DataType::Decimal(_) => {
                if let Some(val) = Decimal::from_f64_retain(data) {
                    return Ok(DataValue::Decimal(val));
                }
            }
            t if data.is_finite() && data.trunc() == data => {
                return Self::try_coerce_integral(data as i128, t)
            }
            _ => {}
        }

        bail!(
            "No type coercion exists from type 'float' ({}) to {:?}",
            data,
            r#type
        )
    }

    fn try_coerce_utf8_string(data: String, r#type: &DataType) -> Result<DataValue> {
        match r#type {
            DataType::Utf8String(_) => return Ok(DataValue::Utf8String(data)),
            DataType::Binary => return Ok(DataValue::Binary(data.into_bytes())),
            DataType::Decimal(_) => {
                if let Ok(n) = data.trim().parse::<Decimal>() {
                    return Ok(DataValue::Decimal(n));
                }
            }
            t if t.is_integral() => {
                if let Ok(n) = data.trim().parse::<i128>() {
                    return Self::try_coerce_integral(n, t);
                }
            }
            _ => {}
        }

        bail!(
            "No type coercion exists from type 'string' ({:?}) to {:?}",
            data,
            r#type
        )
    }
}
