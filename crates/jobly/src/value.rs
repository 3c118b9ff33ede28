//! Dynamically-typed scalar values bound as statement parameters.
//!
//! Partial updates and filters collect values of mixed types into one ordered
//! list, so they need a single parameter type. [`FieldValue`] encodes itself
//! against whatever column type Postgres reports for the placeholder.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A scalar value: text, number, boolean or null.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Bool(bool),
    Null,
}

impl FieldValue {
    /// Convert a JSON scalar. Arrays and objects are rejected.
    pub fn from_json(value: &serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(*b)),
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Self::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Self::Float(f))
                } else {
                    Err(JoblyError::bad_request(format!("unsupported number: {n}")))
                }
            }
            Value::Array(_) | Value::Object(_) => Err(JoblyError::bad_request(
                "nested values are not supported in field updates",
            )),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check the value against the kind its column stores, converting where
    /// the conversion is lossless (integers and numeric strings to decimals).
    ///
    /// Anything else is a `BadRequest` naming `field`. Null passes through.
    pub fn coerce_to(&self, kind: ValueKind, field: &str) -> JoblyResult<Self> {
        let mismatch = || {
            JoblyError::bad_request(format!("{field} must be {}", kind.describe()))
        };

        match (kind, self) {
            (_, Self::Null) => Ok(Self::Null),
            (ValueKind::Text, Self::Text(_)) => Ok(self.clone()),
            (ValueKind::Integer, Self::Int(n)) => i32::try_from(*n)
                .map(|n| Self::Int(n.into()))
                .map_err(|_| mismatch()),
            (ValueKind::Decimal, Self::Int(n)) => Ok(Self::Decimal(Decimal::from(*n))),
            (ValueKind::Decimal, Self::Float(f)) => {
                Decimal::try_from(*f).map(Self::Decimal).map_err(|_| mismatch())
            }
            (ValueKind::Decimal, Self::Decimal(_)) => Ok(self.clone()),
            (ValueKind::Decimal, Self::Text(s)) => s
                .trim()
                .parse::<Decimal>()
                .map(Self::Decimal)
                .map_err(|_| mismatch()),
            _ => Err(mismatch()),
        }
    }
}

/// What a column stores, as far as update values are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Any text type.
    Text,
    /// `INTEGER` (32-bit).
    Integer,
    /// `NUMERIC`.
    Decimal,
}

impl ValueKind {
    fn describe(self) -> &'static str {
        match self {
            Self::Text => "a string",
            Self::Integer => "an integer",
            Self::Decimal => "a number",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for FieldValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl ToSql for FieldValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            FieldValue::Null => Ok(IsNull::Yes),
            FieldValue::Text(s) if <String as ToSql>::accepts(ty) => s.to_sql(ty, out),
            FieldValue::Text(s) => Err(format!("cannot encode text {s:?} as {ty}").into()),
            FieldValue::Bool(b) if *ty == Type::BOOL => b.to_sql(ty, out),
            FieldValue::Bool(b) => Err(format!("cannot encode boolean {b} as {ty}").into()),
            FieldValue::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*n)?.to_sql(ty, out),
                Type::INT8 => n.to_sql(ty, out),
                Type::FLOAT4 => (*n as f32).to_sql(ty, out),
                Type::FLOAT8 => (*n as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*n).to_sql(ty, out),
                _ => Err(format!("cannot encode integer {n} as {ty}").into()),
            },
            FieldValue::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::FLOAT8 => f.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
                _ => Err(format!("cannot encode number {f} as {ty}").into()),
            },
            FieldValue::Decimal(d) => match *ty {
                Type::NUMERIC => d.to_sql(ty, out),
                Type::FLOAT8 => d
                    .to_f64()
                    .ok_or_else(|| format!("decimal {d} out of range for {ty}"))?
                    .to_sql(ty, out),
                Type::FLOAT4 => d
                    .to_f32()
                    .ok_or_else(|| format!("decimal {d} out of range for {ty}"))?
                    .to_sql(ty, out),
                _ => Err(format!("cannot encode decimal {d} as {ty}").into()),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        <String as ToSql>::accepts(ty)
            || matches!(
                *ty,
                Type::BOOL
                    | Type::INT2
                    | Type::INT4
                    | Type::INT8
                    | Type::FLOAT4
                    | Type::FLOAT8
                    | Type::NUMERIC
            )
    }

    tokio_postgres::types::to_sql_checked!();
}
