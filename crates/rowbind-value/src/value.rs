//! Value types carried by rows and fields

use crate::kind::ValueKind;
use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single column or field value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Null/absent value
    #[default]
    Null,

    /// String value (the raw form every column starts as)
    String(String),

    /// Single character
    Char(char),

    /// Boolean value
    Boolean(bool),

    /// 8-bit integer
    Byte(i8),

    /// 16-bit integer
    Short(i16),

    /// 32-bit integer
    Integer(i32),

    /// 64-bit integer
    Long(i64),

    /// 32-bit float
    Float(f32),

    /// 64-bit float
    Double(f64),

    /// 128-bit integer
    BigInteger(i128),

    /// Arbitrary precision decimal
    Decimal(Decimal),

    /// Calendar date
    Date(NaiveDate),

    /// Date and time without offset (UTC by convention)
    DateTime(NaiveDateTime),

    /// Enumeration constant, by name
    Enum(String),
}

impl Value {
    /// Kind of this value, `None` for [`Value::Null`]
    #[must_use]
    pub fn kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Value::Null => return None,
            Value::String(_) => ValueKind::String,
            Value::Char(_) => ValueKind::Char,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Byte(_) => ValueKind::Byte,
            Value::Short(_) => ValueKind::Short,
            Value::Integer(_) => ValueKind::Integer,
            Value::Long(_) => ValueKind::Long,
            Value::Float(_) => ValueKind::Float,
            Value::Double(_) => ValueKind::Double,
            Value::BigInteger(_) => ValueKind::BigInteger,
            Value::Decimal(_) => ValueKind::Decimal,
            Value::Date(_) => ValueKind::Date,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::Enum(_) => ValueKind::Enum,
        };
        Some(kind)
    }

    /// Kind name for messages, `"null"` for [`Value::Null`]
    #[must_use]
    pub fn kind_name(&self) -> String {
        self.kind()
            .map_or_else(|| "null".to_string(), |kind| kind.to_string())
    }

    /// Check if value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the string payload of a [`Value::String`]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the constant name of a [`Value::Enum`]
    #[must_use]
    pub fn enum_name(&self) -> Option<&str> {
        match self {
            Value::Enum(name) => Some(name),
            _ => None,
        }
    }

    /// Render the value as text, `None` for null
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        if self.is_null() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) | Value::Enum(s) => f.write_str(s),
            Value::Char(c) => write!(f, "{c}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Byte(n) => write!(f, "{n}"),
            Value::Short(n) => write!(f, "{n}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Double(n) => write!(f, "{n}"),
            Value::BigInteger(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

/// Extraction of a typed Rust value out of a [`Value`].
///
/// `Option<T>` maps [`Value::Null`] to `None`; the bare types reject null.
pub trait FromValue: Sized {
    /// Convert the value, failing on a kind mismatch.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeMismatch`] when the value has another kind.
    fn from_value(value: Value) -> Result<Self>;
}

macro_rules! value_conversions {
    ($($ty:ty => $variant:ident, $kind:literal;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::$variant(v) => Ok(v),
                        other => Err(Error::type_mismatch($kind, other.kind_name())),
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

value_conversions! {
    String => String, "string";
    char => Char, "char";
    bool => Boolean, "boolean";
    i8 => Byte, "byte";
    i16 => Short, "short";
    i32 => Integer, "integer";
    i64 => Long, "long";
    f32 => Float, "float";
    f64 => Double, "double";
    i128 => BigInteger, "big_integer";
    Decimal => Decimal, "decimal";
    NaiveDate => Date, "date";
    NaiveDateTime => DateTime, "datetime";
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}
