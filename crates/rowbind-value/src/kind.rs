//! Value kind tags

use serde::{Deserialize, Serialize};

/// The kind of a non-null [`crate::Value`].
///
/// Conversions declare the kind they produce in each direction, which lets the
/// resolver decide whether a default conversion would be redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    String,
    Char,
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigInteger,
    Decimal,
    Date,
    DateTime,
    Enum,
}

impl ValueKind {
    /// Whether the kind is one of the numeric kinds.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Byte
                | Self::Short
                | Self::Integer
                | Self::Long
                | Self::Float
                | Self::Double
                | Self::BigInteger
                | Self::Decimal
        )
    }

    /// Whether the kind is a date or date-time.
    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Char => "char",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::Float => "float",
            Self::Double => "double",
            Self::BigInteger => "big_integer",
            Self::Decimal => "decimal",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Enum => "enum",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_kinds() {
        assert!(ValueKind::Integer.is_numeric());
        assert!(ValueKind::Decimal.is_numeric());
        assert!(!ValueKind::String.is_numeric());
        assert!(!ValueKind::Date.is_numeric());
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueKind::BigInteger.to_string(), "big_integer");
        assert_eq!(ValueKind::DateTime.to_string(), "datetime");
        assert!(ValueKind::Date.is_temporal());
    }
}
