use crate::{Conversion, Error, Result, input_text};
use rowbind_value::{Value, ValueKind};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Plain text conversion for characters and numbers
#[derive(Debug, Clone)]
pub struct TypedConversion {
    kind: ValueKind,
    value_if_null: Value,
    null_write: Option<String>,
}

impl TypedConversion {
    /// # Errors
    ///
    /// Returns a configuration error unless `kind` is a character or a
    /// numeric kind.
    pub fn new(kind: ValueKind) -> Result<Self> {
        if kind != ValueKind::Char && !kind.is_numeric() {
            return Err(Error::configuration(format!(
                "No plain conversion available for {kind}"
            )));
        }
        Ok(Self {
            kind,
            value_if_null: Value::Null,
            null_write: None,
        })
    }

    /// Build the conversion with null substitutes. The null-read text is
    /// parsed as a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the kind is unsupported or the
    /// null-read text does not parse.
    pub fn with_null_defaults(
        kind: ValueKind,
        value_if_null: Option<&str>,
        null_write: Option<String>,
    ) -> Result<Self> {
        let mut conversion = Self::new(kind)?;
        if let Some(text) = value_if_null {
            conversion.value_if_null = conversion.parse(text).map_err(|e| {
                Error::configuration(format!("Invalid default value for {kind}: {e}"))
            })?;
        }
        conversion.null_write = null_write;
        Ok(conversion)
    }

    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Parse text as a value of this conversion's kind.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the text is not a valid value.
    pub fn parse(&self, text: &str) -> Result<Value> {
        let invalid = |e: &dyn std::fmt::Display| {
            Error::conversion(text, format!("not a valid {}: {e}", self.kind))
        };
        if self.kind == ValueKind::Char {
            let mut chars = text.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(Error::conversion(
                    text,
                    "expected exactly one character",
                )),
            };
        }

        let trimmed = text.trim();
        let value = match self.kind {
            ValueKind::Byte => Value::Byte(trimmed.parse().map_err(|e| invalid(&e))?),
            ValueKind::Short => Value::Short(trimmed.parse().map_err(|e| invalid(&e))?),
            ValueKind::Integer => Value::Integer(trimmed.parse().map_err(|e| invalid(&e))?),
            ValueKind::Long => Value::Long(trimmed.parse().map_err(|e| invalid(&e))?),
            ValueKind::Float => Value::Float(trimmed.parse().map_err(|e| invalid(&e))?),
            ValueKind::Double => Value::Double(trimmed.parse().map_err(|e| invalid(&e))?),
            ValueKind::BigInteger => {
                Value::BigInteger(trimmed.parse().map_err(|e| invalid(&e))?)
            }
            ValueKind::Decimal => {
                Value::Decimal(Decimal::from_str(trimmed).map_err(|e| invalid(&e))?)
            }
            other => {
                return Err(Error::configuration(format!(
                    "No plain conversion available for {other}"
                )));
            }
        };
        Ok(value)
    }
}

impl Conversion for TypedConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        if input.is_null() {
            return Ok(self.value_if_null.clone());
        }
        if input.kind() == Some(self.kind) {
            return Ok(input);
        }
        self.parse(&input_text(&input))
    }

    fn revert(&self, input: Value) -> Result<Value> {
        match input {
            Value::Null => Ok(self.null_write.clone().map_or(Value::Null, Value::String)),
            value if value.kind() == Some(self.kind) => Ok(Value::String(value.to_string())),
            other => Err(Error::conversion(
                other.to_string(),
                format!("expected {}, found {}", self.kind, other.kind_name()),
            )),
        }
    }

    fn execute_kind(&self) -> ValueKind {
        self.kind
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_kinds() {
        let int = TypedConversion::new(ValueKind::Integer).unwrap();
        assert_eq!(int.execute(Value::from(" 30 ")).unwrap(), Value::Integer(30));
        assert_eq!(int.revert(Value::Integer(30)).unwrap(), Value::from("30"));
        assert!(int.execute(Value::from("thirty")).is_err());
        assert!(int.revert(Value::Long(30)).is_err());

        let byte = TypedConversion::new(ValueKind::Byte).unwrap();
        assert!(byte.execute(Value::from("300")).is_err());

        let big = TypedConversion::new(ValueKind::BigInteger).unwrap();
        assert_eq!(
            big.execute(Value::from("170141183460469231731687303715884105727")).unwrap(),
            Value::BigInteger(i128::MAX)
        );
    }

    #[test]
    fn test_char() {
        let conversion = TypedConversion::new(ValueKind::Char).unwrap();
        assert_eq!(conversion.execute(Value::from("x")).unwrap(), Value::Char('x'));
        assert!(conversion.execute(Value::from("xy")).is_err());
        assert!(TypedConversion::with_null_defaults(ValueKind::Char, Some("ab"), None).is_err());
    }

    #[test]
    fn test_null_defaults() {
        let conversion =
            TypedConversion::with_null_defaults(ValueKind::Long, Some("-1"), Some("none".into()))
                .unwrap();
        assert_eq!(conversion.execute(Value::Null).unwrap(), Value::Long(-1));
        assert_eq!(conversion.revert(Value::Null).unwrap(), Value::from("none"));

        let err =
            TypedConversion::with_null_defaults(ValueKind::Integer, Some("abc"), None).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_unsupported_kind() {
        assert!(TypedConversion::new(ValueKind::String).is_err());
        assert!(TypedConversion::new(ValueKind::Date).is_err());
    }
}
