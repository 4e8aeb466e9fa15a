use crate::format::NumberFormatter;
use crate::properties::Configurable;
use crate::{Conversion, Error, FormattedConversion, Result, input_text};
use rowbind_value::{Value, ValueKind};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};

/// Numeric conversion driven by one or more decimal patterns.
///
/// On read the patterns are tried in order and the first that parses wins.
/// On write the first pattern is used.
#[derive(Debug, Clone)]
pub struct FormattedNumberConversion {
    kind: ValueKind,
    formatters: Vec<NumberFormatter>,
    value_if_null: Value,
    null_write: Option<String>,
}

impl FormattedNumberConversion {
    /// Conversion to a numeric kind. No patterns means plain formatting.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a non-numeric kind or a malformed
    /// pattern.
    pub fn number(kind: ValueKind, formats: &[String]) -> Result<Self> {
        if !kind.is_numeric() {
            return Err(Error::configuration(format!(
                "Cannot apply number formats to {kind}"
            )));
        }
        let mut formatters = formats
            .iter()
            .map(|f| NumberFormatter::new(f))
            .collect::<Result<Vec<_>>>()?;
        if formatters.is_empty() {
            formatters.push(NumberFormatter::plain());
        }
        Ok(Self {
            kind,
            formatters,
            value_if_null: Value::Null,
            null_write: None,
        })
    }

    /// Conversion to [`ValueKind::Decimal`] with null substitutes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed pattern.
    pub fn decimal(
        value_if_null: Option<Decimal>,
        null_write: Option<String>,
        formats: &[String],
    ) -> Result<Self> {
        let mut conversion = Self::number(ValueKind::Decimal, formats)?;
        conversion.value_if_null = value_if_null.map_or(Value::Null, Value::Decimal);
        conversion.null_write = null_write;
        Ok(conversion)
    }

    /// Set the null substitutes, parsing the null-read text with the
    /// configured patterns.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the null-read text does not parse.
    pub fn with_nulls(mut self, value_if_null: Option<&str>, null_write: Option<String>) -> Result<Self> {
        if let Some(text) = value_if_null {
            self.value_if_null = self.parse(text).map_err(|e| {
                Error::configuration(format!("Invalid default value for {}: {e}", self.kind))
            })?;
        }
        self.null_write = null_write;
        Ok(self)
    }

    #[must_use]
    pub fn formatters(&self) -> &[NumberFormatter] {
        &self.formatters
    }

    fn parse(&self, text: &str) -> Result<Value> {
        let decimal = self
            .formatters
            .iter()
            .find_map(|f| f.parse(text).ok())
            .ok_or_else(|| {
                let patterns: Vec<&str> = self.formatters.iter().map(NumberFormatter::pattern).collect();
                Error::conversion(text, format!("does not match any of the formats {patterns:?}"))
            })?;
        self.narrow(text, decimal)
    }

    fn narrow(&self, text: &str, decimal: Decimal) -> Result<Value> {
        let out_of_range = || Error::conversion(text, format!("out of range for {}", self.kind));
        let whole = decimal.trunc();
        let value = match self.kind {
            ValueKind::Byte => Value::Byte(whole.to_i8().ok_or_else(out_of_range)?),
            ValueKind::Short => Value::Short(whole.to_i16().ok_or_else(out_of_range)?),
            ValueKind::Integer => Value::Integer(whole.to_i32().ok_or_else(out_of_range)?),
            ValueKind::Long => Value::Long(whole.to_i64().ok_or_else(out_of_range)?),
            ValueKind::BigInteger => Value::BigInteger(whole.to_i128().ok_or_else(out_of_range)?),
            ValueKind::Float => Value::Float(decimal.to_f32().ok_or_else(out_of_range)?),
            ValueKind::Double => Value::Double(decimal.to_f64().ok_or_else(out_of_range)?),
            _ => Value::Decimal(decimal),
        };
        Ok(value)
    }

    fn widen(value: &Value) -> Option<Decimal> {
        match value {
            Value::Byte(n) => Some(Decimal::from(*n)),
            Value::Short(n) => Some(Decimal::from(*n)),
            Value::Integer(n) => Some(Decimal::from(*n)),
            Value::Long(n) => Some(Decimal::from(*n)),
            Value::BigInteger(n) => Decimal::from_i128(*n),
            Value::Float(n) => Decimal::from_f32(*n),
            Value::Double(n) => Decimal::from_f64(*n),
            Value::Decimal(d) => Some(*d),
            _ => None,
        }
    }
}

impl Conversion for FormattedNumberConversion {
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
        if input.is_null() {
            return Ok(self.null_write.clone().map_or(Value::Null, Value::String));
        }
        let decimal = Self::widen(&input).ok_or_else(|| {
            Error::conversion(
                input.to_string(),
                format!("expected a number, found {}", input.kind_name()),
            )
        })?;
        let formatter = self
            .formatters
            .first()
            .ok_or_else(|| Error::configuration("No number format defined"))?;
        formatter.format(decimal).map(Value::String)
    }

    fn execute_kind(&self) -> ValueKind {
        self.kind
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn as_formatted(&mut self) -> Option<&mut dyn FormattedConversion> {
        Some(self)
    }
}

impl FormattedConversion for FormattedNumberConversion {
    fn formatter_objects(&mut self) -> Vec<&mut dyn Configurable> {
        self.formatters
            .iter_mut()
            .map(|f| f as &mut dyn Configurable)
            .collect()
    }
}
