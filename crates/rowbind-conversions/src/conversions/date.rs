use crate::format::DateFormatter;
use crate::properties::Configurable;
use crate::{Conversion, Error, FormattedConversion, Result, input_text};
use chrono::NaiveDateTime;
use rowbind_value::{Value, ValueKind};

/// Date or date-time conversion driven by one or more patterns
#[derive(Debug, Clone)]
pub struct DateConversion {
    kind: ValueKind,
    formatters: Vec<DateFormatter>,
    value_if_null: Option<NaiveDateTime>,
    null_write: Option<String>,
}

impl DateConversion {
    /// # Errors
    ///
    /// Returns a configuration error if `kind` is not temporal, if no
    /// pattern is given, or if a pattern is invalid.
    pub fn new(
        kind: ValueKind,
        value_if_null: Option<NaiveDateTime>,
        null_write: Option<String>,
        formats: &[String],
    ) -> Result<Self> {
        if !kind.is_temporal() {
            return Err(Error::configuration(format!(
                "Cannot apply date formats to {kind}"
            )));
        }
        if formats.is_empty() {
            return Err(Error::configuration("No format defined"));
        }
        let formatters = formats
            .iter()
            .map(|f| DateFormatter::new(f))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            kind,
            formatters,
            value_if_null,
            null_write,
        })
    }

    #[must_use]
    pub fn formatters(&self) -> &[DateFormatter] {
        &self.formatters
    }

    fn to_kind(&self, value: NaiveDateTime) -> Value {
        if self.kind == ValueKind::Date {
            Value::Date(value.date())
        } else {
            Value::DateTime(value)
        }
    }
}

impl Conversion for DateConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        if input.is_null() {
            return Ok(self.value_if_null.map_or(Value::Null, |v| self.to_kind(v)));
        }
        if input.kind() == Some(self.kind) {
            return Ok(input);
        }
        let text = input_text(&input);
        self.formatters
            .iter()
            .find_map(|f| f.parse(&text).ok())
            .map(|v| self.to_kind(v))
            .ok_or_else(|| {
                let patterns: Vec<&str> = self.formatters.iter().map(DateFormatter::pattern).collect();
                Error::conversion(text.as_str(), format!("does not match any of the formats {patterns:?}"))
            })
    }

    fn revert(&self, input: Value) -> Result<Value> {
        let formatter = self
            .formatters
            .first()
            .ok_or_else(|| Error::configuration("No format defined"))?;
        match input {
            Value::Null => Ok(self.null_write.clone().map_or(Value::Null, Value::String)),
            Value::Date(d) => formatter.format_date(d).map(Value::String),
            Value::DateTime(dt) => formatter.format_datetime(dt).map(Value::String),
            other => Err(Error::conversion(
                other.to_string(),
                format!("expected a date, found {}", other.kind_name()),
            )),
        }
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

impl FormattedConversion for DateConversion {
    fn formatter_objects(&mut self) -> Vec<&mut dyn Configurable> {
        self.formatters
            .iter_mut()
            .map(|f| f as &mut dyn Configurable)
            .collect()
    }
}
