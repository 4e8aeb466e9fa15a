use crate::{Conversion, Error, Result, input_text};
use rowbind_value::{Value, ValueKind};

/// Maps configurable true/false literals to booleans
#[derive(Debug, Clone)]
pub struct BooleanConversion {
    value_if_null: Option<bool>,
    null_write: Option<String>,
    true_strings: Vec<String>,
    false_strings: Vec<String>,
}

impl BooleanConversion {
    /// Build a conversion from true and false literal sets.
    ///
    /// Matching on read is case-insensitive and ignores surrounding
    /// whitespace. On write the first literal of each set is produced.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if either set is empty or if a literal
    /// appears in both.
    pub fn new(
        value_if_null: Option<bool>,
        null_write: Option<String>,
        true_strings: Vec<String>,
        false_strings: Vec<String>,
    ) -> Result<Self> {
        if true_strings.is_empty() || false_strings.is_empty() {
            return Err(Error::configuration(
                "Boolean conversion needs at least one true and one false string",
            ));
        }
        if let Some(both) = true_strings
            .iter()
            .find(|t| false_strings.iter().any(|f| f.trim().eq_ignore_ascii_case(t.trim())))
        {
            return Err(Error::configuration(format!(
                "'{both}' cannot be both a true and a false string"
            )));
        }
        Ok(Self {
            value_if_null,
            null_write,
            true_strings,
            false_strings,
        })
    }

    /// The plain `true`/`false` conversion with the given null substitutes
    ///
    /// # Errors
    ///
    /// Never fails in practice; shares the signature of [`Self::new`].
    pub fn with_defaults(value_if_null: Option<bool>, null_write: Option<String>) -> Result<Self> {
        Self::new(
            value_if_null,
            null_write,
            vec!["true".to_string()],
            vec!["false".to_string()],
        )
    }

    fn matches(set: &[String], text: &str) -> bool {
        set.iter().any(|s| s.trim().eq_ignore_ascii_case(text))
    }
}

impl Conversion for BooleanConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        match input {
            Value::Null => Ok(self.value_if_null.map_or(Value::Null, Value::Boolean)),
            Value::Boolean(_) => Ok(input),
            other => {
                let text = input_text(&other);
                let text = text.trim();
                if Self::matches(&self.true_strings, text) {
                    Ok(Value::Boolean(true))
                } else if Self::matches(&self.false_strings, text) {
                    Ok(Value::Boolean(false))
                } else {
                    Err(Error::conversion(
                        text,
                        format!(
                            "not a boolean, expected one of {:?} or {:?}",
                            self.true_strings, self.false_strings
                        ),
                    ))
                }
            }
        }
    }

    fn revert(&self, input: Value) -> Result<Value> {
        match input {
            Value::Null => Ok(self.null_write.clone().map_or(Value::Null, Value::String)),
            Value::Boolean(b) => {
                let set = if b { &self.true_strings } else { &self.false_strings };
                Ok(set.first().cloned().map_or(Value::Null, Value::String))
            }
            other => Err(Error::conversion(
                other.to_string(),
                format!("expected a boolean, found {}", other.kind_name()),
            )),
        }
    }

    fn execute_kind(&self) -> ValueKind {
        ValueKind::Boolean
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}
