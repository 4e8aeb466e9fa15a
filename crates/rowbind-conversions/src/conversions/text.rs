//! String to string conversions

use crate::{Conversion, Error, Result, input_text};
use regex::Regex;
use rowbind_value::{Value, ValueKind};

/// Maps a set of literals to `Null` on read, and `Null` to the first literal
/// on write.
#[derive(Debug, Clone)]
pub struct NullStringConversion {
    nulls: Vec<String>,
}

impl NullStringConversion {
    #[must_use]
    pub fn new(nulls: Vec<String>) -> Self {
        Self { nulls }
    }
}

impl Conversion for NullStringConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        match &input {
            Value::String(s) if self.nulls.iter().any(|n| n == s) => Ok(Value::Null),
            _ => Ok(input),
        }
    }

    fn revert(&self, input: Value) -> Result<Value> {
        match (input, self.nulls.first()) {
            (Value::Null, Some(first)) => Ok(Value::String(first.clone())),
            (other, _) => Ok(other),
        }
    }

    fn execute_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}

/// Trims surrounding whitespace, optionally bounding the length
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimConversion {
    max_length: Option<usize>,
}

impl TrimConversion {
    #[must_use]
    pub fn new(max_length: Option<usize>) -> Self {
        Self { max_length }
    }

    fn apply(&self, input: Value) -> Value {
        if input.is_null() {
            return input;
        }
        let text = input_text(&input);
        let trimmed = text.trim();
        let bounded = match self.max_length {
            Some(max) => trimmed.chars().take(max).collect(),
            None => trimmed.to_string(),
        };
        Value::String(bounded)
    }
}

impl Conversion for TrimConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        Ok(self.apply(input))
    }

    fn revert(&self, input: Value) -> Result<Value> {
        Ok(self.apply(input))
    }

    fn execute_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}

/// Converts text to upper or lower case in both directions
#[derive(Debug, Clone, Copy)]
pub struct CaseConversion {
    upper: bool,
}

impl CaseConversion {
    #[must_use]
    pub fn upper() -> Self {
        Self { upper: true }
    }

    #[must_use]
    pub fn lower() -> Self {
        Self { upper: false }
    }

    fn apply(&self, input: Value) -> Value {
        if input.is_null() {
            return input;
        }
        let text = input_text(&input);
        Value::String(if self.upper {
            text.to_uppercase()
        } else {
            text.to_lowercase()
        })
    }
}

impl Conversion for CaseConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        Ok(self.apply(input))
    }

    fn revert(&self, input: Value) -> Result<Value> {
        Ok(self.apply(input))
    }

    fn execute_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}

/// Replaces every match of a regular expression, in both directions
#[derive(Debug, Clone)]
pub struct RegexReplaceConversion {
    regex: Regex,
    replacement: String,
}

impl RegexReplaceConversion {
    /// # Errors
    ///
    /// Returns a configuration error for an invalid expression.
    pub fn new(expression: &str, replacement: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(expression).map_err(|e| {
            Error::configuration(format!("Invalid replace expression '{expression}': {e}"))
        })?;
        Ok(Self {
            regex,
            replacement: replacement.into(),
        })
    }

    fn apply(&self, input: Value) -> Value {
        if input.is_null() {
            return input;
        }
        let text = input_text(&input);
        Value::String(
            self.regex
                .replace_all(&text, self.replacement.as_str())
                .into_owned(),
        )
    }
}

impl Conversion for RegexReplaceConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        Ok(self.apply(input))
    }

    fn revert(&self, input: Value) -> Result<Value> {
        Ok(self.apply(input))
    }

    fn execute_kind(&self) -> ValueKind {
        ValueKind::String
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}
