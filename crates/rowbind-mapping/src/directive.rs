//! Field directives
//!
//! Directives are the declarative instructions attached to a field: how it
//! binds to a column and which conversions apply to its value. They can be
//! built in code or loaded from YAML.

use crate::{Error, Result};
use rowbind_conversions::EnumSelector;
use serde::{Deserialize, Serialize};

/// A single declarative instruction attached to a field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "directive", rename_all = "snake_case")]
pub enum Directive {
    /// Marks the field as mapped and says how it binds to a column
    Parsed(ParsedDirective),

    /// Literal strings read as null
    NullString { nulls: Vec<String> },

    /// How enumeration constants are identified in text
    EnumOptions {
        #[serde(default)]
        selectors: Vec<EnumSelector>,
        #[serde(default)]
        custom_element: Option<String>,
    },

    /// Trim surrounding whitespace, optionally bounding the length
    Trim {
        #[serde(default)]
        max_length: Option<usize>,
    },

    LowerCase,

    UpperCase,

    /// Regular expression replacement
    Replace {
        expression: String,
        #[serde(default)]
        replacement: String,
    },

    /// Literal sets for true and false
    BooleanString {
        true_strings: Vec<String>,
        false_strings: Vec<String>,
    },

    /// Number or date patterns plus `key=value` formatter options
    Format {
        #[serde(default)]
        formats: Vec<String>,
        #[serde(default)]
        options: Vec<String>,
    },

    /// A custom conversion registered by name
    Convert {
        conversion: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Directive {
    /// Mapped by the field's own name
    #[must_use]
    pub fn parsed() -> Self {
        Self::Parsed(ParsedDirective::default())
    }

    /// Mapped to a column position
    #[must_use]
    pub fn index(index: usize) -> Self {
        Self::Parsed(ParsedDirective::default().at_index(index))
    }

    /// Mapped to a column name other than the field name
    #[must_use]
    pub fn named(column: impl Into<String>) -> Self {
        Self::Parsed(ParsedDirective::default().named(column))
    }

    /// Directive name as written in YAML
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Parsed(_) => "parsed",
            Self::NullString { .. } => "null_string",
            Self::EnumOptions { .. } => "enum_options",
            Self::Trim { .. } => "trim",
            Self::LowerCase => "lower_case",
            Self::UpperCase => "upper_case",
            Self::Replace { .. } => "replace",
            Self::BooleanString { .. } => "boolean_string",
            Self::Format { .. } => "format",
            Self::Convert { .. } => "convert",
        }
    }

    /// The mapping directive, if this is one
    #[must_use]
    pub fn as_parsed(&self) -> Option<&ParsedDirective> {
        match self {
            Self::Parsed(parsed) => Some(parsed),
            _ => None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// The mapping directive of a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDirective {
    /// Column name override; empty or absent means the field name
    #[serde(default)]
    pub field: Option<String>,

    /// Column position; absent means bound by name
    #[serde(default)]
    pub index: Option<usize>,

    /// Text parsed as the field value when the column is null
    #[serde(default)]
    pub default_null_read: Option<String>,

    /// Text written when the field value is null
    #[serde(default)]
    pub default_null_write: Option<String>,

    /// Whether the type-driven default conversion is appended
    #[serde(default = "default_true")]
    pub apply_default_conversion: bool,
}

impl Default for ParsedDirective {
    fn default() -> Self {
        Self {
            field: None,
            index: None,
            default_null_read: None,
            default_null_write: None,
            apply_default_conversion: true,
        }
    }
}

impl ParsedDirective {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn named(mut self, column: impl Into<String>) -> Self {
        self.field = Some(column.into());
        self
    }

    #[must_use]
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    #[must_use]
    pub fn null_read(mut self, text: impl Into<String>) -> Self {
        self.default_null_read = Some(text.into());
        self
    }

    #[must_use]
    pub fn null_write(mut self, text: impl Into<String>) -> Self {
        self.default_null_write = Some(text.into());
        self
    }

    #[must_use]
    pub fn without_default_conversion(mut self) -> Self {
        self.apply_default_conversion = false;
        self
    }

    /// Null-read text with the `null` literal applied: `null` means no
    /// default and `'null'` stands for the text "null".
    #[must_use]
    pub fn null_read_value(&self) -> Option<&str> {
        null_literal(self.default_null_read.as_deref())
    }

    /// Null-write text, with the same literal rules as
    /// [`ParsedDirective::null_read_value`]
    #[must_use]
    pub fn null_write_value(&self) -> Option<String> {
        null_literal(self.default_null_write.as_deref()).map(str::to_string)
    }

    /// Column name for a field, falling back to the field name
    #[must_use]
    pub fn column_name(&self, field_name: &str) -> String {
        match self.field.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => field_name.to_string(),
        }
    }
}

fn null_literal(text: Option<&str>) -> Option<&str> {
    match text {
        Some("null") => None,
        Some("'null'") => Some("null"),
        other => other,
    }
}

impl From<ParsedDirective> for Directive {
    fn from(parsed: ParsedDirective) -> Self {
        Self::Parsed(parsed)
    }
}

/// Header names declared for a type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadersDirective {
    /// Header names in column order
    #[serde(default)]
    pub sequence: Vec<String>,

    /// Whether headers are extracted from the input when reading
    #[serde(default = "default_true")]
    pub extract: bool,

    /// Whether headers are written to the output
    #[serde(default = "default_true")]
    pub write: bool,
}

impl HeadersDirective {
    pub fn new<I, S>(sequence: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sequence: sequence.into_iter().map(Into::into).collect(),
            extract: true,
            write: true,
        }
    }
}

/// Directives for one field in a [`DirectiveFile`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDirectives {
    pub field: String,
    #[serde(default)]
    pub directives: Vec<Directive>,
}

/// A YAML document declaring the directives of a type
///
/// ```yaml
/// type: Person
/// headers:
///   sequence: [name, age]
/// fields:
///   - field: name
///     directives:
///       - directive: parsed
///       - directive: trim
///   - field: age
///     directives:
///       - directive: parsed
///         index: 1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectiveFile {
    /// Name of the type the directives belong to
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,

    #[serde(default)]
    pub headers: Option<HeadersDirective>,

    #[serde(default)]
    pub fields: Vec<FieldDirectives>,
}

impl DirectiveFile {
    /// Parse a directive file from YAML
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the YAML is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| {
            let location = e
                .location()
                .map(|l| format!(" at line {}, column {}", l.line(), l.column()))
                .unwrap_or_default();
            Error::configuration_caused_by(format!("Invalid directive file{location}"), e)
        })
    }

    /// Parse a directive file from disk
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file cannot be read or parsed.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::configuration_caused_by(
                format!("Failed to read directive file {}", path.display()),
                e,
            )
        })?;
        Self::from_yaml_str(&content)
    }

    /// Serialize back to YAML
    ///
    /// # Errors
    ///
    /// Returns a configuration error when serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::configuration_caused_by("Failed to serialize directives", e))
    }
}
