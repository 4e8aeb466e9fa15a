//! CSV configuration options

use rowbind_mapping::MaterializerConfig;
use serde::{Deserialize, Serialize};

/// Configuration for reading and writing mapped records as CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field delimiter character (default: comma)
    pub delimiter: char,
    /// Quote character for fields containing special characters (default: double quote)
    pub quote_char: char,
    /// Escape character for quotes (default: quotes are doubled)
    pub escape_char: Option<char>,
    /// Whether the first row holds the headers (default: true)
    pub has_header: bool,
    /// How null values appear in the file (default: empty string)
    pub null_representation: NullRepresentation,
    /// Record terminator used when writing (default: CRLF)
    pub record_terminator: RecordTerminator,
    /// Columns to process; all columns when absent
    pub selected_columns: Option<ColumnSelection>,
    /// Whether rows are compacted to the selected columns, in selection order
    pub reorder_columns: bool,
    /// Whether a header row is written (default: true)
    pub write_header: bool,
    /// Header names used when writing; derived from the type when absent
    pub headers: Option<Vec<String>>,
    /// Settings passed on to the materializer
    pub materializer: MaterializerConfig,
}

/// How null values appear in the file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullRepresentation {
    /// Empty string (default)
    EmptyString,
    /// The string "NULL"
    NullString,
    /// The string "\\N"
    BackslashN,
    /// Custom string representation
    Custom(String),
}

impl NullRepresentation {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::EmptyString => "",
            Self::NullString => "NULL",
            Self::BackslashN => "\\N",
            Self::Custom(s) => s,
        }
    }
}

/// Record terminator for writing CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordTerminator {
    /// CRLF (Windows-style, default for RFC 4180)
    CRLF,
    /// LF (Unix-style)
    LF,
}

impl RecordTerminator {
    pub(crate) fn to_csv(self) -> csv::Terminator {
        match self {
            Self::CRLF => csv::Terminator::CRLF,
            Self::LF => csv::Terminator::Any(b'\n'),
        }
    }
}

/// Columns selected for processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnSelection {
    Names(Vec<String>),
    Indexes(Vec<usize>),
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote_char: '"',
            escape_char: None,
            has_header: true,
            null_representation: NullRepresentation::EmptyString,
            record_terminator: RecordTerminator::CRLF,
            selected_columns: None,
            reorder_columns: false,
            write_header: true,
            headers: None,
            materializer: MaterializerConfig::default(),
        }
    }
}

impl CsvConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delimiter character
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the quote character
    pub fn quote_char(mut self, quote_char: char) -> Self {
        self.quote_char = quote_char;
        self
    }

    /// Set the escape character
    pub fn escape_char(mut self, escape_char: char) -> Self {
        self.escape_char = Some(escape_char);
        self
    }

    /// Configure header presence
    pub fn has_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Disable header row
    pub fn without_header(mut self) -> Self {
        self.has_header = false;
        self
    }

    /// Set null representation
    pub fn null_representation(mut self, null_rep: NullRepresentation) -> Self {
        self.null_representation = null_rep;
        self
    }

    /// Set record terminator
    pub fn record_terminator(mut self, terminator: RecordTerminator) -> Self {
        self.record_terminator = terminator;
        self
    }

    /// Process only the named columns
    pub fn select_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_columns = Some(ColumnSelection::Names(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Process only the columns at these positions
    pub fn select_indexes(mut self, indexes: impl IntoIterator<Item = usize>) -> Self {
        self.selected_columns = Some(ColumnSelection::Indexes(indexes.into_iter().collect()));
        self
    }

    /// Compact rows to the selected columns, in selection order
    pub fn reorder_columns(mut self, reorder: bool) -> Self {
        self.reorder_columns = reorder;
        self
    }

    /// Configure header writing
    pub fn write_header(mut self, write_header: bool) -> Self {
        self.write_header = write_header;
        self
    }

    /// Header names for writing
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Fail when a name-bound field is missing from the headers
    pub fn strict_header_validation(mut self, strict: bool) -> Self {
        self.materializer.strict_header_validation = strict;
        self
    }

    /// Convert delimiter to u8 for csv crate
    pub fn delimiter_u8(&self) -> u8 {
        self.delimiter as u8
    }

    /// Convert quote char to u8 for csv crate
    pub fn quote_char_u8(&self) -> u8 {
        self.quote_char as u8
    }

    /// Get escape character as u8, or use quote char if not set
    pub fn escape_char_u8(&self) -> u8 {
        self.escape_char
            .map(|c| c as u8)
            .unwrap_or(self.quote_char as u8)
    }

    /// Whether a text field stands for null
    pub fn is_null(&self, field: &str) -> bool {
        field == self.null_representation.as_str()
    }
}
