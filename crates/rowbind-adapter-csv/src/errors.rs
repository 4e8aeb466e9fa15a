//! Error types for the CSV adapter with line context

use thiserror::Error;

/// Errors that can occur when reading or writing mapped records as CSV
#[derive(Error, Debug)]
pub enum CsvError {
    /// CSV read error with context
    #[error("CSV read error at line {line}: {message}")]
    Read { line: usize, message: String },

    /// CSV write error
    #[error("CSV write error: {0}")]
    Write(String),

    /// A record could not be mapped
    #[error("Mapping error at line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: rowbind_mapping::Error,
    },

    /// Mapping failure not tied to a record
    #[error("Mapping error: {0}")]
    Mapping(#[from] rowbind_mapping::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CsvError {
    /// Create a read error at a specific line
    pub fn read_at(line: usize, message: impl Into<String>) -> Self {
        Self::Read {
            line,
            message: message.into(),
        }
    }

    /// Wrap a mapping error raised for the record at `line`
    pub fn record(line: usize, source: rowbind_mapping::Error) -> Self {
        Self::Record { line, source }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a write error
    pub fn write(message: impl Into<String>) -> Self {
        Self::Write(message.into())
    }

    /// Get the line number if available
    pub fn line_number(&self) -> Option<usize> {
        match self {
            Self::Read { line, .. } | Self::Record { line, .. } if *line > 0 => Some(*line),
            _ => None,
        }
    }

    /// The mapping error behind this error, if any
    pub fn mapping_error(&self) -> Option<&rowbind_mapping::Error> {
        match self {
            Self::Record { source, .. } => Some(source),
            Self::Mapping(source) => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CsvError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<csv::Error> for CsvError {
    fn from(e: csv::Error) -> Self {
        let line = e.position().map_or(0, |p| p.line() as usize);
        Self::read_at(line, e.to_string())
    }
}

/// Result type alias for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;
