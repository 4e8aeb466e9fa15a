#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

//! # rowbind-conversions
//!
//! Bidirectional value conversions for mapped records.
//!
//! A [`Conversion`] turns a column value into a field value (`execute`, used
//! when reading) and back (`revert`, used when writing). Conversions are
//! chained per field; the [`pipeline`] module runs chains over single values
//! and whole rows.

pub mod conversions;
pub mod format;
pub mod pipeline;
pub mod properties;
pub mod registry;

pub use conversions::{
    BooleanConversion, CaseConversion, DateConversion, EnumConstant, EnumConversion,
    EnumSelector, EnumType, FormattedNumberConversion, NullStringConversion,
    RegexReplaceConversion, TrimConversion, TypedConversion,
};
pub use format::{DateFormatter, NumberFormatter, apply_format_options};
pub use pipeline::{ChainFailure, ConversionPipeline};
pub use properties::{
    Configurable, CurrencyCode, NumberSymbols, PropertyDescriptor, PropertyKind, PropertyValue,
    apply_format_settings,
};
pub use registry::{ConversionFactory, ConversionRegistry};

use rowbind_value::{Value, ValueKind};
use thiserror::Error;

/// Errors that can occur while building or running conversions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The conversion cannot be built with the given settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A value could not be converted
    #[error("Cannot convert '{value}': {message}")]
    Conversion { value: String, message: String },

    /// A formatter property could not be found or set
    #[error("Property error on {target}: {message}")]
    Property { target: String, message: String },

    /// A registered custom conversion factory failed
    #[error("Unexpected error instantiating custom conversion '{name}': {source}")]
    Instantiation {
        name: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a conversion error for an input value
    pub fn conversion(value: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create a property error for a formatter type
    pub fn property(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Property {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Whether the error comes from setup rather than from a data value
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Conversion { .. })
    }
}

impl From<rowbind_value::Error> for Error {
    fn from(e: rowbind_value::Error) -> Self {
        Self::Conversion {
            value: String::new(),
            message: e.to_string(),
        }
    }
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

/// A bidirectional value transform.
///
/// `execute` runs on read (column value to field value) and `revert` runs on
/// write. Each conversion handles `Null` itself, substituting its configured
/// null-read or null-write value.
pub trait Conversion: Send + Sync + std::fmt::Debug {
    /// Convert a column value into a field value.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be converted.
    fn execute(&self, input: Value) -> Result<Value>;

    /// Convert a field value back into a column value.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be converted.
    fn revert(&self, input: Value) -> Result<Value>;

    /// Kind produced by [`Conversion::execute`].
    fn execute_kind(&self) -> ValueKind;

    /// Kind produced by [`Conversion::revert`].
    fn revert_kind(&self) -> ValueKind;

    /// Access to the formatter objects, for conversions that have any.
    fn as_formatted(&mut self) -> Option<&mut dyn FormattedConversion> {
        None
    }
}

/// A conversion backed by one or more configurable formatter objects
pub trait FormattedConversion {
    /// The formatters, in the order they are tried when parsing.
    fn formatter_objects(&mut self) -> Vec<&mut dyn Configurable>;
}

/// An ordered chain of conversions for one field
pub type ConversionChain = Vec<Box<dyn Conversion>>;

/// Text of a non-null input, for conversions that work on strings
pub(crate) fn input_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
