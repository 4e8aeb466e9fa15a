#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

//! # rowbind-value
//!
//! Typed values exchanged between record parsers and mapped types.
//!
//! A parser produces rows of strings. Conversions turn those strings into
//! typed [`Value`]s, and field accessors move typed values in and out of
//! user structs through [`FromValue`] and `From<T> for Value`.

/// Value kind tags used to describe conversion inputs and outputs.
pub mod kind;
/// Row helpers for building and rendering rows of values.
pub mod row;
/// The value model itself plus typed extraction.
pub mod value;

pub use kind::ValueKind;
pub use row::{Row, row_from_fields, row_from_strs, row_to_strings};
pub use value::{FromValue, Value};

use thiserror::Error;

/// Errors that can occur when working with values
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Value out of range for {target}: {value}")]
    OutOfRange { target: String, value: String },
}

impl Error {
    /// Build a type-mismatch error from the expected and found kinds.
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Build an out-of-range error for a numeric narrowing.
    pub fn out_of_range(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::OutOfRange {
            target: target.into(),
            value: value.into(),
        }
    }
}

/// Crate-local result type for value operations.
pub type Result<T> = std::result::Result<T, Error>;
