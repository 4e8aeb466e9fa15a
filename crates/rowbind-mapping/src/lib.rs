#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

//! # rowbind-mapping
//!
//! Binds flat records to typed objects.
//!
//! A [`TypeDescriptor`] lists the fields of a target type with their
//! directives and accessors. The [`resolver`] turns it into [`Binding`]s, the
//! [`reconciler`] places those bindings on the positions of a concrete column
//! layout, and the [`RecordMaterializer`] converts rows to objects and back.
//!
//! ```rust
//! use rowbind_mapping::{
//!     Accessor, ColumnLayout, Directive, FieldDescriptor, FieldType, RecordMaterializer,
//!     TypeDescriptor,
//! };
//! use rowbind_value::{Value, ValueKind};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: i32,
//! }
//!
//! let descriptor = TypeDescriptor::new("Person")
//!     .with_default_constructor()
//!     .field(
//!         FieldDescriptor::new(
//!             "name",
//!             FieldType::of(ValueKind::String),
//!             Accessor::typed(|p: &Person| p.name.clone(), |p, v| p.name = v),
//!         )
//!         .with_directive(Directive::parsed()),
//!     )
//!     .field(
//!         FieldDescriptor::new(
//!             "age",
//!             FieldType::of(ValueKind::Integer),
//!             Accessor::typed(|p: &Person| p.age, |p, v| p.age = v),
//!         )
//!         .with_directive(Directive::index(1)),
//!     );
//!
//! let mut materializer = RecordMaterializer::new(descriptor);
//! let layout = ColumnLayout::new().with_headers(["name", "age"]);
//! let person = materializer
//!     .to_object(&[Value::from("Alice"), Value::from("30")], &layout)
//!     .unwrap();
//! assert_eq!(person, Person { name: "Alice".into(), age: 30 });
//! ```

pub mod binding;
pub mod config;
pub mod descriptor;
pub mod directive;
pub mod handler;
pub mod materializer;
pub mod reconciler;
pub mod resolver;
pub mod selector;
pub mod validator;

pub use binding::Binding;
pub use config::MaterializerConfig;
pub use descriptor::{
    Accessor, FieldDescriptor, FieldType, InterfaceDescriptor, Mapped, TypeDescriptor,
};
pub use directive::{Directive, DirectiveFile, FieldDirectives, HeadersDirective, ParsedDirective};
pub use handler::{ErrorHandler, LogErrorHandler};
pub use materializer::{MaterializerState, RecordMaterializer};
pub use reconciler::{ColumnLayout, HeaderReconciler, ReconcileMode, SlotTable, reconcile};
pub use resolver::{
    all_fields_index_based, all_fields_name_based, derive_header_names, resolve,
    selected_indexes,
};
pub use selector::{default_conversion, select_conversion};
pub use validator::validate_bindings;

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while binding records to typed objects
#[derive(Error, Debug)]
pub enum Error {
    /// A directive is invalid for its field or conflicts with another one
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// A directive does not fit the runtime type of its field
    #[error("Runtime type error: {0}")]
    RuntimeType(String),

    /// The target type could not be constructed
    #[error("Unable to instantiate {type_name}: {message}")]
    Instantiation { type_name: String, message: String },

    /// A value could not be converted for a field
    #[error("Error converting value of field '{field}'{}: {message}", describe_column(.column))]
    Conversion {
        column: Option<usize>,
        field: String,
        message: String,
        fatal: bool,
        #[source]
        source: Option<rowbind_conversions::Error>,
    },

    /// A field accessor failed to read or write a value
    #[error("Cannot access field '{field}': {message}")]
    Access { field: String, message: String },
}

fn describe_column(column: &Option<usize>) -> String {
    column.map_or_else(String::new, |c| format!(" at column {c}"))
}

impl Error {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error caused by another error
    pub fn configuration_caused_by(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a runtime type error
    pub fn runtime_type(message: impl Into<String>) -> Self {
        Self::RuntimeType(message.into())
    }

    /// Create an instantiation error
    pub fn instantiation(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Instantiation {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create an accessor error
    pub fn access(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Access {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a fatal conversion error for a field at a column
    pub fn conversion(
        column: Option<usize>,
        field: impl Into<String>,
        source: rowbind_conversions::Error,
    ) -> Self {
        Self::Conversion {
            column,
            field: field.into(),
            message: source.to_string(),
            fatal: true,
            source: Some(source),
        }
    }

    /// Prefix the message with where the error happened, keeping its category
    #[must_use]
    pub fn with_context(self, context: &str) -> Self {
        match self {
            Self::Configuration { message, source } => Self::Configuration {
                message: format!("Error processing {context}. {message}"),
                source,
            },
            Self::RuntimeType(message) => {
                Self::RuntimeType(format!("Error processing {context}. {message}"))
            }
            Self::Instantiation { type_name, message } => Self::Instantiation {
                type_name,
                message: format!("{context}: {message}"),
            },
            Self::Conversion {
                column,
                field,
                message,
                fatal,
                source,
            } => Self::Conversion {
                column,
                field,
                message: format!("{context}: {message}"),
                fatal,
                source,
            },
            Self::Access { field, message } => Self::Access {
                field,
                message: format!("{context}: {message}"),
            },
        }
    }

    /// Fill in the field name of an accessor or conversion error that lacks one
    #[must_use]
    pub fn for_field(self, name: &str) -> Self {
        match self {
            Self::Access { field, message } if field.is_empty() => Self::Access {
                field: name.to_string(),
                message,
            },
            Self::Conversion {
                column,
                field,
                message,
                fatal,
                source,
            } if field.is_empty() => Self::Conversion {
                column,
                field: name.to_string(),
                message,
                fatal,
                source,
            },
            other => other,
        }
    }

    /// Turn the error into a non-fatal conversion error.
    ///
    /// Used on the write path, where a record that cannot be written is
    /// reported to the error handler and skipped.
    #[must_use]
    pub fn mark_non_fatal(self) -> Self {
        match self {
            Self::Conversion {
                column,
                field,
                message,
                source,
                ..
            } => Self::Conversion {
                column,
                field,
                message,
                fatal: false,
                source,
            },
            Self::Access { field, message } => Self::Conversion {
                column: None,
                field,
                message,
                fatal: false,
                source: None,
            },
            other => Self::Conversion {
                column: None,
                field: String::new(),
                message: other.to_string(),
                fatal: false,
                source: None,
            },
        }
    }

    /// Whether the error aborts the operation that raised it
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Conversion { fatal: false, .. })
    }

    /// Whether the error comes from setup rather than from a data value
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}

impl From<rowbind_conversions::Error> for Error {
    fn from(e: rowbind_conversions::Error) -> Self {
        if e.is_configuration() {
            let message = match &e {
                rowbind_conversions::Error::Configuration(message) => message.clone(),
                other => other.to_string(),
            };
            Self::Configuration {
                message,
                source: Some(Box::new(e)),
            }
        } else {
            Self::conversion(None, String::new(), e)
        }
    }
}

/// Result type alias for mapping operations
pub type Result<T> = std::result::Result<T, Error>;
