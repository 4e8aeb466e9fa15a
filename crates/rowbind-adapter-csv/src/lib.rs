#![warn(rust_2018_idioms)]
#![warn(clippy::all)]

//! # rowbind-adapter-csv
//!
//! CSV adapter for reading and writing mapped records.
//!
//! Rows are parsed with the `csv` crate and handed to a
//! [`rowbind_mapping::RecordMaterializer`] together with the headers and
//! the column selection, so the materializer can place each field.
//!
//! ## Example Usage
//!
//! ```rust
//! use rowbind_adapter_csv::{CsvAdapter, CsvConfig};
//! use rowbind_mapping::{Accessor, Directive, FieldDescriptor, FieldType, RecordMaterializer, TypeDescriptor};
//! use rowbind_value::ValueKind;
//!
//! #[derive(Debug, Default)]
//! struct City {
//!     name: String,
//! }
//!
//! let mut materializer = RecordMaterializer::new(
//!     TypeDescriptor::new("City").with_default_constructor().field(
//!         FieldDescriptor::new(
//!             "name",
//!             FieldType::of(ValueKind::String),
//!             Accessor::typed(|c: &City| c.name.clone(), |c, v| c.name = v),
//!         )
//!         .with_directive(Directive::parsed()),
//!     ),
//! );
//!
//! let adapter = CsvAdapter::new().with_config(CsvConfig::new().delimiter(';'));
//! let cities = adapter.reader().read(&mut materializer, "name\nOslo\n".as_bytes()).unwrap();
//! assert_eq!(cities[0].name, "Oslo");
//! ```

pub mod config;
pub mod errors;
pub mod reader;
pub mod writer;

pub use config::{ColumnSelection, CsvConfig, NullRepresentation, RecordTerminator};
pub use errors::{CsvError, CsvResult};
pub use reader::CsvRecordReader;
pub use writer::{CsvRecordWriter, WriteSummary};

/// CSV adapter that combines reader and writer functionality
#[derive(Debug, Clone, Default)]
pub struct CsvAdapter {
    config: CsvConfig,
}

impl CsvAdapter {
    /// Create a new CSV adapter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create adapter with configuration
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Get a reader configured with this adapter's settings
    pub fn reader(&self) -> CsvRecordReader {
        CsvRecordReader::with_config(self.config.clone())
    }

    /// Get a writer configured with this adapter's settings
    pub fn writer(&self) -> CsvRecordWriter {
        CsvRecordWriter::with_config(self.config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowbind_mapping::{Accessor, Directive, FieldDescriptor, FieldType, RecordMaterializer, TypeDescriptor};
    use rowbind_value::ValueKind;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Pair {
        key: String,
        count: i64,
    }

    fn materializer() -> RecordMaterializer<Pair> {
        RecordMaterializer::new(
            TypeDescriptor::new("Pair")
                .with_default_constructor()
                .field(
                    FieldDescriptor::new(
                        "key",
                        FieldType::of(ValueKind::String),
                        Accessor::typed(|p: &Pair| p.key.clone(), |p, v| p.key = v),
                    )
                    .with_directive(Directive::parsed()),
                )
                .field(
                    FieldDescriptor::new(
                        "count",
                        FieldType::of(ValueKind::Long),
                        Accessor::typed(|p: &Pair| p.count, |p, v| p.count = v),
                    )
                    .with_directive(Directive::parsed()),
                ),
        )
    }

    #[test]
    fn test_csv_adapter_creation() {
        let adapter = CsvAdapter::new().with_config(CsvConfig::new().delimiter(';'));
        assert_eq!(adapter.config().delimiter, ';');
        assert_eq!(adapter.reader().config().delimiter, ';');
        assert_eq!(adapter.writer().config().delimiter, ';');
    }

    #[test]
    fn test_end_to_end_read_write() {
        let adapter = CsvAdapter::new()
            .with_config(CsvConfig::new().record_terminator(RecordTerminator::LF));
        let mut materializer = materializer();

        let data = "key,count\napples,3\npears,12\n";
        let pairs = adapter.reader().read(&mut materializer, data.as_bytes()).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], Pair { key: "pears".into(), count: 12 });

        let mut output = Vec::new();
        let summary = adapter.writer().write(&mut materializer, &mut output, &pairs).unwrap();
        assert_eq!(summary.written, 2);
        assert_eq!(String::from_utf8(output).unwrap(), data);
    }
}
