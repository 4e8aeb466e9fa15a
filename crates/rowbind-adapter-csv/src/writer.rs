//! CSV writer for mapped records

use crate::config::CsvConfig;
use crate::errors::{CsvError, CsvResult};
use crate::reader::resolve_selection;
use rowbind_mapping::{RecordMaterializer, derive_header_names};
use std::io::Write;
use std::path::Path;
use tracing::{debug, trace};

/// Outcome of a write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Records written as rows
    pub written: usize,
    /// Records the materializer could not write; each was reported to its
    /// error handler
    pub skipped: usize,
}

/// Writes instances of a mapped type as CSV rows
#[derive(Debug, Clone, Default)]
pub struct CsvRecordWriter {
    config: CsvConfig,
}

/// Header names for the output and whether they go into the file
struct OutputHeaders {
    names: Option<Vec<String>>,
    write: bool,
}

impl CsvRecordWriter {
    /// Create a new CSV writer with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new CSV writer with custom configuration
    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    fn csv_writer<W: Write>(&self, writer: W) -> csv::Writer<W> {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.config.delimiter_u8())
            .quote(self.config.quote_char_u8())
            .terminator(self.config.record_terminator.to_csv())
            .flexible(true);
        if self.config.escape_char.is_some() {
            builder
                .escape(self.config.escape_char_u8())
                .double_quote(false);
        }
        builder.from_writer(writer)
    }

    /// Write `records` to `writer`.
    ///
    /// Headers come from the configuration, else from the header set the
    /// type declares, else from the names of its bindings. With none of
    /// these the materializer lays out columns itself and the header row
    /// follows that layout.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Mapping`] when the type's bindings are invalid,
    /// [`CsvError::Config`] for a column selection that cannot be resolved
    /// and [`CsvError::Write`] when the output cannot be written. Records
    /// that fail to convert are skipped and counted instead.
    pub fn write<T, W>(
        &self,
        materializer: &mut RecordMaterializer<T>,
        writer: W,
        records: &[T],
    ) -> CsvResult<WriteSummary>
    where
        T: 'static,
        W: Write,
    {
        materializer.initialize()?;
        let headers = self.output_headers(materializer)?;
        let indexes = resolve_selection(self.config.selected_columns.as_ref(), headers.names.as_deref())?;

        let mut csv_writer = self.csv_writer(writer);
        let mut header_pending = headers.write;
        if header_pending {
            if let Some(names) = &headers.names {
                self.write_fields(&mut csv_writer, names.iter().map(String::as_str))?;
                header_pending = false;
            }
        }

        let mut summary = WriteSummary::default();
        for record in records {
            let row = materializer.to_record(Some(record), headers.names.as_deref(), indexes.as_deref())?;
            if header_pending {
                if let Some(names) = materializer.synthetic_headers() {
                    let names = names.to_vec();
                    self.write_fields(&mut csv_writer, names.iter().map(String::as_str))?;
                }
                header_pending = false;
            }
            let Some(row) = row else {
                summary.skipped += 1;
                continue;
            };
            let fields = rowbind_value::row_to_strings(&row);
            self.write_fields(
                &mut csv_writer,
                fields
                    .iter()
                    .map(|f| f.as_deref().unwrap_or(self.config.null_representation.as_str())),
            )?;
            trace!(row = ?fields, "Wrote CSV row");
            summary.written += 1;
        }

        csv_writer
            .flush()
            .map_err(|e| CsvError::write(e.to_string()))?;

        debug!(
            record_count = summary.written,
            skipped = summary.skipped,
            "Finished writing CSV"
        );
        Ok(summary)
    }

    /// Write `records` to a new file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Io`] when the file cannot be created, otherwise
    /// the errors of [`CsvRecordWriter::write`].
    pub fn write_path<T: 'static>(
        &self,
        materializer: &mut RecordMaterializer<T>,
        path: impl AsRef<Path>,
        records: &[T],
    ) -> CsvResult<WriteSummary> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write(materializer, std::io::BufWriter::new(file), records)
    }

    fn output_headers<T: 'static>(&self, materializer: &RecordMaterializer<T>) -> CsvResult<OutputHeaders> {
        let enabled = self.config.write_header;
        if let Some(names) = &self.config.headers {
            return Ok(OutputHeaders {
                names: Some(names.clone()),
                write: enabled,
            });
        }
        if let Some(declared) = materializer
            .descriptor()
            .find_headers()
            .filter(|h| !h.sequence.is_empty())
        {
            return Ok(OutputHeaders {
                names: Some(declared.sequence.clone()),
                write: enabled && declared.write,
            });
        }
        let derived = derive_header_names(materializer.descriptor())?;
        Ok(OutputHeaders {
            names: (!derived.is_empty()).then_some(derived),
            write: enabled,
        })
    }

    fn write_fields<'a, W: Write>(
        &self,
        csv_writer: &mut csv::Writer<W>,
        fields: impl IntoIterator<Item = &'a str>,
    ) -> CsvResult<()> {
        csv_writer
            .write_record(fields)
            .map_err(|e| CsvError::write(e.to_string()))
    }
}
