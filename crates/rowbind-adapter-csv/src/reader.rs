//! CSV reader that materializes mapped records

use crate::config::{ColumnSelection, CsvConfig};
use crate::errors::{CsvError, CsvResult};
use rowbind_mapping::{ColumnLayout, RecordMaterializer};
use rowbind_value::{Row, Value};
use std::io::Read;
use std::path::Path;
use tracing::{debug, trace};

/// Reads CSV rows into instances of a mapped type
#[derive(Debug, Clone, Default)]
pub struct CsvRecordReader {
    config: CsvConfig,
}

impl CsvRecordReader {
    /// Create a new CSV reader with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new CSV reader with custom configuration
    pub fn with_config(config: CsvConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    fn csv_reader<R: Read>(&self, reader: R) -> csv::Reader<R> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(self.config.delimiter_u8())
            .quote(self.config.quote_char_u8())
            .has_headers(self.config.has_header)
            .flexible(true);
        if self.config.escape_char.is_some() {
            builder
                .escape(Some(self.config.escape_char_u8()))
                .double_quote(false);
        }
        builder.from_reader(reader)
    }

    /// Read every record from `reader`.
    ///
    /// The first failing record stops the read; its line number is carried
    /// by the returned error.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Read`] for malformed CSV, [`CsvError::Config`]
    /// for a column selection that cannot be resolved, and
    /// [`CsvError::Record`] for a record that cannot be mapped.
    pub fn read<T, R>(&self, materializer: &mut RecordMaterializer<T>, reader: R) -> CsvResult<Vec<T>>
    where
        T: 'static,
        R: Read,
    {
        materializer.set_strict_header_validation(self.config.materializer.strict_header_validation);
        let mut csv_reader = self.csv_reader(reader);

        let headers = self.headers(materializer, &mut csv_reader)?;
        let selected = self.selected_indexes(headers.as_deref())?;
        let reordered = self.config.reorder_columns && selected.is_some();

        let mut layout = ColumnLayout::new().reordered(reordered);
        layout.headers = headers;
        layout.selected_indexes = selected.clone();

        let mut records = Vec::new();
        for (i, result) in csv_reader.records().enumerate() {
            let record = result?;
            let line = record
                .position()
                .map_or(i + 1, |p| p.line() as usize);
            let row = self.to_row(&record, selected.as_deref(), reordered);
            trace!(line, fields = row.len(), "Read CSV row");

            let instance = materializer
                .to_object(&row, &layout)
                .map_err(|e| CsvError::record(line, e))?;
            records.push(instance);
        }

        debug!(record_count = records.len(), "Finished reading CSV");
        Ok(records)
    }

    /// Read every record from the file at `path`
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Io`] when the file cannot be opened, otherwise
    /// the errors of [`CsvRecordReader::read`].
    pub fn read_path<T: 'static>(
        &self,
        materializer: &mut RecordMaterializer<T>,
        path: impl AsRef<Path>,
    ) -> CsvResult<Vec<T>> {
        let file = std::fs::File::open(path.as_ref())?;
        self.read(materializer, std::io::BufReader::new(file))
    }

    /// Headers from the file, unless the type asks for its declared
    /// sequence instead.
    fn headers<T: 'static, R: Read>(
        &self,
        materializer: &RecordMaterializer<T>,
        csv_reader: &mut csv::Reader<R>,
    ) -> CsvResult<Option<Vec<String>>> {
        let declared = materializer.descriptor().find_headers();
        if let Some(declared) = declared.filter(|h| !h.extract || !self.config.has_header) {
            if !declared.sequence.is_empty() {
                return Ok(Some(declared.sequence.clone()));
            }
        }
        if !self.config.has_header {
            return Ok(None);
        }
        let headers = csv_reader
            .headers()
            .map_err(|e| CsvError::read_at(1, e.to_string()))?;
        debug!(columns = headers.len(), "Extracted CSV headers");
        Ok(Some(headers.iter().map(str::to_string).collect()))
    }

    fn selected_indexes(&self, headers: Option<&[String]>) -> CsvResult<Option<Vec<usize>>> {
        resolve_selection(self.config.selected_columns.as_ref(), headers)
    }

    fn to_row(&self, record: &csv::StringRecord, selected: Option<&[usize]>, reordered: bool) -> Row {
        let field = |i: usize| match record.get(i) {
            Some(text) if !self.config.is_null(text) => Value::String(text.to_string()),
            _ => Value::Null,
        };
        match selected {
            Some(selected) if reordered => selected.iter().map(|&i| field(i)).collect(),
            Some(selected) => (0..record.len())
                .map(|i| if selected.contains(&i) { field(i) } else { Value::Null })
                .collect(),
            None => (0..record.len()).map(field).collect(),
        }
    }
}

/// Turn a column selection into positions within the full row.
pub(crate) fn resolve_selection(
    selection: Option<&ColumnSelection>,
    headers: Option<&[String]>,
) -> CsvResult<Option<Vec<usize>>> {
    match selection {
        None => Ok(None),
        Some(ColumnSelection::Indexes(indexes)) => Ok(Some(indexes.clone())),
        Some(ColumnSelection::Names(names)) => {
            let headers = headers.ok_or_else(|| {
                CsvError::config("Columns selected by name require headers")
            })?;
            names
                .iter()
                .map(|name| {
                    headers
                        .iter()
                        .position(|h| h.trim() == name)
                        .ok_or_else(|| {
                            CsvError::config(format!("Selected column '{name}' not found in headers"))
                        })
                })
                .collect::<CsvResult<Vec<_>>>()
                .map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NullRepresentation;
    use rowbind_mapping::{Accessor, Directive, FieldDescriptor, FieldType, TypeDescriptor};
    use rowbind_value::ValueKind;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Person {
        name: String,
        age: i32,
    }

    fn materializer() -> RecordMaterializer<Person> {
        RecordMaterializer::new(
            TypeDescriptor::new("Person")
                .with_default_constructor()
                .field(
                    FieldDescriptor::new(
                        "name",
                        FieldType::of(ValueKind::String),
                        Accessor::typed(|p: &Person| p.name.clone(), |p, v| p.name = v),
                    )
                    .with_directive(Directive::parsed()),
                )
                .field(
                    FieldDescriptor::new(
                        "age",
                        FieldType::of(ValueKind::Integer),
                        Accessor::typed(|p: &Person| p.age, |p, v| p.age = v),
                    )
                    .with_directive(Directive::parsed()),
                ),
        )
    }

    #[test]
    fn test_read_with_header() {
        let data = "name,age\nAlice,30\nBob,25\n";
        let people = CsvRecordReader::new()
            .read(&mut materializer(), data.as_bytes())
            .unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[0], Person { name: "Alice".into(), age: 30 });
        assert_eq!(people[1].age, 25);
    }

    #[test]
    fn test_read_with_columns_swapped() {
        let data = "age,name\n30,Alice\n";
        let people = CsvRecordReader::new()
            .read(&mut materializer(), data.as_bytes())
            .unwrap();
        assert_eq!(people[0], Person { name: "Alice".into(), age: 30 });
    }

    #[test]
    fn test_custom_delimiter() {
        let config = CsvConfig::new().delimiter(';');
        let data = "name;age\nCarol;41\n";
        let people = CsvRecordReader::with_config(config)
            .read(&mut materializer(), data.as_bytes())
            .unwrap();
        assert_eq!(people[0], Person { name: "Carol".into(), age: 41 });
    }

    #[test]
    fn test_row_nulls_and_selection() {
        let reader = CsvRecordReader::with_config(
            CsvConfig::new().null_representation(NullRepresentation::NullString),
        );
        let record = csv::StringRecord::from(vec!["a", "NULL", "c"]);
        assert_eq!(
            reader.to_row(&record, None, false),
            vec![Value::from("a"), Value::Null, Value::from("c")]
        );
        assert_eq!(
            reader.to_row(&record, Some(&[2, 0][..]), false),
            vec![Value::from("a"), Value::Null, Value::from("c")]
        );
        assert_eq!(
            reader.to_row(&record, Some(&[2][..]), false),
            vec![Value::Null, Value::Null, Value::from("c")]
        );
        assert_eq!(
            reader.to_row(&record, Some(&[2, 0][..]), true),
            vec![Value::from("c"), Value::from("a")]
        );
    }

    #[test]
    fn test_empty_input() {
        let people = CsvRecordReader::new()
            .read(&mut materializer(), "name,age\n".as_bytes())
            .unwrap();
        assert!(people.is_empty());
    }

    #[test]
    fn test_empty_cells_read_as_defaults() {
        let data = "name,age\n,30\nDan,\n";
        let people = CsvRecordReader::new()
            .read(&mut materializer(), data.as_bytes())
            .unwrap();
        assert_eq!(people[0], Person { name: String::new(), age: 30 });
        assert_eq!(people[1], Person { name: "Dan".into(), age: 0 });
    }

    #[test]
    fn test_mapping_error_carries_line() {
        let data = "name,age\nAlice,30\nBob,old\n";
        let err = CsvRecordReader::new()
            .read(&mut materializer(), data.as_bytes())
            .unwrap_err();
        assert_eq!(err.line_number(), Some(3));
        assert!(err.to_string().contains("age"));
    }

    #[test]
    fn test_unknown_selected_column() {
        let config = CsvConfig::new().select_names(["email"]);
        let err = CsvRecordReader::with_config(config)
            .read(&mut materializer(), "name,age\nAlice,30\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, CsvError::Config(_)));
        assert!(err.to_string().contains("'email'"));
    }

    #[test]
    fn test_resolve_selection() {
        let headers = vec!["a".to_string(), " b ".to_string(), "c".to_string()];
        let selection = ColumnSelection::Names(vec!["c".into(), "b".into()]);
        assert_eq!(
            resolve_selection(Some(&selection), Some(&headers)).unwrap(),
            Some(vec![2, 1])
        );
        assert!(resolve_selection(Some(&selection), None).is_err());
        assert_eq!(resolve_selection(None, None).unwrap(), None);
    }
}
