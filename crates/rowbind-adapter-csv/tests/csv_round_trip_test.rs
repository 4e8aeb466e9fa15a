//! Integration test: mapped records through CSV files
//!
//! Writes typed records to disk and reads them back, and exercises column
//! selection, declared header sets and the error paths with line numbers.

use chrono::NaiveDate;
use rowbind_adapter_csv::{CsvAdapter, CsvConfig, CsvError, NullRepresentation, RecordTerminator};
use rowbind_mapping::{
    Accessor, Directive, Error, FieldDescriptor, FieldType, HeadersDirective, ParsedDirective,
    RecordMaterializer, TypeDescriptor,
};
use rowbind_value::{Value, ValueKind};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone, PartialEq)]
struct Employee {
    name: String,
    salary: Decimal,
    hired: Option<NaiveDate>,
    active: bool,
}

fn employee() -> TypeDescriptor<Employee> {
    TypeDescriptor::new("Employee")
        .with_default_constructor()
        .field(
            FieldDescriptor::new(
                "name",
                FieldType::of(ValueKind::String),
                Accessor::typed(|e: &Employee| e.name.clone(), |e, v| e.name = v),
            )
            .with_directive(ParsedDirective::new().named("full_name"))
            .with_directive(Directive::Trim { max_length: None }),
        )
        .field(
            FieldDescriptor::new(
                "salary",
                FieldType::of(ValueKind::Decimal),
                Accessor::typed(|e: &Employee| e.salary, |e, v| e.salary = v),
            )
            .with_directive(ParsedDirective::new().null_read("0")),
        )
        .field(
            FieldDescriptor::new(
                "hired",
                FieldType::optional(ValueKind::Date),
                Accessor::typed(|e: &Employee| e.hired, |e, v| e.hired = v),
            )
            .with_directive(Directive::parsed())
            .with_directive(Directive::Format {
                formats: vec!["%Y/%m/%d".into()],
                options: Vec::new(),
            }),
        )
        .field(
            FieldDescriptor::new(
                "active",
                FieldType::of(ValueKind::Boolean),
                Accessor::typed(|e: &Employee| e.active, |e, v| e.active = v),
            )
            .with_directive(Directive::parsed())
            .with_directive(Directive::BooleanString {
                true_strings: vec!["yes".into()],
                false_strings: vec!["no".into()],
            }),
        )
}

fn staff() -> anyhow::Result<Vec<Employee>> {
    Ok(vec![
        Employee {
            name: "Ada".into(),
            salary: Decimal::from_str("5200.50")?,
            hired: NaiveDate::from_ymd_opt(2021, 3, 14),
            active: true,
        },
        Employee {
            name: "Grace".into(),
            salary: Decimal::from_str("6100")?,
            hired: None,
            active: false,
        },
    ])
}

fn lf_adapter() -> CsvAdapter {
    CsvAdapter::new().with_config(CsvConfig::new().record_terminator(RecordTerminator::LF))
}

#[test]
fn test_file_round_trip() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("staff.csv");
    let adapter = lf_adapter();
    let staff = staff()?;

    let summary = adapter
        .writer()
        .write_path(&mut RecordMaterializer::new(employee()), &path, &staff)?;
    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped, 0);

    let text = std::fs::read_to_string(&path)?;
    assert_eq!(
        text,
        "full_name,salary,hired,active\nAda,5200.50,2021/03/14,yes\nGrace,6100,,no\n"
    );

    let read = adapter
        .reader()
        .read_path(&mut RecordMaterializer::new(employee()), &path)?;
    assert_eq!(read, staff);
    Ok(())
}

#[test]
fn test_read_selected_columns_reordered() -> anyhow::Result<()> {
    let data = "id,full_name,dept,salary\n1,  Ada ,R&D,100\n2,Grace,Ops,\n";
    let adapter = CsvAdapter::new().with_config(
        CsvConfig::new()
            .select_names(["salary", "full_name"])
            .reorder_columns(true),
    );

    let read = adapter
        .reader()
        .read(&mut RecordMaterializer::new(employee()), data.as_bytes())?;
    assert_eq!(read.len(), 2);
    assert_eq!(read[0].name, "Ada");
    assert_eq!(read[0].salary, Decimal::from(100));
    // Empty salary takes the null-read default
    assert_eq!(read[1].salary, Decimal::ZERO);
    assert_eq!(read[1].hired, None);
    assert!(!read[1].active);
    Ok(())
}

#[test]
fn test_strict_header_validation_reports_missing_fields() {
    let data = "full_name,salary\nAda,1\n";
    let adapter = CsvAdapter::new().with_config(CsvConfig::new().strict_header_validation(true));
    let err = adapter
        .reader()
        .read(&mut RecordMaterializer::new(employee()), data.as_bytes())
        .unwrap_err();
    assert_eq!(err.line_number(), Some(2));
    let message = err.to_string();
    assert!(message.contains("Could not find fields [active, hired] in input"));
    assert!(message.contains("Names found: [full_name, salary]"));

    // Lenient reading leaves the missing fields at their defaults
    let read = CsvAdapter::new()
        .reader()
        .read(&mut RecordMaterializer::new(employee()), data.as_bytes())
        .unwrap();
    assert_eq!(read[0].hired, None);
}

#[test]
fn test_declared_headers_used_without_header_row() -> anyhow::Result<()> {
    let descriptor = employee().with_headers(HeadersDirective::new(["full_name", "salary", "active", "hired"]));
    let adapter = CsvAdapter::new().with_config(
        CsvConfig::new()
            .without_header()
            .null_representation(NullRepresentation::BackslashN),
    );

    let read = adapter.reader().read(
        &mut RecordMaterializer::new(descriptor),
        "Linus,42,yes,\\N\n".as_bytes(),
    )?;
    assert_eq!(read[0].name, "Linus");
    assert_eq!(read[0].salary, Decimal::from(42));
    assert!(read[0].active);
    assert_eq!(read[0].hired, None);
    Ok(())
}

#[test]
fn test_declared_headers_drive_writing() -> anyhow::Result<()> {
    let mut headers = HeadersDirective::new(["active", "full_name"]);
    headers.write = false;
    let mut materializer = RecordMaterializer::new(employee().with_headers(headers));

    let mut output = Vec::new();
    lf_adapter()
        .writer()
        .write(&mut materializer, &mut output, &staff()?)?;
    assert_eq!(String::from_utf8(output)?, "yes,Ada\nno,Grace\n");
    Ok(())
}

#[test]
fn test_conversion_failure_names_line_and_field() {
    let data = "full_name,salary,hired,active\nAda,1,2020/01/01,yes\nGrace,2,2020/01/02,maybe\n";
    let err = CsvAdapter::new()
        .reader()
        .read(&mut RecordMaterializer::new(employee()), data.as_bytes())
        .unwrap_err();
    assert!(matches!(err, CsvError::Record { line: 3, .. }));
    assert!(matches!(
        err.mapping_error(),
        Some(Error::Conversion { field, .. }) if field == "active"
    ));
}

#[test]
fn test_unwritable_records_are_skipped() -> anyhow::Result<()> {
    let descriptor = employee().field(
        FieldDescriptor::new(
            "badge",
            FieldType::of(ValueKind::String),
            Accessor::new(
                |e: &Employee| {
                    if e.active {
                        Ok(Value::from("B-1"))
                    } else {
                        Err(Error::access("", "badge revoked"))
                    }
                },
                |_, _| Ok(()),
            ),
        )
        .with_directive(Directive::parsed()),
    );
    let reported = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let mut materializer = RecordMaterializer::new(descriptor).with_error_handler(
        move |e: &Error, _: &[Value]| {
            if let Ok(mut errors) = sink.lock() {
                errors.push(e.to_string());
            }
        },
    );

    let mut output = Vec::new();
    let summary = lf_adapter()
        .writer()
        .write(&mut materializer, &mut output, &staff()?)?;
    assert_eq!(summary.written, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(
        String::from_utf8(output)?,
        "full_name,salary,hired,active,badge\nAda,5200.50,2021/03/14,yes,B-1\n"
    );

    let reported = reported
        .lock()
        .map_err(|_| anyhow::anyhow!("handler panicked"))?;
    assert_eq!(reported.len(), 1);
    assert!(reported[0].contains("badge revoked"));
    Ok(())
}
