//! Integration test: directives loaded from YAML on a self-describing type
//!
//! The type declares only its fields and accessors; every directive comes
//! from a YAML document, including formats, enum options and the header
//! set inherited through an interface.

use chrono::NaiveDate;
use rowbind_conversions::{EnumConstant, EnumType};
use rowbind_mapping::{
    Accessor, ColumnLayout, DirectiveFile, FieldDescriptor, FieldType, HeadersDirective,
    InterfaceDescriptor, Mapped, RecordMaterializer, TypeDescriptor, derive_header_names,
};
use rowbind_value::{Value, ValueKind, row_from_strs};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Default, Clone, PartialEq)]
struct Invoice {
    number: i64,
    status: String,
    amount: Decimal,
    due: Option<NaiveDate>,
    paid: bool,
}

fn status_type() -> Arc<EnumType> {
    Arc::new(EnumType::new(
        "Status",
        [
            EnumConstant::new("OPEN").with_property("code", "O"),
            EnumConstant::new("PAID").with_property("code", "P"),
            EnumConstant::new("VOID").with_property("code", "V"),
        ],
    ))
}

impl Mapped for Invoice {
    fn descriptor() -> TypeDescriptor<Self> {
        TypeDescriptor::new("Invoice")
            .with_default_constructor()
            .with_interface(
                InterfaceDescriptor::new("Billable")
                    .with_headers(HeadersDirective::new(["number", "status", "amount", "due", "paid"])),
            )
            .field(FieldDescriptor::new(
                "number",
                FieldType::of(ValueKind::Long),
                Accessor::typed(|i: &Invoice| i.number, |i, v| i.number = v),
            ))
            .field(FieldDescriptor::new(
                "status",
                FieldType::enumeration(status_type()),
                Accessor::new(
                    |i: &Invoice| Ok(Value::Enum(i.status.clone())),
                    |i, v| {
                        i.status = v.enum_name().unwrap_or_default().to_string();
                        Ok(())
                    },
                ),
            ))
            .field(FieldDescriptor::new(
                "amount",
                FieldType::of(ValueKind::Decimal),
                Accessor::typed(|i: &Invoice| i.amount, |i, v| i.amount = v),
            ))
            .field(FieldDescriptor::new(
                "due",
                FieldType::optional(ValueKind::Date),
                Accessor::typed(|i: &Invoice| i.due, |i, v| i.due = v),
            ))
            .field(FieldDescriptor::new(
                "paid",
                FieldType::of(ValueKind::Boolean),
                Accessor::typed(|i: &Invoice| i.paid, |i, v| i.paid = v),
            ))
    }
}

const DIRECTIVES: &str = r"
type: Invoice
fields:
  - field: number
    directives:
      - directive: parsed
        field: invoice_no
  - field: status
    directives:
      - directive: parsed
        default_null_read: OPEN
      - directive: enum_options
        selectors: [custom_element]
        custom_element: code
  - field: amount
    directives:
      - directive: parsed
        default_null_read: '0'
      - directive: format
        formats: ['#,##0.00']
        options: ['locale=de']
  - field: due
    directives:
      - directive: parsed
        default_null_write: 'n/a'
      - directive: format
        formats: ['%d.%m.%Y']
  - field: paid
    directives:
      - directive: parsed
      - directive: boolean_string
        true_strings: [ja, j]
        false_strings: [nein, n]
";

fn materializer() -> anyhow::Result<RecordMaterializer<Invoice>> {
    let mut descriptor = Invoice::descriptor();
    descriptor.apply_directives(&DirectiveFile::from_yaml_str(DIRECTIVES)?)?;
    Ok(RecordMaterializer::new(descriptor))
}

#[test]
fn test_read_with_yaml_directives() -> anyhow::Result<()> {
    let mut materializer = materializer()?;
    let layout = ColumnLayout::new().with_headers(["invoice_no", "status", "amount", "due", "paid"]);

    let invoice = materializer.to_object(
        &row_from_strs(["1042", "P", "1.250,50", "31.01.2025", "J"]),
        &layout,
    )?;
    assert_eq!(
        invoice,
        Invoice {
            number: 1042,
            status: "PAID".into(),
            amount: Decimal::from_str("1250.50")?,
            due: NaiveDate::from_ymd_opt(2025, 1, 31),
            paid: true,
        }
    );

    let defaults = materializer.to_object(
        &[Value::from("7"), Value::Null, Value::Null, Value::Null, Value::Null],
        &layout,
    )?;
    assert_eq!(defaults.status, "OPEN");
    assert_eq!(defaults.amount, Decimal::ZERO);
    assert_eq!(defaults.due, None);
    assert!(!defaults.paid);
    Ok(())
}

#[test]
fn test_write_with_yaml_directives() -> anyhow::Result<()> {
    let mut materializer = materializer()?;
    let headers: Vec<String> = ["invoice_no", "status", "amount", "due", "paid"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    let invoice = Invoice {
        number: 9,
        status: "VOID".into(),
        amount: Decimal::from_str("99.5")?,
        due: None,
        paid: false,
    };
    let row = materializer.to_record(Some(&invoice), Some(&headers), None)?;
    assert_eq!(row, Some(row_from_strs(["9", "V", "99,50", "n/a", "nein"])));
    Ok(())
}

#[test]
fn test_headers_and_derived_names() -> anyhow::Result<()> {
    let materializer = materializer()?;
    let declared = materializer
        .descriptor()
        .find_headers()
        .ok_or_else(|| anyhow::anyhow!("no header set"))?;
    assert_eq!(declared.sequence[0], "number");
    assert_eq!(
        derive_header_names(materializer.descriptor())?,
        vec!["invoice_no", "status", "amount", "due", "paid"]
    );
    Ok(())
}

#[test]
fn test_unknown_selector_element_is_reported_with_context() -> anyhow::Result<()> {
    let mut descriptor = Invoice::descriptor();
    descriptor.apply_directives(&DirectiveFile::from_yaml_str(
        r"
fields:
  - field: status
    directives:
      - directive: parsed
      - directive: enum_options
        selectors: [custom_element]
        custom_element: label
",
    )?)?;
    let err = RecordMaterializer::new(descriptor).initialize().unwrap_err();
    assert!(err.is_configuration());
    let message = err.to_string();
    assert!(message.contains("directive 'enum_options' of field 'status' in Invoice"));
    Ok(())
}

#[test]
fn test_for_type() -> anyhow::Result<()> {
    let mut materializer = RecordMaterializer::<Invoice>::for_type();
    materializer.initialize()?;
    // Without directives nothing is mapped
    assert!(materializer.bindings().is_empty());
    Ok(())
}
