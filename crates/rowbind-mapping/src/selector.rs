//! Conversion selection
//!
//! Maps each directive on a field to the conversion it stands for, and picks
//! the type-driven default conversion appended at the end of a chain.

use crate::descriptor::FieldType;
use crate::directive::{Directive, ParsedDirective};
use crate::{Error, Result};
use chrono::{NaiveDateTime, Utc};
use rowbind_conversions::{
    BooleanConversion, CaseConversion, Conversion, ConversionRegistry, DateConversion,
    DateFormatter, EnumConversion, FormattedNumberConversion, NullStringConversion,
    RegexReplaceConversion, TrimConversion, TypedConversion, apply_format_options,
};
use rowbind_value::ValueKind;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Build the conversion a directive stands for.
///
/// Returns `Ok(None)` for the mapping directive itself and for a format
/// directive on a field type that has no formatted conversion.
///
/// # Errors
///
/// Returns a configuration error when the directive cannot be built for the
/// field, and a runtime type error when a boolean directive is placed on a
/// field that is not boolean.
pub fn select_conversion(
    field_name: &str,
    field_type: &FieldType,
    parsed: &ParsedDirective,
    directive: &Directive,
    registry: &ConversionRegistry,
) -> Result<Option<Box<dyn Conversion>>> {
    let null_read = parsed.null_read_value();
    let null_write = parsed.null_write_value();

    let conversion: Box<dyn Conversion> = match directive {
        Directive::Parsed(_) => return Ok(None),
        Directive::NullString { nulls } => Box::new(NullStringConversion::new(nulls.clone())),
        Directive::EnumOptions {
            selectors,
            custom_element,
        } => {
            let enum_type = field_type.enum_type.clone().ok_or_else(|| {
                Error::configuration(format!(
                    "Enumeration options can only be used on enumeration fields. Field '{field_name}' is {}",
                    field_type.describe()
                ))
            })?;
            let element = custom_element
                .as_deref()
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string);
            Box::new(EnumConversion::new(
                enum_type,
                null_read.map(str::to_string),
                null_write,
                element,
                selectors.clone(),
            )?)
        }
        Directive::Trim { max_length } => Box::new(TrimConversion::new(*max_length)),
        Directive::LowerCase => Box::new(CaseConversion::lower()),
        Directive::UpperCase => Box::new(CaseConversion::upper()),
        Directive::Replace {
            expression,
            replacement,
        } => Box::new(RegexReplaceConversion::new(expression, replacement.clone())?),
        Directive::BooleanString {
            true_strings,
            false_strings,
        } => {
            if field_type.kind != ValueKind::Boolean {
                return Err(Error::runtime_type(format!(
                    "Boolean strings can only be used on boolean fields. Field '{field_name}' is {}",
                    field_type.describe()
                )));
            }
            let value_if_null = match null_read {
                Some(text) => Some(boolean_of(text)),
                None if !field_type.optional => Some(false),
                None => None,
            };
            Box::new(BooleanConversion::new(
                value_if_null,
                null_write,
                true_strings.clone(),
                false_strings.clone(),
            )?)
        }
        Directive::Format { formats, options } => {
            let Some(mut conversion) = formatted(field_type, null_read, null_write, formats)? else {
                return Ok(None);
            };
            apply_format_options(conversion.as_mut(), options)?;
            conversion
        }
        Directive::Convert { conversion, args } => registry.create(conversion, args)?,
    };
    Ok(Some(conversion))
}

fn formatted(
    field_type: &FieldType,
    null_read: Option<&str>,
    null_write: Option<String>,
    formats: &[String],
) -> Result<Option<Box<dyn Conversion>>> {
    let kind = field_type.kind;
    let conversion: Box<dyn Conversion> = match kind {
        ValueKind::Decimal => {
            let value_if_null = null_read
                .map(|text| {
                    Decimal::from_str(text.trim()).map_err(|e| {
                        Error::configuration(format!(
                            "Invalid default value for decimal '{text}': {e}"
                        ))
                    })
                })
                .transpose()?;
            Box::new(FormattedNumberConversion::decimal(
                value_if_null,
                null_write,
                formats,
            )?)
        }
        k if k.is_numeric() => Box::new(
            FormattedNumberConversion::number(k, formats)?.with_nulls(null_read, null_write)?,
        ),
        k if k.is_temporal() => {
            let value_if_null = null_read
                .map(|text| temporal_default(text, formats))
                .transpose()?;
            Box::new(DateConversion::new(k, value_if_null, null_write, formats)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(conversion))
}

fn temporal_default(text: &str, formats: &[String]) -> Result<NaiveDateTime> {
    if text.trim().eq_ignore_ascii_case("now") {
        return Ok(Utc::now().naive_utc());
    }
    let pattern = formats
        .first()
        .ok_or_else(|| Error::configuration("No format defined"))?;
    DateFormatter::new(pattern)?.parse(text).map_err(|e| {
        Error::configuration(format!("Invalid default value '{text}' for pattern '{pattern}': {e}"))
    })
}

/// Only `true`, in any case, reads as true
fn boolean_of(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("true")
}

/// The conversion implied by the field's type alone.
///
/// # Errors
///
/// Returns a configuration error when the null-read text does not parse as
/// a value of the field's type.
pub fn default_conversion(
    field_type: &FieldType,
    parsed: &ParsedDirective,
) -> Result<Option<Box<dyn Conversion>>> {
    let null_read = parsed.null_read_value();
    let null_write = parsed.null_write_value();

    let conversion: Box<dyn Conversion> = match field_type.kind {
        ValueKind::Boolean => Box::new(BooleanConversion::with_defaults(
            null_read.map(boolean_of),
            null_write,
        )?),
        ValueKind::Char => {
            if let Some(text) = null_read {
                if text.chars().count() != 1 {
                    return Err(Error::configuration(format!(
                        "Invalid default value for character '{text}'. It should contain one character only."
                    )));
                }
            }
            Box::new(TypedConversion::with_null_defaults(
                ValueKind::Char,
                null_read,
                null_write,
            )?)
        }
        kind if kind.is_numeric() => Box::new(TypedConversion::with_null_defaults(
            kind,
            null_read,
            null_write,
        )?),
        ValueKind::Enum => {
            let enum_type = field_type.enum_type.clone().ok_or_else(|| {
                Error::configuration("Enumeration field declared without its constants")
            })?;
            Box::new(EnumConversion::new(
                enum_type,
                null_read.map(str::to_string),
                null_write,
                None,
                Vec::new(),
            )?)
        }
        _ => return Ok(None),
    };
    Ok(Some(conversion))
}

/// Whether `candidate` would repeat the last conversion of a chain
pub(crate) fn is_redundant(chain: &[Box<dyn Conversion>], candidate: &dyn Conversion) -> bool {
    chain.last().is_some_and(|last| {
        last.execute_kind() == candidate.execute_kind()
            && last.revert_kind() == candidate.revert_kind()
    })
}
