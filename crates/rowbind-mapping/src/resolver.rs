//! Field mapping resolution
//!
//! Turns the mapped fields of a [`TypeDescriptor`] into [`Binding`]s, each
//! with its conversion chain, plus helpers that inspect the declared layout
//! without building conversions.

use crate::binding::Binding;
use crate::descriptor::{FieldDescriptor, TypeDescriptor};
use crate::directive::{Directive, ParsedDirective};
use crate::selector::{default_conversion, is_redundant, select_conversion};
use crate::validator::validate_bindings;
use crate::{Error, Result};
use rowbind_conversions::ConversionRegistry;
use std::collections::HashMap;
use tracing::debug;

fn parsed_of<T>(field: &FieldDescriptor<T>) -> Option<&ParsedDirective> {
    field.directives.iter().find_map(Directive::as_parsed)
}

/// Resolve the bindings of every mapped field.
///
/// Fields are visited own fields first, then up the parent chain. Each
/// binding's chain holds the conversions of the field's directives in
/// declared order, followed by the default conversion for its type unless
/// that is suppressed or would repeat the last explicit conversion.
///
/// # Errors
///
/// Returns the failure of the first directive that cannot be built, with
/// the directive, field and type added to the message, or the conflict
/// found by [`validate_bindings`].
pub fn resolve<T: 'static>(
    descriptor: &TypeDescriptor<T>,
    registry: &ConversionRegistry,
) -> Result<Vec<Binding<T>>> {
    let mut bindings = Vec::new();

    for field in descriptor.all_fields() {
        let Some(parsed) = parsed_of(field) else {
            continue;
        };
        let context = |directive: &Directive| {
            format!(
                "directive '{}' of field '{}' in {}",
                directive.kind_name(),
                field.name,
                descriptor.name
            )
        };

        let mut conversions = Vec::new();
        for directive in &field.directives {
            let selected =
                select_conversion(&field.name, &field.field_type, parsed, directive, registry)
                    .map_err(|e| e.with_context(&context(directive)))?;
            conversions.extend(selected);
        }

        if parsed.apply_default_conversion {
            let default = default_conversion(&field.field_type, parsed)
                .map_err(|e| e.with_context(&context(&Directive::Parsed(parsed.clone()))))?;
            if let Some(default) = default {
                if !is_redundant(&conversions, default.as_ref()) {
                    conversions.push(default);
                }
            }
        }

        bindings.push(Binding {
            field_name: field.name.clone(),
            column_name: parsed.column_name(&field.name),
            index: parsed.index,
            field_type: field.field_type.clone(),
            accessor: field.accessor.clone(),
            conversions,
        });
    }

    validate_bindings(&descriptor.name, &bindings)?;
    debug!(
        type_name = %descriptor.name,
        bindings = bindings.len(),
        "Resolved field bindings"
    );
    Ok(bindings)
}

/// True when at least one field is mapped and every mapped field is bound
/// by index
#[must_use]
pub fn all_fields_index_based<T: 'static>(descriptor: &TypeDescriptor<T>) -> bool {
    all_mapped(descriptor, |p| p.index.is_some())
}

/// True when at least one field is mapped and every mapped field is bound
/// by name
#[must_use]
pub fn all_fields_name_based<T: 'static>(descriptor: &TypeDescriptor<T>) -> bool {
    all_mapped(descriptor, |p| p.index.is_none())
}

fn all_mapped<T: 'static>(
    descriptor: &TypeDescriptor<T>,
    predicate: impl Fn(&ParsedDirective) -> bool,
) -> bool {
    let parsed: Vec<&ParsedDirective> = descriptor
        .all_fields()
        .into_iter()
        .filter_map(parsed_of)
        .collect();
    !parsed.is_empty() && parsed.into_iter().all(predicate)
}

/// Declared column indexes, in field order
///
/// # Errors
///
/// Returns a configuration error when two fields declare the same index.
pub fn selected_indexes<T: 'static>(descriptor: &TypeDescriptor<T>) -> Result<Vec<usize>> {
    let mut owners: HashMap<usize, &str> = HashMap::new();
    let mut indexes = Vec::new();
    for field in descriptor.all_fields() {
        let Some(index) = parsed_of(field).and_then(|p| p.index) else {
            continue;
        };
        if let Some(previous) = owners.insert(index, &field.name) {
            return Err(duplicate_index(descriptor, index, previous, &field.name));
        }
        indexes.push(index);
    }
    Ok(indexes)
}

fn duplicate_index<T>(
    descriptor: &TypeDescriptor<T>,
    index: usize,
    first: &str,
    second: &str,
) -> Error {
    Error::configuration(format!(
        "Duplicate index {index} declared on fields '{first}' and '{second}' of {}",
        descriptor.name
    ))
}

/// Header names implied by the mapped fields.
///
/// Index-bound fields sit at their index; name-bound fields fill the
/// remaining positions in declaration order. When an index points past the
/// number of mapped fields no layout can be derived and the result is empty.
///
/// # Errors
///
/// Returns a configuration error when two fields declare the same index.
pub fn derive_header_names<T: 'static>(descriptor: &TypeDescriptor<T>) -> Result<Vec<String>> {
    let mapped: Vec<(&FieldDescriptor<T>, &ParsedDirective)> = descriptor
        .all_fields()
        .into_iter()
        .filter_map(|f| parsed_of(f).map(|p| (f, p)))
        .collect();

    let width = mapped.len();
    let mut slots: Vec<Option<(String, &str)>> = vec![None; width];
    let mut by_name = Vec::new();

    for (field, parsed) in &mapped {
        let name = parsed.column_name(&field.name);
        match parsed.index {
            Some(index) if index >= width => return Ok(Vec::new()),
            Some(index) => {
                if let Some((_, previous)) = &slots[index] {
                    return Err(duplicate_index(descriptor, index, previous, &field.name));
                }
                slots[index] = Some((name, field.name.as_str()));
            }
            None => by_name.push(name),
        }
    }

    let mut names = by_name.into_iter();
    Ok(slots
        .into_iter()
        .map(|slot| match slot {
            Some((name, _)) => name,
            None => names.next().unwrap_or_default(),
        })
        .collect())
}
