//! Binding validation

use crate::binding::Binding;
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// Reject binding sets where two fields claim the same column.
///
/// Index-bound bindings conflict on equal indexes; name-bound bindings
/// conflict on equal column names. A name-bound binding never conflicts with
/// an index-bound one.
///
/// # Errors
///
/// Returns a configuration error listing every conflicting field with its
/// type.
pub fn validate_bindings<T>(type_name: &str, bindings: &[Binding<T>]) -> Result<()> {
    let mut by_index: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut by_name: HashMap<&str, Vec<usize>> = HashMap::new();

    for (position, binding) in bindings.iter().enumerate() {
        match binding.index {
            Some(index) => by_index.entry(index).or_default().push(position),
            None => by_name
                .entry(binding.column_name.as_str())
                .or_default()
                .push(position),
        }
    }

    let conflicting: BTreeSet<usize> = by_index
        .into_values()
        .chain(by_name.into_values())
        .filter(|group| group.len() > 1)
        .flatten()
        .collect();

    if conflicting.is_empty() {
        return Ok(());
    }

    let mut message = format!("Conflicting field mappings defined in {type_name}:");
    for binding in conflicting.into_iter().map(|p| &bindings[p]) {
        match binding.index {
            Some(index) => message.push_str(&format!("\n\tIndex: '{index}' of {}", binding.describe())),
            None => message.push_str(&format!(
                "\n\tName: '{}' of {}",
                binding.column_name,
                binding.describe()
            )),
        }
    }
    Err(Error::configuration(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Accessor, FieldType};
    use rowbind_value::{Value, ValueKind};

    fn binding(field: &str, column: &str, index: Option<usize>) -> Binding<()> {
        Binding {
            field_name: field.to_string(),
            column_name: column.to_string(),
            index,
            field_type: FieldType::of(ValueKind::String),
            accessor: Accessor::new(|_: &()| Ok(Value::Null), |_, _| Ok(())),
            conversions: Vec::new(),
        }
    }

    #[test]
    fn test_distinct_bindings_pass() {
        let bindings = vec![
            binding("a", "a", Some(0)),
            binding("b", "b", None),
            // same name as an index-bound binding is fine
            binding("c", "a", None),
        ];
        assert!(validate_bindings("Row", &bindings).is_ok());
    }

    #[test]
    fn test_duplicate_index_lists_both_fields() {
        let bindings = vec![
            binding("first", "first", Some(1)),
            binding("other", "other", None),
            binding("second", "second", Some(1)),
        ];
        let err = validate_bindings("Row", &bindings).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Conflicting field mappings defined in Row"));
        assert!(message.contains("Index: '1' of field 'first' (string)"));
        assert!(message.contains("Index: '1' of field 'second' (string)"));
        assert!(!message.contains("'other'"));
    }

    #[test]
    fn test_duplicate_name() {
        let bindings = vec![binding("a", "code", None), binding("b", "code", None)];
        let message = validate_bindings("Row", &bindings).unwrap_err().to_string();
        assert!(message.contains("Name: 'code' of field 'a'"));
        assert!(message.contains("Name: 'code' of field 'b'"));
    }
}
