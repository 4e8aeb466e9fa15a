//! Rows of values

use crate::value::Value;

/// An ordered sequence of column values
pub type Row = Vec<Value>;

/// Build a row of string values from parsed fields, keeping every field.
pub fn row_from_strs<I, S>(fields: I) -> Row
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields
        .into_iter()
        .map(|field| Value::String(field.into()))
        .collect()
}

/// Build a row from optional fields, `None` becoming [`Value::Null`].
pub fn row_from_fields<I, S>(fields: I) -> Row
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    fields
        .into_iter()
        .map(|field| field.map_or(Value::Null, |s| Value::String(s.into())))
        .collect()
}

/// Render a row back to text, nulls becoming `None`.
#[must_use]
pub fn row_to_strings(row: &[Value]) -> Vec<Option<String>> {
    row.iter().map(Value::as_string).collect()
}
