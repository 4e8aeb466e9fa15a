//! Field bindings

use crate::descriptor::{Accessor, FieldType};
use rowbind_conversions::ConversionChain;

/// One resolved association between a field and a column.
///
/// A binding is either index-bound (`index` is set) or name-bound, in which
/// case `column_name` is looked up in the headers.
pub struct Binding<T> {
    pub field_name: String,
    pub column_name: String,
    pub index: Option<usize>,
    pub field_type: FieldType,
    pub accessor: Accessor<T>,
    pub conversions: ConversionChain,
}

impl<T> Binding<T> {
    #[must_use]
    pub fn is_index_bound(&self) -> bool {
        self.index.is_some()
    }

    #[must_use]
    pub fn is_name_bound(&self) -> bool {
        self.index.is_none()
    }

    /// `field 'name' (kind)`, for messages
    #[must_use]
    pub fn describe(&self) -> String {
        format!("field '{}' ({})", self.field_name, self.field_type.describe())
    }
}

impl<T> std::fmt::Debug for Binding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("field_name", &self.field_name)
            .field("column_name", &self.column_name)
            .field("index", &self.index)
            .field("field_type", &self.field_type)
            .field("conversions", &self.conversions)
            .finish_non_exhaustive()
    }
}
