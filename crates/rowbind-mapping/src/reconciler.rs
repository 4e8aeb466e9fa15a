//! Header reconciliation
//!
//! Places resolved bindings on the positions of a concrete column layout.
//! The result is a [`SlotTable`]: for each row position, the binding that
//! reads or writes it, if any.

use crate::binding::Binding;
use crate::{Error, Result};
use std::collections::BTreeSet;
use tracing::debug;

/// The column layout of the rows being read or written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Header names, in column order
    pub headers: Option<Vec<String>>,
    /// Positions selected for processing
    pub selected_indexes: Option<Vec<usize>>,
    /// Whether rows hold only the selected columns, in selection order
    pub reordered: bool,
}

impl ColumnLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_selected_indexes(mut self, indexes: impl IntoIterator<Item = usize>) -> Self {
        self.selected_indexes = Some(indexes.into_iter().collect());
        self
    }

    #[must_use]
    pub fn reordered(mut self, reordered: bool) -> Self {
        self.reordered = reordered;
        self
    }
}

/// Row position to binding table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotTable(Vec<Option<usize>>);

impl SlotTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Binding at a position, `None` when unbound or out of range
    #[must_use]
    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(position).copied().flatten()
    }

    /// `(position, binding)` pairs of the bound positions
    pub fn bound(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| slot.map(|binding| (position, binding)))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Option<usize>] {
        &self.0
    }
}

/// Which side of the mapping a table is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// Rows parsed from input; unresolved names are checked
    Read { strict: bool },
    /// Rows produced for output
    Write,
}

/// Build the slot table for a layout.
///
/// 1. The table is as wide as the widest of the headers, the row and the
///    highest bound index.
/// 2. Index-bound bindings sit at their index; name-bound bindings sit at
///    the position of their column name in the headers.
/// 3. When reading, names missing from the headers are an error if there
///    are no headers at all or validation is strict; otherwise they stay
///    unbound.
/// 4. Positions outside the selection are unbound.
/// 5. A reordered layout is projected onto the selection order.
///
/// # Errors
///
/// Returns a configuration error for unresolved names, as described above.
pub fn reconcile<T>(
    bindings: &[Binding<T>],
    row_width: usize,
    layout: &ColumnLayout,
    mode: ReconcileMode,
) -> Result<SlotTable> {
    let headers = layout.headers.as_deref().unwrap_or_default();
    let highest = bindings
        .iter()
        .filter_map(|b| b.index)
        .max()
        .map_or(0, |i| i + 1);
    let width = headers.len().max(row_width).max(highest);

    let mut slots: Vec<Option<usize>> = vec![None; width];
    let mut unresolved = BTreeSet::new();

    for (position, binding) in bindings.iter().enumerate() {
        match binding.index {
            Some(index) => slots[index] = Some(position),
            None => match headers.iter().position(|h| h.trim() == binding.column_name) {
                Some(column) => slots[column] = Some(position),
                None => {
                    unresolved.insert(binding.column_name.as_str());
                }
            },
        }
    }

    if let ReconcileMode::Read { strict } = mode {
        if !unresolved.is_empty() {
            let missing = unresolved.into_iter().collect::<Vec<_>>().join(", ");
            if headers.is_empty() {
                return Err(Error::configuration(format!(
                    "Could not find fields [{missing}] in input. Please enable header extraction in the parser settings in order to match field names."
                )));
            }
            if strict {
                return Err(Error::configuration(format!(
                    "Could not find fields [{missing}] in input. Names found: [{}]",
                    headers.join(", ")
                )));
            }
        }
    }

    if let Some(selected) = &layout.selected_indexes {
        for (position, slot) in slots.iter_mut().enumerate() {
            if !selected.contains(&position) {
                *slot = None;
            }
        }
        if layout.reordered {
            slots = selected
                .iter()
                .map(|&index| slots.get(index).copied().flatten())
                .collect();
        }
    }

    Ok(SlotTable(slots))
}

/// Caches the slot table of one materializer.
///
/// The table is recomputed when none exists yet, when the layout or mode
/// changes, or when a row wider than any seen before arrives. Narrower rows
/// reuse the cached table.
#[derive(Debug, Default)]
pub struct HeaderReconciler {
    table: Option<SlotTable>,
    layout: Option<ColumnLayout>,
    mode: Option<ReconcileMode>,
    widest_row: usize,
    recomputations: usize,
}

impl HeaderReconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for a row of `row_width` values, recomputed if stale.
    ///
    /// # Errors
    ///
    /// Returns the error of [`reconcile`]. The previous table is kept.
    pub fn slot_table<T>(
        &mut self,
        bindings: &[Binding<T>],
        row_width: usize,
        layout: &ColumnLayout,
        mode: ReconcileMode,
    ) -> Result<&SlotTable> {
        let stale = self.table.is_none()
            || self.layout.as_ref() != Some(layout)
            || self.mode != Some(mode)
            || row_width > self.widest_row;

        let table = match self.table.take() {
            Some(table) if !stale => table,
            previous => {
                let width = self.widest_row.max(row_width);
                match reconcile(bindings, width, layout, mode) {
                    Ok(table) => {
                        self.widest_row = width;
                        self.layout = Some(layout.clone());
                        self.mode = Some(mode);
                        self.recomputations += 1;
                        debug!(
                            row_width = width,
                            slots = table.len(),
                            recomputations = self.recomputations,
                            "Recomputed slot table"
                        );
                        table
                    }
                    Err(e) => {
                        self.table = previous;
                        return Err(e);
                    }
                }
            }
        };
        Ok(&*self.table.insert(table))
    }

    /// How many times a table has been computed
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    #[must_use]
    pub fn current(&self) -> Option<&SlotTable> {
        self.table.as_ref()
    }

    /// Drop the cached table
    pub fn reset(&mut self) {
        *self = Self {
            recomputations: self.recomputations,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Accessor, FieldType};
    use rowbind_value::{Value, ValueKind};

    fn binding(column: &str, index: Option<usize>) -> Binding<()> {
        Binding {
            field_name: column.to_string(),
            column_name: column.to_string(),
            index,
            field_type: FieldType::of(ValueKind::String),
            accessor: Accessor::new(|_: &()| Ok(Value::Null), |_, _| Ok(())),
            conversions: Vec::new(),
        }
    }

    const READ: ReconcileMode = ReconcileMode::Read { strict: false };
    const STRICT: ReconcileMode = ReconcileMode::Read { strict: true };

    #[test]
    fn test_names_and_indexes() {
        let bindings = vec![binding("name", None), binding("age", Some(1)), binding("city", None)];
        let layout = ColumnLayout::new().with_headers(["city", "age", "name"]);
        let table = reconcile(&bindings, 3, &layout, READ).unwrap();
        assert_eq!(table.as_slice(), &[Some(2), Some(1), Some(0)]);
    }

    #[test]
    fn test_width_covers_highest_index() {
        let bindings = vec![binding("a", Some(4))];
        let table = reconcile(&bindings, 2, &ColumnLayout::new(), READ).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.get(4), Some(0));
        assert_eq!(table.get(9), None);
    }

    #[test]
    fn test_unresolved_names() {
        let bindings = vec![binding("name", None), binding("zip", None)];

        let err = reconcile(&bindings, 2, &ColumnLayout::new(), READ).unwrap_err();
        assert!(err.to_string().contains("enable header extraction"));

        let layout = ColumnLayout::new().with_headers(["name", "street"]);
        let err = reconcile(&bindings, 2, &layout, STRICT).unwrap_err();
        assert!(err
            .to_string()
            .contains("Could not find fields [zip] in input. Names found: [name, street]"));

        let table = reconcile(&bindings, 2, &layout, READ).unwrap();
        assert_eq!(table.as_slice(), &[Some(0), None]);

        // Writing never checks names
        let table = reconcile(&bindings, 2, &ColumnLayout::new(), ReconcileMode::Write).unwrap();
        assert_eq!(table.bound().count(), 0);
    }

    #[test]
    fn test_selection_and_reordering() {
        let bindings = vec![binding("a", Some(0)), binding("b", Some(1)), binding("c", Some(2))];

        let layout = ColumnLayout::new().with_selected_indexes([0, 2]);
        let table = reconcile(&bindings, 3, &layout, READ).unwrap();
        assert_eq!(table.as_slice(), &[Some(0), None, Some(2)]);

        let layout = ColumnLayout::new().with_selected_indexes([2, 0, 1]).reordered(true);
        let table = reconcile(&bindings, 3, &layout, READ).unwrap();
        assert_eq!(table.as_slice(), &[Some(2), Some(0), Some(1)]);

        let layout = ColumnLayout::new().with_selected_indexes([7, 1]).reordered(true);
        let table = reconcile(&bindings, 3, &layout, READ).unwrap();
        assert_eq!(table.as_slice(), &[None, Some(1)]);
    }

    #[test]
    fn test_cache_grows_only() {
        let bindings = vec![binding("a", Some(0))];
        let layout = ColumnLayout::new();
        let mut reconciler = HeaderReconciler::new();

        assert_eq!(reconciler.slot_table(&bindings, 3, &layout, READ).unwrap().len(), 3);
        assert_eq!(reconciler.slot_table(&bindings, 2, &layout, READ).unwrap().len(), 3);
        assert_eq!(reconciler.recomputations(), 1);

        assert_eq!(reconciler.slot_table(&bindings, 5, &layout, READ).unwrap().len(), 5);
        assert_eq!(reconciler.recomputations(), 2);

        let other = ColumnLayout::new().with_selected_indexes([0]);
        reconciler.slot_table(&bindings, 1, &other, READ).unwrap();
        assert_eq!(reconciler.recomputations(), 3);

        reconciler.reset();
        assert!(reconciler.current().is_none());
    }

    #[test]
    fn test_failed_recompute_keeps_table() {
        let bindings = vec![binding("name", None)];
        let mut reconciler = HeaderReconciler::new();
        let good = ColumnLayout::new().with_headers(["name"]);
        reconciler.slot_table(&bindings, 1, &good, STRICT).unwrap();

        let bad = ColumnLayout::new().with_headers(["other"]);
        assert!(reconciler.slot_table(&bindings, 1, &bad, STRICT).is_err());
        assert_eq!(reconciler.current().unwrap().get(0), Some(0));
    }
}
