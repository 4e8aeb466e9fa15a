//! Record materialization
//!
//! Converts rows into instances of a target type and instances back into
//! rows, using the bindings resolved for the type and a cached slot table.

use crate::binding::Binding;
use crate::config::MaterializerConfig;
use crate::descriptor::{Mapped, TypeDescriptor};
use crate::handler::{ErrorHandler, LogErrorHandler};
use crate::reconciler::{ColumnLayout, HeaderReconciler, ReconcileMode, SlotTable};
use crate::resolver::resolve;
use crate::{Error, Result};
use rowbind_conversions::{ChainFailure, ConversionPipeline, ConversionRegistry};
use rowbind_value::{Row, Value};
use tracing::{debug, trace};

/// Mutable state a materializer keeps between calls
#[derive(Debug, Default)]
pub struct MaterializerState {
    initialized: bool,
    reconciler: HeaderReconciler,
    output_row: Option<Row>,
    synthetic_headers: Option<Vec<String>>,
    // Synthetic headers with index-claimed positions blanked, so name lookup
    // never lands on a slot an index binding owns
    synthetic_lookup: Option<Vec<String>>,
}

impl MaterializerState {
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn reconciler(&self) -> &HeaderReconciler {
        &self.reconciler
    }

    /// Headers derived from the bindings on the first write without a layout
    #[must_use]
    pub fn synthetic_headers(&self) -> Option<&[String]> {
        self.synthetic_headers.as_deref()
    }
}

/// Converts rows to objects of `T` and back.
///
/// A materializer caches state between calls and is meant for a single
/// consumer. Build one per thread.
pub struct RecordMaterializer<T> {
    descriptor: TypeDescriptor<T>,
    registry: ConversionRegistry,
    config: MaterializerConfig,
    handler: Box<dyn ErrorHandler>,
    bindings: Vec<Binding<T>>,
    state: MaterializerState,
}

impl<T: 'static> RecordMaterializer<T> {
    pub fn new(descriptor: TypeDescriptor<T>) -> Self {
        Self {
            descriptor,
            registry: ConversionRegistry::new(),
            config: MaterializerConfig::default(),
            handler: Box::new(LogErrorHandler),
            bindings: Vec::new(),
            state: MaterializerState::default(),
        }
    }

    /// Materializer for a type that describes itself
    #[must_use]
    pub fn for_type() -> Self
    where
        T: Mapped,
    {
        Self::new(T::descriptor())
    }

    /// Registry used to build custom conversions
    #[must_use]
    pub fn with_registry(mut self, registry: ConversionRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: MaterializerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    pub fn set_strict_header_validation(&mut self, strict: bool) {
        self.config.strict_header_validation = strict;
    }

    #[must_use]
    pub fn config(&self) -> &MaterializerConfig {
        &self.config
    }

    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor<T> {
        &self.descriptor
    }

    /// Resolved bindings; empty until initialized
    #[must_use]
    pub fn bindings(&self) -> &[Binding<T>] {
        &self.bindings
    }

    #[must_use]
    pub fn state(&self) -> &MaterializerState {
        &self.state
    }

    #[must_use]
    pub fn slot_table(&self) -> Option<&SlotTable> {
        self.state.reconciler.current()
    }

    /// How many times the slot table has been computed
    #[must_use]
    pub fn recomputations(&self) -> usize {
        self.state.reconciler.recomputations()
    }

    #[must_use]
    pub fn synthetic_headers(&self) -> Option<&[String]> {
        self.state.synthetic_headers()
    }

    /// Resolve and validate the bindings, once.
    ///
    /// # Errors
    ///
    /// Returns the resolution or validation failure. Nothing is cached on
    /// failure, so the next call tries again.
    pub fn initialize(&mut self) -> Result<()> {
        if self.state.initialized {
            return Ok(());
        }
        let bindings = resolve(&self.descriptor, &self.registry)?;
        debug!(
            type_name = %self.descriptor.name,
            bindings = bindings.len(),
            "Materializer initialized"
        );
        self.bindings = bindings;
        self.state.initialized = true;
        Ok(())
    }

    /// Build an instance from a row.
    ///
    /// # Errors
    ///
    /// Returns configuration errors from initialization or reconciliation,
    /// a conversion error naming the column and field that failed, an
    /// instantiation error, or an accessor error.
    pub fn to_object(&mut self, row: &[Value], layout: &ColumnLayout) -> Result<T> {
        self.initialize()?;
        let mode = ReconcileMode::Read {
            strict: self.config.strict_header_validation,
        };
        let table = self
            .state
            .reconciler
            .slot_table(&self.bindings, row.len(), layout, mode)?;

        let mut converted = row.to_vec();
        ConversionPipeline::execute_row(
            &mut converted,
            table
                .bound()
                .filter(|(position, _)| *position < row.len())
                .map(|(position, binding)| (position, self.bindings[binding].conversions.as_slice())),
        )
        .map_err(|failure| chain_error(&self.bindings, table, failure))?;

        let mut instance = self.descriptor.instantiate()?;
        let mut assigned = 0;
        for (position, index) in table.bound() {
            let Some(value) = converted.get_mut(position) else {
                continue;
            };
            let binding = &self.bindings[index];
            binding
                .accessor
                .set(&mut instance, std::mem::take(value))
                .map_err(|e| e.for_field(&binding.field_name))?;
            assigned += 1;
        }
        trace!(type_name = %self.descriptor.name, fields = assigned, "Materialized record");
        Ok(instance)
    }

    /// Build a row from an instance.
    ///
    /// The row is sized on the first call from the headers, else from the
    /// indexes to write, else from a synthetic layout derived from the
    /// bindings, and reused afterwards. A record that cannot be written is
    /// reported to the error handler and `Ok(None)` is returned.
    ///
    /// # Errors
    ///
    /// Only initialization failures are returned.
    pub fn to_record(
        &mut self,
        instance: Option<&T>,
        headers: Option<&[String]>,
        indexes: Option<&[usize]>,
    ) -> Result<Option<Row>> {
        let Some(instance) = instance else {
            return Ok(None);
        };
        self.initialize()?;

        let mut row = match self.state.output_row.take() {
            Some(row) => row,
            None => {
                let width = match (headers, indexes) {
                    (Some(headers), _) => headers.len(),
                    (None, Some(indexes)) => indexes
                        .iter()
                        .max()
                        .map_or(0, |i| i + 1)
                        .max(indexes.len()),
                    (None, None) => {
                        let names = synthetic_headers(&self.bindings);
                        let width = names.len();
                        self.state.synthetic_lookup = Some(blank_index_claimed(&self.bindings, &names));
                        self.state.synthetic_headers = Some(names);
                        width
                    }
                };
                vec![Value::Null; width]
            }
        };
        row.fill(Value::Null);

        let mut layout = ColumnLayout::new();
        layout.headers = self
            .state
            .synthetic_lookup
            .clone()
            .or_else(|| headers.map(<[String]>::to_vec));
        layout.selected_indexes = indexes.map(<[usize]>::to_vec);

        let outcome = write_row(
            &mut self.state.reconciler,
            &self.bindings,
            instance,
            &mut row,
            &layout,
        );
        let produced = match outcome {
            Ok(()) => {
                trace!(type_name = %self.descriptor.name, width = row.len(), "Wrote record");
                Some(row.clone())
            }
            Err(e) => {
                let error = e.mark_non_fatal();
                self.handler.handle(&error, &row);
                None
            }
        };
        self.state.output_row = Some(row);
        Ok(produced)
    }
}

fn chain_error<T>(bindings: &[Binding<T>], table: &SlotTable, failure: ChainFailure) -> Error {
    let field = table
        .get(failure.position)
        .map(|b| bindings[b].field_name.clone())
        .unwrap_or_default();
    Error::conversion(Some(failure.position), field, failure.error)
}

fn write_row<T: 'static>(
    reconciler: &mut HeaderReconciler,
    bindings: &[Binding<T>],
    instance: &T,
    row: &mut Row,
    layout: &ColumnLayout,
) -> Result<()> {
    let table = reconciler.slot_table(bindings, row.len(), layout, ReconcileMode::Write)?;
    if table.len() > row.len() {
        row.resize(table.len(), Value::Null);
    }
    for (position, index) in table.bound() {
        let binding = &bindings[index];
        row[position] = binding
            .accessor
            .get(instance)
            .map_err(|e| e.for_field(&binding.field_name))?;
    }
    ConversionPipeline::revert_row(
        row,
        table
            .bound()
            .map(|(position, index)| (position, bindings[index].conversions.as_slice())),
    )
    .map_err(|failure| chain_error(bindings, table, failure))
}

/// Header names for writing when no layout is given.
///
/// The layout is as wide as the highest index plus one, or the number of
/// bindings if larger. Index-bound bindings name their own position; the
/// remaining positions take the name-bound names in declaration order, and
/// any left over stay blank.
fn synthetic_headers<T>(bindings: &[Binding<T>]) -> Vec<String> {
    let highest = bindings
        .iter()
        .filter_map(|b| b.index)
        .max()
        .map_or(0, |i| i + 1);
    let width = highest.max(bindings.len());

    let mut names: Vec<Option<String>> = vec![None; width];
    for binding in bindings {
        if let Some(index) = binding.index {
            names[index] = Some(binding.column_name.clone());
        }
    }
    let mut free = bindings
        .iter()
        .filter(|b| b.is_name_bound())
        .map(|b| b.column_name.clone());
    names
        .into_iter()
        .map(|name| name.or_else(|| free.next()).unwrap_or_default())
        .collect()
}

fn blank_index_claimed<T>(bindings: &[Binding<T>], names: &[String]) -> Vec<String> {
    let mut lookup = names.to_vec();
    for index in bindings.iter().filter_map(|b| b.index) {
        if let Some(name) = lookup.get_mut(index) {
            name.clear();
        }
    }
    lookup
}

impl<T> std::fmt::Debug for RecordMaterializer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordMaterializer")
            .field("type_name", &self.descriptor.name)
            .field("bindings", &self.bindings)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
