//! Conversion pipeline
//!
//! Runs conversion chains forward (read) and backward (write), over single
//! values or over the positions of a row.

use crate::{Conversion, Error, Result};
use rowbind_value::Value;

/// A chain failure at a row position
#[derive(Debug, Clone, PartialEq)]
pub struct ChainFailure {
    pub position: usize,
    pub error: Error,
}

/// Runs chains of conversions
#[derive(Debug, Clone, Copy, Default)]
pub struct ConversionPipeline;

impl ConversionPipeline {
    /// Apply every conversion's `execute`, in declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error.
    pub fn execute_chain(chain: &[Box<dyn Conversion>], input: Value) -> Result<Value> {
        chain
            .iter()
            .try_fold(input, |value, conversion| conversion.execute(value))
    }

    /// Apply every conversion's `revert`, in reverse declaration order.
    ///
    /// # Errors
    ///
    /// Returns the first conversion error.
    pub fn revert_chain(chain: &[Box<dyn Conversion>], input: Value) -> Result<Value> {
        chain
            .iter()
            .rev()
            .try_fold(input, |value, conversion| conversion.revert(value))
    }

    /// Run the chain of each listed position forward, in place.
    ///
    /// Positions beyond the row are treated as `Null` and appended.
    ///
    /// # Errors
    ///
    /// Stops at the first failing position.
    pub fn execute_row<'a, I>(row: &mut Vec<Value>, chains: I) -> std::result::Result<(), ChainFailure>
    where
        I: IntoIterator<Item = (usize, &'a [Box<dyn Conversion>])>,
    {
        Self::apply_row(row, chains, Self::execute_chain)
    }

    /// Run the chain of each listed position backward, in place.
    ///
    /// # Errors
    ///
    /// Stops at the first failing position.
    pub fn revert_row<'a, I>(row: &mut Vec<Value>, chains: I) -> std::result::Result<(), ChainFailure>
    where
        I: IntoIterator<Item = (usize, &'a [Box<dyn Conversion>])>,
    {
        Self::apply_row(row, chains, Self::revert_chain)
    }

    fn apply_row<'a, I>(
        row: &mut Vec<Value>,
        chains: I,
        run: fn(&[Box<dyn Conversion>], Value) -> Result<Value>,
    ) -> std::result::Result<(), ChainFailure>
    where
        I: IntoIterator<Item = (usize, &'a [Box<dyn Conversion>])>,
    {
        for (position, chain) in chains {
            if chain.is_empty() {
                continue;
            }
            if position >= row.len() {
                row.resize(position + 1, Value::Null);
            }
            let input = std::mem::take(&mut row[position]);
            row[position] = run(chain, input).map_err(|error| ChainFailure { position, error })?;
        }
        Ok(())
    }
}
