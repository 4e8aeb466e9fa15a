//! Error handlers for the write path
//!
//! A record that cannot be written is not an error for the caller: the
//! failure goes to an [`ErrorHandler`] together with the partially built
//! row, and the record is skipped.

use crate::Error;
use rowbind_value::Value;
use tracing::warn;

/// Receives non-fatal write failures
pub trait ErrorHandler: Send {
    fn handle(&mut self, error: &Error, row: &[Value]);
}

impl<F> ErrorHandler for F
where
    F: FnMut(&Error, &[Value]) + Send,
{
    fn handle(&mut self, error: &Error, row: &[Value]) {
        self(error, row);
    }
}

/// Logs each failure at warn level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogErrorHandler;

impl ErrorHandler for LogErrorHandler {
    fn handle(&mut self, error: &Error, row: &[Value]) {
        warn!(error = %error, row = ?row, "Skipping record that could not be written");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_handler() {
        let mut seen = Vec::new();
        {
            let mut handler = |error: &Error, row: &[Value]| seen.push((error.to_string(), row.len()));
            handler.handle(&Error::access("age", "boom"), &[Value::Null, Value::Null]);
        }
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, 2);
        assert!(seen[0].0.contains("boom"));
    }
}
