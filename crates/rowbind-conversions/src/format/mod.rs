//! Formatter objects used by formatted conversions

mod date;
mod number;

pub use date::DateFormatter;
pub use number::NumberFormatter;

use crate::properties::apply_format_settings;
use crate::{Conversion, Error, Result};

/// Apply `key=value` options to every formatter object of a conversion.
///
/// # Errors
///
/// Returns a configuration error if the conversion has no formatter objects,
/// or if any option cannot be applied.
pub fn apply_format_options(conversion: &mut dyn Conversion, options: &[String]) -> Result<()> {
    if options.is_empty() {
        return Ok(());
    }

    let description = format!("{conversion:?}");
    let Some(formatted) = conversion.as_formatted() else {
        return Err(Error::configuration(format!(
            "Options {options:?} not supported by conversion {description}. It must expose formatter objects"
        )));
    };

    for formatter in formatted.formatter_objects() {
        apply_format_settings(formatter, options)?;
    }
    Ok(())
}
