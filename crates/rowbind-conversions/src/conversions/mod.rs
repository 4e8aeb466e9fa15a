//! Standard conversions

mod boolean;
mod date;
mod enumeration;
mod number;
mod text;
mod typed;

pub use boolean::BooleanConversion;
pub use date::DateConversion;
pub use enumeration::{EnumConstant, EnumConversion, EnumSelector, EnumType};
pub use number::FormattedNumberConversion;
pub use text::{CaseConversion, NullStringConversion, RegexReplaceConversion, TrimConversion};
pub use typed::TypedConversion;
