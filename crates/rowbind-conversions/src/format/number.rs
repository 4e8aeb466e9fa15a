//! Decimal pattern formatter
//!
//! Supports the common subset of decimal patterns: `#` and `0` digits, `,`
//! grouping, `.` fraction, quoted literals, `%`/`‰` multipliers and the `¤`
//! currency sign in prefixes and suffixes.

use crate::properties::{
    Configurable, CurrencyCode, NumberSymbols, PropertyDescriptor, PropertyKind, PropertyValue,
};
use crate::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

const MAX_SCALE: usize = 28;

const NUMBER_PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::read_only("pattern", PropertyKind::String),
    PropertyDescriptor::writable("decimalSeparator", PropertyKind::Character),
    PropertyDescriptor::writable("groupingSeparator", PropertyKind::Character),
    PropertyDescriptor::writable("groupingUsed", PropertyKind::Boolean),
    PropertyDescriptor::writable("groupingSize", PropertyKind::Integer),
    PropertyDescriptor::writable("minimumIntegerDigits", PropertyKind::Integer),
    PropertyDescriptor::writable("minimumFractionDigits", PropertyKind::Integer),
    PropertyDescriptor::writable("maximumFractionDigits", PropertyKind::Integer),
    PropertyDescriptor::writable("parseIntegerOnly", PropertyKind::Boolean),
    PropertyDescriptor::writable("currency", PropertyKind::Currency),
    PropertyDescriptor::writable("locale", PropertyKind::Locale),
];

/// Formats and parses decimals according to a pattern such as `#,##0.00`
#[derive(Debug, Clone, PartialEq)]
pub struct NumberFormatter {
    pattern: String,
    prefix: String,
    suffix: String,
    grouping_used: bool,
    grouping_size: usize,
    min_integer_digits: usize,
    min_fraction_digits: usize,
    max_fraction_digits: usize,
    multiplier: u32,
    symbols: NumberSymbols,
    currency: Option<CurrencyCode>,
    parse_integer_only: bool,
}

impl NumberFormatter {
    /// Formatter without grouping or rounding, used when no pattern is given
    #[must_use]
    pub fn plain() -> Self {
        Self {
            pattern: String::new(),
            prefix: String::new(),
            suffix: String::new(),
            grouping_used: false,
            grouping_size: 3,
            min_integer_digits: 1,
            min_fraction_digits: 0,
            max_fraction_digits: MAX_SCALE,
            multiplier: 1,
            symbols: NumberSymbols::default(),
            currency: None,
            parse_integer_only: false,
        }
    }

    /// Build a formatter from a pattern.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a malformed pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Ok(Self::plain());
        }
        let malformed = |reason: &str| {
            Error::configuration(format!("Malformed number pattern '{pattern}': {reason}"))
        };

        let positive = pattern.split(';').next().unwrap_or_default();
        let mut prefix = String::new();
        let mut body = String::new();
        let mut suffix = String::new();
        // 0 = prefix, 1 = digits, 2 = suffix
        let mut stage = 0;
        let mut quoted = false;
        let mut chars = positive.chars().peekable();
        while let Some(c) = chars.next() {
            let literal = if c == '\'' {
                if chars.peek() == Some(&'\'') {
                    chars.next();
                    '\''
                } else {
                    quoted = !quoted;
                    continue;
                }
            } else if !quoted && stage < 2 && matches!(c, '#' | '0' | ',' | '.') {
                stage = 1;
                body.push(c);
                continue;
            } else {
                c
            };
            if stage == 1 {
                stage = 2;
            }
            if stage == 0 {
                prefix.push(literal);
            } else {
                suffix.push(literal);
            }
        }

        if !body.chars().any(|c| c == '#' || c == '0') {
            return Err(malformed("no digit placeholders"));
        }
        let (integer, fraction) = body.split_once('.').unwrap_or((body.as_str(), ""));
        if fraction.contains(',') || fraction.contains('.') {
            return Err(malformed("grouping or separator inside the fraction"));
        }
        let grouping_size = integer.rfind(',').map(|pos| integer.len() - pos - 1);
        if grouping_size == Some(0) {
            return Err(malformed("empty grouping"));
        }

        let multiplier = if prefix.contains('%') || suffix.contains('%') {
            100
        } else if prefix.contains('‰') || suffix.contains('‰') {
            1000
        } else {
            1
        };

        Ok(Self {
            pattern: pattern.to_string(),
            prefix,
            suffix,
            grouping_used: grouping_size.is_some(),
            grouping_size: grouping_size.unwrap_or(3),
            min_integer_digits: integer.chars().filter(|c| *c == '0').count(),
            min_fraction_digits: fraction.chars().filter(|c| *c == '0').count(),
            max_fraction_digits: fraction.len().min(MAX_SCALE),
            multiplier,
            symbols: NumberSymbols::default(),
            currency: None,
            parse_integer_only: false,
        })
    }

    /// The pattern this formatter was built from
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Current number symbols
    #[must_use]
    pub fn symbols(&self) -> NumberSymbols {
        self.symbols
    }

    fn render_affix(&self, affix: &str) -> String {
        if affix.contains('¤') {
            let symbol = self.currency.as_ref().map_or("¤", CurrencyCode::symbol);
            affix.replace('¤', symbol)
        } else {
            affix.to_string()
        }
    }

    /// Format a decimal, rounding half-even to the maximum fraction digits.
    ///
    /// # Errors
    ///
    /// Returns an error if applying the pattern multiplier overflows.
    pub fn format(&self, value: Decimal) -> Result<String> {
        let scaled = value
            .checked_mul(Decimal::from(self.multiplier))
            .ok_or_else(|| Error::conversion(value.to_string(), "number too large to format"))?;
        let scale = u32::try_from(self.max_fraction_digits).unwrap_or(28);
        let rounded = scaled.round_dp_with_strategy(scale, RoundingStrategy::MidpointNearestEven);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let text = rounded.abs().to_string();
        let (int_digits, frac_digits) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut fraction = frac_digits.trim_end_matches('0').to_string();
        while fraction.len() < self.min_fraction_digits {
            fraction.push('0');
        }
        let mut integer = if int_digits == "0" && self.min_integer_digits == 0 {
            String::new()
        } else {
            int_digits.to_string()
        };
        while integer.len() < self.min_integer_digits {
            integer.insert(0, '0');
        }
        if integer.is_empty() && fraction.is_empty() {
            integer.push('0');
        }
        if self.grouping_used {
            integer = group_digits(
                &integer,
                self.grouping_size,
                self.symbols.grouping_separator,
            );
        }

        let mut out = String::new();
        if negative {
            out.push('-');
        }
        out.push_str(&self.render_affix(&self.prefix));
        out.push_str(&integer);
        if !fraction.is_empty() {
            out.push(self.symbols.decimal_separator);
            out.push_str(&fraction);
        }
        out.push_str(&self.render_affix(&self.suffix));
        Ok(out)
    }

    /// Parse text produced by this pattern (prefix and suffix are optional).
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the text is not a number in this format.
    pub fn parse(&self, text: &str) -> Result<Decimal> {
        let mut rest = text.trim();
        let mut negative = false;
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = true;
            rest = stripped.trim_start();
        }
        let prefix = self.render_affix(&self.prefix);
        if !prefix.is_empty() {
            rest = rest.strip_prefix(prefix.as_str()).unwrap_or(rest);
        }
        if let Some(stripped) = rest.strip_prefix('-') {
            negative = !negative;
            rest = stripped;
        }
        let suffix = self.render_affix(&self.suffix);
        if !suffix.is_empty() {
            rest = rest.strip_suffix(suffix.as_str()).unwrap_or(rest);
        }

        let mut cleaned = String::with_capacity(rest.len());
        let mut seen_decimal = false;
        for c in rest.trim().chars() {
            if c.is_ascii_digit() {
                cleaned.push(c);
            } else if c == self.symbols.decimal_separator && !seen_decimal {
                seen_decimal = true;
                if self.parse_integer_only {
                    break;
                }
                cleaned.push('.');
            } else if self.grouping_used && c == self.symbols.grouping_separator && !seen_decimal
            {
                continue;
            } else {
                return Err(Error::conversion(
                    text,
                    format!("unexpected character '{c}' for pattern '{}'", self.pattern),
                ));
            }
        }
        if !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return Err(Error::conversion(text, "no digits to parse"));
        }

        let mut number =
            Decimal::from_str(&cleaned).map_err(|e| Error::conversion(text, e.to_string()))?;
        if self.multiplier != 1 {
            number = number
                .checked_div(Decimal::from(self.multiplier))
                .ok_or_else(|| Error::conversion(text, "number out of range"))?;
        }
        Ok(if negative { -number } else { number })
    }
}

fn group_digits(digits: &str, size: usize, separator: char) -> String {
    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(chars.len() + chars.len() / size.max(1));
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % size == 0 {
            out.push(separator);
        }
        out.push(*c);
    }
    out
}

fn digit_count(name: &str, value: i64) -> Result<usize> {
    usize::try_from(value)
        .ok()
        .filter(|n| *n <= MAX_SCALE)
        .ok_or_else(|| {
            Error::property(
                "NumberFormatter",
                format!("{name} must be between 0 and {MAX_SCALE}, got {value}"),
            )
        })
}

impl Configurable for NumberFormatter {
    fn type_name(&self) -> &'static str {
        "NumberFormatter"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        NUMBER_PROPERTIES
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, value) {
            ("decimalSeparator", PropertyValue::Character(c)) => self.symbols.decimal_separator = c,
            ("groupingSeparator", PropertyValue::Character(c)) => {
                self.symbols.grouping_separator = c;
            }
            ("groupingUsed", PropertyValue::Boolean(b)) => self.grouping_used = b,
            ("groupingSize", PropertyValue::Integer(n)) => {
                let size = digit_count(name, n)?;
                if size == 0 {
                    return Err(Error::property("NumberFormatter", "groupingSize must be positive"));
                }
                self.grouping_size = size;
            }
            ("minimumIntegerDigits", PropertyValue::Integer(n)) => {
                self.min_integer_digits = digit_count(name, n)?;
            }
            ("minimumFractionDigits", PropertyValue::Integer(n)) => {
                self.min_fraction_digits = digit_count(name, n)?;
                self.max_fraction_digits = self.max_fraction_digits.max(self.min_fraction_digits);
            }
            ("maximumFractionDigits", PropertyValue::Integer(n)) => {
                self.max_fraction_digits = digit_count(name, n)?;
                self.min_fraction_digits = self.min_fraction_digits.min(self.max_fraction_digits);
            }
            ("parseIntegerOnly", PropertyValue::Boolean(b)) => self.parse_integer_only = b,
            ("currency", PropertyValue::Currency(code)) => self.currency = Some(code),
            ("locale", PropertyValue::Locale(symbols)) => self.symbols = symbols,
            (other, value) => {
                return Err(Error::property(
                    "NumberFormatter",
                    format!("Cannot set property '{other}' to {value:?}"),
                ));
            }
        }
        Ok(())
    }
}
