//! Property setting for formatter objects
//!
//! Format options are written as `key=value` strings. Each formatter
//! publishes the properties it accepts, and the value text is coerced into
//! the declared property kind before it is handed over.

use crate::{Error, Result};
use chrono::FixedOffset;

/// Declared value kind of a formatter property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    Integer,
    Character,
    Boolean,
    Currency,
    TimeZone,
    Locale,
}

/// A coerced property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Character(char),
    Boolean(bool),
    Currency(CurrencyCode),
    TimeZone(FixedOffset),
    Locale(NumberSymbols),
}

/// A property published by a formatter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub writable: bool,
}

impl PropertyDescriptor {
    /// A writable property
    #[must_use]
    pub const fn writable(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            writable: true,
        }
    }

    /// A read-only property
    #[must_use]
    pub const fn read_only(name: &'static str, kind: PropertyKind) -> Self {
        Self {
            name,
            kind,
            writable: false,
        }
    }
}

/// An object whose properties can be set by name
pub trait Configurable {
    /// Type name used in error messages
    fn type_name(&self) -> &'static str;

    /// Every property the object publishes
    fn properties(&self) -> &'static [PropertyDescriptor];

    /// Set a writable property to an already coerced value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is out of range for the property.
    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()>;
}

/// ISO 4217 shaped currency code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a three letter upper-case code.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for anything else.
    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(Error::configuration(format!(
                "Invalid currency code '{code}'"
            )))
        }
    }

    /// The code itself
    #[must_use]
    pub fn code(&self) -> &str {
        &self.0
    }

    /// Display symbol for the currency, the code when no symbol is known
    #[must_use]
    pub fn symbol(&self) -> &str {
        match self.0.as_str() {
            "USD" => "$",
            "EUR" => "€",
            "GBP" => "£",
            "JPY" => "¥",
            "INR" => "₹",
            other => other,
        }
    }
}

/// Locale-specific number symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for NumberSymbols {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

impl NumberSymbols {
    /// Symbols for a language tag such as `en`, `de_DE` or `fr-CA`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an unknown language.
    pub fn for_locale(tag: &str) -> Result<Self> {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        if normalized == "de-ch" {
            return Ok(Self {
                decimal_separator: '.',
                grouping_separator: '\'',
            });
        }
        let language = normalized.split('-').next().unwrap_or_default();
        let symbols = match language {
            "en" | "ja" | "zh" | "ko" | "th" | "he" => Self::default(),
            "de" | "es" | "it" | "pt" | "nl" | "id" | "tr" | "da" | "el" => Self {
                decimal_separator: ',',
                grouping_separator: '.',
            },
            "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "no" | "uk" => Self {
                decimal_separator: ',',
                grouping_separator: '\u{a0}',
            },
            _ => {
                return Err(Error::configuration(format!("Unsupported locale '{tag}'")));
            }
        };
        Ok(symbols)
    }
}

/// Parse a time zone id: `UTC`, `GMT`, `Z` or an offset such as `+05:30`,
/// optionally prefixed by `UTC`/`GMT`.
///
/// # Errors
///
/// Returns a configuration error for an unrecognised id.
pub fn parse_time_zone(id: &str) -> Result<FixedOffset> {
    let invalid = || Error::configuration(format!("Invalid time zone '{id}'"));
    let upper = id.trim().to_ascii_uppercase();
    if upper == "Z" {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }
    let rest = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);
    if rest.is_empty() {
        return FixedOffset::east_opt(0).ok_or_else(invalid);
    }

    let (sign, digits) = if let Some(digits) = rest.strip_prefix('+') {
        (1, digits)
    } else if let Some(digits) = rest.strip_prefix('-') {
        (-1, digits)
    } else {
        return Err(invalid());
    };
    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None if digits.len() == 4 && digits.is_ascii() => digits.split_at(2),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().map_err(|_| invalid())?;
    let minutes: i32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 18 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

fn coerce(kind: PropertyKind, raw: &str) -> Result<PropertyValue> {
    let value = match kind {
        PropertyKind::String => PropertyValue::String(raw.to_string()),
        PropertyKind::Integer => PropertyValue::Integer(raw.trim().parse().map_err(|_| {
            Error::configuration(format!("Cannot convert '{raw}' to an integer"))
        })?),
        PropertyKind::Character => PropertyValue::Character(raw.chars().next().ok_or_else(
            || Error::configuration("Cannot convert an empty value to a character"),
        )?),
        PropertyKind::Boolean => match raw.trim() {
            s if s.eq_ignore_ascii_case("true") => PropertyValue::Boolean(true),
            s if s.eq_ignore_ascii_case("false") => PropertyValue::Boolean(false),
            _ => {
                return Err(Error::configuration(format!(
                    "Cannot convert '{raw}' to a boolean"
                )));
            }
        },
        PropertyKind::Currency => PropertyValue::Currency(CurrencyCode::parse(raw)?),
        PropertyKind::TimeZone => PropertyValue::TimeZone(parse_time_zone(raw)?),
        PropertyKind::Locale => PropertyValue::Locale(NumberSymbols::for_locale(raw)?),
    };
    Ok(value)
}

/// Apply a list of `key=value` settings to a formatter object.
///
/// Settings are applied in order. Every key must name a writable property of
/// the target.
///
/// # Errors
///
/// Returns an error for a malformed setting, an unknown or read-only
/// property, or a value that cannot be coerced to the property kind.
pub fn apply_format_settings(target: &mut dyn Configurable, settings: &[String]) -> Result<()> {
    if settings.is_empty() {
        return Ok(());
    }

    let mut pairs = Vec::with_capacity(settings.len());
    for setting in settings {
        let parts: Vec<&str> = setting.split('=').collect();
        if parts.len() != 2 {
            return Err(Error::configuration(format!(
                "Illegal format setting '{setting}' among: {settings:?}"
            )));
        }
        pairs.push((parts[0].trim(), parts[1]));
    }

    let target_name = target.type_name();
    let mut unknown = Vec::new();
    for (name, raw) in pairs {
        let Some(descriptor) = target.properties().iter().find(|p| p.name == name) else {
            unknown.push(name.to_string());
            continue;
        };
        if !descriptor.writable {
            return Err(Error::property(
                target_name,
                format!("Cannot set property '{name}' to {raw}. No setter defined"),
            ));
        }
        let value = coerce(descriptor.kind, raw).map_err(|e| {
            Error::property(
                target_name,
                format!("Cannot set property '{name}' from '{raw}': {e}"),
            )
        })?;
        target.set_property(name, value)?;
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::property(
            target_name,
            format!("Cannot find properties {unknown:?}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Gauge {
        label: String,
        width: i64,
        fill: char,
        strict: bool,
        zone: Option<FixedOffset>,
    }

    const GAUGE_PROPERTIES: &[PropertyDescriptor] = &[
        PropertyDescriptor::writable("label", PropertyKind::String),
        PropertyDescriptor::writable("width", PropertyKind::Integer),
        PropertyDescriptor::writable("fill", PropertyKind::Character),
        PropertyDescriptor::writable("strict", PropertyKind::Boolean),
        PropertyDescriptor::writable("zone", PropertyKind::TimeZone),
        PropertyDescriptor::read_only("kind", PropertyKind::String),
    ];

    impl Configurable for Gauge {
        fn type_name(&self) -> &'static str {
            "Gauge"
        }

        fn properties(&self) -> &'static [PropertyDescriptor] {
            GAUGE_PROPERTIES
        }

        fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
            match (name, value) {
                ("label", PropertyValue::String(s)) => self.label = s,
                ("width", PropertyValue::Integer(n)) => self.width = n,
                ("fill", PropertyValue::Character(c)) => self.fill = c,
                ("strict", PropertyValue::Boolean(b)) => self.strict = b,
                ("zone", PropertyValue::TimeZone(z)) => self.zone = Some(z),
                (other, _) => return Err(Error::property("Gauge", other)),
            }
            Ok(())
        }
    }

    fn settings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_apply_settings_coerces_kinds() {
        let mut gauge = Gauge::default();
        apply_format_settings(
            &mut gauge,
            &settings(&["label=x", "width=12", "fill=*", "strict=TRUE", "zone=+02:00"]),
        )
        .unwrap();
        assert_eq!(gauge.label, "x");
        assert_eq!(gauge.width, 12);
        assert_eq!(gauge.fill, '*');
        assert!(gauge.strict);
        assert_eq!(gauge.zone, FixedOffset::east_opt(7200));
    }

    #[test]
    fn test_unknown_property_fails() {
        let mut gauge = Gauge::default();
        let err = apply_format_settings(&mut gauge, &settings(&["colour=red"])).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_malformed_and_read_only() {
        let mut gauge = Gauge::default();
        assert!(apply_format_settings(&mut gauge, &settings(&["width"])).is_err());
        assert!(apply_format_settings(&mut gauge, &settings(&["a=b=c"])).is_err());
        let err = apply_format_settings(&mut gauge, &settings(&["kind=x"])).unwrap_err();
        assert!(err.to_string().contains("No setter defined"));
    }

    #[test]
    fn test_uncoercible_value_fails() {
        let mut gauge = Gauge::default();
        let err = apply_format_settings(&mut gauge, &settings(&["width=wide"])).unwrap_err();
        assert!(err.to_string().contains("width"));
        assert!(apply_format_settings(&mut gauge, &settings(&["strict=yes"])).is_err());
    }

    #[test]
    fn test_time_zone_ids() {
        assert_eq!(parse_time_zone("UTC").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_time_zone("Z").unwrap().local_minus_utc(), 0);
        assert_eq!(parse_time_zone("GMT-05:00").unwrap().local_minus_utc(), -18000);
        assert_eq!(parse_time_zone("+0530").unwrap().local_minus_utc(), 19800);
        assert!(parse_time_zone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_currency_and_locale() {
        assert_eq!(CurrencyCode::parse("EUR").unwrap().symbol(), "€");
        assert_eq!(CurrencyCode::parse("CHF").unwrap().symbol(), "CHF");
        assert!(CurrencyCode::parse("euro").is_err());
        assert_eq!(NumberSymbols::for_locale("de_DE").unwrap().decimal_separator, ',');
        assert_eq!(NumberSymbols::for_locale("de-CH").unwrap().grouping_separator, '\'');
        assert!(NumberSymbols::for_locale("xx").is_err());
    }
}
