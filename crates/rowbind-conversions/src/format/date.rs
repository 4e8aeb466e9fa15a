//! Date and date-time pattern formatter

use crate::properties::{Configurable, PropertyDescriptor, PropertyKind, PropertyValue};
use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt::Write;

const DATE_PROPERTIES: &[PropertyDescriptor] = &[
    PropertyDescriptor::read_only("pattern", PropertyKind::String),
    PropertyDescriptor::writable("timeZone", PropertyKind::TimeZone),
    PropertyDescriptor::writable("lenient", PropertyKind::Boolean),
];

/// Parses and formats temporal values with a strftime pattern.
///
/// Date-times are stored in UTC. The configured time zone is the zone of the
/// text: parsing shifts from it to UTC and formatting shifts back.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFormatter {
    pattern: String,
    time_zone: FixedOffset,
    lenient: bool,
}

impl DateFormatter {
    /// Build a formatter from a strftime pattern such as `%d/%m/%Y`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pattern is empty or invalid.
    pub fn new(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::configuration("Date pattern must not be empty"));
        }
        if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
            return Err(Error::configuration(format!(
                "Invalid date pattern '{pattern}'"
            )));
        }
        let utc = FixedOffset::east_opt(0)
            .ok_or_else(|| Error::configuration("UTC offset unavailable"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            time_zone: utc,
            lenient: false,
        })
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn time_zone(&self) -> FixedOffset {
        self.time_zone
    }

    fn offset(&self) -> Duration {
        Duration::seconds(i64::from(self.time_zone.local_minus_utc()))
    }

    /// Parse text into a UTC date-time. Date-only patterns give midnight.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the text does not match the pattern.
    pub fn parse(&self, text: &str) -> Result<NaiveDateTime> {
        let input = if self.lenient { text.trim() } else { text };

        let parsed = if self.lenient {
            NaiveDateTime::parse_and_remainder(input, &self.pattern).map(|(dt, _)| dt)
        } else {
            NaiveDateTime::parse_from_str(input, &self.pattern)
        };
        if let Ok(local) = parsed {
            return local
                .checked_sub_signed(self.offset())
                .ok_or_else(|| Error::conversion(text, "date out of range"));
        }

        let date = if self.lenient {
            NaiveDate::parse_and_remainder(input, &self.pattern).map(|(d, _)| d)
        } else {
            NaiveDate::parse_from_str(input, &self.pattern)
        };
        date.map(|d| d.and_time(NaiveTime::MIN)).map_err(|e| {
            Error::conversion(text, format!("does not match pattern '{}': {e}", self.pattern))
        })
    }

    /// Format a UTC date-time in the configured zone.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the pattern asks for fields a naive
    /// date-time does not carry.
    pub fn format_datetime(&self, value: NaiveDateTime) -> Result<String> {
        let local = value
            .checked_add_signed(self.offset())
            .ok_or_else(|| Error::conversion(value.to_string(), "date out of range"))?;
        let mut out = String::new();
        write!(out, "{}", local.format(&self.pattern)).map_err(|_| {
            Error::conversion(
                value.to_string(),
                format!("cannot be formatted with '{}'", self.pattern),
            )
        })?;
        Ok(out)
    }

    /// Format a calendar date. Time fields in the pattern render as midnight.
    ///
    /// # Errors
    ///
    /// Returns a conversion error if the pattern cannot be rendered.
    pub fn format_date(&self, value: NaiveDate) -> Result<String> {
        let mut out = String::new();
        write!(out, "{}", value.and_time(NaiveTime::MIN).format(&self.pattern)).map_err(|_| {
            Error::conversion(
                value.to_string(),
                format!("cannot be formatted with '{}'", self.pattern),
            )
        })?;
        Ok(out)
    }
}

impl Configurable for DateFormatter {
    fn type_name(&self) -> &'static str {
        "DateFormatter"
    }

    fn properties(&self) -> &'static [PropertyDescriptor] {
        DATE_PROPERTIES
    }

    fn set_property(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        match (name, value) {
            ("timeZone", PropertyValue::TimeZone(zone)) => self.time_zone = zone,
            ("lenient", PropertyValue::Boolean(lenient)) => self.lenient = lenient,
            (other, value) => {
                return Err(Error::property(
                    "DateFormatter",
                    format!("Cannot set property '{other}' to {value:?}"),
                ));
            }
        }
        Ok(())
    }
}
