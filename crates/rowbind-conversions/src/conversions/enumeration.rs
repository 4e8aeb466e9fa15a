//! Enumeration conversions
//!
//! Target enums are described at runtime by an [`EnumType`]: the constant
//! names in declaration order, a display label and named properties per
//! constant. An [`EnumConversion`] maps text to a constant by one or more
//! [`EnumSelector`]s and writes the key of the first selector back.

use crate::{Conversion, Error, Result, input_text};
use rowbind_value::{Value, ValueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// One constant of an enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumConstant {
    pub name: String,
    pub label: Option<String>,
    pub properties: BTreeMap<String, String>,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Display text: the label, or the name when no label is set
    #[must_use]
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Runtime description of an enumeration type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub constants: Vec<EnumConstant>,
}

impl EnumType {
    pub fn new(name: impl Into<String>, constants: impl IntoIterator<Item = EnumConstant>) -> Self {
        Self {
            name: name.into(),
            constants: constants.into_iter().collect(),
        }
    }

    /// An enumeration whose constants only have names
    pub fn from_names(name: impl Into<String>, names: &[&str]) -> Self {
        Self::new(name, names.iter().map(|n| EnumConstant::new(*n)))
    }

    #[must_use]
    pub fn constant(&self, name: &str) -> Option<&EnumConstant> {
        self.constants.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.constants.iter().position(|c| c.name == name)
    }
}

/// How an enumeration constant is identified in text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumSelector {
    Name,
    Ordinal,
    Display,
    CustomElement,
}

/// Converts text to enumeration constants and back
#[derive(Debug, Clone)]
pub struct EnumConversion {
    enum_type: Arc<EnumType>,
    value_if_null: Option<String>,
    null_write: Option<String>,
    custom_element: Option<String>,
    selectors: Vec<EnumSelector>,
    lookup: HashMap<String, String>,
}

impl EnumConversion {
    /// Selectors used when none are declared
    pub const DEFAULT_SELECTORS: [EnumSelector; 3] =
        [EnumSelector::Name, EnumSelector::Ordinal, EnumSelector::Display];

    /// Build the conversion and its lookup table.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the null-read constant does not
    /// exist, if `CustomElement` is selected without an element name (or a
    /// constant lacks that element), or if two constants share a key.
    pub fn new(
        enum_type: Arc<EnumType>,
        value_if_null: Option<String>,
        null_write: Option<String>,
        custom_element: Option<String>,
        selectors: Vec<EnumSelector>,
    ) -> Result<Self> {
        let selectors = if selectors.is_empty() {
            Self::DEFAULT_SELECTORS.to_vec()
        } else {
            selectors
        };

        if let Some(name) = &value_if_null {
            if enum_type.constant(name).is_none() {
                return Err(Error::configuration(format!(
                    "Cannot find constant '{name}' in enumeration {}",
                    enum_type.name
                )));
            }
        }
        if selectors.contains(&EnumSelector::CustomElement) && custom_element.is_none() {
            return Err(Error::configuration(format!(
                "Cannot select {} constants by custom element without an element name",
                enum_type.name
            )));
        }

        let mut conversion = Self {
            enum_type,
            value_if_null,
            null_write,
            custom_element,
            selectors,
            lookup: HashMap::new(),
        };

        let mut lookup = HashMap::new();
        for selector in &conversion.selectors {
            for (ordinal, constant) in conversion.enum_type.constants.iter().enumerate() {
                let key = conversion.key_for(*selector, ordinal, constant)?;
                match lookup.get(&key) {
                    Some(existing) if existing != &constant.name => {
                        return Err(Error::configuration(format!(
                            "Ambiguous key '{key}' in enumeration {}: matches {existing} and {}",
                            conversion.enum_type.name, constant.name
                        )));
                    }
                    Some(_) => {}
                    None => {
                        lookup.insert(key, constant.name.clone());
                    }
                }
            }
        }
        conversion.lookup = lookup;
        Ok(conversion)
    }

    fn key_for(
        &self,
        selector: EnumSelector,
        ordinal: usize,
        constant: &EnumConstant,
    ) -> Result<String> {
        match selector {
            EnumSelector::Name => Ok(constant.name.clone()),
            EnumSelector::Ordinal => Ok(ordinal.to_string()),
            EnumSelector::Display => Ok(constant.display().to_string()),
            EnumSelector::CustomElement => {
                let element = self.custom_element.as_deref().unwrap_or_default();
                constant.properties.get(element).cloned().ok_or_else(|| {
                    Error::configuration(format!(
                        "Element '{element}' not found in constant {}.{}",
                        self.enum_type.name, constant.name
                    ))
                })
            }
        }
    }

    #[must_use]
    pub fn enum_type(&self) -> &EnumType {
        &self.enum_type
    }

    #[must_use]
    pub fn selectors(&self) -> &[EnumSelector] {
        &self.selectors
    }
}

impl Conversion for EnumConversion {
    fn execute(&self, input: Value) -> Result<Value> {
        match input {
            Value::Null => Ok(self.value_if_null.clone().map_or(Value::Null, Value::Enum)),
            Value::Enum(name) if self.enum_type.constant(&name).is_some() => Ok(Value::Enum(name)),
            other => {
                let text = input_text(&other);
                self.lookup
                    .get(&text)
                    .map(|name| Value::Enum(name.clone()))
                    .ok_or_else(|| {
                        Error::conversion(
                            text.as_str(),
                            format!("not a constant of enumeration {}", self.enum_type.name),
                        )
                    })
            }
        }
    }

    fn revert(&self, input: Value) -> Result<Value> {
        match input {
            Value::Null => Ok(self.null_write.clone().map_or(Value::Null, Value::String)),
            Value::Enum(name) => {
                let ordinal = self.enum_type.ordinal(&name).ok_or_else(|| {
                    Error::conversion(
                        name.as_str(),
                        format!("not a constant of enumeration {}", self.enum_type.name),
                    )
                })?;
                let constant = &self.enum_type.constants[ordinal];
                let selector = self.selectors.first().copied().unwrap_or(EnumSelector::Name);
                Ok(Value::String(self.key_for(selector, ordinal, constant)?))
            }
            other => Err(Error::conversion(
                other.to_string(),
                format!("expected an enumeration constant, found {}", other.kind_name()),
            )),
        }
    }

    fn execute_kind(&self) -> ValueKind {
        ValueKind::Enum
    }

    fn revert_kind(&self) -> ValueKind {
        ValueKind::String
    }
}
