//! Type descriptors
//!
//! A [`TypeDescriptor`] is the registration table for a target type: its
//! fields in declaration order, each with a [`FieldType`], its directives and
//! an [`Accessor`]; an optional constructor; an optional header set; and the
//! interfaces and parent it inherits from.

use crate::directive::{Directive, DirectiveFile, HeadersDirective};
use crate::{Error, Result};
use rowbind_conversions::EnumType;
use rowbind_value::{FromValue, Value, ValueKind};
use std::collections::HashSet;
use std::sync::Arc;

/// Type alias for a field getter
pub type GetterFn<T> = Arc<dyn Fn(&T) -> Result<Value> + Send + Sync>;

/// Type alias for a field setter
pub type SetterFn<T> = Arc<dyn Fn(&mut T, Value) -> Result<()> + Send + Sync>;

/// Type alias for a constructor
pub type ConstructorFn<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

/// Runtime type of a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldType {
    pub kind: ValueKind,
    /// Whether the field accepts null (`Option<_>` in Rust)
    pub optional: bool,
    /// Constants of an enumeration field
    pub enum_type: Option<Arc<EnumType>>,
}

impl FieldType {
    /// A required field of the given kind
    #[must_use]
    pub fn of(kind: ValueKind) -> Self {
        Self {
            kind,
            optional: false,
            enum_type: None,
        }
    }

    /// A nullable field of the given kind
    #[must_use]
    pub fn optional(kind: ValueKind) -> Self {
        Self {
            optional: true,
            ..Self::of(kind)
        }
    }

    /// A required enumeration field
    #[must_use]
    pub fn enumeration(enum_type: Arc<EnumType>) -> Self {
        Self {
            kind: ValueKind::Enum,
            optional: false,
            enum_type: Some(enum_type),
        }
    }

    /// A nullable enumeration field
    #[must_use]
    pub fn optional_enumeration(enum_type: Arc<EnumType>) -> Self {
        Self {
            optional: true,
            ..Self::enumeration(enum_type)
        }
    }

    /// Readable name, for messages
    #[must_use]
    pub fn describe(&self) -> String {
        let base = match &self.enum_type {
            Some(enum_type) => enum_type.name.clone(),
            None => self.kind.to_string(),
        };
        if self.optional {
            format!("optional {base}")
        } else {
            base
        }
    }
}

/// Read and write access to one field of `T`
pub struct Accessor<T> {
    getter: GetterFn<T>,
    setter: SetterFn<T>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        Self {
            getter: Arc::clone(&self.getter),
            setter: Arc::clone(&self.setter),
        }
    }
}

impl<T> std::fmt::Debug for Accessor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accessor").finish_non_exhaustive()
    }
}

impl<T: 'static> Accessor<T> {
    /// Accessor from raw closures working on [`Value`]
    pub fn new(
        getter: impl Fn(&T) -> Result<Value> + Send + Sync + 'static,
        setter: impl Fn(&mut T, Value) -> Result<()> + Send + Sync + 'static,
    ) -> Self {
        Self {
            getter: Arc::new(getter),
            setter: Arc::new(setter),
        }
    }

    /// Accessor from closures over the field's Rust type.
    ///
    /// A null stores `V::default()`, so `Option` fields get `None` and plain
    /// fields their zero value. The setter fails with [`Error::Access`] when
    /// the incoming value has another kind.
    pub fn typed<V>(
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: Into<Value> + FromValue + Default + 'static,
    {
        Self::new(
            move |target| Ok(get(target).into()),
            move |target, value| {
                let value = if value.is_null() {
                    V::default()
                } else {
                    V::from_value(value).map_err(|e| Error::access("", e.to_string()))?
                };
                set(target, value);
                Ok(())
            },
        )
    }
}

impl<T> Accessor<T> {
    /// Read the field's current value
    ///
    /// # Errors
    ///
    /// Returns whatever the getter returns.
    pub fn get(&self, target: &T) -> Result<Value> {
        (self.getter)(target)
    }

    /// Write a value into the field
    ///
    /// # Errors
    ///
    /// Returns whatever the setter returns.
    pub fn set(&self, target: &mut T, value: Value) -> Result<()> {
        (self.setter)(target, value)
    }
}

/// A field of a target type
pub struct FieldDescriptor<T> {
    pub name: String,
    pub field_type: FieldType,
    pub directives: Vec<Directive>,
    pub accessor: Accessor<T>,
}

impl<T> Clone for FieldDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            directives: self.directives.clone(),
            accessor: self.accessor.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("directives", &self.directives)
            .finish_non_exhaustive()
    }
}

impl<T> FieldDescriptor<T> {
    pub fn new(name: impl Into<String>, field_type: FieldType, accessor: Accessor<T>) -> Self {
        Self {
            name: name.into(),
            field_type,
            directives: Vec::new(),
            accessor,
        }
    }

    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<Directive>) -> Self {
        self.directives.push(directive.into());
        self
    }

    #[must_use]
    pub fn with_directives(mut self, directives: impl IntoIterator<Item = Directive>) -> Self {
        self.directives.extend(directives);
        self
    }

    /// Whether the field carries a mapping directive
    #[must_use]
    pub fn is_mapped(&self) -> bool {
        self.directives.iter().any(|d| d.as_parsed().is_some())
    }
}

/// An interface a type declares, which may carry a header set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub headers: Option<HeadersDirective>,
    pub extends: Vec<InterfaceDescriptor>,
}

impl InterfaceDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeadersDirective) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use]
    pub fn extending(mut self, parent: InterfaceDescriptor) -> Self {
        self.extends.push(parent);
        self
    }

    fn find_headers(&self) -> Option<&HeadersDirective> {
        self.headers
            .as_ref()
            .or_else(|| self.extends.iter().find_map(InterfaceDescriptor::find_headers))
    }
}

/// Registration table of a target type
pub struct TypeDescriptor<T> {
    pub name: String,
    pub fields: Vec<FieldDescriptor<T>>,
    constructor: Option<ConstructorFn<T>>,
    pub headers: Option<HeadersDirective>,
    pub interfaces: Vec<InterfaceDescriptor>,
    pub parent: Option<Box<TypeDescriptor<T>>>,
}

impl<T> Clone for TypeDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            fields: self.fields.clone(),
            constructor: self.constructor.clone(),
            headers: self.headers.clone(),
            interfaces: self.interfaces.clone(),
            parent: self.parent.clone(),
        }
    }
}

impl<T> std::fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("constructor", &self.constructor.is_some())
            .field("headers", &self.headers)
            .field("interfaces", &self.interfaces)
            .field("parent", &self.parent)
            .finish()
    }
}

impl<T: 'static> TypeDescriptor<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            constructor: None,
            headers: None,
            interfaces: Vec::new(),
            parent: None,
        }
    }

    /// Add a field, after the ones already declared
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor<T>) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_constructor(
        mut self,
        constructor: impl Fn() -> Result<T> + Send + Sync + 'static,
    ) -> Self {
        self.constructor = Some(Arc::new(constructor));
        self
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeadersDirective) -> Self {
        self.headers = Some(headers);
        self
    }

    #[must_use]
    pub fn with_interface(mut self, interface: InterfaceDescriptor) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Set the parent type whose fields are inherited
    #[must_use]
    pub fn with_parent(mut self, parent: TypeDescriptor<T>) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Every field, own fields first and then the parent chain's.
    ///
    /// A field shadows same-named fields further up the chain.
    #[must_use]
    pub fn all_fields(&self) -> Vec<&FieldDescriptor<T>> {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        let mut current = Some(self);
        while let Some(descriptor) = current {
            for field in &descriptor.fields {
                if seen.insert(field.name.as_str()) {
                    fields.push(field);
                }
            }
            current = descriptor.parent.as_deref();
        }
        fields
    }

    /// Fields carrying a mapping directive, in resolution order
    #[must_use]
    pub fn mapped_fields(&self) -> Vec<&FieldDescriptor<T>> {
        self.all_fields()
            .into_iter()
            .filter(|f| f.is_mapped())
            .collect()
    }

    /// Nearest header set: this type, its interfaces, then its parent
    #[must_use]
    pub fn find_headers(&self) -> Option<&HeadersDirective> {
        self.headers
            .as_ref()
            .or_else(|| self.interfaces.iter().find_map(InterfaceDescriptor::find_headers))
            .or_else(|| self.parent.as_deref().and_then(TypeDescriptor::find_headers))
    }

    /// Build a new, empty instance
    ///
    /// # Errors
    ///
    /// Returns [`Error::Instantiation`] when no constructor is registered or
    /// the constructor fails.
    pub fn instantiate(&self) -> Result<T> {
        let constructor = self.constructor.as_ref().ok_or_else(|| {
            Error::instantiation(&self.name, "no constructor registered")
        })?;
        constructor().map_err(|e| match e {
            Error::Instantiation { .. } => e,
            other => Error::instantiation(&self.name, other.to_string()),
        })
    }

    /// Attach the directives of a YAML directive file.
    ///
    /// Directives are appended after those already declared on each field.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the file names another type or a
    /// field that does not exist.
    pub fn apply_directives(&mut self, file: &DirectiveFile) -> Result<()> {
        if let Some(type_name) = &file.type_name {
            if type_name != &self.name {
                return Err(Error::configuration(format!(
                    "Directive file for {type_name} cannot be applied to {}",
                    self.name
                )));
            }
        }
        let type_name = self.name.clone();
        for entry in &file.fields {
            let field = self.field_mut(&entry.field).ok_or_else(|| {
                Error::configuration(format!(
                    "Unknown field '{}' in directives for {type_name}",
                    entry.field
                ))
            })?;
            field.directives.extend(entry.directives.iter().cloned());
        }
        if let Some(headers) = &file.headers {
            self.headers = Some(headers.clone());
        }
        Ok(())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FieldDescriptor<T>> {
        if let Some(position) = self.fields.iter().position(|f| f.name == name) {
            return self.fields.get_mut(position);
        }
        self.parent.as_deref_mut().and_then(|p| p.field_mut(name))
    }
}

impl<T: Default + 'static> TypeDescriptor<T> {
    /// Use `T::default()` as the constructor
    #[must_use]
    pub fn with_default_constructor(self) -> Self {
        self.with_constructor(|| Ok(T::default()))
    }
}

/// Types that describe their own mapping
pub trait Mapped: Sized + 'static {
    fn descriptor() -> TypeDescriptor<Self>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Item {
        id: i64,
        label: String,
        note: Option<String>,
    }

    fn base() -> TypeDescriptor<Item> {
        TypeDescriptor::new("Base")
            .with_headers(HeadersDirective::new(["id"]))
            .field(
                FieldDescriptor::new(
                    "id",
                    FieldType::of(ValueKind::Long),
                    Accessor::typed(|i: &Item| i.id, |i, v| i.id = v),
                )
                .with_directive(Directive::index(0)),
            )
            .field(FieldDescriptor::new(
                "label",
                FieldType::of(ValueKind::String),
                Accessor::typed(|i: &Item| i.label.clone(), |i, v| i.label = v),
            ))
    }

    fn item() -> TypeDescriptor<Item> {
        TypeDescriptor::new("Item")
            .with_default_constructor()
            .field(
                FieldDescriptor::new(
                    "label",
                    FieldType::of(ValueKind::String),
                    Accessor::typed(|i: &Item| i.label.clone(), |i, v| i.label = v),
                )
                .with_directive(Directive::named("title")),
            )
            .field(FieldDescriptor::new(
                "note",
                FieldType::optional(ValueKind::String),
                Accessor::typed(|i: &Item| i.note.clone(), |i, v| i.note = v),
            ))
            .with_parent(base())
    }

    #[test]
    fn test_all_fields_first_wins() {
        let descriptor = item();
        let names: Vec<&str> = descriptor.all_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["label", "note", "id"]);
        // The child's label carries the override, not the parent's
        assert!(descriptor.all_fields()[0].is_mapped());

        let mapped: Vec<&str> = descriptor.mapped_fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(mapped, vec!["label", "id"]);
    }

    #[test]
    fn test_find_headers_order() {
        let interface = InterfaceDescriptor::new("Printable")
            .extending(InterfaceDescriptor::new("Named").with_headers(HeadersDirective::new(["name"])));
        let descriptor = item().with_interface(interface);
        assert_eq!(descriptor.find_headers().unwrap().sequence, vec!["name"]);

        let descriptor = item();
        assert_eq!(descriptor.find_headers().unwrap().sequence, vec!["id"]);

        let descriptor = item().with_headers(HeadersDirective::new(["own"]));
        assert_eq!(descriptor.find_headers().unwrap().sequence, vec!["own"]);
    }

    #[test]
    fn test_typed_accessor() {
        let descriptor = item();
        let fields = descriptor.all_fields();
        let mut target = descriptor.instantiate().unwrap();

        fields[1].accessor.set(&mut target, Value::from("hi")).unwrap();
        assert_eq!(target.note.as_deref(), Some("hi"));
        fields[1].accessor.set(&mut target, Value::Null).unwrap();
        assert_eq!(fields[1].accessor.get(&target).unwrap(), Value::Null);

        let err = fields[2].accessor.set(&mut target, Value::from("x")).unwrap_err();
        assert!(matches!(err, Error::Access { .. }));

        // Plain fields take their zero value on null
        fields[0].accessor.set(&mut target, Value::from("kept")).unwrap();
        fields[0].accessor.set(&mut target, Value::Null).unwrap();
        assert_eq!(target.label, "");
        fields[2].accessor.set(&mut target, Value::Long(7)).unwrap();
        fields[2].accessor.set(&mut target, Value::Null).unwrap();
        assert_eq!(target.id, 0);
    }

    #[test]
    fn test_missing_constructor() {
        let err = base().instantiate().unwrap_err();
        assert!(matches!(err, Error::Instantiation { ref type_name, .. } if type_name == "Base"));
    }

    #[test]
    fn test_apply_directives() {
        let mut descriptor = item();
        let file = DirectiveFile::from_yaml_str(
            r"
type: Item
fields:
  - field: note
    directives:
      - directive: parsed
        index: 2
      - directive: trim
  - field: id
    directives:
      - directive: format
        formats: ['#,##0']
",
        )
        .unwrap();
        descriptor.apply_directives(&file).unwrap();
        let fields = descriptor.all_fields();
        assert_eq!(fields[1].directives.len(), 2);
        assert_eq!(fields[2].directives.len(), 2);
        assert_eq!(fields[2].directives[1].kind_name(), "format");

        let unknown = DirectiveFile::from_yaml_str("fields:\n  - field: nope\n").unwrap();
        assert!(descriptor.apply_directives(&unknown).unwrap_err().is_configuration());
    }
}
