//! Static schema descriptors for declared record types
//!
//! A [`Schema`] is a table of [`FieldSpec`]s: field name, semantic type, and the
//! default used when a payload omits the field. Schemas are plain `static` items, so a
//! declared type is identified by the address of its descriptor; two schemas with the
//! same fields are still different types.
//!
//! ```rust
//! use aioslack::schema::{FieldSpec, Schema};
//! use serde_json::json;
//!
//! static POINT: Schema = Schema {
//!     name: "Point",
//!     fields: &[FieldSpec::integer("x"), FieldSpec::integer("y").with_default_int(-1)],
//! };
//!
//! let p = POINT.build(json!({"x": 3}).as_object().unwrap());
//! assert_eq!(p.i64("x"), Some(3));
//! assert_eq!(p.i64("y"), Some(-1));
//! ```

use crate::diagnostics::Diagnostics;
use crate::record::{Record, RecordBuilder};
use serde_json::{Map, Value};

/// Semantic type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    /// A list of ids or names.
    StringList,
    /// A list of anything.
    List,
    /// An opaque sub-object with no declared shape. Object values are generated ad-hoc.
    Generic,
    /// A sub-object of a declared type. Object values are built as that schema.
    Nested(&'static Schema),
}

/// Value a declared field takes when the payload omits it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(&'static str),
    EmptyList,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Null => Value::Null,
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::EmptyList => Value::Array(Vec::new()),
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub default: DefaultValue,
}

impl FieldSpec {
    pub const fn new(name: &'static str, ty: FieldType, default: DefaultValue) -> Self {
        Self { name, ty, default }
    }

    /// String field, defaults to `""`.
    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String, DefaultValue::Str(""))
    }

    /// Integer field, defaults to `0`.
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer, DefaultValue::Int(0))
    }

    /// Boolean field, defaults to `false`.
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean, DefaultValue::Bool(false))
    }

    /// List of strings, defaults to `[]`.
    pub const fn string_list(name: &'static str) -> Self {
        Self::new(name, FieldType::StringList, DefaultValue::EmptyList)
    }

    /// List of anything, defaults to `[]`.
    pub const fn list(name: &'static str) -> Self {
        Self::new(name, FieldType::List, DefaultValue::EmptyList)
    }

    /// Opaque sub-object, defaults to null.
    pub const fn generic(name: &'static str) -> Self {
        Self::new(name, FieldType::Generic, DefaultValue::Null)
    }

    /// Sub-object of a declared type, defaults to null.
    pub const fn nested(name: &'static str, schema: &'static Schema) -> Self {
        Self::new(name, FieldType::Nested(schema), DefaultValue::Null)
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }

    pub const fn with_default_int(self, value: i64) -> Self {
        self.with_default(DefaultValue::Int(value))
    }

    pub const fn with_default_str(self, value: &'static str) -> Self {
        self.with_default(DefaultValue::Str(value))
    }

    pub const fn with_default_bool(self, value: bool) -> Self {
        self.with_default(DefaultValue::Bool(value))
    }
}

/// A declared record type.
#[derive(Debug, PartialEq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|spec| spec.name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }

    /// Build a record of this type, discarding diagnostics.
    pub fn build(&'static self, data: &Map<String, Value>) -> Record {
        RecordBuilder::default().build(self, data)
    }

    /// Build a record of this type, reporting dropped keys to `diagnostics`.
    pub fn build_with(
        &'static self,
        data: &Map<String, Value>,
        diagnostics: &Diagnostics,
    ) -> Record {
        RecordBuilder::new(diagnostics.clone()).build(self, data)
    }

    /// A record holding every field's default.
    pub fn default_record(&'static self) -> Record {
        self.build(&Map::new())
    }
}
