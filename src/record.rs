//! Field-accessible records built from decoded JSON
//!
//! Responses from the Web API and events from the RTM stream arrive as arbitrary,
//! nested JSON objects. This module turns them into [`Record`]s: ordered,
//! immutable collections of named [`Field`]s that can be read by name without
//! declaring a Rust struct per endpoint.
//!
//! There are two ways to get a record:
//!
//! - **Ad-hoc** with [`Record::generate`]: the field set is exactly the keys of the
//!   input. Nested objects optionally become nested ad-hoc records, named after the
//!   title-cased key (`"topic"` becomes a record named `"Topic"`).
//! - **Declared** with [`RecordBuilder::build`]: the field set comes from a static
//!   [`Schema`]. Missing keys take the field's default, unknown keys are reported to
//!   the builder's [`Diagnostics`] and dropped, and nested objects are built into the
//!   declared nested schema (or generated ad-hoc when the field has none).
//!
//! ```text
//! {"id": "C1", "topic": {"value": "x"}, "color": "red"}
//!     │
//!     │ RecordBuilder::build(&CHANNEL, ..)
//!     ▼
//! Channel { id: "C1", name: "", .., topic: Value { value: "x", creator: "", last_set: 0 }, .. }
//!           (diagnostic: unknown attribute color for Channel)
//! ```

use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::schema::{FieldType, Schema};
use crate::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};
use std::ops::Index;

/// Name given to ad-hoc records when the caller supplies none.
pub const DEFAULT_RECORD_NAME: &str = "Unknown";

static NULL_FIELD: Field = Field::Json(Value::Null);

/// The value held by one field of a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    /// A scalar, a list, or a mapping that was left unconverted.
    Json(Value),
    /// A nested record.
    Record(Record),
}

impl Field {
    /// The raw JSON value, if this field is not a nested record.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Field::Json(value) => Some(value),
            Field::Record(_) => None,
        }
    }

    /// The nested record, if any.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Field::Record(record) => Some(record),
            Field::Json(_) => None,
        }
    }

    /// The value as a string, if it is one.
    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    /// The value as an integer, if it is one.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    /// The value as a float, if it is a number.
    pub fn as_f64(&self) -> Option<f64> {
        self.as_json().and_then(Value::as_f64)
    }

    /// The value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    /// The value as a list, if it is one.
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        self.as_json().and_then(Value::as_array)
    }

    /// A raw mapping left in place by non-recursive generation.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.as_json().and_then(Value::as_object)
    }

    /// Whether the value is JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Json(Value::Null))
    }

    /// Convert back to plain JSON, flattening nested records into objects.
    pub fn to_json(&self) -> Value {
        match self {
            Field::Json(value) => value.clone(),
            Field::Record(record) => record.to_json(),
        }
    }
}

impl From<Value> for Field {
    fn from(value: Value) -> Self {
        Field::Json(value)
    }
}

impl From<Record> for Field {
    fn from(record: Record) -> Self {
        Field::Record(record)
    }
}

impl PartialEq<Value> for Field {
    fn eq(&self, other: &Value) -> bool {
        match self {
            Field::Json(value) => value == other,
            Field::Record(record) => &record.to_json() == other,
        }
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Field::Json(value) => value.serialize(serializer),
            Field::Record(record) => record.serialize(serializer),
        }
    }
}

/// A named, immutable set of fields.
///
/// The field set is fixed when the record is created. Fields keep the order in which
/// they were produced: input order for ad-hoc records, declaration order for
/// declared ones.
#[derive(Debug, Clone)]
pub struct Record {
    name: String,
    schema: Option<&'static Schema>,
    fields: Vec<(String, Field)>,
}

/// Records are equal when they have the same name and fields and come from the same
/// declared schema (by identity, as in [`Record::is_instance_of`]) or are both ad-hoc.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let same_schema = match (self.schema, other.schema) {
            (Some(a), Some(b)) => std::ptr::eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_schema && self.name == other.name && self.fields == other.fields
    }
}

impl Record {
    /// Create an ad-hoc record from explicit fields.
    pub fn new<K, I>(name: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Field)>,
    {
        Self {
            name: name.into(),
            schema: None,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub(crate) fn declared(schema: &'static Schema, fields: Vec<(String, Field)>) -> Self {
        Self {
            name: schema.name.to_string(),
            schema: Some(schema),
            fields,
        }
    }

    /// Generate an ad-hoc record whose fields are exactly the keys of `data`.
    ///
    /// With `recursive`, every value that is itself an object becomes a nested ad-hoc
    /// record named after the title-cased key. Without it, such values are kept as raw
    /// mappings. Lists are never descended into. This never fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use aioslack::Record;
    /// use serde_json::json;
    ///
    /// let data = json!({"foo": "bar", "fizz": {"buzz": 1}});
    /// let obj = Record::generate(data.as_object().unwrap(), "Something", true);
    ///
    /// assert_eq!(obj.name(), "Something");
    /// assert_eq!(obj.str("foo"), Some("bar"));
    /// assert_eq!(obj.record("fizz").unwrap().name(), "Fizz");
    /// assert_eq!(obj.record("fizz").unwrap().i64("buzz"), Some(1));
    /// ```
    pub fn generate(data: &Map<String, Value>, name: &str, recursive: bool) -> Self {
        let fields = data
            .iter()
            .map(|(key, value)| {
                let field = match value {
                    Value::Object(nested) if recursive => {
                        Field::Record(Record::generate(nested, &title_case(key), true))
                    }
                    other => Field::Json(other.clone()),
                };
                (key.clone(), field)
            })
            .collect();

        Self {
            name: name.to_string(),
            schema: None,
            fields,
        }
    }

    /// Display name of the record (the schema name for declared records).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared schema, or `None` for ad-hoc records.
    pub fn schema(&self) -> Option<&'static Schema> {
        self.schema
    }

    pub fn is_declared(&self) -> bool {
        self.schema.is_some()
    }

    /// Whether this record was built against exactly `schema`.
    pub fn is_instance_of(&self, schema: &Schema) -> bool {
        self.schema.is_some_and(|own| std::ptr::eq(own, schema))
    }

    /// Field by name.
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, field)| field)
    }

    /// Whether the record has a field called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Field::as_str)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Field::as_i64)
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Field::as_bool)
    }

    pub fn list(&self, name: &str) -> Option<&Vec<Value>> {
        self.get(name).and_then(Field::as_array)
    }

    pub fn record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(Field::as_record)
    }

    /// Field names in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    /// `(name, field)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(key, field)| (key.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Plain JSON object of the fields, nested records included.
    pub fn to_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(key, field)| (key.clone(), field.to_json()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.to_map())
    }
}

/// Subscript access, equivalent to [`Record::get`]. A missing field reads as null.
impl Index<&str> for Record {
    type Output = Field;

    fn index(&self, name: &str) -> &Field {
        self.get(name).unwrap_or(&NULL_FIELD)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, field) in &self.fields {
            map.serialize_entry(key, field)?;
        }
        map.end()
    }
}

/// Builds declared and ad-hoc records, reporting dropped data to a [`Diagnostics`] sink.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    diagnostics: Diagnostics,
}

impl RecordBuilder {
    pub fn new(diagnostics: Diagnostics) -> Self {
        Self { diagnostics }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// See [`Record::generate`].
    pub fn generate(&self, data: &Map<String, Value>, name: &str, recursive: bool) -> Record {
        Record::generate(data, name, recursive)
    }

    /// Build a record of the declared `schema` from `data`.
    ///
    /// For every declared field, in declaration order:
    ///
    /// - absent key: the field's default
    /// - object value, field declared `Nested(S)`: built recursively as `S`
    /// - object value, any other field type: generated ad-hoc, named after the key
    /// - anything else: kept unchanged
    ///
    /// A `Nested` field holding null or a scalar keeps that raw value rather than the
    /// nested schema's default.
    ///
    /// Keys of `data` that the schema does not declare are dropped, each one reported
    /// as [`Diagnostic::UnknownAttribute`]. Building never fails.
    pub fn build(&self, schema: &'static Schema, data: &Map<String, Value>) -> Record {
        let fields = schema
            .fields
            .iter()
            .map(|spec| {
                let field = match (data.get(spec.name), spec.ty) {
                    (None, _) => Field::Json(spec.default.to_value()),
                    (Some(Value::Object(nested)), FieldType::Nested(inner)) => {
                        Field::Record(self.build(inner, nested))
                    }
                    (Some(Value::Object(nested)), _) => {
                        Field::Record(Record::generate(nested, &title_case(spec.name), true))
                    }
                    (Some(value), _) => Field::Json(value.clone()),
                };
                (spec.name.to_string(), field)
            })
            .collect();

        for key in data.keys() {
            if !schema.has_field(key) {
                self.diagnostics.emit(Diagnostic::UnknownAttribute {
                    schema: schema.name,
                    key: key.clone(),
                });
            }
        }

        Record::declared(schema, fields)
    }

    /// Build from a JSON value that must be an object.
    pub fn build_value(&self, schema: &'static Schema, value: &Value) -> Result<Record> {
        match value {
            Value::Object(data) => Ok(self.build(schema, data)),
            other => Err(Error::invalid_input(format!(
                "expected an object for {}, got {}",
                schema.name,
                json_kind(other)
            ))),
        }
    }

    /// Build every object in `values` as `schema`.
    ///
    /// Entries that are not objects are reported as [`Diagnostic::SkippedEntry`] and
    /// left out of the result.
    pub fn build_list(&self, schema: &'static Schema, values: &[Value]) -> Vec<Record> {
        values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| match value {
                Value::Object(data) => Some(self.build(schema, data)),
                _ => {
                    self.diagnostics.emit(Diagnostic::SkippedEntry {
                        schema: schema.name,
                        index,
                    });
                    None
                }
            })
            .collect()
    }
}

/// Title-case a key the way nested record names are derived: the first letter of
/// every alphabetic run is upper-cased and the rest lower-cased (`last_set` becomes
/// `Last_Set`).
pub fn title_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut previous_alpha = false;
    for c in key.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
