//! Field values and the record access contract.
//!
//! # Responsibility
//! - Define the value shapes a stored field can hold.
//! - Define `Record`, the capability the projection layer walks.
//!
//! # Invariants
//! - Looking up an undeclared field yields `None`, never a panic.
//! - Only embedded documents, resolved references and JSON objects expose
//!   nested field access.

use crate::model::document::Document;
use crate::model::object_id::ObjectId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Link to another stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    /// Pointer only; the target has not been loaded.
    Link { collection: String, id: ObjectId },
    /// Target loaded by the repository.
    Resolved(Box<Document>),
}

impl Reference {
    pub fn link(collection: impl Into<String>, id: ObjectId) -> Self {
        Self::Link {
            collection: collection.into(),
            id,
        }
    }

    /// Identifier of the target, when known.
    ///
    /// A resolved target without an `id` field returns `None`.
    pub fn id(&self) -> Option<ObjectId> {
        match self {
            Self::Link { id, .. } => Some(*id),
            Self::Resolved(document) => document.id(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// Stored value of one document field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Id(ObjectId),
    List(Vec<FieldValue>),
    /// Free-form mapping from non-strict sources.
    Dict(Map<String, Value>),
    Embedded(Document),
    Reference(Reference),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen to floats; mongo-style numeric fields mix both.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Self::DateTime(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<ObjectId> {
        match self {
            Self::Id(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(values) => Some(values.as_slice()),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Dict(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Embedded(document) => Some(document),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Short type name used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::DateTime(_) => "datetime",
            Self::Date(_) => "date",
            Self::Id(_) => "id",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Embedded(_) => "embedded",
            Self::Reference(_) => "reference",
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<ObjectId> for FieldValue {
    fn from(value: ObjectId) -> Self {
        Self::Id(value)
    }
}

impl From<Document> for FieldValue {
    fn from(value: Document) -> Self {
        Self::Embedded(value)
    }
}

impl From<Reference> for FieldValue {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}

impl From<Map<String, Value>> for FieldValue {
    fn from(value: Map<String, Value>) -> Self {
        Self::Dict(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Borrowed view of one field, either a typed document value or plain JSON.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Value(&'a FieldValue),
    Json(&'a Value),
}

impl<'a> FieldRef<'a> {
    /// Returns the nested record when this value supports field access.
    pub fn as_record(self) -> Option<&'a dyn Record> {
        match self {
            Self::Value(FieldValue::Embedded(document)) => Some(document),
            Self::Value(FieldValue::Reference(Reference::Resolved(document))) => {
                Some(document.as_ref())
            }
            Self::Value(FieldValue::Dict(map)) => Some(map),
            Self::Json(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}

/// Named-field access over a structured record.
pub trait Record {
    /// Declared field names, in declaration order.
    fn field_names(&self) -> Vec<&str>;

    /// Whether `name` is a declared field of this record.
    fn has_field(&self, name: &str) -> bool {
        self.field_names().contains(&name)
    }

    /// Value of a declared field; `None` for undeclared names.
    fn field(&self, name: &str) -> Option<FieldRef<'_>>;
}

impl Record for Map<String, Value> {
    fn field_names(&self) -> Vec<&str> {
        self.keys().map(String::as_str).collect()
    }

    fn has_field(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        self.get(name).map(FieldRef::Json)
    }
}
