//! Typed schema contract and document field decoding helpers.
//!
//! # Responsibility
//! - Map typed collection structs to and from `Document`.
//! - Report constraint violations (`choices`, `max_length`, required).
//!
//! # Invariants
//! - `from_document` treats a missing field and a `Null` field the same.
//! - A present field of the wrong shape is an error, never silently dropped.

use crate::model::document::Document;
use crate::model::object_id::ObjectId;
use crate::model::record::{FieldValue, Reference};
use chrono::{NaiveDate, NaiveDateTime};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModelResult<T> = Result<T, ModelError>;

/// Validation and decoding errors for typed schemas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// Required field is absent or null.
    MissingField(&'static str),
    /// Field holds a value of another shape.
    FieldType {
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },
    /// Text is longer than the declared limit.
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual: usize,
    },
    /// Value is outside the declared choices.
    InvalidChoice {
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
    /// Value violates a field-specific format rule.
    InvalidFormat {
        field: &'static str,
        message: &'static str,
    },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::FieldType {
                field,
                expected,
                found,
            } => write!(f, "field `{field}` expected {expected}, found {found}"),
            Self::TooLong {
                field,
                max_chars,
                actual,
            } => write!(
                f,
                "field `{field}` is {actual} chars, longer than max {max_chars}"
            ),
            Self::InvalidChoice {
                field,
                value,
                allowed,
            } => write!(
                f,
                "field `{field}` value `{value}` is not one of {}",
                allowed.join("|")
            ),
            Self::InvalidFormat { field, message } => write!(f, "field `{field}` {message}"),
        }
    }
}

impl Error for ModelError {}

/// Conversion between a typed struct and its document form.
pub trait DocumentCodec: Sized {
    fn to_document(&self) -> Document;
    fn from_document(document: &Document) -> ModelResult<Self>;

    /// Checks field constraints. Default accepts everything.
    fn validate(&self) -> ModelResult<()> {
        Ok(())
    }
}

/// Field value that must be unique within a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub value: String,
}

impl UniqueKey {
    pub fn new(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// Top-level stored document type.
pub trait Schema: DocumentCodec {
    /// Collection the documents are stored under.
    const COLLECTION: &'static str;

    fn id(&self) -> ObjectId;

    /// Uniqueness constraints enforced by the repository on write.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        Vec::new()
    }

    /// Reference link pointing at this document.
    fn reference(&self) -> Reference {
        Reference::link(Self::COLLECTION, self.id())
    }
}

/// Reads the required `id` field.
pub fn required_id(document: &Document) -> ModelResult<ObjectId> {
    match document.get("id") {
        Some(FieldValue::Id(id)) => Ok(*id),
        None | Some(FieldValue::Null) => Err(ModelError::MissingField("id")),
        Some(other) => Err(type_error("id", "id", other)),
    }
}

pub fn opt_text(document: &Document, field: &'static str) -> ModelResult<Option<String>> {
    match present(document, field) {
        None => Ok(None),
        Some(FieldValue::Text(value)) => Ok(Some(value.clone())),
        Some(other) => Err(type_error(field, "text", other)),
    }
}

/// Text field with a declared default when absent.
pub fn text_or(
    document: &Document,
    field: &'static str,
    default: &str,
) -> ModelResult<String> {
    Ok(opt_text(document, field)?.unwrap_or_else(|| default.to_string()))
}

pub fn opt_int(document: &Document, field: &'static str) -> ModelResult<Option<i64>> {
    match present(document, field) {
        None => Ok(None),
        Some(FieldValue::Int(value)) => Ok(Some(*value)),
        Some(other) => Err(type_error(field, "int", other)),
    }
}

pub fn opt_float(document: &Document, field: &'static str) -> ModelResult<Option<f64>> {
    match present(document, field) {
        None => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| type_error(field, "float", value)),
    }
}

pub fn opt_datetime(
    document: &Document,
    field: &'static str,
) -> ModelResult<Option<NaiveDateTime>> {
    match present(document, field) {
        None => Ok(None),
        Some(FieldValue::DateTime(value)) => Ok(Some(*value)),
        Some(other) => Err(type_error(field, "datetime", other)),
    }
}

pub fn opt_date(document: &Document, field: &'static str) -> ModelResult<Option<NaiveDate>> {
    match present(document, field) {
        None => Ok(None),
        Some(FieldValue::Date(value)) => Ok(Some(*value)),
        Some(other) => Err(type_error(field, "date", other)),
    }
}

pub fn opt_reference(
    document: &Document,
    field: &'static str,
) -> ModelResult<Option<Reference>> {
    match present(document, field) {
        None => Ok(None),
        Some(FieldValue::Reference(reference)) => Ok(Some(reference.clone())),
        Some(other) => Err(type_error(field, "reference", other)),
    }
}

pub fn opt_embedded<T: DocumentCodec>(
    document: &Document,
    field: &'static str,
) -> ModelResult<Option<T>> {
    match present(document, field) {
        None => Ok(None),
        Some(FieldValue::Embedded(inner)) => T::from_document(inner).map(Some),
        Some(other) => Err(type_error(field, "embedded", other)),
    }
}

/// List of text values; null items are skipped.
pub fn text_list(document: &Document, field: &'static str) -> ModelResult<Vec<String>> {
    list_items(document, field)?
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            FieldValue::Text(value) => Ok(value.clone()),
            other => Err(type_error(field, "text", other)),
        })
        .collect()
}

pub fn embedded_list<T: DocumentCodec>(
    document: &Document,
    field: &'static str,
) -> ModelResult<Vec<T>> {
    list_items(document, field)?
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            FieldValue::Embedded(inner) => T::from_document(inner),
            other => Err(type_error(field, "embedded", other)),
        })
        .collect()
}

/// List of references; null items are skipped.
pub fn reference_list(document: &Document, field: &'static str) -> ModelResult<Vec<Reference>> {
    list_items(document, field)?
        .iter()
        .filter(|item| !item.is_null())
        .map(|item| match item {
            FieldValue::Reference(reference) => Ok(reference.clone()),
            other => Err(type_error(field, "reference", other)),
        })
        .collect()
}

/// Encodes embedded values for storage.
pub fn embedded_values<T: DocumentCodec>(items: &[T]) -> FieldValue {
    FieldValue::List(
        items
            .iter()
            .map(|item| FieldValue::Embedded(item.to_document()))
            .collect(),
    )
}

pub fn check_max_len(
    field: &'static str,
    value: Option<&str>,
    max_chars: usize,
) -> ModelResult<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let actual = value.chars().count();
    if actual > max_chars {
        return Err(ModelError::TooLong {
            field,
            max_chars,
            actual,
        });
    }
    Ok(())
}

pub fn check_choice(
    field: &'static str,
    value: Option<&str>,
    allowed: &'static [&'static str],
) -> ModelResult<()> {
    match value {
        Some(value) if !allowed.iter().any(|choice| *choice == value) => Err(ModelError::InvalidChoice {
            field,
            value: value.to_string(),
            allowed,
        }),
        _ => Ok(()),
    }
}

/// Rejects a link into another collection than `collection`.
///
/// Resolved targets carry no collection name and are accepted.
pub fn check_reference_target(
    field: &'static str,
    reference: Option<&Reference>,
    collection: &str,
) -> ModelResult<()> {
    match reference {
        Some(Reference::Link {
            collection: target, ..
        }) if target != collection => Err(ModelError::InvalidFormat {
            field,
            message: "links into the wrong collection",
        }),
        _ => Ok(()),
    }
}

fn present<'a>(document: &'a Document, field: &str) -> Option<&'a FieldValue> {
    document.get(field).filter(|value| !value.is_null())
}

fn list_items<'a>(document: &'a Document, field: &'static str) -> ModelResult<&'a [FieldValue]> {
    match present(document, field) {
        None => Ok(&[]),
        Some(FieldValue::List(items)) => Ok(items.as_slice()),
        Some(other) => Err(type_error(field, "list", other)),
    }
}

fn type_error(field: &'static str, expected: &'static str, found: &FieldValue) -> ModelError {
    ModelError::FieldType {
        field,
        expected,
        found: found.kind_name(),
    }
}
