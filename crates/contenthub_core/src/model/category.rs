//! Editorial category tree.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::record::Reference;
use crate::model::schema::{
    check_choice, opt_datetime, opt_int, opt_reference, opt_text, required_id, text_or,
    DocumentCodec, ModelError, ModelResult, Schema,
};
use chrono::NaiveDateTime;

pub const CATEGORY_STATUS_CHOICES: &[&str] = &["enabled", "disabled"];

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: ObjectId,
    pub name: Option<String>,
    /// Parent node; `None` for roots.
    pub parent: Option<Reference>,
    pub article_count: Option<i64>,
    pub create_time: Option<NaiveDateTime>,
    pub status: String,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: Some(name.into()),
            parent: None,
            article_count: None,
            create_time: Some(chrono::Local::now().naive_local()),
            status: "enabled".to_string(),
        }
    }
}

impl DocumentCodec for Category {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("name", self.name.clone())
            .with("parent", self.parent.clone())
            .with("article_count", self.article_count)
            .with("create_time", self.create_time)
            .with("status", self.status.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            name: opt_text(document, "name")?,
            parent: opt_reference(document, "parent")?,
            article_count: opt_int(document, "article_count")?,
            create_time: opt_datetime(document, "create_time")?,
            status: text_or(document, "status", "enabled")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        if self.article_count.is_some_and(|count| count < 0) {
            return Err(ModelError::InvalidFormat {
                field: "article_count",
                message: "must not be negative",
            });
        }
        if self.parent.as_ref().and_then(Reference::id) == Some(self.id) {
            return Err(ModelError::InvalidFormat {
                field: "parent",
                message: "must not point at the category itself",
            });
        }
        check_choice("status", Some(&self.status), CATEGORY_STATUS_CHOICES)
    }
}

impl Schema for Category {
    const COLLECTION: &'static str = "category";

    fn id(&self) -> ObjectId {
        self.id
    }
}
