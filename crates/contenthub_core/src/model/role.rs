//! Access role granted to back-office accounts.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::schema::{
    check_max_len, opt_text, required_id, DocumentCodec, ModelError, ModelResult, Schema,
    UniqueKey,
};

pub const ROLE_NAME_MAX_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: ObjectId,
    /// Unique role name.
    pub name: String,
    pub description: Option<String>,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: name.into(),
            description: None,
        }
    }
}

impl DocumentCodec for Role {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("name", self.name.clone())
            .with("description", self.description.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            name: opt_text(document, "name")?.ok_or(ModelError::MissingField("name"))?,
            description: opt_text(document, "description")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::MissingField("name"));
        }
        check_max_len("name", Some(&self.name), ROLE_NAME_MAX_CHARS)?;
        check_max_len("description", self.description.as_deref(), 255)
    }
}

impl Schema for Role {
    const COLLECTION: &'static str = "role";

    fn id(&self) -> ObjectId {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("name", self.name.clone())]
    }
}
