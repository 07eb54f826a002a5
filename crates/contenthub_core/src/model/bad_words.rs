//! Banned-word rules applied to aggregated content.
//!
//! # Invariants
//! - `strategy` is `replace` or `abandon`; `status` is `enabled` or
//!   `disabled`.
//! - `bad_words` is unique together with its `sources` list.
//! - A target names one of `article|video|goods`.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::schema::{
    check_choice, embedded_list, embedded_values, opt_datetime, opt_text, required_id,
    text_list, text_or, DocumentCodec, ModelError, ModelResult, Schema, UniqueKey,
};
use chrono::NaiveDateTime;

pub const STRATEGY_CHOICES: &[&str] = &["replace", "abandon"];
pub const BAD_WORDS_STATUS_CHOICES: &[&str] = &["enabled", "disabled"];
pub const TARGET_COLLECTION_CHOICES: &[&str] = &["article", "video", "goods"];

/// Fields of one collection searched for a banned word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadWordsTarget {
    pub collection: String,
    /// Empty means every field.
    pub fields: Vec<String>,
}

impl DocumentCodec for BadWordsTarget {
    fn to_document(&self) -> Document {
        Document::new()
            .with("collection", self.collection.clone())
            .with("fields", self.fields.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            collection: opt_text(document, "collection")?
                .ok_or(ModelError::MissingField("collection"))?,
            fields: text_list(document, "fields")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_choice(
            "collection",
            Some(&self.collection),
            TARGET_COLLECTION_CHOICES,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadWords {
    pub id: ObjectId,
    /// Word or regular expression to look for.
    pub bad_words: String,
    pub strategy: String,
    /// Sources the rule applies to; empty means every source.
    pub sources: Vec<String>,
    /// Collections and fields searched; empty means every field of every
    /// content collection.
    pub target: Vec<BadWordsTarget>,
    pub modify_time: Option<NaiveDateTime>,
    /// Replacement text; `\1` refers to the first regex group.
    pub replacement: String,
    pub status: String,
}

impl BadWords {
    /// Enabled `replace` rule with an empty replacement, stamped now.
    pub fn new(bad_words: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            bad_words: bad_words.into(),
            strategy: "replace".to_string(),
            sources: Vec::new(),
            target: Vec::new(),
            modify_time: Some(chrono::Local::now().naive_local()),
            replacement: String::new(),
            status: "enabled".to_string(),
        }
    }
}

impl DocumentCodec for BadWords {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("bad_words", self.bad_words.clone())
            .with("strategy", self.strategy.clone())
            .with("sources", self.sources.clone())
            .with("target", embedded_values(&self.target))
            .with("modify_time", self.modify_time)
            .with("replacement", self.replacement.clone())
            .with("status", self.status.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            bad_words: opt_text(document, "bad_words")?
                .ok_or(ModelError::MissingField("bad_words"))?,
            strategy: text_or(document, "strategy", "replace")?,
            sources: text_list(document, "sources")?,
            target: embedded_list(document, "target")?,
            modify_time: opt_datetime(document, "modify_time")?,
            replacement: text_or(document, "replacement", "")?,
            status: text_or(document, "status", "enabled")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        if self.bad_words.is_empty() {
            return Err(ModelError::MissingField("bad_words"));
        }
        check_choice("strategy", Some(&self.strategy), STRATEGY_CHOICES)?;
        check_choice("status", Some(&self.status), BAD_WORDS_STATUS_CHOICES)?;
        for target in &self.target {
            target.validate()?;
        }
        Ok(())
    }
}

impl Schema for BadWords {
    const COLLECTION: &'static str = "bad_words";

    fn id(&self) -> ObjectId {
        self.id
    }

    /// The word is unique per exact `sources` list.
    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(
            "bad_words",
            format!("{}/{}", self.sources.join(","), self.bad_words),
        )]
    }
}
