//! User comment attached to an article, video or goods item.
//!
//! # Invariants
//! - A comment with a `parent` is a follow-up reply to that comment.
//! - `classification` names which of `article|video|goods` is the owner.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::record::Reference;
use crate::model::schema::{
    check_choice, opt_datetime, opt_int, opt_reference, opt_text, required_id, DocumentCodec,
    ModelError, ModelResult, Schema,
};
use chrono::NaiveDateTime;

pub const COMMENT_STATUS_CHOICES: &[&str] = &["enabled", "deleted"];
pub const CLASSIFICATION_CHOICES: &[&str] = &["article", "video", "goods"];

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: ObjectId,
    pub parent: Option<Reference>,
    pub reply: Option<String>,
    pub thumbs_up_count: Option<i64>,
    pub create_time: Option<NaiveDateTime>,
    pub article: Option<Reference>,
    pub video: Option<Reference>,
    pub goods: Option<Reference>,
    pub status: Option<String>,
    pub classification: Option<String>,
}

impl Comment {
    /// Creates an enabled comment stamped with the current time.
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            parent: None,
            reply: Some(reply.into()),
            thumbs_up_count: None,
            create_time: Some(chrono::Local::now().naive_local()),
            article: None,
            video: None,
            goods: None,
            status: Some("enabled".to_string()),
            classification: None,
        }
    }

    /// Reference to the owning item selected by `classification`.
    pub fn owner(&self) -> Option<&Reference> {
        match self.classification.as_deref() {
            Some("article") => self.article.as_ref(),
            Some("video") => self.video.as_ref(),
            Some("goods") => self.goods.as_ref(),
            _ => None,
        }
    }
}

impl DocumentCodec for Comment {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("parent", self.parent.clone())
            .with("reply", self.reply.clone())
            .with("thumbs_up_count", self.thumbs_up_count)
            .with("create_time", self.create_time)
            .with("article", self.article.clone())
            .with("video", self.video.clone())
            .with("goods", self.goods.clone())
            .with("status", self.status.clone())
            .with("classification", self.classification.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            parent: opt_reference(document, "parent")?,
            reply: opt_text(document, "reply")?,
            thumbs_up_count: opt_int(document, "thumbs_up_count")?,
            create_time: opt_datetime(document, "create_time")?,
            article: opt_reference(document, "article")?,
            video: opt_reference(document, "video")?,
            goods: opt_reference(document, "goods")?,
            status: opt_text(document, "status")?,
            classification: opt_text(document, "classification")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_choice("status", self.status.as_deref(), COMMENT_STATUS_CHOICES)?;
        check_choice(
            "classification",
            self.classification.as_deref(),
            CLASSIFICATION_CHOICES,
        )?;
        if self.classification.is_some() && self.owner().is_none() {
            return Err(ModelError::InvalidFormat {
                field: "classification",
                message: "names an owner reference that is not set",
            });
        }
        Ok(())
    }
}

impl Schema for Comment {
    const COLLECTION: &'static str = "comment";

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::Comment;
    use crate::model::article::Article;
    use crate::model::schema::{DocumentCodec, ModelError, Schema};

    #[test]
    fn classification_must_match_a_set_owner() {
        let article = Article::new();
        let mut comment = Comment::new("nice");
        comment.classification = Some("article".to_string());
        assert!(matches!(
            comment.validate().unwrap_err(),
            ModelError::InvalidFormat { field: "classification", .. }
        ));

        comment.article = Some(article.reference());
        assert!(comment.validate().is_ok());
        assert_eq!(comment.owner().unwrap().id(), Some(article.id));
    }
}
