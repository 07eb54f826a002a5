//! Source/publisher metadata shared by articles, videos and goods.
//!
//! # Responsibility
//! - Hold the crawl origin, publisher and review fields common to every
//!   aggregated content item.
//! - Flatten those fields into the owning document (no nesting on the wire).
//!
//! # Invariants
//! - `(source, source_item_id)` identifies an item on its origin platform.
//! - `status` defaults to `pending` for freshly crawled items.

use crate::model::document::Document;
use crate::model::schema::{
    check_max_len, opt_datetime, opt_int, opt_text, ModelError, ModelResult, UniqueKey,
};
use chrono::NaiveDateTime;

pub const SOURCE_MAX_CHARS: usize = 64;

/// Editorial review state of aggregated content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewStatus {
    #[default]
    Pending,
    Passed,
    Abandoned,
    Edited,
}

impl ReviewStatus {
    pub const CHOICES: &'static [&'static str] = &["pending", "passed", "abandoned", "edited"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Passed => "passed",
            Self::Abandoned => "abandoned",
            Self::Edited => "edited",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "passed" => Some(Self::Passed),
            "abandoned" => Some(Self::Abandoned),
            "edited" => Some(Self::Edited),
            _ => None,
        }
    }
}

/// Origin and publisher fields flattened into content documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Publication {
    /// Publish time on the origin platform.
    pub published_time: Option<NaiveDateTime>,
    /// Time the item entered our store.
    pub create_time: Option<NaiveDateTime>,
    pub planned_published_time: Option<NaiveDateTime>,
    pub publisher_image: Option<String>,
    pub publisher_name: Option<String>,
    /// Publisher ID on the origin platform.
    pub publisher_id: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    /// Item ID on the origin platform.
    pub source_item_id: Option<String>,
    pub status: ReviewStatus,
    pub comment_count: Option<i64>,
    pub thumbs_up_count: Option<i64>,
}

impl Publication {
    /// Publication stamped with the current local time as `create_time`.
    pub fn now() -> Self {
        Self {
            create_time: Some(chrono::Local::now().naive_local()),
            ..Self::default()
        }
    }

    pub(crate) fn write_into(&self, document: &mut Document) {
        document.insert("published_time", self.published_time);
        document.insert("create_time", self.create_time);
        document.insert("planned_published_time", self.planned_published_time);
        document.insert("publisher_image", self.publisher_image.clone());
        document.insert("publisher_name", self.publisher_name.clone());
        document.insert("publisher_id", self.publisher_id.clone());
        document.insert("source", self.source.clone());
        document.insert("source_url", self.source_url.clone());
        document.insert("source_item_id", self.source_item_id.clone());
        document.insert("status", self.status.as_str());
        document.insert("comment_count", self.comment_count);
        document.insert("thumbs_up_count", self.thumbs_up_count);
    }

    pub(crate) fn read_from(document: &Document) -> ModelResult<Self> {
        let status = match opt_text(document, "status")? {
            None => ReviewStatus::default(),
            Some(value) => {
                ReviewStatus::parse(&value).ok_or(ModelError::InvalidChoice {
                    field: "status",
                    value,
                    allowed: ReviewStatus::CHOICES,
                })?
            }
        };

        Ok(Self {
            published_time: opt_datetime(document, "published_time")?,
            create_time: opt_datetime(document, "create_time")?,
            planned_published_time: opt_datetime(document, "planned_published_time")?,
            publisher_image: opt_text(document, "publisher_image")?,
            publisher_name: opt_text(document, "publisher_name")?,
            publisher_id: opt_text(document, "publisher_id")?,
            source: opt_text(document, "source")?,
            source_url: opt_text(document, "source_url")?,
            source_item_id: opt_text(document, "source_item_id")?,
            status,
            comment_count: opt_int(document, "comment_count")?,
            thumbs_up_count: opt_int(document, "thumbs_up_count")?,
        })
    }

    /// `source_item_id` is unique per `source`; both must be set to apply.
    pub(crate) fn unique_keys(&self) -> Vec<UniqueKey> {
        match (&self.source, &self.source_item_id) {
            (Some(source), Some(item_id)) => vec![UniqueKey::new(
                "source_item_id",
                format!("{source}/{item_id}"),
            )],
            _ => Vec::new(),
        }
    }

    pub(crate) fn validate(&self) -> ModelResult<()> {
        check_max_len("source", self.source.as_deref(), SOURCE_MAX_CHARS)
    }
}
