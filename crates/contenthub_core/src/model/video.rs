//! Aggregated short video with per-resolution media URLs.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::publication::Publication;
use crate::model::record::Reference;
use crate::model::schema::{
    check_max_len, opt_embedded, opt_int, opt_reference, opt_text, required_id, text_list,
    DocumentCodec, ModelResult, Schema, UniqueKey,
};

/// Origin URL plus our cached copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaUrl {
    pub source_url: Option<String>,
    pub cached_url: Option<String>,
}

impl DocumentCodec for MediaUrl {
    fn to_document(&self) -> Document {
        Document::new()
            .with("source_url", self.source_url.clone())
            .with("cached_url", self.cached_url.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            source_url: opt_text(document, "source_url")?,
            cached_url: opt_text(document, "cached_url")?,
        })
    }
}

/// Media location for each available resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub r480p: Option<MediaUrl>,
    pub r720p: Option<MediaUrl>,
    pub r1080p: Option<MediaUrl>,
    pub r1080p60: Option<MediaUrl>,
    pub r4k: Option<MediaUrl>,
}

const RESOLUTION_KEYS: [&str; 5] = ["R480P", "R720P", "R1080P", "R1080P60", "R4K"];

impl Resolution {
    fn slots(&self) -> [&Option<MediaUrl>; 5] {
        [
            &self.r480p,
            &self.r720p,
            &self.r1080p,
            &self.r1080p60,
            &self.r4k,
        ]
    }
}

impl DocumentCodec for Resolution {
    fn to_document(&self) -> Document {
        let mut document = Document::new();
        for (key, slot) in RESOLUTION_KEYS.iter().zip(self.slots()) {
            document.insert(*key, slot.as_ref().map(MediaUrl::to_document));
        }
        document
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            r480p: opt_embedded(document, "R480P")?,
            r720p: opt_embedded(document, "R720P")?,
            r1080p: opt_embedded(document, "R1080P")?,
            r1080p60: opt_embedded(document, "R1080P60")?,
            r4k: opt_embedded(document, "R4K")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Video {
    pub id: ObjectId,
    /// Parent video this one was cut from.
    pub parent: Option<Reference>,
    pub cover_page: Vec<String>,
    pub title: Option<String>,
    pub view_count: Option<i64>,
    /// Completion ratio in percent.
    pub complete_ratio: Option<i64>,
    pub category: Vec<String>,
    /// Human-readable duration, e.g. `03:21`.
    pub length: Option<String>,
    pub url: Option<Resolution>,
    pub publication: Publication,
}

impl Video {
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            parent: None,
            cover_page: Vec::new(),
            title: None,
            view_count: None,
            complete_ratio: None,
            category: Vec::new(),
            length: None,
            url: None,
            publication: Publication::now(),
        }
    }
}

impl Default for Video {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCodec for Video {
    fn to_document(&self) -> Document {
        let mut document = Document::new()
            .with(ID_FIELD, self.id)
            .with("parent", self.parent.clone())
            .with("cover_page", self.cover_page.clone())
            .with("title", self.title.clone())
            .with("view_count", self.view_count)
            .with("complete_ratio", self.complete_ratio)
            .with("category", self.category.clone())
            .with("length", self.length.clone());
        self.publication.write_into(&mut document);
        document.with("url", self.url.as_ref().map(Resolution::to_document))
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            parent: opt_reference(document, "parent")?,
            cover_page: text_list(document, "cover_page")?,
            title: opt_text(document, "title")?,
            view_count: opt_int(document, "view_count")?,
            complete_ratio: opt_int(document, "complete_ratio")?,
            category: text_list(document, "category")?,
            length: opt_text(document, "length")?,
            url: opt_embedded(document, "url")?,
            publication: Publication::read_from(document)?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_max_len("title", self.title.as_deref(), 128)?;
        self.publication.validate()
    }
}

impl Schema for Video {
    const COLLECTION: &'static str = "video";

    fn id(&self) -> ObjectId {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        self.publication.unique_keys()
    }
}
