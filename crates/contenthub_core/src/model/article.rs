//! Aggregated article and the products it recommends.
//!
//! # Invariants
//! - `title` is at most 128 chars, `share_title` at most 1024.
//! - `editorial_topic` is at most 64 chars.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::publication::Publication;
use crate::model::schema::{
    check_max_len, embedded_list, embedded_values, opt_datetime, opt_float, opt_int, opt_text,
    required_id, text_list, DocumentCodec, ModelResult, Schema, UniqueKey,
};
use chrono::NaiveDateTime;

/// Product card embedded in an article body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleProduct {
    pub title: Option<String>,
    pub img: Option<String>,
    pub mall: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

impl DocumentCodec for ArticleProduct {
    fn to_document(&self) -> Document {
        Document::new()
            .with("title", self.title.clone())
            .with("img", self.img.clone())
            .with("mall", self.mall.clone())
            .with("url", self.url.clone())
            .with("description", self.description.clone())
            .with("price", self.price)
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            title: opt_text(document, "title")?,
            img: opt_text(document, "img")?,
            mall: opt_text(document, "mall")?,
            url: opt_text(document, "url")?,
            description: opt_text(document, "description")?,
            price: opt_float(document, "price")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    pub id: ObjectId,
    pub cover_page: Vec<String>,
    pub title: Option<String>,
    pub share_title: Option<String>,
    /// Stored as `abstract`.
    pub summary: Option<String>,
    pub read_count: Option<i64>,
    pub category: Vec<String>,
    /// Category label reported by the origin platform.
    pub category_hint: Option<String>,
    pub word_count: Option<i64>,
    pub content: Option<String>,
    pub favor_count: Option<i64>,
    pub crawl_datetime: Option<NaiveDateTime>,
    pub product_data: Vec<ArticleProduct>,
    pub editorial_topic: Option<String>,
    pub publication: Publication,
}

impl Article {
    /// Creates an empty pending article stamped with the current time.
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            cover_page: Vec::new(),
            title: None,
            share_title: None,
            summary: None,
            read_count: None,
            category: Vec::new(),
            category_hint: None,
            word_count: None,
            content: None,
            favor_count: None,
            crawl_datetime: None,
            product_data: Vec::new(),
            editorial_topic: None,
            publication: Publication::now(),
        }
    }
}

impl Default for Article {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCodec for Article {
    fn to_document(&self) -> Document {
        let mut document = Document::new()
            .with(ID_FIELD, self.id)
            .with("cover_page", self.cover_page.clone())
            .with("title", self.title.clone())
            .with("share_title", self.share_title.clone())
            .with("abstract", self.summary.clone())
            .with("read_count", self.read_count)
            .with("category", self.category.clone())
            .with("category_hint", self.category_hint.clone())
            .with("word_count", self.word_count)
            .with("content", self.content.clone());
        self.publication.write_into(&mut document);
        document
            .with("favor_count", self.favor_count)
            .with("crawl_datetime", self.crawl_datetime)
            .with("product_data", embedded_values(&self.product_data))
            .with("editorial_topic", self.editorial_topic.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            cover_page: text_list(document, "cover_page")?,
            title: opt_text(document, "title")?,
            share_title: opt_text(document, "share_title")?,
            summary: opt_text(document, "abstract")?,
            read_count: opt_int(document, "read_count")?,
            category: text_list(document, "category")?,
            category_hint: opt_text(document, "category_hint")?,
            word_count: opt_int(document, "word_count")?,
            content: opt_text(document, "content")?,
            favor_count: opt_int(document, "favor_count")?,
            crawl_datetime: opt_datetime(document, "crawl_datetime")?,
            product_data: embedded_list(document, "product_data")?,
            editorial_topic: opt_text(document, "editorial_topic")?,
            publication: Publication::read_from(document)?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_max_len("title", self.title.as_deref(), 128)?;
        check_max_len("share_title", self.share_title.as_deref(), 1024)?;
        check_max_len("editorial_topic", self.editorial_topic.as_deref(), 64)?;
        self.publication.validate()
    }
}

impl Schema for Article {
    const COLLECTION: &'static str = "article";

    fn id(&self) -> ObjectId {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        self.publication.unique_keys()
    }
}
