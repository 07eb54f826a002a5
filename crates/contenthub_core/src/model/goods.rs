//! Aggregated e-commerce goods listing.
//!
//! # Invariants
//! - `view_count` and `deal_count` default to `0`.
//! - Source comment counts are folded into `thumbs_up_count` upstream; the
//!   goods comment count is stored but not displayed.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::publication::Publication;
use crate::model::schema::{
    check_max_len, embedded_list, embedded_values, opt_datetime, opt_int, opt_text, required_id,
    text_list, DocumentCodec, ModelResult, Schema, UniqueKey,
};
use chrono::NaiveDateTime;

/// Image with its pixel size.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PicInfo {
    pub width: Option<i64>,
    pub pict_url: Option<String>,
    pub height: Option<i64>,
}

impl DocumentCodec for PicInfo {
    fn to_document(&self) -> Document {
        Document::new()
            .with("width", self.width)
            .with("pict_url", self.pict_url.clone())
            .with("height", self.height)
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            width: opt_int(document, "width")?,
            pict_url: opt_text(document, "pict_url")?,
            height: opt_int(document, "height")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goods {
    pub id: ObjectId,
    pub cover_page: Option<String>,
    pub title: Option<String>,
    pub share_title: Option<String>,
    pub original_price: Option<String>,
    pub price: Option<String>,
    pub coupon_info: Option<String>,
    pub coupon_url: Option<String>,
    pub coupon_time_start: Option<NaiveDateTime>,
    pub coupon_time_end: Option<NaiveDateTime>,
    pub description: Option<String>,
    pub view_count: i64,
    pub deal_count: i64,
    pub category: Vec<String>,
    pub category_hint: Option<String>,
    pub platform: Option<String>,
    /// Purchase limit per buyer, as published.
    pub buy_allowance: Option<String>,
    /// Listing URL on the shop platform.
    pub direct_url: Option<String>,
    pub shop_name: Option<String>,
    pub shop_icon: Option<String>,
    pub shop_score: Vec<String>,
    pub check_time: Option<String>,
    pub des_pics: Vec<PicInfo>,
    pub info_pics: Vec<PicInfo>,
    pub crawl_datetime: Option<NaiveDateTime>,
    pub publication: Publication,
}

impl Goods {
    pub fn new() -> Self {
        Self {
            id: ObjectId::new(),
            cover_page: None,
            title: None,
            share_title: None,
            original_price: None,
            price: None,
            coupon_info: None,
            coupon_url: None,
            coupon_time_start: None,
            coupon_time_end: None,
            description: None,
            view_count: 0,
            deal_count: 0,
            category: Vec::new(),
            category_hint: None,
            platform: None,
            buy_allowance: None,
            direct_url: None,
            shop_name: None,
            shop_icon: None,
            shop_score: Vec::new(),
            check_time: None,
            des_pics: Vec::new(),
            info_pics: Vec::new(),
            crawl_datetime: None,
            publication: Publication::now(),
        }
    }
}

impl Default for Goods {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCodec for Goods {
    fn to_document(&self) -> Document {
        let mut document = Document::new()
            .with(ID_FIELD, self.id)
            .with("cover_page", self.cover_page.clone())
            .with("title", self.title.clone())
            .with("share_title", self.share_title.clone())
            .with("original_price", self.original_price.clone())
            .with("price", self.price.clone())
            .with("coupon_info", self.coupon_info.clone())
            .with("coupon_url", self.coupon_url.clone())
            .with("coupon_time_start", self.coupon_time_start)
            .with("coupon_time_end", self.coupon_time_end)
            .with("description", self.description.clone())
            .with("view_count", self.view_count)
            .with("deal_count", self.deal_count)
            .with("category", self.category.clone())
            .with("category_hint", self.category_hint.clone());
        self.publication.write_into(&mut document);
        document
            .with("platform", self.platform.clone())
            .with("buyAllowance", self.buy_allowance.clone())
            .with("direct_url", self.direct_url.clone())
            .with("shopName", self.shop_name.clone())
            .with("shop_icon", self.shop_icon.clone())
            .with("shopScore", self.shop_score.clone())
            .with("checkTime", self.check_time.clone())
            .with("desPics", embedded_values(&self.des_pics))
            .with("infoPics", embedded_values(&self.info_pics))
            .with("crawl_datetime", self.crawl_datetime)
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            cover_page: opt_text(document, "cover_page")?,
            title: opt_text(document, "title")?,
            share_title: opt_text(document, "share_title")?,
            original_price: opt_text(document, "original_price")?,
            price: opt_text(document, "price")?,
            coupon_info: opt_text(document, "coupon_info")?,
            coupon_url: opt_text(document, "coupon_url")?,
            coupon_time_start: opt_datetime(document, "coupon_time_start")?,
            coupon_time_end: opt_datetime(document, "coupon_time_end")?,
            description: opt_text(document, "description")?,
            view_count: opt_int(document, "view_count")?.unwrap_or_default(),
            deal_count: opt_int(document, "deal_count")?.unwrap_or_default(),
            category: text_list(document, "category")?,
            category_hint: opt_text(document, "category_hint")?,
            platform: opt_text(document, "platform")?,
            buy_allowance: opt_text(document, "buyAllowance")?,
            direct_url: opt_text(document, "direct_url")?,
            shop_name: opt_text(document, "shopName")?,
            shop_icon: opt_text(document, "shop_icon")?,
            shop_score: text_list(document, "shopScore")?,
            check_time: opt_text(document, "checkTime")?,
            des_pics: embedded_list(document, "desPics")?,
            info_pics: embedded_list(document, "infoPics")?,
            crawl_datetime: opt_datetime(document, "crawl_datetime")?,
            publication: Publication::read_from(document)?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_max_len("cover_page", self.cover_page.as_deref(), 1024)?;
        check_max_len("title", self.title.as_deref(), 128)?;
        check_max_len("share_title", self.share_title.as_deref(), 64)?;
        check_max_len("coupon_info", self.coupon_info.as_deref(), 1024)?;
        self.publication.validate()
    }
}

impl Schema for Goods {
    const COLLECTION: &'static str = "goods";

    fn id(&self) -> ObjectId {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        self.publication.unique_keys()
    }
}
