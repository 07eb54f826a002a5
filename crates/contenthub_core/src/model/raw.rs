//! Raw crawled records from non-strict upstream sources.
//!
//! # Responsibility
//! - Keep crawler output, shaping the fields each source declares.
//! - Route each source to its own collection.
//!
//! # Invariants
//! - Undeclared fields pass through untouched; only `id` is managed here.
//! - Declared fields are checked for shape and length by `validate()`.
//! - JSON objects inside crawled payloads are stored as `Dict` values, except
//!   declared picture lists, which become embedded `PicInfo` documents.

use crate::model::document::{Document, ID_FIELD};
use crate::model::goods::PicInfo;
use crate::model::object_id::ObjectId;
use crate::model::record::FieldValue;
use crate::model::schema::{
    check_max_len, embedded_list, opt_datetime, opt_int, opt_text, required_id, DocumentCodec,
    ModelError, ModelResult,
};
use chrono::NaiveDateTime;
use serde_json::{Map, Value};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Shape of one declared raw field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Text,
    Int,
    DateTime,
    Dict,
    DictList,
    PicInfoList,
}

/// Field a source declares, with its shape and optional length limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField {
    pub name: &'static str,
    pub kind: RawKind,
    pub max_chars: Option<usize>,
}

const fn text(name: &'static str) -> RawField {
    RawField {
        name,
        kind: RawKind::Text,
        max_chars: None,
    }
}

const fn bounded(name: &'static str, max_chars: usize) -> RawField {
    RawField {
        name,
        kind: RawKind::Text,
        max_chars: Some(max_chars),
    }
}

const fn shaped(name: &'static str, kind: RawKind) -> RawField {
    RawField {
        name,
        kind,
        max_chars: None,
    }
}

const SMZDM_FIELDS: &[RawField] = &[
    bounded("itemId", 64),
    text("platform"),
    text("goodPic"),
    text("goodName"),
    text("originPrice"),
    text("price"),
    text("freeSend"),
    text("useCoupon"),
    text("couponInfo"),
    text("couponUrl"),
    text("shopPlatform"),
    text("publish_time"),
    shaped("value1", RawKind::Int),
    text("goodDesc"),
    shaped("smzdmPublicTime", RawKind::DateTime),
    text("checkTime"),
    shaped("relatGoods1", RawKind::Dict),
    shaped("relatGoods2", RawKind::Dict),
    shaped("relatGoods3", RawKind::Dict),
    shaped("relatGoods4", RawKind::Dict),
    shaped("relatGoods5", RawKind::Dict),
    shaped("baoliaoUserInfo", RawKind::Dict),
    shaped("value2", RawKind::Int),
    text("collectNum"),
    text("directUrl"),
    shaped("other_info", RawKind::Dict),
    text("crawlStartTime"),
    text("crawlTime"),
];

const SMZDM_ARTICLE_FIELDS: &[RawField] = &[
    bounded("itemId", 64),
    text("platform"),
    text("topic"),
    text("titlePage"),
    text("title"),
    text("autherHeadSculpture"),
    text("autherNickName"),
    text("collectNum"),
    text("updateTime"),
    text("topicFocusPersonNum"),
    text("content"),
    shaped("recommend", RawKind::DictList),
    shaped("other_info", RawKind::Dict),
    text("crawlStartTime"),
    text("crawlTime"),
];

const YANGMAO_FIELDS: &[RawField] = &[
    text("platform"),
    bounded("itemId", 32),
    text("title"),
    text("currentPrice"),
    text("publish_time"),
    text("tb_url"),
    text("coupon"),
    text("couponTime"),
    text("buyAllowance"),
    text("coupon_url"),
    text("returnNum"),
    text("returnPrice"),
    shaped("picInfo", RawKind::PicInfoList),
    text("picUrl"),
];

/// Upstream crawler feeding raw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawSource {
    /// Deal posts from smzdm.
    Smzdm,
    /// Editorial articles from smzdm.
    SmzdmArticle,
    /// Coupon listings from yangmao.
    YangMao,
}

impl RawSource {
    pub fn collection(self) -> &'static str {
        match self {
            Self::Smzdm => "smzdm",
            Self::SmzdmArticle => "smzdm_goods",
            Self::YangMao => "yangmao",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "smzdm" => Some(Self::Smzdm),
            "smzdm_goods" => Some(Self::SmzdmArticle),
            "yangmao" => Some(Self::YangMao),
            _ => None,
        }
    }

    /// Fields this source declares; others are stored as crawled.
    pub fn declared_fields(self) -> &'static [RawField] {
        match self {
            Self::Smzdm => SMZDM_FIELDS,
            Self::SmzdmArticle => SMZDM_ARTICLE_FIELDS,
            Self::YangMao => YANGMAO_FIELDS,
        }
    }

    fn declared(self, name: &str) -> Option<&'static RawField> {
        self.declared_fields().iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub id: ObjectId,
    pub source: RawSource,
    /// Crawled fields, excluding `id`.
    pub fields: Document,
}

impl RawRecord {
    /// Wraps one crawled JSON object.
    ///
    /// A top-level `id` key in the payload is dropped; stored records get a
    /// fresh identifier. Declared date-times are parsed from text and declared
    /// picture lists become embedded documents; values that do not fit stay
    /// as crawled and fail `validate()`.
    pub fn from_json(source: RawSource, payload: &Map<String, Value>) -> Self {
        let mut fields = Document::new();
        for (name, value) in payload {
            if name == ID_FIELD {
                continue;
            }
            let converted = match source.declared(name).map(|field| field.kind) {
                Some(RawKind::DateTime) => json_to_datetime(value),
                Some(RawKind::PicInfoList) => json_to_embedded_list(value),
                _ => None,
            };
            fields.insert(name.as_str(), converted.unwrap_or_else(|| json_to_field(value)));
        }
        Self {
            id: ObjectId::new(),
            source,
            fields,
        }
    }

    /// Checks shape and length of every declared field that is set.
    pub fn validate(&self) -> ModelResult<()> {
        for field in self.source.declared_fields() {
            let name = field.name;
            match field.kind {
                RawKind::Text => {
                    let value = opt_text(&self.fields, name)?;
                    if let Some(max_chars) = field.max_chars {
                        check_max_len(name, value.as_deref(), max_chars)?;
                    }
                }
                RawKind::Int => {
                    opt_int(&self.fields, name)?;
                }
                RawKind::DateTime => {
                    opt_datetime(&self.fields, name)?;
                }
                RawKind::Dict => check_dict(name, self.fields.get(name))?,
                RawKind::DictList => {
                    if let Some(value) = self.fields.get(name).filter(|value| !value.is_null()) {
                        let items = value.as_list().ok_or_else(|| ModelError::FieldType {
                            field: name,
                            expected: "list",
                            found: value.kind_name(),
                        })?;
                        for item in items {
                            check_dict(name, Some(item))?;
                        }
                    }
                }
                RawKind::PicInfoList => {
                    for picture in embedded_list::<PicInfo>(&self.fields, name)? {
                        picture.validate()?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn to_document(&self) -> Document {
        let mut document = Document::new().with(ID_FIELD, self.id);
        for (name, value) in self.fields.iter() {
            document.insert(name, value.clone());
        }
        document
    }

    pub fn from_document(source: RawSource, document: &Document) -> ModelResult<Self> {
        let id = required_id(document)?;
        let mut fields = document.clone();
        fields.remove(ID_FIELD);
        if fields.is_empty() {
            return Err(ModelError::InvalidFormat {
                field: "fields",
                message: "raw record carries no crawled fields",
            });
        }
        Ok(Self { id, source, fields })
    }
}

fn check_dict(field: &'static str, value: Option<&FieldValue>) -> ModelResult<()> {
    match value {
        None | Some(FieldValue::Null) | Some(FieldValue::Dict(_)) => Ok(()),
        Some(other) => Err(ModelError::FieldType {
            field,
            expected: "dict",
            found: other.kind_name(),
        }),
    }
}

fn json_to_datetime(value: &Value) -> Option<FieldValue> {
    let text = value.as_str()?.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(FieldValue::DateTime)
}

fn json_to_embedded_list(value: &Value) -> Option<FieldValue> {
    let items = value.as_array()?;
    let mut embedded = Vec::with_capacity(items.len());
    for item in items {
        let object = item.as_object()?;
        let mut document = Document::new();
        for (name, value) in object {
            document.insert(name.as_str(), json_to_field(value));
        }
        embedded.push(FieldValue::Embedded(document));
    }
    Some(FieldValue::List(embedded))
}

fn json_to_field(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(flag) => FieldValue::Bool(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => FieldValue::Int(integer),
            None => number.as_f64().map_or(FieldValue::Null, FieldValue::Float),
        },
        Value::String(text) => FieldValue::Text(text.clone()),
        Value::Array(items) => FieldValue::List(items.iter().map(json_to_field).collect()),
        Value::Object(map) => FieldValue::Dict(map.clone()),
    }
}
