//! Registered user and per-platform login info.
//!
//! # Invariants
//! - `number` is required, digits only, at most 11 chars.
//! - `sex`, when set, is one of `男|女`.
//! - `password` holds a salted hash once persisted by the user service.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::schema::{
    check_choice, check_max_len, embedded_list, embedded_values, opt_text, required_id,
    text_list, DocumentCodec, ModelError, ModelResult, Schema, UniqueKey,
};
use once_cell::sync::Lazy;
use regex::Regex;

pub const SEX_CHOICES: &[&str] = &["男", "女"];
pub const NUMBER_MAX_CHARS: usize = 11;

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid number regex"));

/// Login identity for one third-party platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformInfo {
    pub open_id: Option<String>,
    pub union_id: Option<String>,
    pub platform: Vec<String>,
    pub login_info: Vec<String>,
}

impl DocumentCodec for PlatformInfo {
    fn to_document(&self) -> Document {
        Document::new()
            .with("open_id", self.open_id.clone())
            .with("union_id", self.union_id.clone())
            .with("platform", self.platform.clone())
            .with("login_info", self.login_info.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            open_id: opt_text(document, "open_id")?,
            union_id: opt_text(document, "union_id")?,
            platform: text_list(document, "platform")?,
            login_info: text_list(document, "login_info")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_max_len("open_id", self.open_id.as_deref(), 50)?;
        check_max_len("union_id", self.union_id.as_deref(), 50)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: ObjectId,
    pub name: Option<String>,
    pub nickname: Option<String>,
    /// Mobile number.
    pub number: String,
    pub password: Option<String>,
    pub sex: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub tag: Vec<String>,
    pub income: Option<String>,
    pub platform_info: Vec<PlatformInfo>,
}

impl User {
    /// Creates a user with a generated ID and only the mobile number set.
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            name: None,
            nickname: None,
            number: number.into(),
            password: None,
            sex: None,
            area: None,
            city: None,
            tag: Vec::new(),
            income: None,
            platform_info: Vec::new(),
        }
    }
}

impl DocumentCodec for User {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("name", self.name.clone())
            .with("nickname", self.nickname.clone())
            .with("number", self.number.clone())
            .with("password", self.password.clone())
            .with("sex", self.sex.clone())
            .with("area", self.area.clone())
            .with("city", self.city.clone())
            .with("tag", self.tag.clone())
            .with("income", self.income.clone())
            .with("platformInfo", embedded_values(&self.platform_info))
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            name: opt_text(document, "name")?,
            nickname: opt_text(document, "nickname")?,
            number: opt_text(document, "number")?.ok_or(ModelError::MissingField("number"))?,
            password: opt_text(document, "password")?,
            sex: opt_text(document, "sex")?,
            area: opt_text(document, "area")?,
            city: opt_text(document, "city")?,
            tag: text_list(document, "tag")?,
            income: opt_text(document, "income")?,
            platform_info: embedded_list(document, "platformInfo")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        if self.number.is_empty() {
            return Err(ModelError::MissingField("number"));
        }
        check_max_len("number", Some(&self.number), NUMBER_MAX_CHARS)?;
        if !NUMBER_RE.is_match(&self.number) {
            return Err(ModelError::InvalidFormat {
                field: "number",
                message: "must contain digits only",
            });
        }
        check_max_len("name", self.name.as_deref(), 50)?;
        check_max_len("nickname", self.nickname.as_deref(), 50)?;
        check_max_len("password", self.password.as_deref(), 100)?;
        check_choice("sex", self.sex.as_deref(), SEX_CHOICES)?;
        check_max_len("area", self.area.as_deref(), 255)?;
        check_max_len("city", self.city.as_deref(), 255)?;
        check_max_len("income", self.income.as_deref(), 50)?;
        for tag in &self.tag {
            check_max_len("tag", Some(tag), 100)?;
        }
        for info in &self.platform_info {
            info.validate()?;
        }
        Ok(())
    }
}

impl Schema for User {
    const COLLECTION: &'static str = "user";

    fn id(&self) -> ObjectId {
        self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new("number", self.number.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::{PlatformInfo, User};
    use crate::model::schema::{DocumentCodec, ModelError};

    #[test]
    fn validate_rejects_long_or_non_digit_numbers() {
        let err = User::new("123456789012").validate().unwrap_err();
        assert!(matches!(err, ModelError::TooLong { field: "number", .. }));

        let err = User::new("12a").validate().unwrap_err();
        assert!(matches!(err, ModelError::InvalidFormat { field: "number", .. }));

        for number in ["١٣٨٠٠٠٠٠٠٠٠", "１３８００００００００"] {
            let err = User::new(number).validate().unwrap_err();
            assert!(matches!(err, ModelError::InvalidFormat { field: "number", .. }));
        }
    }

    #[test]
    fn validate_checks_sex_choices() {
        let mut user = User::new("12365987452");
        user.sex = Some("女".to_string());
        assert!(user.validate().is_ok());

        user.sex = Some("other".to_string());
        assert!(matches!(
            user.validate().unwrap_err(),
            ModelError::InvalidChoice { field: "sex", .. }
        ));
    }

    #[test]
    fn document_roundtrip_keeps_platform_info() {
        let mut user = User::new("12365987452");
        user.nickname = Some("dfbb".to_string());
        user.platform_info.push(PlatformInfo {
            open_id: Some("open-1".to_string()),
            union_id: None,
            platform: vec!["wechat".to_string()],
            login_info: Vec::new(),
        });

        let decoded = User::from_document(&user.to_document()).unwrap();
        assert_eq!(decoded, user);
    }
}
