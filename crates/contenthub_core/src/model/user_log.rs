//! Reader behavior log.
//!
//! # Invariants
//! - `behavior_type` is one of `view|thumbs_up|favor|comment`.
//! - `obj_type` is one of `article|video|goods|comment` and is set whenever
//!   `obj_id` is.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::schema::{
    check_choice, check_max_len, opt_date, opt_text, required_id, DocumentCodec, ModelError,
    ModelResult, Schema,
};
use chrono::NaiveDate;

pub const BEHAVIOR_TYPE_CHOICES: &[&str] = &["view", "thumbs_up", "favor", "comment"];
pub const OBJ_TYPE_CHOICES: &[&str] = &["article", "video", "goods", "comment"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserLog {
    pub id: ObjectId,
    pub behavior_type: Option<String>,
    /// Day the behavior was recorded.
    pub behavior_time: Option<NaiveDate>,
    /// Day the behavior happened on the client.
    pub occ_time: Option<NaiveDate>,
    pub obj_id: Option<String>,
    pub obj_type: Option<String>,
}

impl UserLog {
    /// Log entry for `behavior` on one object, dated today.
    pub fn new(
        behavior: impl Into<String>,
        obj_type: impl Into<String>,
        obj_id: impl Into<String>,
    ) -> Self {
        let today = chrono::Local::now().date_naive();
        Self {
            id: ObjectId::new(),
            behavior_type: Some(behavior.into()),
            behavior_time: Some(today),
            occ_time: Some(today),
            obj_id: Some(obj_id.into()),
            obj_type: Some(obj_type.into()),
        }
    }
}

impl DocumentCodec for UserLog {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("behavior_type", self.behavior_type.clone())
            .with("behavior_time", self.behavior_time)
            .with("occ_time", self.occ_time)
            .with("obj_id", self.obj_id.clone())
            .with("obj_type", self.obj_type.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            behavior_type: opt_text(document, "behavior_type")?,
            behavior_time: opt_date(document, "behavior_time")?,
            occ_time: opt_date(document, "occ_time")?,
            obj_id: opt_text(document, "obj_id")?,
            obj_type: opt_text(document, "obj_type")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_choice("behavior_type", self.behavior_type.as_deref(), BEHAVIOR_TYPE_CHOICES)?;
        check_max_len("obj_id", self.obj_id.as_deref(), 255)?;
        check_choice("obj_type", self.obj_type.as_deref(), OBJ_TYPE_CHOICES)?;
        if self.obj_id.is_some() && self.obj_type.is_none() {
            return Err(ModelError::MissingField("obj_type"));
        }
        Ok(())
    }
}

impl Schema for UserLog {
    const COLLECTION: &'static str = "user_log";

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::UserLog;
    use crate::model::schema::{DocumentCodec, ModelError};
    use crate::projection::project_all;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn validate_checks_choices_and_object_type() {
        let log = UserLog::new("view", "article", "65f0c0ffee");
        assert!(log.validate().is_ok());

        let mut bad = log.clone();
        bad.behavior_type = Some("share".to_string());
        assert!(matches!(
            bad.validate(),
            Err(ModelError::InvalidChoice { field: "behavior_type", .. })
        ));

        let mut bad = log.clone();
        bad.obj_type = Some("user".to_string());
        assert!(matches!(
            bad.validate(),
            Err(ModelError::InvalidChoice { field: "obj_type", .. })
        ));

        let mut bad = log;
        bad.obj_type = None;
        assert_eq!(bad.validate(), Err(ModelError::MissingField("obj_type")));
    }

    #[test]
    fn dates_roundtrip_and_project_as_days() {
        let mut log = UserLog::new("favor", "goods", "g-1");
        log.behavior_time = NaiveDate::from_ymd_opt(2024, 6, 18);
        log.occ_time = NaiveDate::from_ymd_opt(2024, 6, 17);

        let document = log.to_document();
        assert_eq!(UserLog::from_document(&document).unwrap(), log);
        let projected = project_all(&document);
        assert_eq!(projected["behavior_time"], json!("2024-06-18"));
        assert_eq!(projected["occ_time"], json!("2024-06-17"));
    }
}
