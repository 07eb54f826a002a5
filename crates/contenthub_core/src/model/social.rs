//! Follow graph between readers and content authors.
//!
//! # Invariants
//! - `Followee.followee` links only into `user`.
//! - `UserInfo.user_id` is required and links into `user`; `follow` links
//!   only into `followee`.

use crate::model::document::{Document, ID_FIELD};
use crate::model::object_id::ObjectId;
use crate::model::publication::SOURCE_MAX_CHARS;
use crate::model::record::Reference;
use crate::model::schema::{
    check_max_len, check_reference_target, opt_reference, opt_text, reference_list, required_id,
    text_list, DocumentCodec, ModelError, ModelResult, Schema,
};
use crate::model::user::User;

/// Author on a content platform and the users following them.
#[derive(Debug, Clone, PartialEq)]
pub struct Followee {
    pub id: ObjectId,
    /// Author identifier on `source`.
    pub author_id: Option<String>,
    /// Platform the author publishes on.
    pub source: Option<String>,
    pub followee: Vec<Reference>,
}

impl Followee {
    pub fn new(author_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            author_id: Some(author_id.into()),
            source: Some(source.into()),
            followee: Vec::new(),
        }
    }
}

impl DocumentCodec for Followee {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("author_id", self.author_id.clone())
            .with("source", self.source.clone())
            .with("followee", self.followee.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            author_id: opt_text(document, "author_id")?,
            source: opt_text(document, "source")?,
            followee: reference_list(document, "followee")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_max_len("author_id", self.author_id.as_deref(), 50)?;
        check_max_len("source", self.source.as_deref(), SOURCE_MAX_CHARS)?;
        for follower in &self.followee {
            check_reference_target("followee", Some(follower), User::COLLECTION)?;
        }
        Ok(())
    }
}

impl Schema for Followee {
    const COLLECTION: &'static str = "followee";

    fn id(&self) -> ObjectId {
        self.id
    }
}

/// Per-user saved items and followed authors.
#[derive(Debug, Clone, PartialEq)]
pub struct UserInfo {
    pub id: ObjectId,
    pub user_id: Reference,
    pub collect: Vec<String>,
    pub follow: Vec<Reference>,
}

impl UserInfo {
    pub fn new(user: Reference) -> Self {
        Self {
            id: ObjectId::new(),
            user_id: user,
            collect: Vec::new(),
            follow: Vec::new(),
        }
    }
}

impl DocumentCodec for UserInfo {
    fn to_document(&self) -> Document {
        Document::new()
            .with(ID_FIELD, self.id)
            .with("user_id", self.user_id.clone())
            .with("collect", self.collect.clone())
            .with("follow", self.follow.clone())
    }

    fn from_document(document: &Document) -> ModelResult<Self> {
        Ok(Self {
            id: required_id(document)?,
            user_id: opt_reference(document, "user_id")?
                .ok_or(ModelError::MissingField("user_id"))?,
            collect: text_list(document, "collect")?,
            follow: reference_list(document, "follow")?,
        })
    }

    fn validate(&self) -> ModelResult<()> {
        check_reference_target("user_id", Some(&self.user_id), User::COLLECTION)?;
        for item in &self.collect {
            check_max_len("collect", Some(item), 255)?;
        }
        for followed in &self.follow {
            check_reference_target("follow", Some(followed), Followee::COLLECTION)?;
        }
        Ok(())
    }
}

impl Schema for UserInfo {
    const COLLECTION: &'static str = "user_info";

    fn id(&self) -> ObjectId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{Followee, UserInfo};
    use crate::model::object_id::ObjectId;
    use crate::model::record::Reference;
    use crate::model::schema::{DocumentCodec, ModelError, Schema};
    use crate::model::user::User;

    #[test]
    fn followee_list_roundtrips_and_checks_targets() {
        let mut author = Followee::new("a-1", "smzdm");
        author.followee.push(User::new("13800000000").reference());
        assert!(author.validate().is_ok());
        assert_eq!(Followee::from_document(&author.to_document()).unwrap(), author);

        author.followee.push(Reference::link("article", ObjectId::new()));
        assert!(matches!(
            author.validate(),
            Err(ModelError::InvalidFormat { field: "followee", .. })
        ));
    }

    #[test]
    fn user_info_requires_user_and_followee_links() {
        let mut info = UserInfo::new(User::new("13800000000").reference());
        info.collect.push("article/1".to_string());
        info.follow.push(Followee::new("a-1", "smzdm").reference());
        assert!(info.validate().is_ok());

        let mut document = info.to_document();
        assert_eq!(UserInfo::from_document(&document).unwrap(), info);
        document.remove("user_id");
        assert_eq!(
            UserInfo::from_document(&document).unwrap_err(),
            ModelError::MissingField("user_id")
        );

        info.follow.push(Reference::link(User::COLLECTION, ObjectId::new()));
        assert!(matches!(
            info.validate(),
            Err(ModelError::InvalidFormat { field: "follow", .. })
        ));
    }
}
