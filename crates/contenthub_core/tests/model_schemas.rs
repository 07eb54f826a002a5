use contenthub_core::db::open_db_in_memory;
use contenthub_core::model::bad_words::BadWords;
use contenthub_core::model::category::Category;
use contenthub_core::model::comment::Comment;
use contenthub_core::model::goods::{Goods, PicInfo};
use contenthub_core::model::raw::{RawRecord, RawSource};
use contenthub_core::model::role::Role;
use contenthub_core::model::social::Followee;
use contenthub_core::model::user::{PlatformInfo, User};
use contenthub_core::model::user_log::UserLog;
use contenthub_core::projection::{project_all, to_dict};
use contenthub_core::{
    DocumentCodec, DocumentRepository, ModelError, RepoError, Schema, SqliteDocumentRepository,
};
use serde_json::json;

#[test]
fn user_projection_uses_stored_field_names() {
    let mut user = User::new("12365987452");
    user.platform_info.push(PlatformInfo {
        open_id: Some("o-1".to_string()),
        platform: vec!["wechat".to_string()],
        ..PlatformInfo::default()
    });

    let projected = to_dict(
        &user.to_document(),
        &["number", "platformInfo:platforms"],
    )
    .unwrap();
    assert_eq!(
        serde_json::Value::Object(projected),
        json!({
            "number": "12365987452",
            "platforms": [{
                "open_id": "o-1",
                "union_id": null,
                "platform": ["wechat"],
                "login_info": []
            }]
        })
    );
}

#[test]
fn goods_keeps_camel_case_keys_and_pictures() {
    let mut goods = Goods::new();
    goods.des_pics.push(PicInfo {
        width: Some(750),
        pict_url: Some("https://img/1.jpg".to_string()),
        height: Some(420),
    });
    let document = goods.to_document();

    assert!(document.contains("desPics"));
    assert!(document.contains("buyAllowance"));
    assert_eq!(Goods::from_document(&document).unwrap(), goods);

    let projected = to_dict(&document, &["desPics"]).unwrap();
    assert_eq!(projected["desPics"][0]["width"], json!(750));
}

#[test]
fn comment_requires_owner_named_by_classification() {
    let mut comment = Comment::new("+1");
    comment.classification = Some("video".to_string());
    assert!(matches!(
        comment.validate().unwrap_err(),
        ModelError::InvalidFormat {
            field: "classification",
            ..
        }
    ));

    let category = Category::new("digital");
    comment.video = Some(category.reference());
    assert!(comment.validate().is_ok());
    assert_eq!(comment.owner(), comment.video.as_ref());
}

#[test]
fn category_rejects_self_parent() {
    let mut category = Category::new("loop");
    category.parent = Some(category.reference());
    assert!(category.validate().is_err());
    assert_eq!(Category::COLLECTION, "category");
}

#[test]
fn raw_record_projects_crawled_payload_as_is() {
    let payload = json!({
        "id": "upstream-7",
        "title": "满减",
        "publish_time": "2021-03-01 10:00:00",
        "tags": ["a", "b"],
        "extra": {"mall": "jd"}
    });
    let record = RawRecord::from_json(RawSource::Smzdm, payload.as_object().unwrap());
    let document = record.to_document();

    let projected = project_all(&document);
    assert_eq!(projected["id"], json!(record.id.to_hex()));
    assert_eq!(projected["title"], json!("满减"));
    assert_eq!(projected["tags"], json!(["a", "b"]));
    assert_eq!(projected["extra"], json!({"mall": "jd"}));

    let mall = to_dict(&document, &["extra.mall:mall"]).unwrap();
    assert_eq!(serde_json::Value::Object(mall), json!({"mall": "jd"}));
    assert_eq!(
        RawRecord::from_document(RawSource::Smzdm, &document).unwrap(),
        record
    );
}

#[test]
fn role_names_and_bad_word_scopes_are_unique_in_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    repo.insert_schema(&Role::new("editor")).unwrap();
    let err = repo.insert_schema(&Role::new("editor")).unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { field: "name", .. }));

    let mut scoped = BadWords::new("spam");
    scoped.sources = vec!["smzdm".to_string()];
    repo.insert_schema(&scoped).unwrap();
    repo.insert_schema(&BadWords::new("spam")).unwrap();

    let mut again = BadWords::new("spam");
    again.sources = vec!["smzdm".to_string()];
    again.strategy = "abandon".to_string();
    let err = repo.insert_schema(&again).unwrap_err();
    assert!(matches!(err, RepoError::Duplicate { field: "bad_words", .. }));
    assert_eq!(repo.count(BadWords::COLLECTION).unwrap(), 2);
}

#[test]
fn user_log_and_followee_validate_before_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteDocumentRepository::try_new(&conn).unwrap();

    let log = UserLog::new("comment", "video", "v-1");
    repo.insert_schema(&log).unwrap();
    assert_eq!(repo.load::<UserLog>(log.id).unwrap(), Some(log));

    let mut followee = Followee::new("a-9", "yangmao");
    followee
        .followee
        .push(Category::new("not a user").reference());
    let err = repo.insert_schema(&followee).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Model(ModelError::InvalidFormat { field: "followee", .. })
    ));
}
