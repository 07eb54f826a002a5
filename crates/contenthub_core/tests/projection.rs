use chrono::{NaiveDate, NaiveDateTime};
use contenthub_core::model::record::{FieldValue, Reference};
use contenthub_core::projection::{project, project_all, to_dict, FieldSpec, ProjectionError};
use contenthub_core::{Document, ObjectId};
use serde_json::{json, Map, Value};

fn datetime(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap()
}

fn object(map: Map<String, Value>) -> Value {
    Value::Object(map)
}

fn fixed_id() -> ObjectId {
    ObjectId::parse_str("507f191e810c19729de860ea").unwrap()
}

fn blog_post() -> Document {
    let author = Document::new()
        .with("id", ObjectId::parse_str("5f0000000000000000000001").unwrap())
        .with("name", "东方不败")
        .with("city", None::<String>);
    Document::new()
        .with("id", fixed_id())
        .with("title", "hello")
        .with("create_time", datetime("2024-01-05 09:30:00"))
        .with("day", NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        .with("_cls", "Post")
        .with("author", Reference::Resolved(Box::new(author)))
        .with(
            "meta",
            Document::new().with("words", 120_i64).with("lang", "zh"),
        )
}

#[test]
fn empty_spec_projects_every_non_reserved_field() {
    let projected = project_all(&blog_post());
    assert_eq!(
        object(projected),
        json!({
            "id": "507f191e810c19729de860ea",
            "title": "hello",
            "create_time": "2024-01-05 09:30:00",
            "day": "2024-01-05",
            "author": {
                "id": "5f0000000000000000000001",
                "name": "东方不败",
                "city": null
            },
            "meta": {"words": 120, "lang": "zh"}
        })
    );
}

#[test]
fn default_projection_keeps_declaration_order() {
    let keys: Vec<String> = project_all(&blog_post()).keys().cloned().collect();
    assert_eq!(
        keys,
        vec!["id", "title", "create_time", "day", "author", "meta"]
    );
}

#[test]
fn plain_selectors_discard_defaults_and_modifiers() {
    let projected = to_dict(&blog_post(), &["title", "meta.words:stats.words", "+day", "-title"])
        .unwrap();
    assert_eq!(
        object(projected),
        json!({"title": "hello", "stats": {"words": 120}})
    );
}

#[test]
fn removal_wins_over_addition() {
    let projected = to_dict(&blog_post(), &["+title", "-title", "-author", "-meta"]).unwrap();
    assert_eq!(
        object(projected),
        json!({
            "id": "507f191e810c19729de860ea",
            "create_time": "2024-01-05 09:30:00",
            "day": "2024-01-05"
        })
    );
}

#[test]
fn added_selectors_follow_defaults_in_spec_order() {
    let projected = to_dict(
        &blog_post(),
        &["+author.name:author_name", "-author", "-meta", "-day", "+meta.lang:lang"],
    )
    .unwrap();
    let keys: Vec<&str> = projected.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["id", "title", "create_time", "author_name", "lang"]);
}

#[test]
fn alias_builds_nested_output() {
    let record = Document::new().with("a", Document::new().with("b", 5_i64));
    let projected = to_dict(&record, &["a.b:x.y"]).unwrap();
    assert_eq!(object(projected), json!({"x": {"y": 5}}));
}

#[test]
fn identifier_projects_to_canonical_hex() {
    let record = Document::new().with("id", fixed_id());
    let projected = to_dict(&record, &["id"]).unwrap();
    assert_eq!(object(projected), json!({"id": "507f191e810c19729de860ea"}));
}

#[test]
fn datetime_and_date_use_fixed_formats() {
    let projected = to_dict(&blog_post(), &["create_time", "day"]).unwrap();
    assert_eq!(
        object(projected),
        json!({"create_time": "2024-01-05 09:30:00", "day": "2024-01-05"})
    );
}

#[test]
fn missing_nested_path_is_omitted() {
    let record = Document::new().with("title", "t").with("blog", FieldValue::Null);
    let projected = to_dict(&record, &["blog.title", "nothing.here", "title.length"]).unwrap();
    assert!(projected.is_empty());

    let projected = to_dict(&record, &["blog"]).unwrap();
    assert_eq!(object(projected), json!({"blog": null}));
}

#[test]
fn later_selector_overwrites_earlier_destination() {
    let record = Document::new().with("a", 1_i64).with("b", 2_i64);
    let projected = to_dict(&record, &["a:x", "b:x"]).unwrap();
    assert_eq!(object(projected), json!({"x": 2}));
}

#[test]
fn later_selector_may_extend_nested_destination() {
    let projected = to_dict(
        &blog_post(),
        &["author.name:author.label", "author.id:author.ref"],
    )
    .unwrap();
    assert_eq!(
        object(projected),
        json!({"author": {"label": "东方不败", "ref": "5f0000000000000000000001"}})
    );
}

#[test]
fn projecting_projected_mapping_is_identity() {
    let first = project_all(&blog_post());
    let second = project_all(&first);
    assert_eq!(second, first);

    let aliased = to_dict(&blog_post(), &["author.name:who.name", "title"]).unwrap();
    assert_eq!(project(&aliased, &FieldSpec::all()), aliased);
}

#[test]
fn projected_mapping_supports_dotted_paths() {
    let first = project_all(&blog_post());
    let projected = to_dict(&first, &["author.name:name", "meta.words"]).unwrap();
    assert_eq!(object(projected), json!({"name": "东方不败", "meta": {"words": 120}}));
}

#[test]
fn unresolved_link_formats_as_oid_and_stops_traversal() {
    let target = ObjectId::parse_str("5f0000000000000000000002").unwrap();
    let record = Document::new().with("parent", Reference::link("category", target));

    let projected = to_dict(&record, &["parent", "parent.name:parent_name"]).unwrap();
    assert_eq!(
        object(projected),
        json!({"parent": {"$oid": "5f0000000000000000000002"}})
    );
}

#[test]
fn reserved_segments_are_always_skipped() {
    let projected = to_dict(&blog_post(), &["_cls", "meta._x", "title:_shown"]).unwrap();
    assert_eq!(object(projected), json!({"_shown": "hello"}));
}

#[test]
fn lists_and_dicts_are_formatted_elementwise() {
    let mut dict = Map::new();
    dict.insert("k".to_string(), json!({"deep": true}));
    let record = Document::new()
        .with(
            "items",
            vec![
                FieldValue::from(datetime("2024-02-01 00:00:00")),
                FieldValue::from(Document::new().with("n", 1_i64)),
                FieldValue::from(f64::NAN),
            ],
        )
        .with("extra", dict);

    let projected = to_dict(&record, &["items", "extra.k.deep:deep"]).unwrap();
    assert_eq!(
        object(projected),
        json!({"items": ["2024-02-01 00:00:00", {"n": 1}, null], "deep": true})
    );
}

#[test]
fn malformed_selector_rejects_whole_call() {
    for raw in ["", "+", "a..b", "a:", "a:x..y", "-a:b", ".a"] {
        let err = to_dict(&blog_post(), &["title", raw]).unwrap_err();
        assert!(
            matches!(err, ProjectionError::InvalidSelector { ref selector, .. } if selector == raw),
            "{raw}: {err}"
        );
    }
}

#[test]
fn param_form_matches_list_form() {
    let from_param = FieldSpec::from_param(" title , author.name:who ,").unwrap();
    let from_list = FieldSpec::parse(["title", "author.name:who"]).unwrap();
    assert_eq!(from_param, from_list);
    assert_eq!(
        object(project(&blog_post(), &from_param)),
        json!({"title": "hello", "who": "东方不败"})
    );
}

#[test]
fn projection_does_not_mutate_record() {
    let record = blog_post();
    let before = record.clone();
    let _ = to_dict(&record, &["author.name:x.y", "-meta"]).unwrap();
    assert_eq!(record, before);
}
