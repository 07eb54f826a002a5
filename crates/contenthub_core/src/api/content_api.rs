//! Projected document lookup handler.

use super::{ApiResponse, RequestParams};
use crate::model::object_id::ObjectId;
use crate::projection::FieldSpec;
use crate::repo::{RepoError, SqliteDocumentRepository};
use crate::service::ContentService;
use rusqlite::Connection;
use serde_json::Value;

/// Collections `show` may read.
pub const KNOWN_COLLECTIONS: &[&str] = &[
    "user",
    "article",
    "video",
    "goods",
    "comment",
    "category",
    "role",
    "followee",
    "user_info",
    "user_log",
    "bad_words",
    "smzdm",
    "smzdm_goods",
    "yangmao",
];

/// Returns document `id` of `collection`, projected by the optional
/// comma-separated `fields` selector list.
pub fn show(conn: &Connection, params: &RequestParams) -> ApiResponse {
    let Some(collection) = params.get("collection") else {
        return ApiResponse::failure("collection is required");
    };
    if !KNOWN_COLLECTIONS.iter().any(|known| *known == collection) {
        return ApiResponse::failure(format!("unknown collection `{collection}`"));
    }
    let id = match params.get("id").map(ObjectId::parse_str) {
        Some(Ok(id)) => id,
        Some(Err(err)) => return ApiResponse::failure(err.to_string()),
        None => return ApiResponse::failure("id is required"),
    };
    let spec = match params.get("fields").map(FieldSpec::from_param) {
        Some(Ok(spec)) => spec,
        Some(Err(err)) => return ApiResponse::failure(err.to_string()),
        None => FieldSpec::all(),
    };

    let service = match SqliteDocumentRepository::try_new(conn) {
        Ok(repo) => ContentService::new(repo),
        Err(err) => return ApiResponse::failure(format!("show failed: {err}")),
    };
    match service.fetch_projected(collection, id, &spec) {
        Ok(data) => ApiResponse::success("ok", Value::Object(data)),
        Err(err @ RepoError::NotFound { .. }) => ApiResponse::failure(err.to_string()),
        Err(err) => ApiResponse::failure(format!("show failed: {err}")),
    }
}
