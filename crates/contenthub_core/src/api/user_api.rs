//! Registration and sign-in handlers.

use super::{ApiResponse, RequestParams};
use crate::model::schema::DocumentCodec;
use crate::projection::to_dict;
use crate::repo::SqliteDocumentRepository;
use crate::service::{RegisterRequest, SignInOutcome, UserService, UserServiceError};
use rusqlite::Connection;
use serde_json::{json, Value};

const MSG_REGISTERED: &str = "注册成功";
const MSG_BAD_FORMAT: &str = "格式错误，请检查手机号码与性别";
const MSG_NUMBER_TAKEN: &str = "手机号码已注册";
const MSG_SIGNED_IN: &str = "登录成功";
const MSG_SIGN_IN_FAILED: &str = "登录失败 密码或用户名错误";

/// Registers a user from `name`, `nickname`, `number`, `password`, `sex`,
/// `area`, `city`, `tag` (comma list) and `income`.
///
/// Success data is the stored user without its password.
pub fn register(conn: &Connection, params: &RequestParams) -> ApiResponse {
    let Some(number) = params.get("number") else {
        return ApiResponse::failure(format!("{MSG_BAD_FORMAT}: number is required"));
    };
    let request = RegisterRequest {
        name: params.get_owned("name"),
        nickname: params.get_owned("nickname"),
        number: number.to_string(),
        password: params.get_owned("password"),
        sex: params.get_owned("sex"),
        area: params.get_owned("area"),
        city: params.get_owned("city"),
        tag: params.list("tag"),
        income: params.get_owned("income"),
    };

    let service = match SqliteDocumentRepository::try_new(conn) {
        Ok(repo) => UserService::new(repo),
        Err(err) => return ApiResponse::failure(format!("register failed: {err}")),
    };
    match service.register(&request) {
        Ok(user) => match to_dict(&user.to_document(), &["-password"]) {
            Ok(data) => {
                ApiResponse::success(format!("{}{MSG_REGISTERED}", user.id), Value::Object(data))
            }
            Err(err) => ApiResponse::failure(format!("register failed: {err}")),
        },
        Err(UserServiceError::Validation(err)) => {
            ApiResponse::failure(format!("{MSG_BAD_FORMAT}: {err}"))
        }
        Err(UserServiceError::DuplicateNumber(_)) => ApiResponse::failure(MSG_NUMBER_TAKEN),
        Err(err) => ApiResponse::failure(format!("register failed: {err}")),
    }
}

/// Checks `nickname` and `password`; success data carries the user `id`.
pub fn sign_in(conn: &Connection, params: &RequestParams) -> ApiResponse {
    let (Some(nickname), Some(password)) = (params.get("nickname"), params.get("password")) else {
        return ApiResponse::failure(MSG_SIGN_IN_FAILED);
    };
    let service = match SqliteDocumentRepository::try_new(conn) {
        Ok(repo) => UserService::new(repo),
        Err(err) => return ApiResponse::failure(format!("sign_in failed: {err}")),
    };
    match service.sign_in(nickname, password) {
        Ok(SignInOutcome::Success(id)) => {
            ApiResponse::success(MSG_SIGNED_IN, json!({ "id": id.to_hex() }))
        }
        Ok(SignInOutcome::Failure) => ApiResponse::failure(MSG_SIGN_IN_FAILED),
        Err(err) => ApiResponse::failure(format!("sign_in failed: {err}")),
    }
}
