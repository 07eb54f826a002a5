//! User registration and sign-in.
//!
//! # Responsibility
//! - Build, validate and persist users from registration input.
//! - Verify sign-in credentials against stored password hashes.
//!
//! # Invariants
//! - Passwords are hashed before the user reaches the repository.
//! - `number` is unique across users.
//! - An unknown nickname is a failed sign-in, not an error.

use crate::auth::{check_password_hash, generate_password_hash};
use crate::model::object_id::ObjectId;
use crate::model::schema::{DocumentCodec, ModelError, Schema};
use crate::model::user::User;
use crate::repo::{DocumentRepository, RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for user use-cases.
#[derive(Debug)]
pub enum UserServiceError {
    /// Another user already registered this mobile number.
    DuplicateNumber(String),
    /// Input failed model validation.
    Validation(ModelError),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for UserServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateNumber(number) => write!(f, "number already registered: {number}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for UserServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DuplicateNumber(_) => None,
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Model(err) => Self::Validation(err),
            RepoError::Duplicate {
                field: "number",
                value,
                ..
            } => Self::DuplicateNumber(value),
            other => Self::Repo(other),
        }
    }
}

impl From<ModelError> for UserServiceError {
    fn from(value: ModelError) -> Self {
        Self::Validation(value)
    }
}

/// Registration input; `password` is plain text here and never stored as such.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub number: String,
    pub password: Option<String>,
    pub sex: Option<String>,
    pub area: Option<String>,
    pub city: Option<String>,
    pub tag: Vec<String>,
    pub income: Option<String>,
}

/// Result of a credential check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInOutcome {
    Success(ObjectId),
    Failure,
}

/// Use-case service for user accounts.
pub struct UserService<R: DocumentRepository> {
    repo: R,
}

impl<R: DocumentRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user and returns it as stored.
    ///
    /// # Errors
    /// - `Validation` when any field violates the user schema.
    /// - `DuplicateNumber` when `number` is taken.
    pub fn register(&self, request: &RegisterRequest) -> Result<User, UserServiceError> {
        let mut user = User::new(request.number.trim());
        user.name = request.name.clone();
        user.nickname = request.nickname.clone();
        user.sex = request.sex.clone();
        user.area = request.area.clone();
        user.city = request.city.clone();
        user.tag = request.tag.clone();
        user.income = request.income.clone();
        // Plain input is checked here; insert re-validates the hashed form.
        user.validate()?;
        user.password = request.password.as_deref().map(generate_password_hash);

        match self.repo.insert_schema(&user) {
            Ok(_) => {
                info!(
                    "event=user_register module=service status=ok user_id={}",
                    user.id
                );
                Ok(user)
            }
            Err(err) => {
                let err = UserServiceError::from(err);
                warn!(
                    "event=user_register module=service status=error error_code={}",
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    /// Checks `password` for the first user registered with `nickname`.
    pub fn sign_in(&self, nickname: &str, password: &str) -> Result<SignInOutcome, UserServiceError> {
        let outcome = match self.repo.find_one_by(User::COLLECTION, "nickname", nickname)? {
            Some(document) => {
                let user = User::from_document(&document)?;
                match user.password.as_deref() {
                    Some(stored) if check_password_hash(stored, password) => {
                        SignInOutcome::Success(user.id)
                    }
                    _ => SignInOutcome::Failure,
                }
            }
            None => SignInOutcome::Failure,
        };

        let status = match outcome {
            SignInOutcome::Success(_) => "ok",
            SignInOutcome::Failure => "rejected",
        };
        info!("event=user_sign_in module=service status={status}");
        Ok(outcome)
    }

    pub fn get_user(&self, id: ObjectId) -> RepoResult<Option<User>> {
        self.repo.load::<User>(id)
    }
}

fn error_code(err: &UserServiceError) -> &'static str {
    match err {
        UserServiceError::DuplicateNumber(_) => "duplicate_number",
        UserServiceError::Validation(_) => "validation_failed",
        UserServiceError::Repo(_) => "repo_failed",
    }
}

#[cfg(test)]
mod tests {
    use super::{RegisterRequest, SignInOutcome, UserService, UserServiceError};
    use crate::db::open_db_in_memory;
    use crate::model::schema::ModelError;
    use crate::repo::SqliteDocumentRepository;

    fn request(number: &str, nickname: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            number: number.to_string(),
            nickname: Some(nickname.to_string()),
            password: Some(password.to_string()),
            ..RegisterRequest::default()
        }
    }

    #[test]
    fn register_hashes_password_and_sign_in_checks_it() {
        let conn = open_db_in_memory().unwrap();
        let service = UserService::new(SqliteDocumentRepository::try_new(&conn).unwrap());

        let user = service
            .register(&request("12365987452", "dfbb", "dfbb"))
            .unwrap();
        let stored = user.password.clone().unwrap();
        assert_ne!(stored, "dfbb");
        assert_eq!(service.get_user(user.id).unwrap(), Some(user.clone()));

        assert_eq!(
            service.sign_in("dfbb", "dfbb").unwrap(),
            SignInOutcome::Success(user.id)
        );
        assert_eq!(service.sign_in("dfbb", "wrong").unwrap(), SignInOutcome::Failure);
        assert_eq!(service.sign_in("nobody", "dfbb").unwrap(), SignInOutcome::Failure);
    }

    #[test]
    fn register_rejects_duplicate_number() {
        let conn = open_db_in_memory().unwrap();
        let service = UserService::new(SqliteDocumentRepository::try_new(&conn).unwrap());

        service.register(&request("13800000000", "a", "pw")).unwrap();
        let err = service
            .register(&request("13800000000", "b", "pw"))
            .unwrap_err();
        assert!(matches!(err, UserServiceError::DuplicateNumber(number) if number == "13800000000"));
    }

    #[test]
    fn register_rejects_invalid_sex_before_persisting() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteDocumentRepository::try_new(&conn).unwrap();
        let service = UserService::new(repo);

        let mut input = request("13800000001", "c", "pw");
        input.sex = Some("x".to_string());
        let err = service.register(&input).unwrap_err();
        assert!(matches!(
            err,
            UserServiceError::Validation(ModelError::InvalidChoice { field: "sex", .. })
        ));
    }
}
