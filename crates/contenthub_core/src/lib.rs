//! Core domain logic for the content hub.
//!
//! Holds the record model, the projection serializer that turns records
//! into response mappings, content schemas, the SQLite document store, and
//! the services and handlers built on them.

pub mod api;
pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod service;

pub use api::{ApiResponse, RequestParams};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::document::Document;
pub use model::object_id::ObjectId;
pub use model::record::{FieldValue, Record, Reference};
pub use model::schema::{DocumentCodec, ModelError, Schema};
pub use projection::{project, to_dict, FieldSpec, ProjectionError};
pub use repo::{
    DocumentListQuery, DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository,
};
pub use service::{ContentService, UserService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
