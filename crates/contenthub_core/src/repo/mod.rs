//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define collection-oriented document access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Typed writes enforce `DocumentCodec::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to DB transport errors.

pub mod document_repo;

pub use document_repo::{
    DocumentListQuery, DocumentRepository, RepoError, RepoResult, SqliteDocumentRepository,
};
