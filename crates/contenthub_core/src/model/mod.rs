//! Document model for aggregated content.
//!
//! # Responsibility
//! - Define the generic record shape (`Document`, `FieldValue`, `Record`).
//! - Define typed schemas for every stored collection.
//!
//! # Invariants
//! - Every stored document carries an `ObjectId` under `id`.
//! - Typed schemas validate before they are persisted.

pub mod article;
pub mod bad_words;
pub mod category;
pub mod comment;
pub mod document;
pub mod goods;
pub mod object_id;
pub mod publication;
pub mod raw;
pub mod record;
pub mod role;
pub mod schema;
pub mod social;
pub mod user;
pub mod user_log;
pub mod video;
