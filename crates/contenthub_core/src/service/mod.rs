//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep request handlers decoupled from storage details.

pub mod content_service;
pub mod user_service;

pub use content_service::ContentService;
pub use user_service::{RegisterRequest, SignInOutcome, UserService, UserServiceError};
