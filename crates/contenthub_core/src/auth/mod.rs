//! Credential handling for user accounts.
//!
//! # Invariants
//! - Plain passwords never reach storage or logs.

pub mod password;

pub use password::{check_password_hash, generate_password_hash, DEFAULT_ITERATIONS};
