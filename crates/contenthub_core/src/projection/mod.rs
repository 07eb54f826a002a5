//! Record-to-mapping projection.
//!
//! # Responsibility
//! - Parse field selectors (`[+|-]path[:alias]`).
//! - Turn a `Record` into a plain nested JSON mapping for responses.
//!
//! # Invariants
//! - Projection never fails on absent fields or unresolvable paths; those
//!   selectors simply produce no key.
//! - Selector syntax is validated before any output is built.
//! - Output keys keep insertion order.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod selector;
mod serializer;

pub use selector::{FieldSpec, Selector, SelectorMode};
pub use serializer::{format_value, project, project_all, to_dict, OID_KEY};

/// Caller-side selector contract violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    InvalidSelector {
        selector: String,
        reason: &'static str,
    },
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSelector { selector, reason } => {
                write!(f, "invalid field selector `{selector}`: {reason}")
            }
        }
    }
}

impl Error for ProjectionError {}
