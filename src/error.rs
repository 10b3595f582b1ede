//! Engine errors.
//!
//! Every variant is a programming error on the side of an algebra author:
//! either a kind, pattern or rule set was declared inconsistently, or a
//! constructor was fed ill-typed operands. A failed match is never an error.

use thiserror::Error;

use crate::types::{AlgebraId, KindId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid pattern in rule '{rule}': {reason}")]
    InvalidPattern { rule: String, reason: String },

    #[error("rule '{rule}' is defined twice in rule set '{ruleset}'")]
    DuplicateRule { ruleset: String, rule: String },

    #[error("type constraint violated by '{kind}': {reason}")]
    TypeConstraint { kind: String, reason: String },

    #[error("invalid kind '{name}': {reason}")]
    InvalidKind { name: String, reason: String },

    #[error("kind {0} is not registered")]
    UnknownKind(KindId),

    #[error("algebra {0} is not registered")]
    UnknownAlgebra(AlgebraId),

    #[error("simplification exceeded the limit of {limit} rewrite steps")]
    StepLimitExceeded { limit: usize },
}

impl Error {
    pub(crate) fn invalid_pattern(rule: &str, reason: impl Into<String>) -> Self {
        Error::InvalidPattern {
            rule: rule.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn type_constraint(kind: &str, reason: impl Into<String>) -> Self {
        Error::TypeConstraint {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
