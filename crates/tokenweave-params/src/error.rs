//! Parameter parsing errors
//!
//! These are reported per rule and then skipped by the segment parser; a
//! malformed rule never poisons the rest of a directive set.

use thiserror::Error;

/// Result type for parameter-rule parsing
pub type ParamResult<T> = Result<T, ParamError>;

/// Errors for individual parameter rules
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// A rule is missing its `:` separator.
    #[error("rule '{rule}' has no ':' separator")]
    MissingSeparator { rule: String },

    /// A comparator or threshold could not be parsed.
    #[error("rule '{rule}' has an unparsable comparator or threshold")]
    InvalidRule { rule: String },

    /// A `precision=` value is not an unsigned integer.
    #[error("invalid precision '{value}'")]
    InvalidPrecision { value: String },
}

impl ParamError {
    /// Create a missing-separator error
    pub fn missing_separator(rule: impl Into<String>) -> Self {
        Self::MissingSeparator { rule: rule.into() }
    }

    /// Create an invalid-rule error
    pub fn invalid_rule(rule: impl Into<String>) -> Self {
        Self::InvalidRule { rule: rule.into() }
    }

    /// Create an invalid-precision error
    pub fn invalid_precision(value: impl Into<String>) -> Self {
        Self::InvalidPrecision {
            value: value.into(),
        }
    }
}
