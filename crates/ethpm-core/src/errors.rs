//! Fatal error type for ethpm-core.
//!
//! Errors in this module abort a call. They are a separate signal from
//! [`crate::pipeline::validate::Violation`]: a manifest that breaks a rule
//! produces violations, while an unusable rule set or a document that is not
//! a JSON object produces a `ConformError`.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ConformResult<T> = Result<T, ConformError>;

#[derive(Debug, Error)]
pub enum ConformError {
    /// The rule set document cannot be compiled or evaluated.
    #[error("invalid rule set at `{pointer}`: {reason}")]
    InvalidRuleSet { pointer: String, reason: String },

    /// The document handed to the validator is not a JSON object.
    #[error("manifest must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ConformError {
    pub fn invalid_rule_set(pointer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRuleSet {
            pointer: pointer.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Stable machine-readable code, used by the CLI JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRuleSet { .. } => "rule_set.invalid",
            Self::NotAnObject { .. } => "manifest.not_object",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Serialization(_) => "serialization",
        }
    }
}

impl From<serde_json::Error> for ConformError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Human name of a JSON value's type, as used in messages.
pub fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
