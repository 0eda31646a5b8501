//! Manifest version helpers.
//!
//! The `manifest` field of a document names the manifest format family and
//! major version it claims to follow. This module centralizes parsing of that
//! token and the choice of rule set that goes with it.

use serde_json::Value;

use crate::errors::{ConformError, ConformResult};
use crate::rules::RuleSet;

/// The `manifest` token of EthPM v3 documents.
pub const ETHPM_V3: &str = "ethpm/3";

/// Known manifest versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestVersion {
    V3,
}

impl ManifestVersion {
    /// Parse a manifest version token (e.g. "ethpm/3").
    pub fn parse(s: &str) -> ConformResult<Self> {
        match s {
            ETHPM_V3 => Ok(Self::V3),
            _ => Err(ConformError::invalid_argument(format!(
                "unsupported manifest version: {s}"
            ))),
        }
    }

    /// Return the canonical token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V3 => ETHPM_V3,
        }
    }

    /// The embedded rule set for this version.
    pub fn rule_set(&self) -> ConformResult<&'static RuleSet> {
        match self {
            Self::V3 => RuleSet::ethpm_v3(),
        }
    }
}

/// Read the `manifest` token of a document, if it carries a string one.
pub fn declared_version(doc: &Value) -> Option<&str> {
    doc.get("manifest").and_then(Value::as_str)
}
