//! Configuration structures for ethpm-core.
//!
//! These are explicit values supplied by the caller (CLI, tests, embedding
//! applications). The core crate never reads environment variables or files
//! to configure itself.

use crate::errors::{ConformError, ConformResult};
use crate::version::ManifestVersion;

/// Global configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreConfig {
    pub limits: LimitsConfig,
    pub manifest: ManifestConfig,
}

/// Resource limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Largest manifest (or rule set) accepted by the parse helpers.
    pub max_json_bytes: usize,
    /// Deepest rule nesting the evaluator follows, `$ref` expansions included.
    pub max_rule_depth: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_json_bytes: 8 * 1024 * 1024,
            max_rule_depth: 256,
        }
    }
}

/// Manifest-level policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestConfig {
    pub version: ManifestVersion,
    /// Treat a non-canonical byte encoding as a failure of the whole check.
    pub require_canonical: bool,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            version: ManifestVersion::V3,
            require_canonical: true,
        }
    }
}

/// Validate a full configuration object.
pub fn validate_config(cfg: &CoreConfig) -> ConformResult<()> {
    if cfg.limits.max_json_bytes == 0 {
        return Err(ConformError::invalid_argument(
            "max_json_bytes must be greater than zero",
        ));
    }

    if cfg.limits.max_rule_depth == 0 {
        return Err(ConformError::invalid_argument(
            "max_rule_depth must be greater than zero",
        ));
    }

    Ok(())
}
