//! Canonical JSON encoding and the canonical-form check.
//!
//! Manifests are content-addressed, so two documents with the same meaning
//! but different bytes are different artifacts. The canonical encoding is:
//! - object keys sorted lexicographically (by code point), recursively
//! - no insignificant whitespace; separators are exactly `,` and `:`
//! - strings and numbers in `serde_json`'s minimal compact form
//! - no trailing newline
//!
//! The check re-encodes the parsed value and compares bytes. It never
//! normalizes and then compares structure.

use std::fmt;

use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

use crate::errors::ConformResult;

/// Why a byte string is not canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NonCanonicalReason {
    InvalidJson,
    TrailingNewline,
    NotTightlyPacked,
}

impl NonCanonicalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidJson => "invalid JSON",
            Self::TrailingNewline => "trailing newline",
            Self::NotTightlyPacked => "unsorted keys, duplicate keys, or not tightly packed",
        }
    }
}

impl fmt::Display for NonCanonicalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "camelCase")]
pub enum CanonicalVerdict {
    Canonical,
    NonCanonical(NonCanonicalReason),
}

impl CanonicalVerdict {
    pub fn is_canonical(&self) -> bool {
        matches!(self, Self::Canonical)
    }

    pub fn reason(&self) -> Option<NonCanonicalReason> {
        match self {
            Self::Canonical => None,
            Self::NonCanonical(r) => Some(*r),
        }
    }
}

/// Encode a JSON value canonically.
pub fn canonical_json_bytes(value: &Value) -> ConformResult<Vec<u8>> {
    let mut out = Vec::new();
    write_canonical(value, &mut out)?;
    Ok(out)
}

/// Encode a JSON value canonically as a string.
pub fn canonical_json_string(value: &Value) -> ConformResult<String> {
    let bytes = canonical_json_bytes(value)?;
    // Only UTF-8 is ever written.
    String::from_utf8(bytes).map_err(|e| crate::errors::ConformError::serialization(e.to_string()))
}

fn write_canonical(value: &Value, out: &mut Vec<u8>) -> ConformResult<()> {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            serde_json::to_writer(&mut *out, value)?;
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical(item, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            for (i, (k, v)) in map.iter().sorted_by(|a, b| a.0.cmp(b.0)).enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, k)?;
                out.push(b':');
                write_canonical(v, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

/// Check whether `raw` is the canonical encoding of its own content.
pub fn check_canonical(raw: &[u8]) -> CanonicalVerdict {
    match serde_json::from_slice::<Value>(raw) {
        Ok(value) => check_canonical_parsed(raw, &value),
        Err(_) => CanonicalVerdict::NonCanonical(NonCanonicalReason::InvalidJson),
    }
}

/// Like [`check_canonical`] for callers that already parsed `raw` into `value`.
pub fn check_canonical_parsed(raw: &[u8], value: &Value) -> CanonicalVerdict {
    if raw.last() == Some(&b'\n') {
        return CanonicalVerdict::NonCanonical(NonCanonicalReason::TrailingNewline);
    }
    match canonical_json_bytes(value) {
        Ok(bytes) if bytes == raw => CanonicalVerdict::Canonical,
        _ => CanonicalVerdict::NonCanonical(NonCanonicalReason::NotTightlyPacked),
    }
}
