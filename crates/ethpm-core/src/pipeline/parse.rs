//! Parsing helpers for manifest inputs.
//!
//! The core crate does no filesystem or network I/O. Helpers here operate on
//! in-memory bytes supplied by the caller:
//! - strict JSON parsing with a size limit
//! - the `manifest` version dispatch
//! - decoding into the typed v3 model
//!
//! Parsing is deterministic given the same bytes. Limits are explicit.

use serde_json::Value;

use crate::errors::{ConformError, ConformResult};
use crate::model::v3::PackageManifest;
use crate::version::{declared_version, ManifestVersion};

/// Parse JSON bytes into `serde_json::Value` with a hard size limit.
pub fn parse_json_bytes(bytes: &[u8], max_bytes: usize) -> ConformResult<Value> {
    if bytes.len() > max_bytes {
        return Err(ConformError::invalid_argument(format!(
            "JSON payload too large ({} bytes > limit {})",
            bytes.len(),
            max_bytes
        )));
    }

    serde_json::from_slice(bytes)
        .map_err(|e| ConformError::serialization(format!("failed to parse JSON: {e}")))
}

/// The manifest version a document claims, if it claims a known one.
pub fn detect_version(v: &Value) -> Option<ManifestVersion> {
    declared_version(v).and_then(|s| ManifestVersion::parse(s).ok())
}

/// Decode a document into the typed v3 model.
///
/// Decoding never decides validity; run the validator first and only decode
/// documents it accepted.
pub fn decode_manifest_v3(v: &Value) -> ConformResult<PackageManifest> {
    if detect_version(v).is_none() {
        return Err(ConformError::invalid_argument(format!(
            "unsupported manifest version: {}",
            declared_version(v).unwrap_or("<missing>")
        )));
    }
    PackageManifest::deserialize_from(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_json_bytes_respects_limit() {
        let bytes = br#"{"manifest":"ethpm/3"}"#;
        let v = parse_json_bytes(bytes, 1024).unwrap();
        assert_eq!(v["manifest"], "ethpm/3");

        let err = parse_json_bytes(bytes, 1).err().unwrap();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn parse_failure_is_serialization_error() {
        assert_matches!(
            parse_json_bytes(b"{\"manifest\":", 1024),
            Err(ConformError::Serialization(_))
        );
    }

    #[test]
    fn detect_known_versions_only() {
        assert_eq!(
            detect_version(&serde_json::json!({"manifest": "ethpm/3"})),
            Some(ManifestVersion::V3)
        );
        assert_eq!(detect_version(&serde_json::json!({"manifest": "ethpm/2"})), None);
        assert_eq!(detect_version(&serde_json::json!({})), None);
    }

    #[test]
    fn decode_rejects_unknown_version() {
        let err = decode_manifest_v3(&serde_json::json!({"manifest": "2"})).unwrap_err();
        assert!(err.to_string().contains("unsupported manifest version: 2"));
    }
}
