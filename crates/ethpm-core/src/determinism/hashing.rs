//! Content digests for manifests.
//!
//! A manifest is identified by the sha256 of its canonical bytes, so the
//! digest of a document never depends on how it happened to be formatted.
//!
//! Supported algorithms:
//! - sha256

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::determinism::canonical_json::canonical_json_bytes;
use crate::errors::ConformResult;

/// Hash algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlg {
    Sha256,
}

impl HashAlg {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlg::Sha256 => "sha256",
        }
    }
}

/// Hash raw bytes using the selected algorithm.
pub fn hash_bytes(alg: HashAlg, bytes: &[u8]) -> Vec<u8> {
    match alg {
        HashAlg::Sha256 => {
            let mut h = Sha256::new();
            h.update(bytes);
            h.finalize().to_vec()
        }
    }
}

/// Hash raw bytes and return lowercase hex.
pub fn hash_bytes_hex(alg: HashAlg, bytes: &[u8]) -> String {
    hex::encode(hash_bytes(alg, bytes))
}

/// sha256 of the canonical encoding of `value`, lowercase hex.
pub fn canonical_digest_hex(value: &Value) -> ConformResult<String> {
    let bytes = canonical_json_bytes(value)?;
    Ok(hash_bytes_hex(HashAlg::Sha256, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sha256_known_vector() {
        assert_eq!(
            hash_bytes_hex(HashAlg::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_ignores_formatting() {
        let a: Value = serde_json::from_str(r#"{ "version": "1", "name": "package" }"#).unwrap();
        let b = json!({"name": "package", "version": "1"});
        assert_eq!(canonical_digest_hex(&a).unwrap(), canonical_digest_hex(&b).unwrap());
        assert_eq!(
            canonical_digest_hex(&b).unwrap(),
            hash_bytes_hex(HashAlg::Sha256, br#"{"name":"package","version":"1"}"#)
        );
    }
}
