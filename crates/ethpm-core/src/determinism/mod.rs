//! Deterministic encodings.
//!
//! - `canonical_json`: canonical byte form and the canonical-form check
//! - `hashing`: content digests over canonical bytes

pub mod canonical_json;
pub mod hashing;
