//! Typed manifest models.
//!
//! Each wire version lives in its own `vN` module. Models are plain data:
//! validity is decided by the rule engine, and canonical bytes come from
//! `crate::determinism::canonical_json`, never from default serde output.

pub mod v3;

pub use v3::{PackageManifest, PackageSummary};
