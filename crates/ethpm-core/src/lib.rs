//! ethpm-core
//!
//! Conformance checking for EthPM v3 package manifests:
//! - a JSON rule set compiled into a typed rule tree, with hand-written
//!   matchers for the manifest grammars (package names, URIs, addresses)
//! - one evaluator that walks a document and collects every violation
//! - the canonical-form check (sorted keys, tight packing, no trailing newline)
//! - content digests over canonical bytes
//! - a typed v3 model and standardized fixture records
//!
//! The crate does no filesystem or network I/O and reads no environment.

pub mod config;
pub mod determinism;
pub mod errors;
pub mod model;
pub mod pipeline;
pub mod rules;
pub mod version;

pub use crate::determinism::canonical_json::{check_canonical, check_canonical_parsed};
pub use crate::errors::{ConformError, ConformResult};
pub use crate::pipeline::validate::{validate, validate_with_limits, Verdict, Violation};
pub use crate::rules::RuleSet;

/// Convenience re-exports.
pub mod prelude {
    pub use crate::config::{CoreConfig, LimitsConfig, ManifestConfig};
    pub use crate::determinism::canonical_json::{
        canonical_json_bytes, canonical_json_string, check_canonical, check_canonical_parsed,
        CanonicalVerdict, NonCanonicalReason,
    };
    pub use crate::determinism::hashing::{canonical_digest_hex, HashAlg};
    pub use crate::model::v3::{PackageManifest, PackageSummary};
    pub use crate::pipeline::fixture::{run_fixture, Fixture, FixtureOutcome, TestCase};
    pub use crate::pipeline::parse::parse_json_bytes;
    pub use crate::pipeline::validate::{validate, validate_with_limits, Verdict, Violation};
    pub use crate::rules::grammar::Grammar;
    pub use crate::rules::RuleSet;
    pub use crate::version::ManifestVersion;
    pub use crate::{ConformError, ConformResult};
}
