#![allow(dead_code)]

use ethpm_core::{validate, RuleSet, Verdict, Violation};
use serde_json::{json, Value};

pub const ADDRESS: &str = "0x9182902397B57a8c611D764D4DCD24BA951B4319";
pub const BLOCKCHAIN_URI: &str = "blockchain://d8764b6fdd13fbd4132265128dcaacb7c04cbb0ee0e0efb329e7a24d1f8509c7/block/d8764b6fdd13fbd4132265128dcaacb7c04cbb0ee0e0efb329e7a24d1f8509c7";
pub const TX_HASH: &str = "0xb16905dbcc3bed51f0bc79475dd2e69df451ff193bf62bca58ae2fcca2c196f7";
pub const BLOCK_HASH: &str = "0xee1147804cd4eb25b7111244d11424be221de81679f27f8a469d772d1a51909a";

pub fn base_manifest() -> Value {
    json!({"manifest": "ethpm/3", "name": "package", "version": "1.0.0"})
}

/// `base_manifest()` with one top-level field replaced.
pub fn with(field: &str, value: Value) -> Value {
    let mut m = base_manifest();
    m[field] = value;
    m
}

pub fn check(doc: &Value) -> Verdict {
    validate(doc, RuleSet::ethpm_v3().unwrap()).unwrap()
}

pub fn assert_valid(doc: &Value) {
    let verdict = check(doc);
    assert!(verdict.is_valid(), "expected valid, got {:?}\n{doc}", verdict.violations());
}

pub fn assert_invalid(doc: &Value) -> Vec<Violation> {
    let verdict = check(doc);
    assert!(!verdict.is_valid(), "expected invalid\n{doc}");
    verdict.into_violations()
}

/// Assert some violation sits at `path` with `constraint_id`.
pub fn assert_violation(doc: &Value, path: &str, constraint_id: &str) -> Violation {
    let violations = assert_invalid(doc);
    violations
        .iter()
        .find(|v| v.path == path && v.constraint_id == constraint_id)
        .cloned()
        .unwrap_or_else(|| panic!("no `{constraint_id}` violation at `{path}` in {violations:?}"))
}
