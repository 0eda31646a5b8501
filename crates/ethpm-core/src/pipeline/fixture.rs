//! Standardized fixture records.
//!
//! A fixture wraps one manifest, serialized as a JSON string so its exact
//! bytes survive, together with the expected outcome:
//!
//! ```json
//! {"testCase": "invalid", "package": "{\"manifest\":\"ethpm/2\"}",
//!  "errorInfo": {"reason": "must be one of"}}
//! ```
//!
//! The canonical-form verdict counts as one more violation at the document
//! root (`constraint_id = "canonical"`), so a fixture can expect either kind
//! of failure with the same `reason` field.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::determinism::canonical_json::{check_canonical_parsed, NonCanonicalReason};
use crate::errors::{ConformError, ConformResult};
use crate::pipeline::validate::{constraint, validate, Violation};
use crate::rules::RuleSet;

/// Constraint id of the synthetic canonical-form violation.
pub const CANONICAL_CONSTRAINT: &str = "canonical";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCase {
    Valid,
    Invalid,
}

impl TestCase {
    /// Classify by fixture directory name (`valid` / `invalid`).
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "valid" => Some(Self::Valid),
            "invalid" => Some(Self::Invalid),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for TestCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub test_case: TestCase,
    /// The manifest, byte for byte.
    pub package: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<ErrorInfo>,
}

impl Fixture {
    pub fn from_slice(bytes: &[u8]) -> ConformResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ConformError::serialization(format!("failed to decode fixture: {e}")))
    }

    pub fn reason(&self) -> Option<&str> {
        self.error_info.as_ref().map(|e| e.reason.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureOutcome {
    pub passed: bool,
    pub detail: String,
    /// Everything the package broke, canonical form included.
    pub violations: Vec<Violation>,
}

/// Every violation of `raw`: validator output plus the canonical verdict.
///
/// Unparseable bytes yield only the canonical `invalid JSON` violation.
pub fn collect_violations(raw: &[u8], rules: &RuleSet) -> ConformResult<Vec<Violation>> {
    let value: Value = match serde_json::from_slice(raw) {
        Ok(v) => v,
        Err(_) => return Ok(vec![canonical_violation(NonCanonicalReason::InvalidJson)]),
    };

    let mut out = match validate(&value, rules) {
        Ok(verdict) => verdict.into_violations(),
        Err(ConformError::NotAnObject { found }) => vec![Violation::new(
            "",
            format!("expected object, found {found}"),
            constraint::TYPE,
        )],
        Err(e) => return Err(e),
    };
    if let Some(reason) = check_canonical_parsed(raw, &value).reason() {
        out.push(canonical_violation(reason));
    }
    Ok(out)
}

fn canonical_violation(reason: NonCanonicalReason) -> Violation {
    Violation::new("", reason.as_str(), CANONICAL_CONSTRAINT)
}

/// True when `message` contains `reason` or matches it as a regex.
pub fn reason_matches(reason: &str, message: &str) -> bool {
    if message.contains(reason) {
        return true;
    }
    Regex::new(reason).map(|re| re.is_match(message)).unwrap_or(false)
}

/// Run one fixture against `rules`.
pub fn run_fixture(fixture: &Fixture, rules: &RuleSet) -> ConformResult<FixtureOutcome> {
    let violations = collect_violations(fixture.package.as_bytes(), rules)?;

    let (passed, detail) = match fixture.test_case {
        TestCase::Valid => match violations.first() {
            None => (true, "valid and canonical".to_string()),
            Some(first) => (false, format!("expected valid, got {first}")),
        },
        TestCase::Invalid if violations.is_empty() => {
            (false, "expected a violation, manifest is valid and canonical".to_string())
        }
        TestCase::Invalid => match fixture.reason() {
            None => (true, format!("rejected: {}", violations[0])),
            Some(reason) => match violations.iter().find(|v| reason_matches(reason, &v.message)) {
                Some(hit) => (true, format!("rejected: {hit}")),
                None => (
                    false,
                    format!(
                        "no violation mentions `{reason}`; got {}",
                        violations.iter().map(ToString::to_string).collect::<Vec<_>>().join(" | ")
                    ),
                ),
            },
        },
    };

    trace!(test_case = %fixture.test_case, passed, %detail, "ran fixture");
    Ok(FixtureOutcome {
        passed,
        detail,
        violations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> &'static RuleSet {
        RuleSet::ethpm_v3().unwrap()
    }

    fn fixture(case: TestCase, package: &str, reason: Option<&str>) -> Fixture {
        Fixture {
            test_case: case,
            package: package.to_string(),
            error_info: reason.map(|r| ErrorInfo { reason: r.to_string() }),
        }
    }

    #[test]
    fn decodes_wire_format() {
        let f = Fixture::from_slice(
            br#"{"testCase":"invalid","package":"{}","errorInfo":{"reason":"manifest"}}"#,
        )
        .unwrap();
        assert_eq!(f.test_case, TestCase::Invalid);
        assert_eq!(f.reason(), Some("manifest"));
        assert!(Fixture::from_slice(br#"{"testCase":"maybe","package":"{}"}"#).is_err());
    }

    #[test]
    fn valid_fixture_passes() {
        let f = fixture(TestCase::Valid, r#"{"manifest":"ethpm/3","name":"package","version":"1"}"#, None);
        let out = run_fixture(&f, rules()).unwrap();
        assert!(out.passed, "{}", out.detail);
        assert!(out.violations.is_empty());
    }

    #[test]
    fn non_canonical_valid_fixture_fails() {
        let f = fixture(TestCase::Valid, r#"{"version":"1","name":"package","manifest":"ethpm/3"}"#, None);
        let out = run_fixture(&f, rules()).unwrap();
        assert!(!out.passed);
        assert_eq!(out.violations[0].constraint_id, CANONICAL_CONSTRAINT);
    }

    #[test]
    fn invalid_fixture_matches_substring_or_regex() {
        let pkg = r#"{"manifest":"ethpm/3","name":"package"}"#;
        assert!(run_fixture(&fixture(TestCase::Invalid, pkg, Some("`version` is required")), rules())
            .unwrap()
            .passed);
        assert!(run_fixture(&fixture(TestCase::Invalid, pkg, Some("^`version`.*absent$")), rules())
            .unwrap()
            .passed);
        let out = run_fixture(&fixture(TestCase::Invalid, pkg, Some("checksum")), rules()).unwrap();
        assert!(!out.passed);
        assert!(out.detail.contains("no violation mentions"));
    }

    #[test]
    fn invalid_fixture_can_expect_canonical_failure() {
        let pkg = "{\"manifest\":\"ethpm/3\"}\n";
        let out = run_fixture(&fixture(TestCase::Invalid, pkg, Some("trailing newline")), rules()).unwrap();
        assert!(out.passed, "{}", out.detail);
    }

    #[test]
    fn unparseable_package_is_invalid_json() {
        let out = run_fixture(&fixture(TestCase::Invalid, "{", Some("invalid JSON")), rules()).unwrap();
        assert!(out.passed);
        assert_eq!(out.violations.len(), 1);
    }

    #[test]
    fn non_object_package_is_a_root_violation() {
        let v = collect_violations(b"[]", rules()).unwrap();
        assert_eq!(v[0].path, "");
        assert_eq!(v[0].constraint_id, "type");
    }

    #[test]
    fn invalid_fixture_that_validates_fails() {
        let f = fixture(TestCase::Invalid, r#"{"manifest":"ethpm/3"}"#, Some("anything"));
        assert!(!run_fixture(&f, rules()).unwrap().passed);
    }
}
