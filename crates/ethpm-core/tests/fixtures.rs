use std::fs;
use std::path::{Path, PathBuf};

use ethpm_core::determinism::canonical_json::check_canonical;
use ethpm_core::pipeline::fixture::{run_fixture, Fixture, TestCase};
use ethpm_core::pipeline::parse::{decode_manifest_v3, parse_json_bytes};
use ethpm_core::{validate, RuleSet};

fn fixture_dir(parts: &[&str]) -> PathBuf {
    let mut dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    for p in parts {
        dir.push(p);
    }
    dir
}

fn json_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.extension().is_some_and(|x| x == "json"))
        .collect();
    files.sort();
    assert!(!files.is_empty(), "no fixtures in {}", dir.display());
    files
}

fn run_dir(case: TestCase) {
    let rules = RuleSet::ethpm_v3().unwrap();
    for path in json_files(&fixture_dir(&["standardized", case.as_str()])) {
        let fixture = Fixture::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(fixture.test_case, case, "{}", path.display());
        let outcome = run_fixture(&fixture, rules).unwrap();
        assert!(outcome.passed, "{}: {}", path.display(), outcome.detail);
    }
}

#[test]
fn valid_fixtures() {
    run_dir(TestCase::Valid);
}

#[test]
fn invalid_fixtures() {
    run_dir(TestCase::Invalid);
}

#[test]
fn example_manifests_validate_and_are_canonical() {
    let rules = RuleSet::ethpm_v3().unwrap();
    for path in json_files(&fixture_dir(&["manifests"])) {
        let raw = fs::read(&path).unwrap();
        let doc = parse_json_bytes(&raw, 1 << 20).unwrap();
        let verdict = validate(&doc, rules).unwrap();
        assert!(verdict.is_valid(), "{}: {:?}", path.display(), verdict.violations());
        assert!(check_canonical(&raw).is_canonical(), "{}", path.display());

        let manifest = decode_manifest_v3(&doc).unwrap();
        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert_eq!(manifest.name.as_deref(), Some(stem));
    }
}

#[test]
fn wallet_summary() {
    let raw = fs::read(fixture_dir(&["manifests", "wallet.json"])).unwrap();
    let doc = parse_json_bytes(&raw, 1 << 20).unwrap();
    let summary = decode_manifest_v3(&doc).unwrap().summary();
    assert_eq!(summary.version.as_deref(), Some("1.0.0"));
    assert_eq!(summary.contract_types, 1);
    assert_eq!(summary.contract_instances, 2);
    assert_eq!(summary.build_dependencies, 2);
}
