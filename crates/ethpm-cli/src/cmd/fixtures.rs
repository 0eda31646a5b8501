use std::path::Path;

use anyhow::{bail, Context, Result};
use ethpm_core::config::CoreConfig;
use ethpm_core::pipeline::fixture::{run_fixture, Fixture};
use serde::Serialize;
use tracing::warn;

use crate::cmd::Outcome;
use crate::io::{fixtures, input};
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureReport {
    pub path: String,
    pub test_case: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct FixturesOut {
    pub ok: bool,
    pub passed: usize,
    pub failed: usize,
    pub fixtures: Vec<FixtureReport>,
}

pub fn run(dir: &Path, schema: Option<&Path>, cfg: &CoreConfig) -> Result<Outcome> {
    let rules = input::load_rules(schema, cfg)?;
    let found = fixtures::discover(dir)?;
    if found.is_empty() {
        bail!("no fixtures found under {}", dir.display());
    }

    let mut reports = Vec::with_capacity(found.len());
    for file in found {
        let raw = input::read_bytes(&file.path, cfg.limits.max_json_bytes)?;
        let mut fixture =
            Fixture::from_slice(&raw).with_context(|| format!("{}", file.path.display()))?;
        if fixture.test_case != file.expect {
            warn!(
                path = %file.path.display(),
                declared = %fixture.test_case,
                directory = %file.expect,
                "fixture testCase disagrees with its directory; using the directory"
            );
            fixture.test_case = file.expect;
        }
        let outcome = run_fixture(&fixture, &rules)?;
        reports.push(FixtureReport {
            path: file.path.display().to_string(),
            test_case: fixture.test_case.to_string(),
            passed: outcome.passed,
            detail: outcome.detail,
        });
    }

    let passed = reports.iter().filter(|r| r.passed).count();
    let failed = reports.len() - passed;
    if output::is_json() {
        output::print(&FixturesOut {
            ok: failed == 0,
            passed,
            failed,
            fixtures: reports,
        })?;
    } else {
        for r in &reports {
            output::status_line(r.passed, &format!("[{}] {}", r.test_case, r.path))?;
            if !r.passed {
                output::detail_line(&r.detail)?;
            }
        }
        println!("{passed} passed, {failed} failed");
    }
    Ok(Outcome::from_passed(failed == 0))
}
