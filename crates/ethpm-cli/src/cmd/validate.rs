use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ethpm_core::config::CoreConfig;
use ethpm_core::determinism::canonical_json::check_canonical_parsed;
use ethpm_core::model::v3::PackageSummary;
use ethpm_core::pipeline::fixture::CANONICAL_CONSTRAINT;
use ethpm_core::pipeline::parse::decode_manifest_v3;
use ethpm_core::{validate_with_limits, Violation};
use serde::Serialize;
use tracing::debug;

use crate::cmd::Outcome;
use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: String,
    pub valid: bool,
    pub canonical: bool,
    pub violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<PackageSummary>,
}

#[derive(Debug, Serialize)]
pub struct ValidateOut {
    pub ok: bool,
    pub files: Vec<FileReport>,
}

pub fn run(files: &[PathBuf], schema: Option<&Path>, cfg: &CoreConfig) -> Result<Outcome> {
    let rules = input::load_rules(schema, cfg)?;

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let (raw, doc) = input::read_json_file(path, cfg.limits.max_json_bytes)?;
        let verdict = validate_with_limits(&doc, &rules, &cfg.limits)
            .with_context(|| format!("cannot validate {}", path.display()))?;
        let mut violations = verdict.into_violations();

        let canonical = check_canonical_parsed(&raw, &doc);
        if let Some(reason) = canonical.reason() {
            if cfg.manifest.require_canonical {
                violations.push(Violation::new("", reason.as_str(), CANONICAL_CONSTRAINT));
            } else {
                debug!(path = %path.display(), %reason, "ignoring non-canonical encoding");
            }
        }

        let valid = violations.is_empty();
        let summary = if valid {
            match decode_manifest_v3(&doc) {
                Ok(manifest) => Some(manifest.summary()),
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "no summary for valid manifest");
                    None
                }
            }
        } else {
            None
        };
        reports.push(FileReport {
            path: path.display().to_string(),
            valid,
            canonical: canonical.is_canonical(),
            violations,
            summary,
        });
    }

    let ok = reports.iter().all(|r| r.valid);
    if output::is_json() {
        output::print(&ValidateOut { ok, files: reports })?;
    } else {
        for r in &reports {
            output::status_line(r.valid, &r.path)?;
            for v in &r.violations {
                output::detail_line(&v.to_string())?;
            }
        }
    }
    Ok(Outcome::from_passed(ok))
}
