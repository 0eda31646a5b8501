use std::path::PathBuf;

use anyhow::Result;
use ethpm_core::config::CoreConfig;
use ethpm_core::determinism::canonical_json::{canonical_json_string, check_canonical, CanonicalVerdict};
use serde::Serialize;

use crate::cmd::Outcome;
use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct CanonicalReport {
    pub path: String,
    #[serde(flatten)]
    pub verdict: CanonicalVerdict,
}

#[derive(Debug, Serialize)]
pub struct CanonicalOut {
    pub ok: bool,
    pub files: Vec<CanonicalReport>,
}

pub fn run(files: &[PathBuf], print: bool, cfg: &CoreConfig) -> Result<Outcome> {
    if print {
        return print_canonical(files, cfg);
    }

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let raw = input::read_bytes(path, cfg.limits.max_json_bytes)?;
        reports.push(CanonicalReport {
            path: path.display().to_string(),
            verdict: check_canonical(&raw),
        });
    }

    let ok = reports.iter().all(|r| r.verdict.is_canonical());
    if output::is_json() {
        output::print(&CanonicalOut { ok, files: reports })?;
    } else {
        for r in &reports {
            output::status_line(r.verdict.is_canonical(), &r.path)?;
            if let Some(reason) = r.verdict.reason() {
                output::detail_line(reason.as_str())?;
            }
        }
    }
    Ok(Outcome::from_passed(ok))
}

/// Write each file's canonical encoding to stdout, one per line.
fn print_canonical(files: &[PathBuf], cfg: &CoreConfig) -> Result<Outcome> {
    for path in files {
        let (_, doc) = input::read_json_file(path, cfg.limits.max_json_bytes)?;
        println!("{}", canonical_json_string(&doc)?);
    }
    Ok(Outcome::Pass)
}
