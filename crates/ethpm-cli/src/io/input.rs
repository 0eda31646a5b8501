use std::borrow::Cow;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use ethpm_core::config::CoreConfig;
use ethpm_core::pipeline::parse::parse_json_bytes;
use ethpm_core::RuleSet;
use serde_json::Value;
use tracing::debug;

/// Read a file, refusing anything larger than `max_bytes`.
pub fn read_bytes<P: AsRef<Path>>(path: P, max_bytes: usize) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let len = fs::metadata(path)
        .with_context(|| format!("cannot read {}", path.display()))?
        .len();
    if len > max_bytes as u64 {
        bail!("{} is too large ({len} bytes > limit {max_bytes})", path.display());
    }
    fs::read(path).with_context(|| format!("cannot read {}", path.display()))
}

/// Read and parse a JSON file. Returns the raw bytes too, for canonical checks.
pub fn read_json_file<P: AsRef<Path>>(path: P, max_bytes: usize) -> Result<(Vec<u8>, Value)> {
    let path = path.as_ref();
    let raw = read_bytes(path, max_bytes)?;
    let value = parse_json_bytes(&raw, max_bytes).with_context(|| format!("{}", path.display()))?;
    Ok((raw, value))
}

/// The rule set named by `--schema`, or the embedded one for the configured version.
pub fn load_rules(schema: Option<&Path>, cfg: &CoreConfig) -> Result<Cow<'static, RuleSet>> {
    match schema {
        None => Ok(Cow::Borrowed(cfg.manifest.version.rule_set()?)),
        Some(path) => {
            let raw = read_bytes(path, cfg.limits.max_json_bytes)?;
            let rules = RuleSet::from_slice(&raw)
                .with_context(|| format!("cannot load rule set {}", path.display()))?;
            debug!(path = %path.display(), "loaded external rule set");
            Ok(Cow::Owned(rules))
        }
    }
}
