use std::path::PathBuf;

use anyhow::Result;
use ethpm_core::config::CoreConfig;
use ethpm_core::determinism::hashing::{canonical_digest_hex, HashAlg};
use serde::Serialize;

use crate::cmd::Outcome;
use crate::io::input;
use crate::output;

#[derive(Debug, Serialize)]
pub struct DigestOut {
    pub path: String,
    pub algorithm: &'static str,
    pub digest: String,
}

pub fn run(files: &[PathBuf], cfg: &CoreConfig) -> Result<Outcome> {
    let mut out = Vec::with_capacity(files.len());
    for path in files {
        let (_, doc) = input::read_json_file(path, cfg.limits.max_json_bytes)?;
        out.push(DigestOut {
            path: path.display().to_string(),
            algorithm: HashAlg::Sha256.as_str(),
            digest: canonical_digest_hex(&doc)?,
        });
    }

    if output::is_json() {
        output::print(&out)?;
    } else {
        for d in &out {
            println!("{}  {}", d.digest, d.path);
        }
    }
    Ok(Outcome::Pass)
}
