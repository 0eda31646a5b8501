use std::process::ExitCode;

use anyhow::Result;
use ethpm_core::config::{validate_config, CoreConfig};

use crate::args::{Cli, Command};

mod canonical;
mod digest;
mod fixtures;
mod validate;

/// How a command that ran to completion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl Outcome {
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Pass => ExitCode::SUCCESS,
            Self::Fail => ExitCode::from(1),
        }
    }
}

fn core_config(cli: &Cli) -> Result<CoreConfig> {
    let mut cfg = CoreConfig::default();
    cfg.limits.max_json_bytes = cli.max_bytes;
    if let Command::Validate {
        allow_non_canonical, ..
    } = &cli.command
    {
        cfg.manifest.require_canonical = !allow_non_canonical;
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn dispatch(cli: Cli) -> Result<Outcome> {
    let cfg = core_config(&cli)?;
    let schema = cli.schema.as_deref();
    match &cli.command {
        Command::Validate { files, .. } => validate::run(files, schema, &cfg),
        Command::Canonical { files, print } => canonical::run(files, *print, &cfg),
        Command::Fixtures { dir } => fixtures::run(dir, schema, &cfg),
        Command::Digest { files } => digest::run(files, &cfg),
    }
}
