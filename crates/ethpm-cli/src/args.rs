use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Default `--max-bytes` (8 MiB).
pub const DEFAULT_MAX_BYTES: usize = 8 * 1024 * 1024;

#[derive(Parser, Debug, Clone)]
#[command(name = "ethpm", version, about = "EthPM manifest conformance checker")]
pub struct Cli {
    /// Emit JSON output on stdout.
    #[arg(long, global = true)]
    pub json: bool,

    /// Log at debug level (otherwise RUST_LOG, default warn).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Rule set document to validate against (default: embedded ethpm/3).
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Largest manifest or rule set accepted, in bytes.
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_BYTES)]
    pub max_bytes: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate manifests against the rule set and check canonical form.
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Report non-canonical encoding without failing on it.
        #[arg(long)]
        allow_non_canonical: bool,
    },

    /// Check that manifests are canonically encoded.
    Canonical {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print the canonical encoding instead of checking.
        #[arg(long)]
        print: bool,
    },

    /// Run standardized fixtures found under `valid/` and `invalid/` directories.
    Fixtures {
        /// Root directory to search.
        dir: PathBuf,
    },

    /// Print the sha256 digest of each manifest's canonical encoding.
    Digest {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
