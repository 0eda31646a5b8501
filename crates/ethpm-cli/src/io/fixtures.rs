use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ethpm_core::pipeline::fixture::TestCase;
use walkdir::WalkDir;

/// A fixture file and the outcome its directory calls for.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    pub path: PathBuf,
    pub expect: TestCase,
}

/// Every `*.json` file under `root` whose parent directory is `valid` or `invalid`.
pub fn discover(root: &Path) -> Result<Vec<FixtureFile>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("cannot walk {}", root.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "json") {
            continue;
        }
        let expect = path
            .parent()
            .and_then(Path::file_name)
            .and_then(|n| n.to_str())
            .and_then(TestCase::from_dir_name);
        if let Some(expect) = expect {
            found.push(FixtureFile {
                path: path.to_path_buf(),
                expect,
            });
        }
    }
    Ok(found)
}
