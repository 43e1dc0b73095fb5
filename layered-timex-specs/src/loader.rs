//! Fixture file loading.

use crate::{parse_fixture, SpecError, SpecResult, TimexFixture};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn load_error(path: &Path, err: impl ToString) -> SpecError {
    SpecError::Load {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Load a single fixture file.
pub fn load_fixture(path: &Path) -> SpecResult<TimexFixture> {
    let content = fs::read_to_string(path).map_err(|e| load_error(path, e))?;
    parse_fixture(&content).map_err(|e| load_error(path, e))
}

/// Every `*.toml` fixture below `dir`, named by relative path and sorted by name.
///
/// A missing directory yields no fixtures.
pub fn load_all_fixtures(dir: &Path) -> SpecResult<Vec<(String, TimexFixture)>> {
    let mut paths = fixture_paths(dir).map_err(|e| load_error(dir, e))?;
    paths.sort();
    paths
        .into_iter()
        .map(|path| {
            let name = path.strip_prefix(dir).unwrap_or(&path).display().to_string();
            load_fixture(&path).map(|fixture| (name, fixture))
        })
        .collect()
}

fn fixture_paths(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        if !dir.is_dir() {
            continue;
        }
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.extension().map_or(false, |ext| ext == "toml") {
                found.push(path);
            }
        }
    }
    Ok(found)
}
