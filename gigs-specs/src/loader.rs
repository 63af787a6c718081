//! Fixture file loading.

use crate::errors::SpecError;
use crate::fixture::FixtureFile;
use log::debug;
use std::fs;
use std::path::Path;

/// Load a single fixture file.
pub fn load_fixture_file(path: &Path) -> Result<FixtureFile, SpecError> {
    let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    FixtureFile::parse(&path.display().to_string(), &content)
}

/// Load all fixture files from a directory (glob: **/*.toml), sorted by
/// relative path.
pub fn load_all_fixtures(dir: &Path) -> Result<Vec<(String, FixtureFile)>, SpecError> {
    let mut fixtures = Vec::new();
    load_fixtures_recursive(dir, dir, &mut fixtures)?;
    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(fixtures)
}

fn load_fixtures_recursive(
    base: &Path,
    dir: &Path,
    fixtures: &mut Vec<(String, FixtureFile)>,
) -> Result<(), SpecError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir).map_err(|e| SpecError::Load {
        path: dir.display().to_string(),
        message: e.to_string(),
    })? {
        let entry = entry.map_err(|e| SpecError::Load {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();

        if path.is_dir() {
            load_fixtures_recursive(base, &path, fixtures)?;
        } else if path.extension().map_or(false, |e| e == "toml") {
            let relative = path.strip_prefix(base).unwrap_or(&path);
            debug!("loading {}", relative.display());
            let fixture = load_fixture_file(&path)?;
            fixtures.push((relative.display().to_string(), fixture));
        }
    }

    Ok(())
}
