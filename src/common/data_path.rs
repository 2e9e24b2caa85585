// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use crate::domain::error::AppError;
use std::path::{Path, PathBuf};

fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Active data directory: explicit setting first, then `./data`.
pub fn resolve_data_dir(data_dir: Option<&str>) -> PathBuf {
    match non_empty(data_dir) {
        Some(dir) => absolute(PathBuf::from(dir)),
        None => absolute(PathBuf::from("data")),
    }
}

/// Absolute paths pass through. Relative paths land under the data dir when
/// one is configured; otherwise they are taken relative to the cwd, falling
/// back to `./data/<path>` when only that exists.
pub fn resolve_data_path(raw_path: &str, data_dir: Option<&str>) -> PathBuf {
    let as_path = PathBuf::from(raw_path.trim());
    if as_path.is_absolute() {
        return as_path;
    }
    let relative = as_path
        .strip_prefix("data")
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| as_path.clone());
    if non_empty(data_dir).is_some() {
        return resolve_data_dir(data_dir).join(relative);
    }
    let direct = absolute(as_path);
    if direct.exists() {
        return direct;
    }
    let under_data = resolve_data_dir(None).join(relative);
    if under_data.exists() {
        return under_data;
    }
    direct
}

pub fn resolve_required_data_path(
    raw_path: &str,
    data_dir: Option<&str>,
) -> Result<PathBuf, AppError> {
    let resolved = resolve_data_path(raw_path, data_dir);
    if resolved.exists() {
        return Ok(resolved);
    }
    Err(AppError::Config(format!(
        "{raw_path} expected at {}; set DATA_DIR or an absolute path",
        resolved.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_data_dir_wins_for_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let resolved = resolve_data_path("data/crates.json", Some(&root));
        assert_eq!(resolved, dir.path().join("crates.json"));
    }

    #[test]
    fn absolute_paths_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("basket.json");
        let raw = file.to_string_lossy().to_string();
        assert_eq!(resolve_data_path(&raw, Some("/elsewhere")), file);
    }

    #[test]
    fn required_path_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_string_lossy().to_string();
        let err = resolve_required_data_path("missing.json", Some(&root)).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("missing.json")));
    }
}
