//! Writing rendered Kotlin files.
//!
//! Files land at `<output_dir>/<package path>/<File>.kt` and are written
//! through a temp file and a rename, so an interrupted run never leaves a
//! half-written source behind.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::KtWrapError;
use crate::kotlin::KotlinFile;

/// Writes content to a file atomically using temp file + rename.
///
/// Parent directories are created as needed.
///
/// ## Errors
/// Returns [`KtWrapError::WriteError`] if a directory cannot be created,
/// the temp file cannot be written or the rename fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), KtWrapError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| KtWrapError::WriteError {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("kt.tmp");
    fs::write(&temp_path, content).map_err(|e| KtWrapError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| KtWrapError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// Renders and writes `files` under `output_dir`, or prints them when
/// `dry_run` is set. Returns the path of every file, written or not.
///
/// ## Errors
/// Propagates [`write_atomic`] failures.
pub fn write_files(files: &[KotlinFile], output_dir: &Path, dry_run: bool) -> Result<Vec<PathBuf>, KtWrapError> {
    let mut paths = Vec::with_capacity(files.len());
    for file in files {
        let path = output_dir.join(file.relative_path());
        let content = file.render();
        if dry_run {
            println!("=== {} ===\n{}", path.display(), content);
        } else {
            write_atomic(&path, &content)?;
            debug!(path = %path.display(), bytes = content.len(), "Wrote file");
        }
        paths.push(path);
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn write_atomic_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("org/bots/Objects.kt");

        write_atomic(&file_path, "package org.bots\n").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "package org.bots\n");
        assert!(!file_path.with_extension("kt.tmp").exists());
    }

    #[test]
    fn write_atomic_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("Objects.kt");
        fs::write(&file_path, "old").unwrap();

        write_atomic(&file_path, "new").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new");
    }

    #[test]
    fn write_files_places_files_by_package() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![KotlinFile::new("org.bots.objects", "Objects")];

        let paths = write_files(&files, temp_dir.path(), false).unwrap();

        assert_eq!(paths, vec![temp_dir.path().join("org/bots/objects/Objects.kt")]);
        assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "package org.bots.objects\n\n");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![KotlinFile::new("org.bots", "Objects")];

        let paths = write_files(&files, temp_dir.path(), true).unwrap();

        assert_eq!(paths.len(), 1);
        assert!(!paths[0].exists());
    }
}
