//! Thin filesystem gateway used by the publish workflow and the adapters.
//!
//! Folder creation is idempotent so a failed workflow step can be retried
//! without cleanup. Copies never overwrite silently.

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Source file does not exist: {0}")]
    SourceMissing(PathBuf),
    #[error("Target path already exists: {0}")]
    TargetExists(PathBuf),
}

/// Creates `path` and any missing parents. Succeeds if it already exists.
pub fn ensure_dir(path: &Path) -> Result<(), FsError> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Copies `src` into the directory `dir` under `file_name`, creating the
/// directory first. Overwrites an existing target (publish re-resolves the
/// revision before calling this, so a collision means a deliberate repair).
pub fn copy_into(src: &Path, dir: &Path, file_name: &str) -> Result<PathBuf, FsError> {
    if !src.is_file() {
        return Err(FsError::SourceMissing(src.to_path_buf()));
    }
    ensure_dir(dir)?;
    let target = dir.join(file_name);
    std::fs::copy(src, &target)?;
    Ok(target)
}

/// Copy that refuses to clobber: fails with `TargetExists` when the target
/// path is already on disk. Used by scene export.
pub fn copy_guarded(src: &Path, target: &Path) -> Result<(), FsError> {
    if target.exists() {
        return Err(FsError::TargetExists(target.to_path_buf()));
    }
    if !src.is_file() {
        return Err(FsError::SourceMissing(src.to_path_buf()));
    }
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    std::fs::copy(src, target)?;
    Ok(())
}

/// Renames `src` to `target`, falling back to copy+remove across devices.
pub fn rename_file(src: &Path, target: &Path) -> Result<(), FsError> {
    if !src.is_file() {
        return Err(FsError::SourceMissing(src.to_path_buf()));
    }
    if let Some(parent) = target.parent() {
        ensure_dir(parent)?;
    }
    match std::fs::rename(src, target) {
        Ok(()) => Ok(()),
        Err(_) => {
            std::fs::copy(src, target)?;
            std::fs::remove_file(src)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn copy_into_creates_target_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("scene.ma");
        std::fs::write(&src, b"scene").unwrap();

        let dir = tmp.path().join("out/V001");
        let target = copy_into(&src, &dir, "scene_V001.ma").unwrap();

        assert_eq!(target, dir.join("scene_V001.ma"));
        assert_eq!(std::fs::read(&target).unwrap(), b"scene");
    }

    #[test]
    fn copy_into_rejects_missing_source() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("nope.ma");
        let err = copy_into(&missing, tmp.path(), "x.ma").unwrap_err();
        assert!(matches!(err, FsError::SourceMissing(_)));
    }

    #[test]
    fn copy_guarded_refuses_existing_target() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.abc");
        let target = tmp.path().join("b.abc");
        std::fs::write(&src, b"x").unwrap();
        std::fs::write(&target, b"y").unwrap();

        let err = copy_guarded(&src, &target).unwrap_err();
        assert!(matches!(err, FsError::TargetExists(_)));
        // Target untouched.
        assert_eq!(std::fs::read(&target).unwrap(), b"y");
    }
}
