//! Process-wide scratch directory for preview downloads and capture staging.
//!
//! Created lazily on first use, emptied at shutdown by the bootstrap.

use std::path::PathBuf;

use once_cell::sync::Lazy;

static SCRATCH_DIR: Lazy<PathBuf> = Lazy::new(|| std::env::temp_dir().join("hestia"));

/// Returns the scratch directory, creating it if needed.
pub fn scratch_dir() -> PathBuf {
    let dir = SCRATCH_DIR.clone();
    if let Err(err) = std::fs::create_dir_all(&dir) {
        tracing::warn!("Failed to create scratch dir {}: {}", dir.display(), err);
    }
    dir
}

/// Path inside the scratch directory.
pub fn scratch_path(file_name: &str) -> PathBuf {
    scratch_dir().join(file_name)
}

/// Removes the scratch directory and everything under it. Failures are
/// logged, never raised: shutdown must not block on scratch cleanup.
pub fn clear_scratch() {
    let dir = SCRATCH_DIR.clone();
    if !dir.exists() {
        return;
    }
    if let Err(err) = std::fs::remove_dir_all(&dir) {
        tracing::warn!("Failed to clear scratch dir {}: {}", dir.display(), err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_is_created_and_stable() {
        let a = scratch_dir();
        let b = scratch_dir();
        assert_eq!(a, b);
        assert!(a.is_dir());
    }

    #[test]
    fn scratch_path_joins_under_scratch_dir() {
        let p = scratch_path("preview.png");
        assert!(p.starts_with(scratch_dir()));
        assert_eq!(p.file_name().unwrap(), "preview.png");
    }
}
