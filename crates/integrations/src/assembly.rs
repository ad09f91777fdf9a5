//! Shot-assembly document (`.hshot`): the serialized output of
//! `extract_assets`, consumed by `build_shot`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const ASSEMBLY_EXTENSION: &str = "hshot";

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Assembly file not found: {0}")]
    NotFound(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// One placed asset inside a shot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyItem {
    pub asset_id: Uuid,
    pub version_id: Uuid,
    pub is_static: bool,
    /// Published artifact the placement was imported from.
    pub source_path: PathBuf,
    /// Row-major 4x4 world transform.
    pub transform: [f64; 16],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShotAssembly {
    pub items: Vec<AssemblyItem>,
}

impl ShotAssembly {
    pub fn read(path: &Path) -> Result<Self, AssemblyError> {
        if !path.is_file() {
            return Err(AssemblyError::NotFound(path.to_path_buf()));
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write(&self, path: &Path) -> Result<(), AssemblyError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::session::IDENTITY;

    use super::*;

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ShotAssembly::read(&tmp.path().join("sh010.hshot")).unwrap_err();
        assert!(matches!(err, AssemblyError::NotFound(_)));
    }

    #[test]
    fn document_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("sh010.hshot");
        let assembly = ShotAssembly {
            items: vec![AssemblyItem {
                asset_id: Uuid::new_v4(),
                version_id: Uuid::new_v4(),
                is_static: true,
                source_path: PathBuf::from("/proj/hero.abc"),
                transform: IDENTITY,
            }],
        };
        assembly.write(&path).unwrap();

        let loaded = ShotAssembly::read(&path).unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].asset_id, assembly.items[0].asset_id);
        assert_eq!(loaded.items[0].transform, IDENTITY);
    }
}
