use std::{fmt, path::PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

/// Revision number of a version. The legacy publish flow passes `-1` as an
/// "unset, auto-increment" sentinel, so the wrapper keeps that value
/// representable while making it impossible to render into a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Revision(pub i32);

impl Revision {
    pub const UNSET: Revision = Revision(-1);

    pub fn is_set(&self) -> bool {
        self.0 >= 0
    }

    /// Zero-padded folder rendering (`V003`). `None` while unset.
    pub fn padded(&self) -> Option<String> {
        if self.is_set() {
            Some(format!("V{:03}", self.0))
        } else {
            None
        }
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.padded() {
            Some(s) => f.write_str(&s),
            None => f.write_str("V???"),
        }
    }
}

/// File format of a published artifact, derived from the output-path
/// extension unless set explicitly by the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FileType {
    MayaAscii,
    MayaBinary,
    Guerilla,
    Alembic,
    Obj,
    Fbx,
    /// JSON shot-assembly description (`.hshot`).
    Assembly,
    Image,
    Unknown,
}

impl FileType {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "ma" => FileType::MayaAscii,
            "mb" => FileType::MayaBinary,
            "gproject" => FileType::Guerilla,
            "abc" => FileType::Alembic,
            "obj" => FileType::Obj,
            "fbx" => FileType::Fbx,
            "hshot" => FileType::Assembly,
            "png" | "jpg" | "jpeg" | "exr" => FileType::Image,
            _ => FileType::Unknown,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => Self::from_extension(ext),
            None => FileType::Unknown,
        }
    }

    /// True for formats that replace the whole scene when opened.
    pub fn is_native_scene(&self) -> bool {
        matches!(
            self,
            FileType::MayaAscii | FileType::MayaBinary | FileType::Guerilla
        )
    }
}

/// One revision of a task's output for an entity. Created only through
/// publish; paths and file type may be corrected afterwards, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    pub id: Uuid,
    pub task_id: Uuid,
    pub working_path: PathBuf,
    pub output_path: PathBuf,
    pub file_type: FileType,
    pub revision: Revision,
    pub created_at: DateTime<Utc>,
}

impl Version {
    /// File type is read off the output extension; pass `file_type` to
    /// override (e.g. a playblast published next to a scene file).
    pub fn new(
        id: Uuid,
        task_id: Uuid,
        working_path: PathBuf,
        output_path: PathBuf,
        revision: Revision,
        file_type: Option<FileType>,
    ) -> Self {
        let file_type = file_type.unwrap_or_else(|| FileType::from_path(&output_path));
        Self {
            id,
            task_id,
            working_path,
            output_path,
            file_type,
            revision,
            created_at: Utc::now(),
        }
    }
}
