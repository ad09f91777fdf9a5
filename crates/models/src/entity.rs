use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::{task::Task, version::Version};

/// The two kinds of tracked entity. Also used to pick the asset/shot leg of
/// a path template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Asset,
    Shot,
}

/// Kind-specific payload. Shots carry their frame count and the assets
/// assigned to them for assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityDetail {
    Asset,
    Shot {
        frame_count: i32,
        assigned_asset_ids: Vec<Uuid>,
    },
}

/// An asset or shot tracked by the pipeline.
///
/// `loaded` says whether tasks/versions have been fetched from the remote
/// link; the manager calls `ServiceLink` explicitly to populate an entity
/// before handing it to anything else. Fetch happens at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub preview_path: Option<PathBuf>,
    pub detail: EntityDetail,
    pub tasks: Vec<Task>,
    pub versions: Vec<Version>,
    pub loaded: bool,
}

impl Entity {
    pub fn new(id: Uuid, name: impl Into<String>, detail: EntityDetail) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            preview_path: None,
            detail,
            tasks: Vec::new(),
            versions: Vec::new(),
            loaded: false,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self.detail {
            EntityDetail::Asset => EntityKind::Asset,
            EntityDetail::Shot { .. } => EntityKind::Shot,
        }
    }

    /// Frame count for shots, `None` for assets.
    pub fn frame_count(&self) -> Option<i32> {
        match self.detail {
            EntityDetail::Asset => None,
            EntityDetail::Shot { frame_count, .. } => Some(frame_count),
        }
    }

    /// Versions belonging to the given task, in insertion order.
    pub fn versions_for_task(&self, task_id: Uuid) -> impl Iterator<Item = &Version> {
        self.versions.iter().filter(move |v| v.task_id == task_id)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn kind_follows_detail() {
        let asset = Entity::new(Uuid::new_v4(), "Hero", EntityDetail::Asset);
        assert_eq!(asset.kind(), EntityKind::Asset);
        assert_eq!(asset.frame_count(), None);

        let shot = Entity::new(
            Uuid::new_v4(),
            "sh010",
            EntityDetail::Shot {
                frame_count: 120,
                assigned_asset_ids: vec![],
            },
        );
        assert_eq!(shot.kind(), EntityKind::Shot);
        assert_eq!(shot.frame_count(), Some(120));
    }

    #[test]
    fn entity_kind_parses_lowercase() {
        assert_eq!(EntityKind::from_str("asset").unwrap(), EntityKind::Asset);
        assert_eq!(EntityKind::from_str("shot").unwrap(), EntityKind::Shot);
        assert!(EntityKind::from_str("sequence").is_err());
        assert_eq!(EntityKind::Asset.to_string(), "asset");
    }
}
