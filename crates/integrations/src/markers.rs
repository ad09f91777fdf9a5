//! Side table for the marker attributes attached to imported assets.
//!
//! Hosts whose scene format cannot carry structured metadata keep these
//! records out of band, keyed by scene-object identity. `extract_assets`
//! reads this table back to serialize a shot assembly.

use std::{collections::BTreeMap, path::PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::ObjectId;

/// How an asset was brought into the scene. The two modes may never be
/// mixed on the same live object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    Reference,
    Flattened,
}

/// The marker attributes written on every imported asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetMarkers {
    pub is_asset: bool,
    pub is_static: bool,
    pub asset_id: Uuid,
    pub version_id: Uuid,
    /// Empty until a shader is assigned.
    pub shader_id: Option<Uuid>,
}

impl AssetMarkers {
    pub fn new(asset_id: Uuid, version_id: Uuid, is_static: bool) -> Self {
        Self {
            is_asset: true,
            is_static,
            asset_id,
            version_id,
            shader_id: None,
        }
    }
}

/// One tagged scene object.
#[derive(Debug, Clone)]
pub struct MarkerEntry {
    pub markers: AssetMarkers,
    pub mode: ImportMode,
    /// Artifact the object was imported from, kept for assembly export.
    pub source_path: PathBuf,
}

/// Object-id keyed registry of tagged imports.
#[derive(Debug, Default)]
pub struct MarkerTable {
    entries: BTreeMap<ObjectId, MarkerEntry>,
}

impl MarkerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, object: ObjectId, entry: MarkerEntry) {
        self.entries.insert(object, entry);
    }

    pub fn get(&self, object: &str) -> Option<&MarkerEntry> {
        self.entries.get(object)
    }

    pub fn get_mut(&mut self, object: &str) -> Option<&mut MarkerEntry> {
        self.entries.get_mut(object)
    }

    pub fn remove(&mut self, object: &str) -> Option<MarkerEntry> {
        self.entries.remove(object)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ObjectId, &MarkerEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
