//! Guerilla Render adapter.
//!
//! Guerilla has no reference mechanism, so every import is flattened; an
//! update on a selected tagged import is a delete-and-reimport of its
//! children. Shot setup and playblast follow the shared protocol.

use std::path::Path;

use models::{Category, Entity, FileType, Project, Version};

use crate::{
    assembly::ShotAssembly,
    integrations::{
        AdapterState, ExtractedAsset, HostIntegration, HostKind, IntegrationError, Outcome,
        PluginSpec, apply_shot_setup, capture_playblast, extract_tagged,
    },
    markers::{AssetMarkers, ImportMode, MarkerEntry, MarkerTable},
    session::HostSession,
};

pub struct Guerilla {
    session: Option<Box<dyn HostSession>>,
    state: AdapterState,
    formats: Vec<FileType>,
    markers: MarkerTable,
}

impl Guerilla {
    pub fn new(session: Option<Box<dyn HostSession>>) -> Self {
        let state = if session.is_some() {
            AdapterState::Uninitialized
        } else {
            tracing::warn!("Guerilla runtime unavailable, adapter is inert");
            AdapterState::Inactive
        };
        Self {
            session,
            state,
            formats: vec![FileType::Guerilla],
            markers: MarkerTable::new(),
        }
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }
}

impl HostIntegration for Guerilla {
    fn kind(&self) -> HostKind {
        HostKind::Guerilla
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    fn default_format(&self) -> FileType {
        FileType::Guerilla
    }

    fn available_formats(&self) -> &[FileType] {
        &self.formats
    }

    fn supports_instances(&self) -> bool {
        false
    }

    fn supports_screenshots(&self) -> bool {
        true
    }

    fn initialize_formats(&mut self, plugins: &[PluginSpec]) {
        let Some(session) = self.session.as_deref_mut() else {
            tracing::warn!("Guerilla unavailable, keeping base format set");
            return;
        };
        for spec in plugins {
            if session.load_plugin(&spec.name) {
                for format in &spec.formats {
                    if !self.formats.contains(format) {
                        self.formats.push(*format);
                    }
                }
            } else {
                tracing::warn!("Guerilla plugin '{}' failed to load", spec.name);
            }
        }
        if self.state == AdapterState::Uninitialized {
            self.state = AdapterState::FormatsInitialized;
        }
    }

    fn load_asset(
        &mut self,
        asset: &Entity,
        version: &Version,
    ) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        let artifact = &version.output_path;
        if !artifact.is_file() {
            return Err(IntegrationError::NotFound(artifact.clone()));
        }
        if !self.formats.contains(&version.file_type) {
            return Err(IntegrationError::UnsupportedFormat(version.file_type));
        }

        let selection = session.selection();
        if let Some(selected) = selection.first() {
            if let Some(entry) = self.markers.get_mut(selected) {
                if entry.markers.asset_id == asset.id {
                    session.delete_children(selected)?;
                    session.import_under(artifact, selected)?;
                    entry.markers.version_id = version.id;
                    entry.source_path = artifact.clone();
                    self.state = AdapterState::Active;
                    return Ok(Outcome::Done);
                }
            }
        }

        let object = session.import_file(artifact, &asset.name)?;
        self.markers.tag(
            object,
            MarkerEntry {
                markers: AssetMarkers::new(asset.id, version.id, true),
                mode: ImportMode::Flattened,
                source_path: artifact.clone(),
            },
        );
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn load_shot(
        &mut self,
        shot: &Entity,
        version: &Version,
    ) -> Result<Outcome, IntegrationError> {
        // Availability first, like the other scene calls: an inert adapter
        // must not leak artifact or format diagnostics.
        if self.session.is_none() {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        }
        if !version.output_path.is_file() {
            return Err(IntegrationError::NotFound(version.output_path.clone()));
        }
        if version.file_type == FileType::Assembly {
            let path = version.output_path.clone();
            return self.build_shot(&path);
        }
        if version.file_type != FileType::Guerilla {
            return Err(IntegrationError::UnsupportedFormat(version.file_type));
        }
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        tracing::info!("Opening shot '{}' project {}", shot.name, version.output_path.display());
        session.open_scene(&version.output_path)?;
        self.markers = MarkerTable::new();
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn build_shot(&mut self, path: &Path) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        if !path.is_file() {
            return Err(IntegrationError::NotFound(path.to_path_buf()));
        }
        let assembly = ShotAssembly::read(path)?;
        for item in &assembly.items {
            if !item.source_path.is_file() {
                tracing::warn!(
                    "Assembly item {} points at missing artifact {}, skipping",
                    item.asset_id,
                    item.source_path.display()
                );
                continue;
            }
            let group = format!("asset_{}", item.asset_id.simple());
            let object = session.import_file(&item.source_path, &group)?;
            session.set_world_transform(&object, item.transform)?;
            self.markers.tag(
                object,
                MarkerEntry {
                    markers: AssetMarkers {
                        is_asset: true,
                        is_static: item.is_static,
                        asset_id: item.asset_id,
                        version_id: item.version_id,
                        shader_id: None,
                    },
                    mode: ImportMode::Flattened,
                    source_path: item.source_path.clone(),
                },
            );
        }
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn setup_shot(
        &mut self,
        project: &Project,
        category: &Category,
        shot: &Entity,
    ) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        let outcome = apply_shot_setup(session, project, category, shot)?;
        self.state = AdapterState::Active;
        Ok(outcome)
    }

    fn take_playblast(
        &mut self,
        start_frame: i32,
        end_frame: i32,
        path: &Path,
    ) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        capture_playblast(session, start_frame, end_frame, path)
    }

    fn open_file(&mut self, version: &Version) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        let path = &version.working_path;
        if !path.is_file() {
            return Err(IntegrationError::NotFound(path.clone()));
        }
        let file_type = FileType::from_path(path);
        if !self.formats.contains(&file_type) {
            return Err(IntegrationError::UnsupportedFormat(file_type));
        }
        session.open_scene(path)?;
        self.markers = MarkerTable::new();
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn save_file(&mut self, path: &Path) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        let file_type = FileType::from_path(path);
        if !self.formats.contains(&file_type) {
            return Err(IntegrationError::UnsupportedFormat(file_type));
        }
        session.save_scene(path)?;
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn export_selection(
        &mut self,
        path: &Path,
        extension: &str,
    ) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        let file_type = FileType::from_extension(extension);
        if !self.formats.contains(&file_type) {
            return Err(IntegrationError::UnsupportedFormat(file_type));
        }
        let target = path.with_extension(extension);
        if target.exists() {
            return Err(IntegrationError::TargetExists(target));
        }
        if session.selection().is_empty() {
            return Err(IntegrationError::NothingSelected);
        }
        session.export_selection(&target)?;
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn assign_shader_to_selected(
        &mut self,
        version: &Version,
    ) -> Result<bool, IntegrationError> {
        let Some(session) = self.session.as_deref() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        let selection = session.selection();
        let Some(selected) = selection.first() else {
            return Ok(false);
        };
        let Some(entry) = self.markers.get_mut(selected) else {
            return Ok(false);
        };
        entry.markers.shader_id = Some(version.id);
        Ok(true)
    }

    fn extract_assets(&mut self) -> Result<Vec<ExtractedAsset>, IntegrationError> {
        let Some(session) = self.session.as_deref() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Guerilla));
        };
        extract_tagged(session, &self.markers)
    }
}
