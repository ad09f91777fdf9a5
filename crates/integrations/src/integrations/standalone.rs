//! Filesystem-only adapter used when no DCC hosts the tool.
//!
//! There is no live scene, so every scene-mutating operation answers
//! `Unsupported`; file-level operations work directly on disk.

use std::path::{Path, PathBuf};

use models::{Category, Entity, FileType, Project, Version};

use crate::integrations::{
    AdapterState, ExtractedAsset, HostIntegration, HostKind, IntegrationError, Outcome,
    PluginSpec,
};

const ALL_FORMATS: [FileType; 8] = [
    FileType::MayaAscii,
    FileType::MayaBinary,
    FileType::Guerilla,
    FileType::Alembic,
    FileType::Obj,
    FileType::Fbx,
    FileType::Assembly,
    FileType::Image,
];

pub struct Standalone {
    state: AdapterState,
    formats: Vec<FileType>,
    current_file: Option<PathBuf>,
}

impl Standalone {
    pub fn new() -> Self {
        Self {
            state: AdapterState::Uninitialized,
            formats: ALL_FORMATS.to_vec(),
            current_file: None,
        }
    }

    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }
}

impl Default for Standalone {
    fn default() -> Self {
        Self::new()
    }
}

impl HostIntegration for Standalone {
    fn kind(&self) -> HostKind {
        HostKind::Standalone
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    fn default_format(&self) -> FileType {
        FileType::Alembic
    }

    fn available_formats(&self) -> &[FileType] {
        &self.formats
    }

    fn supports_instances(&self) -> bool {
        false
    }

    fn supports_screenshots(&self) -> bool {
        false
    }

    fn initialize_formats(&mut self, plugins: &[PluginSpec]) {
        // No host to extend; plugin specs are acknowledged and ignored.
        if !plugins.is_empty() {
            tracing::debug!("Standalone host ignores {} plugin spec(s)", plugins.len());
        }
        self.state = AdapterState::FormatsInitialized;
    }

    fn load_asset(
        &mut self,
        _asset: &Entity,
        version: &Version,
    ) -> Result<Outcome, IntegrationError> {
        if !version.output_path.is_file() {
            return Err(IntegrationError::NotFound(version.output_path.clone()));
        }
        Ok(Outcome::Unsupported)
    }

    fn load_shot(
        &mut self,
        _shot: &Entity,
        version: &Version,
    ) -> Result<Outcome, IntegrationError> {
        if !version.output_path.is_file() {
            return Err(IntegrationError::NotFound(version.output_path.clone()));
        }
        Ok(Outcome::Unsupported)
    }

    fn build_shot(&mut self, path: &Path) -> Result<Outcome, IntegrationError> {
        if !path.is_file() {
            return Err(IntegrationError::NotFound(path.to_path_buf()));
        }
        Ok(Outcome::Unsupported)
    }

    fn setup_shot(
        &mut self,
        _project: &Project,
        _category: &Category,
        _shot: &Entity,
    ) -> Result<Outcome, IntegrationError> {
        Ok(Outcome::Unsupported)
    }

    fn take_playblast(
        &mut self,
        _start_frame: i32,
        _end_frame: i32,
        _path: &Path,
    ) -> Result<Outcome, IntegrationError> {
        Ok(Outcome::Unsupported)
    }

    fn open_file(&mut self, version: &Version) -> Result<Outcome, IntegrationError> {
        let path = &version.working_path;
        if !path.is_file() {
            return Err(IntegrationError::NotFound(path.clone()));
        }
        self.current_file = Some(path.clone());
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn save_file(&mut self, path: &Path) -> Result<Outcome, IntegrationError> {
        let Some(current) = self.current_file.clone() else {
            return Ok(Outcome::Unsupported);
        };
        if let Some(parent) = path.parent() {
            utils::fs::ensure_dir(parent)?;
        }
        std::fs::copy(&current, path).map_err(utils::fs::FsError::from)?;
        Ok(Outcome::Done)
    }

    fn export_selection(
        &mut self,
        _path: &Path,
        _extension: &str,
    ) -> Result<Outcome, IntegrationError> {
        Ok(Outcome::Unsupported)
    }

    fn assign_shader_to_selected(
        &mut self,
        _version: &Version,
    ) -> Result<bool, IntegrationError> {
        Ok(false)
    }

    fn extract_assets(&mut self) -> Result<Vec<ExtractedAsset>, IntegrationError> {
        Ok(Vec::new())
    }
}
