use std::path::{Path, PathBuf};

use models::{Entity, Project, Version};

use super::{Credentials, PublishMetadata, RemoteServiceError, ServiceLink};

/// The offline link. Backs the static local project: no tracker exists, so
/// reads come back empty and publishes are accepted as-is (the local ledger
/// is the only record).
#[derive(Debug, Default)]
pub struct LocalLink;

impl ServiceLink for LocalLink {
    fn login(&mut self, _credentials: &Credentials) -> Result<bool, RemoteServiceError> {
        Ok(false)
    }

    fn get_open_projects(&mut self) -> Result<Vec<serde_json::Value>, RemoteServiceError> {
        Ok(Vec::new())
    }

    fn get_data_from_project(
        &mut self,
        _raw: &serde_json::Value,
    ) -> Result<Project, RemoteServiceError> {
        Err(RemoteServiceError::NotConnected)
    }

    fn get_versions(
        &mut self,
        _project: &Project,
        _entity: &Entity,
    ) -> Result<Vec<Version>, RemoteServiceError> {
        Ok(Vec::new())
    }

    fn download_preview(&mut self, _entity: &Entity) -> Result<PathBuf, RemoteServiceError> {
        Err(RemoteServiceError::NotConnected)
    }

    fn publish(
        &mut self,
        entity: &Entity,
        metadata: &PublishMetadata<'_>,
        _working_path: &Path,
        _output_paths: &[PathBuf],
        _preview_path: Option<&Path>,
    ) -> Result<bool, RemoteServiceError> {
        tracing::info!(
            "Publishing {} {} V{:03} locally only",
            entity.name,
            metadata.task_name,
            metadata.revision
        );
        Ok(true)
    }
}
