//! Contract to the remote project-management service.
//!
//! The production implementation wraps the tracker's HTTP API; this crate
//! only depends on the contract. Read failures degrade at the manager
//! boundary; publish failures surface to the caller.

pub mod local;

use std::path::{Path, PathBuf};

use models::{Entity, Project, Version};
use secrecy::SecretString;
use thiserror::Error;

pub use local::LocalLink;

#[derive(Debug, Error)]
pub enum RemoteServiceError {
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Not connected to a remote service")]
    NotConnected,
    #[error("Remote call failed: {0}")]
    Transport(String),
    #[error("Malformed remote payload: {0}")]
    Payload(String),
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub host_url: String,
    pub username: String,
    pub password: SecretString,
}

/// What a publish hands to the tracker besides the files themselves.
#[derive(Debug, Clone)]
pub struct PublishMetadata<'a> {
    pub comment: &'a str,
    pub task_name: &'a str,
    pub revision: i32,
}

pub trait ServiceLink {
    /// `Ok(false)` is a rejected login, `Err` a transport problem.
    fn login(&mut self, credentials: &Credentials) -> Result<bool, RemoteServiceError>;

    /// Raw open-project payloads, one per project.
    fn get_open_projects(&mut self) -> Result<Vec<serde_json::Value>, RemoteServiceError>;

    /// Materializes one raw payload into the full data model.
    fn get_data_from_project(
        &mut self,
        raw: &serde_json::Value,
    ) -> Result<Project, RemoteServiceError>;

    /// Versions for one entity; called once per entity by `ensure_loaded`.
    fn get_versions(
        &mut self,
        project: &Project,
        entity: &Entity,
    ) -> Result<Vec<Version>, RemoteServiceError>;

    /// Downloads the entity's preview into the scratch dir.
    fn download_preview(&mut self, entity: &Entity) -> Result<PathBuf, RemoteServiceError>;

    /// Registers a published version with the tracker. `Ok(false)` means
    /// the tracker refused it.
    fn publish(
        &mut self,
        entity: &Entity,
        metadata: &PublishMetadata<'_>,
        working_path: &Path,
        output_paths: &[PathBuf],
        preview_path: Option<&Path>,
    ) -> Result<bool, RemoteServiceError>;
}
