//! The publish workflow: resolve, copy, register, record.
//!
//! The tracker is asked before the ledger is touched. A refused or failed
//! registration leaves the entity's version list unchanged; the copied files
//! stay on disk and are overwritten by the retry's re-resolved revision.

use std::path::{Path, PathBuf};

use models::{Project, Revision, ValidationError, Version};
use templates::{ledger, resolver, ConfigError};
use thiserror::Error;
use uuid::Uuid;

use crate::services::link::{PublishMetadata, RemoteServiceError, ServiceLink};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Unknown category: {0}")]
    UnknownCategory(Uuid),
    #[error("Unknown entity: {0}")]
    UnknownEntity(Uuid),
    #[error("Unknown task: {0}")]
    UnknownTask(Uuid),
    #[error("The tracker refused the publish")]
    Rejected,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Fs(#[from] utils::fs::FsError),
    #[error(transparent)]
    Remote(#[from] RemoteServiceError),
}

/// What to publish and where it comes from. The revision is never part of
/// the request; it is always the ledger's next one.
#[derive(Debug, Clone)]
pub struct PublishRequest<'a> {
    pub category_id: Uuid,
    pub entity_id: Uuid,
    pub task_id: Uuid,
    pub working_file: &'a Path,
    pub comment: &'a str,
    pub preview: Option<&'a Path>,
}

fn with_working_extension(name: String, working_file: &Path) -> String {
    match working_file.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{name}.{ext}"),
        None => name,
    }
}

/// Publishes one working file as the next revision of (entity, task).
///
/// Steps: resolve the working and output locations for the next revision,
/// copy the file into both, register with the tracker, then append to the
/// entity's ledger. Any failure before the last step leaves the ledger
/// untouched.
pub fn publish_version(
    link: &mut dyn ServiceLink,
    project: &mut Project,
    request: &PublishRequest<'_>,
) -> Result<Version, PublishError> {
    let category = project
        .categories
        .iter()
        .find(|c| c.id == request.category_id)
        .ok_or(PublishError::UnknownCategory(request.category_id))?;
    let entity = category
        .entity_by_id(request.entity_id)
        .ok_or(PublishError::UnknownEntity(request.entity_id))?;
    let task = project
        .tasks
        .iter()
        .find(|t| t.id == request.task_id)
        .ok_or(PublishError::UnknownTask(request.task_id))?;

    let revision = ledger::next_revision(entity, task);
    tracing::info!(
        "Publishing {}/{} {} as {}",
        category.name,
        entity.name,
        task.name,
        revision
    );

    let working_dir =
        resolver::resolve_path(project, category, entity, task, revision, true, false)?;
    let output_dir =
        resolver::resolve_path(project, category, entity, task, revision, false, true)?;
    let working_name = with_working_extension(
        resolver::resolve_filename(project, category, entity, task, revision, true, false)?,
        request.working_file,
    );
    let output_name = with_working_extension(
        resolver::resolve_filename(project, category, entity, task, revision, false, true)?,
        request.working_file,
    );

    let working_path = utils::fs::copy_into(request.working_file, &working_dir, &working_name)?;
    let output_path = utils::fs::copy_into(request.working_file, &output_dir, &output_name)?;

    let version = Version::new(
        Uuid::new_v4(),
        task.id,
        working_path.clone(),
        output_path.clone(),
        revision,
        None,
    );

    let metadata = PublishMetadata {
        comment: request.comment,
        task_name: &task.name,
        revision: revision.0,
    };
    let outputs: Vec<PathBuf> = vec![output_path];
    let accepted = link.publish(entity, &metadata, &working_path, &outputs, request.preview)?;
    if !accepted {
        tracing::warn!("Tracker refused publish of {} {}", entity.name, revision);
        return Err(PublishError::Rejected);
    }

    let entity = project
        .categories
        .iter_mut()
        .find(|c| c.id == request.category_id)
        .and_then(|c| c.entity_by_id_mut(request.entity_id))
        .ok_or(PublishError::UnknownEntity(request.entity_id))?;
    ledger::add_version(entity, version.clone())?;
    Ok(version)
}

/// Next revision the publish would get, for display before committing.
pub fn pending_revision(
    project: &Project,
    category_id: Uuid,
    entity_id: Uuid,
    task_id: Uuid,
) -> Option<Revision> {
    let category = project.categories.iter().find(|c| c.id == category_id)?;
    let entity = category.entity_by_id(entity_id)?;
    let task = project.tasks.iter().find(|t| t.id == task_id)?;
    Some(ledger::next_revision(entity, task))
}
