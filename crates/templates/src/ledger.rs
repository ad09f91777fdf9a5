//! Per-entity version bookkeeping.
//!
//! Revisions are strictly increasing per (entity, task). Publishing the same
//! revision twice is rejected here even though some legacy flows allowed it.

use models::{Entity, Revision, Task, ValidationError, Version};

/// Next revision for `task` on `entity`: max matching revision + 1, or 1
/// when the entity has no version for that task yet.
pub fn next_revision(entity: &Entity, task: &Task) -> Revision {
    let max = entity
        .versions_for_task(task.id)
        .map(|v| v.revision.0)
        .max();
    match max {
        Some(n) => Revision(n + 1),
        None => Revision(1),
    }
}

/// Appends `version` to the entity's ledger, rejecting duplicates of the
/// same (task, revision) pair.
pub fn add_version(entity: &mut Entity, version: Version) -> Result<(), ValidationError> {
    if !version.revision.is_set() {
        return Err(ValidationError::UnsetRevision);
    }
    let duplicate = entity
        .versions_for_task(version.task_id)
        .any(|v| v.revision == version.revision);
    if duplicate {
        return Err(ValidationError::DuplicateVersion {
            task_id: version.task_id,
            revision: version.revision.0,
        });
    }
    entity.versions.push(version);
    Ok(())
}
