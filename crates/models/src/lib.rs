pub mod category;
pub mod entity;
pub mod project;
pub mod task;
pub mod template;
pub mod user;
pub mod version;

pub use category::Category;
pub use entity::{Entity, EntityDetail, EntityKind};
pub use project::Project;
pub use task::Task;
pub use template::{ExportKind, PathTemplate};
pub use user::User;
pub use version::{FileType, Revision, Version};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("A version with revision {revision} already exists for task {task_id}")]
    DuplicateVersion { task_id: Uuid, revision: i32 },
    #[error("Revision number is unset")]
    UnsetRevision,
}
