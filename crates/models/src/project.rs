use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{category::Category, entity::EntityKind, task::Task, template::PathTemplate, user::User};

/// A production tracked by the pipeline. Owns its categories (and through
/// them every entity) plus the task and team lists.
///
/// `template == None` means the project has no file tree on disk and cannot
/// resolve paths; the static local fallback is in that state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub fps: f64,
    pub ratio: String,
    pub resolution: String,
    pub start_frame: i32,
    pub pre_roll: i32,
    pub post_roll: i32,
    pub template: Option<PathTemplate>,
    pub categories: Vec<Category>,
    pub tasks: Vec<Task>,
    pub team: Vec<User>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            fps: 24.0,
            ratio: "16:9".to_string(),
            resolution: "1920x1080".to_string(),
            start_frame: 1001,
            pre_roll: 24,
            post_roll: 24,
            template: None,
            categories: Vec::new(),
            tasks: Vec::new(),
            team: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// The static offline project. Exactly one of these always exists in the
    /// manager's project list.
    pub fn local() -> Self {
        let mut project = Self::new(Uuid::nil(), "local");
        project.description = "Offline project, not synced with any tracker".to_string();
        project
    }

    pub fn supports_file_tree(&self) -> bool {
        self.template.is_some()
    }

    pub fn categories_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(move |c| c.kind() == kind)
    }

    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn task_by_name(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }
}
