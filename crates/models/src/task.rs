use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::EntityKind;

/// A work discipline applied to an entity (modeling, rigging, animation...).
/// Value-like and immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub kind: EntityKind,
}

impl Task {
    pub fn new(id: Uuid, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }
}
