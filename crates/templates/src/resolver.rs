//! Pure mapping from (export kind, project, category, entity, task, revision)
//! to folder paths and file names.
//!
//! No I/O happens here; callers hand the resolved paths to the filesystem
//! gateway. The legacy calling convention of two boolean flags (`working`,
//! `publish`) is kept at the public surface and checked to be exclusive.

use std::path::PathBuf;

use models::{
    Category, Entity, EntityKind, ExportKind, PathTemplate, Project, Revision, Task,
};
use utils::sanitize::sanitize_segment;

use crate::ConfigError;

/// Placeholder tokens a template may carry. All seven are substituted on
/// every resolution.
pub const TOKENS: [&str; 7] = [
    "Project",
    "AssetType",
    "Sequence",
    "Asset",
    "Shot",
    "TaskType",
    "Version",
];

fn export_kind(working: bool, publish: bool) -> Result<ExportKind, ConfigError> {
    match (working, publish) {
        (true, false) => Ok(ExportKind::Working),
        (false, true) => Ok(ExportKind::Output),
        _ => Err(ConfigError::AmbiguousExportKind),
    }
}

/// Looks up the folder-path template leg for `parent_entity` ("asset" or
/// "shot"). Anything else is a configuration error, not a panic.
pub fn folder_template<'t>(
    template: &'t PathTemplate,
    parent_entity: &str,
    working: bool,
    publish: bool,
) -> Result<&'t str, ConfigError> {
    let export = export_kind(working, publish)?;
    let kind: EntityKind = parent_entity
        .parse()
        .map_err(|_| ConfigError::UnknownEntityKind(parent_entity.to_string()))?;
    Ok(template.export(export).folder_path.for_kind(kind))
}

/// Returns the folder-path template truncated immediately after the segment
/// containing `{token}`. Used to locate the "up to {Project}" part of a tree
/// when walking existing folders on disk.
pub fn resolve_folder(
    template: &PathTemplate,
    token: &str,
    working: bool,
    publish: bool,
    kind: EntityKind,
) -> Result<String, ConfigError> {
    let export = export_kind(working, publish)?;
    let folder = template.export(export).folder_path.for_kind(kind);
    let needle = format!("{{{token}}}");

    let mut kept = Vec::new();
    for segment in folder.split('/') {
        kept.push(segment);
        if segment.contains(&needle) {
            return Ok(kept.join("/"));
        }
    }
    Err(ConfigError::TokenNotFound(token.to_string()))
}

/// Substitution context: the names a template's placeholders resolve to.
///
/// Asset-category names are lowercased before substitution — the legacy
/// backing store writes asset-type folders in lowercase, and the trees on
/// disk depend on it. Shot sequences keep their case.
struct Substitutions {
    project: String,
    asset_type: String,
    sequence: String,
    entity: String,
    task: String,
    version: String,
}

impl Substitutions {
    fn build(
        project: &Project,
        category: &Category,
        entity: &Entity,
        task: &Task,
        revision: Revision,
    ) -> Result<Self, ConfigError> {
        let version = revision.padded().ok_or(ConfigError::UnsetRevision)?;
        Ok(Self {
            project: project.name.clone(),
            asset_type: category.name.to_lowercase(),
            sequence: category.name.clone(),
            entity: entity.name.clone(),
            task: task.name.clone(),
            version,
        })
    }

    fn apply(&self, template: &str) -> Result<String, ConfigError> {
        let resolved = template
            .replace("{Project}", &self.project)
            .replace("{AssetType}", &self.asset_type)
            .replace("{Sequence}", &self.sequence)
            .replace("{Asset}", &self.entity)
            .replace("{Shot}", &self.entity)
            .replace("{TaskType}", &self.task)
            .replace("{Version}", &self.version);
        if resolved.contains('{') || resolved.contains('}') {
            return Err(ConfigError::UnresolvedPlaceholder(resolved));
        }
        Ok(sanitize_segment(&resolved))
    }
}

/// Resolves the concrete on-disk folder for the given tuple:
/// mountpoint / root / substituted folder template, sanitized.
///
/// `revision` must already be concrete — auto-increment is the ledger's job,
/// the sentinel never reaches substitution.
pub fn resolve_path(
    project: &Project,
    category: &Category,
    entity: &Entity,
    task: &Task,
    revision: Revision,
    working: bool,
    publish: bool,
) -> Result<PathBuf, ConfigError> {
    let export = export_kind(working, publish)?;
    let template = project
        .template
        .as_ref()
        .ok_or_else(|| ConfigError::NoFileTree(project.name.clone()))?;
    let leg = template.export(export);
    let subs = Substitutions::build(project, category, entity, task, revision)?;
    let folder = subs.apply(leg.folder_path.for_kind(entity.kind()))?;

    let mut path = PathBuf::from(&leg.mountpoint);
    path.push(&leg.root);
    for segment in folder.split('/') {
        path.push(segment);
    }
    tracing::debug!("Resolved {export} folder for '{}': {}", entity.name, path.display());
    Ok(path)
}

/// Resolves the file name (no directory part) for the given tuple.
pub fn resolve_filename(
    project: &Project,
    category: &Category,
    entity: &Entity,
    task: &Task,
    revision: Revision,
    working: bool,
    publish: bool,
) -> Result<String, ConfigError> {
    let export = export_kind(working, publish)?;
    let template = project
        .template
        .as_ref()
        .ok_or_else(|| ConfigError::NoFileTree(project.name.clone()))?;
    let subs = Substitutions::build(project, category, entity, task, revision)?;
    subs.apply(template.export(export).file_name.for_kind(entity.kind()))
}

#[cfg(test)]
mod tests {
    use models::{EntityDetail, PathTemplate};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    fn template() -> PathTemplate {
        PathTemplate::from_document(&json!({
            "working": {
                "mountpoint": "/proj",
                "root": "show01",
                "file_name": {
                    "asset": "<Project>_<Asset>_<TaskType>_<Version>",
                    "shot": "<Project>_<Sequence>_<Shot>_<TaskType>_<Version>"
                },
                "folder_path": {
                    "asset": "<Project>/<AssetType>/<Asset>/<TaskType>/<Version>",
                    "shot": "<Project>/<Sequence>/<Shot>/<TaskType>/<Version>"
                }
            },
            "output": {
                "mountpoint": "/proj",
                "root": "show01",
                "file_name": {
                    "asset": "<Project>_<Asset>_<TaskType>_<Version>_out",
                    "shot": "<Project>_<Sequence>_<Shot>_<TaskType>_<Version>_out"
                },
                "folder_path": {
                    "asset": "<Project>/publish/<AssetType>/<Asset>/<TaskType>/<Version>",
                    "shot": "<Project>/publish/<Sequence>/<Shot>/<TaskType>/<Version>"
                }
            }
        }))
        .unwrap()
    }

    fn fixtures() -> (Project, Category, Entity, Task) {
        let mut project = Project::new(Uuid::new_v4(), "Project Name");
        project.template = Some(template());
        let category = Category::new(Uuid::new_v4(), "Characters", EntityKind::Asset);
        let entity = Entity::new(Uuid::new_v4(), "Hero", EntityDetail::Asset);
        let task = Task::new(Uuid::new_v4(), "rig", EntityKind::Asset);
        (project, category, entity, task)
    }

    #[test]
    fn resolves_asset_folder_with_lowercased_category() {
        let (project, category, entity, task) = fixtures();
        let path = resolve_path(&project, &category, &entity, &task, Revision(3), true, false)
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/proj/show01/Project_Name/characters/Hero/rig/V003")
        );
    }

    #[test]
    fn shot_sequence_keeps_case() {
        let (mut project, _, _, _) = fixtures();
        project.name = "show".to_string();
        let category = Category::new(Uuid::new_v4(), "SEQ010", EntityKind::Shot);
        let entity = Entity::new(
            Uuid::new_v4(),
            "sh010",
            EntityDetail::Shot { frame_count: 48, assigned_asset_ids: vec![] },
        );
        let task = Task::new(Uuid::new_v4(), "anim", EntityKind::Shot);
        let path =
            resolve_path(&project, &category, &entity, &task, Revision(1), false, true).unwrap();
        assert_eq!(
            path,
            PathBuf::from("/proj/show01/show/publish/SEQ010/sh010/anim/V001")
        );
    }

    #[test]
    fn resolved_path_has_no_braces_or_specials() {
        let (mut project, category, entity, task) = fixtures();
        project.name = "My Show-'01`^\"".to_string();
        let path = resolve_path(&project, &category, &entity, &task, Revision(12), true, false)
            .unwrap();
        let rendered = path.to_string_lossy();
        for c in ['{', '}', ' ', '-', '\'', '"', '`', '^'] {
            assert!(!rendered.contains(c), "found {c:?} in {rendered}");
        }
    }

    #[test]
    fn both_or_neither_flags_fail() {
        let (project, category, entity, task) = fixtures();
        for (working, publish) in [(true, true), (false, false)] {
            let err = resolve_path(
                &project, &category, &entity, &task, Revision(1), working, publish,
            )
            .unwrap_err();
            assert!(matches!(err, ConfigError::AmbiguousExportKind));
        }
    }

    #[test]
    fn unset_revision_is_rejected_before_substitution() {
        let (project, category, entity, task) = fixtures();
        let err = resolve_path(
            &project, &category, &entity, &task, Revision::UNSET, true, false,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnsetRevision));
    }

    #[test]
    fn unknown_parent_entity_fails_lookup() {
        let t = template();
        let err = folder_template(&t, "sequence", true, false).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEntityKind(_)));
        assert!(folder_template(&t, "asset", true, false).is_ok());
    }

    #[test]
    fn resolve_folder_truncates_after_token_segment() {
        let t = template();
        let sub = resolve_folder(&t, "AssetType", true, false, EntityKind::Asset).unwrap();
        assert_eq!(sub, "{Project}/{AssetType}");

        let err = resolve_folder(&t, "Sequence", true, false, EntityKind::Asset).unwrap_err();
        assert!(matches!(err, ConfigError::TokenNotFound(_)));
    }

    #[test]
    fn resolve_folder_is_pure() {
        let t = template();
        let a = resolve_folder(&t, "Version", false, true, EntityKind::Shot).unwrap();
        let b = resolve_folder(&t, "Version", false, true, EntityKind::Shot).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_placeholder_in_substituted_template_is_reported() {
        let (mut project, category, entity, task) = fixtures();
        if let Some(t) = project.template.as_mut() {
            t.working.folder_path.asset = "{Project}/{Unknown}/{Asset}".to_string();
        }
        let err = resolve_path(&project, &category, &entity, &task, Revision(1), true, false)
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnresolvedPlaceholder(_)));
    }

    #[test]
    fn filename_substitution() {
        let (project, category, entity, task) = fixtures();
        let name =
            resolve_filename(&project, &category, &entity, &task, Revision(7), false, true)
                .unwrap();
        assert_eq!(name, "Project_Name_Hero_rig_V007_out");
    }
}
