//! Maya adapter.
//!
//! Imports run in one of two modes, chosen by the instancing preference:
//! references (instanced, re-targetable) or flattened imports (grouped
//! copies). A previously imported asset that is currently selected gets
//! updated in place; switching modes on the same live object is rejected.

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

const BASE_FORMATS: [FileType; 2] = [FileType::MayaAscii, FileType::MayaBinary];

/// Alembic caches carry baked animation; everything else is treated as a
/// static placement.
fn is_static(file_type: FileType) -> bool {
    !matches!(file_type, FileType::Alembic)
}

pub struct Maya {
    session: Option<Box<dyn HostSession>>,
    state: AdapterState,
    formats: Vec<FileType>,
    use_instances: bool,
    markers: MarkerTable,
}

impl Maya {
    /// `session == None` means the Maya runtime could not be reached; the
    /// adapter is constructed inert and every scene call fails fast.
    pub fn new(session: Option<Box<dyn HostSession>>, use_instances: bool) -> Self {
        let state = if session.is_some() {
            AdapterState::Uninitialized
        } else {
            tracing::warn!("Maya runtime unavailable, adapter is inert");
            AdapterState::Inactive
        };
        Self {
            session,
            state,
            formats: BASE_FORMATS.to_vec(),
            use_instances,
            markers: MarkerTable::new(),
        }
    }

    pub fn set_use_instances(&mut self, use_instances: bool) {
        self.use_instances = use_instances;
    }

    pub fn markers(&self) -> &MarkerTable {
        &self.markers
    }
}

impl HostIntegration for Maya {
    fn kind(&self) -> HostKind {
        HostKind::Maya
    }

    fn state(&self) -> AdapterState {
        self.state
    }

    fn default_format(&self) -> FileType {
        FileType::MayaAscii
    }

    fn available_formats(&self) -> &[FileType] {
        &self.formats
    }

    fn supports_instances(&self) -> bool {
        true
    }

    fn supports_screenshots(&self) -> bool {
        true
    }

    fn initialize_formats(&mut self, plugins: &[PluginSpec]) {
        let Some(session) = self.session.as_deref_mut() else {
            tracing::warn!("Maya unavailable, keeping base format set");
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
                // Partial success is expected: a missing plugin only
                // shrinks the format set.
                tracing::warn!("Maya plugin '{}' failed to load", spec.name);
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
        };
        let artifact = &version.output_path;
        if !artifact.is_file() {
            return Err(IntegrationError::NotFound(artifact.clone()));
        }
        if !self.formats.contains(&version.file_type) {
            return Err(IntegrationError::UnsupportedFormat(version.file_type));
        }

        let desired = if self.use_instances {
            ImportMode::Reference
        } else {
            ImportMode::Flattened
        };

        // Update in place when a compatible import of the same asset is
        // selected.
        let selection = session.selection();
        if let Some(selected) = selection.first() {
            if let Some(entry) = self.markers.get_mut(selected) {
                if entry.markers.asset_id == asset.id {
                    if entry.mode != desired {
                        return Err(IntegrationError::MixedImportModes(asset.id));
                    }
                    match desired {
                        ImportMode::Reference => {
                            session.retarget_reference(selected, artifact)?;
                        }
                        ImportMode::Flattened => {
                            session.delete_children(selected)?;
                            session.import_under(artifact, selected)?;
                        }
                    }
                    entry.markers.version_id = version.id;
                    entry.markers.is_static = is_static(version.file_type);
                    entry.source_path = artifact.clone();
                    self.state = AdapterState::Active;
                    return Ok(Outcome::Done);
                }
            }
        }

        let object = match desired {
            ImportMode::Reference => session.create_reference(artifact, &asset.name)?,
            ImportMode::Flattened => session.import_file(artifact, &asset.name)?,
        };
        self.markers.tag(
            object,
            MarkerEntry {
                markers: AssetMarkers::new(asset.id, version.id, is_static(version.file_type)),
                mode: desired,
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
        }
        if !version.output_path.is_file() {
            return Err(IntegrationError::NotFound(version.output_path.clone()));
        }
        if version.file_type == FileType::Assembly {
            let path = version.output_path.clone();
            return self.build_shot(&path);
        }
        if !version.file_type.is_native_scene() {
            return Err(IntegrationError::UnsupportedFormat(version.file_type));
        }
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
        };
        tracing::info!("Opening shot '{}' scene {}", shot.name, version.output_path.display());
        session.open_scene(&version.output_path)?;
        // Full scene replace invalidates every marker.
        self.markers = MarkerTable::new();
        self.state = AdapterState::Active;
        Ok(Outcome::Done)
    }

    fn build_shot(&mut self, path: &Path) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
        };
        if !path.is_file() {
            return Err(IntegrationError::NotFound(path.to_path_buf()));
        }
        let assembly = ShotAssembly::read(path)?;
        let mode = if self.use_instances {
            ImportMode::Reference
        } else {
            ImportMode::Flattened
        };
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
            let object = match mode {
                ImportMode::Reference => session.create_reference(&item.source_path, &group)?,
                ImportMode::Flattened => session.import_file(&item.source_path, &group)?,
            };
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
                    mode,
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
        };
        capture_playblast(session, start_frame, end_frame, path)
    }

    fn open_file(&mut self, version: &Version) -> Result<Outcome, IntegrationError> {
        let Some(session) = self.session.as_deref_mut() else {
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
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
            return Err(IntegrationError::HostUnavailable(HostKind::Maya));
        };
        extract_tagged(session, &self.markers)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, path::PathBuf, rc::Rc};

    use models::{EntityDetail, Revision};
    use uuid::Uuid;

    use crate::session::MemorySession;

    use super::*;

    fn adapter_with_session(
        use_instances: bool,
    ) -> (Maya, Rc<RefCell<MemorySession>>) {
        let session = Rc::new(RefCell::new(MemorySession::with_plugins(["AbcImport"])));
        let mut maya = Maya::new(Some(Box::new(session.clone())), use_instances);
        maya.initialize_formats(&[
            PluginSpec::new("AbcImport", vec![FileType::Alembic]),
            PluginSpec::new("objExport", vec![FileType::Obj]),
        ]);
        (maya, session)
    }

    fn asset() -> Entity {
        Entity::new(Uuid::new_v4(), "Hero", EntityDetail::Asset)
    }

    fn abc_version(dir: &Path, name: &str) -> Version {
        let output = dir.join(name);
        std::fs::write(&output, b"abc").unwrap();
        Version::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            output.clone(),
            output,
            Revision(1),
            None,
        )
    }

    #[test]
    fn inert_adapter_fails_fast() {
        let mut maya = Maya::new(None, true);
        assert_eq!(maya.state(), AdapterState::Inactive);

        let tmp = tempfile::tempdir().unwrap();
        let version = abc_version(tmp.path(), "hero.abc");
        assert!(matches!(
            maya.load_asset(&asset(), &version),
            Err(IntegrationError::HostUnavailable(HostKind::Maya))
        ));
        assert!(matches!(
            maya.take_playblast(-1, -1, &tmp.path().join("still.png")),
            Err(IntegrationError::HostUnavailable(HostKind::Maya))
        ));
    }

    #[test]
    fn inert_adapter_reports_unavailable_before_artifact_checks() {
        let tmp = tempfile::tempdir().unwrap();
        let mut maya = Maya::new(None, true);
        let shot = Entity::new(
            Uuid::new_v4(),
            "sh010",
            EntityDetail::Shot { frame_count: 48, assigned_asset_ids: vec![] },
        );
        // Missing artifact and foreign format both stay hidden behind the
        // availability failure.
        let missing = Version::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            PathBuf::from("w.ma"),
            tmp.path().join("gone.ma"),
            Revision(1),
            None,
        );
        assert!(matches!(
            maya.load_shot(&shot, &missing),
            Err(IntegrationError::HostUnavailable(HostKind::Maya))
        ));

        let foreign = abc_version(tmp.path(), "sh010.gproject");
        assert!(matches!(
            maya.load_shot(&shot, &foreign),
            Err(IntegrationError::HostUnavailable(HostKind::Maya))
        ));
    }

    #[test]
    fn plugin_failures_shrink_the_format_set() {
        let (maya, _session) = adapter_with_session(true);
        assert_eq!(maya.state(), AdapterState::FormatsInitialized);
        assert!(maya.available_formats().contains(&FileType::Alembic));
        assert!(!maya.available_formats().contains(&FileType::Obj));
    }

    #[test]
    fn load_asset_tags_markers_on_fresh_import() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(false);
        let hero = asset();
        let version = abc_version(tmp.path(), "hero.abc");

        assert_eq!(maya.load_asset(&hero, &version).unwrap(), Outcome::Done);
        assert_eq!(maya.state(), AdapterState::Active);

        let (object, entry) = maya.markers().iter().next().map(|(o, e)| (o.clone(), e.clone())).unwrap();
        assert!(session.borrow().object_exists(&object));
        assert_eq!(entry.markers.asset_id, hero.id);
        assert_eq!(entry.markers.version_id, version.id);
        assert!(entry.markers.is_asset);
        assert!(entry.markers.shader_id.is_none());
        assert_eq!(entry.mode, ImportMode::Flattened);
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, _session) = adapter_with_session(false);
        let version = Version::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            PathBuf::from("w.abc"),
            tmp.path().join("gone.abc"),
            Revision(1),
            None,
        );
        assert!(matches!(
            maya.load_asset(&asset(), &version),
            Err(IntegrationError::NotFound(_))
        ));
    }

    #[test]
    fn selected_reference_is_retargeted_in_place() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(true);
        let hero = asset();

        let v1 = abc_version(tmp.path(), "hero_v1.abc");
        maya.load_asset(&hero, &v1).unwrap();
        let object = maya.markers().iter().next().map(|(o, _)| o.clone()).unwrap();

        session.borrow_mut().select(&[object.clone()]);
        let v2 = abc_version(tmp.path(), "hero_v2.abc");
        maya.load_asset(&hero, &v2).unwrap();

        // Same object, new source and version marker; no second import.
        assert_eq!(maya.markers().iter().count(), 1);
        assert_eq!(maya.markers().get(&object).unwrap().markers.version_id, v2.id);
        assert_eq!(
            session.borrow().reference_source(&object),
            Some(v2.output_path.as_path())
        );
    }

    #[test]
    fn mixing_import_modes_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(true);
        let hero = asset();

        let v1 = abc_version(tmp.path(), "hero_v1.abc");
        maya.load_asset(&hero, &v1).unwrap();
        let object = maya.markers().iter().next().map(|(o, _)| o.clone()).unwrap();
        session.borrow_mut().select(&[object]);

        // Artist flips the instancing preference, then updates the same
        // selected import.
        maya.set_use_instances(false);
        let v2 = abc_version(tmp.path(), "hero_v2.abc");
        let err = maya.load_asset(&hero, &v2).unwrap_err();
        assert!(matches!(err, IntegrationError::MixedImportModes(id) if id == hero.id));
        // Nothing was imported.
        assert_eq!(maya.markers().iter().count(), 1);
    }

    #[test]
    fn flattened_update_reimports_children() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(false);
        let hero = asset();

        let v1 = abc_version(tmp.path(), "hero_v1.abc");
        maya.load_asset(&hero, &v1).unwrap();
        let object = maya.markers().iter().next().map(|(o, _)| o.clone()).unwrap();
        session.borrow_mut().select(&[object.clone()]);

        let v2 = abc_version(tmp.path(), "hero_v2.abc");
        maya.load_asset(&hero, &v2).unwrap();

        let children = session.borrow().children_of(&object);
        assert_eq!(children.len(), 1);
        assert_eq!(maya.markers().get(&object).unwrap().source_path, v2.output_path);
    }

    #[test]
    fn export_selection_guards_existing_target_and_empty_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(false);
        let hero = asset();
        maya.load_asset(&hero, &abc_version(tmp.path(), "hero.abc")).unwrap();

        let target = tmp.path().join("export.abc");
        std::fs::write(&target, b"old").unwrap();
        let object = maya.markers().iter().next().map(|(o, _)| o.clone()).unwrap();
        session.borrow_mut().select(&[object]);

        let err = maya.export_selection(&tmp.path().join("export"), "abc").unwrap_err();
        assert!(matches!(err, IntegrationError::TargetExists(_)));
        assert_eq!(std::fs::read(&target).unwrap(), b"old");

        session.borrow_mut().select(&[]);
        let err = maya
            .export_selection(&tmp.path().join("export2"), "abc")
            .unwrap_err();
        assert!(matches!(err, IntegrationError::NothingSelected));
    }

    #[test]
    fn playblast_still_and_range() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(true);
        session.borrow_mut().set_current_frame(1042);

        let still = tmp.path().join("still.png");
        maya.take_playblast(-1, -1, &still).unwrap();
        assert_eq!(std::fs::read_to_string(&still).unwrap(), "still:1042");

        let fixed = tmp.path().join("fixed.png");
        maya.take_playblast(1010, 1010, &fixed).unwrap();
        assert_eq!(std::fs::read_to_string(&fixed).unwrap(), "still:1010");

        let range = tmp.path().join("range.mov");
        maya.take_playblast(1001, 1100, &range).unwrap();
        assert_eq!(std::fs::read_to_string(&range).unwrap(), "range:1001-1100");
    }

    #[test]
    fn setup_shot_pushes_timeline_and_render_settings() {
        let (mut maya, session) = adapter_with_session(true);
        let mut project = Project::new(Uuid::new_v4(), "show01");
        project.start_frame = 1001;
        project.pre_roll = 24;
        project.post_roll = 24;
        project.resolution = "2048x858".to_string();

        let category = Category::new(Uuid::new_v4(), "seq010", models::EntityKind::Shot);
        let shot = Entity::new(
            Uuid::new_v4(),
            "sh010",
            EntityDetail::Shot { frame_count: 96, assigned_asset_ids: vec![] },
        );

        assert_eq!(maya.setup_shot(&project, &category, &shot).unwrap(), Outcome::Done);

        let session = session.borrow();
        assert_eq!(session.frame_range(), Some((1001, 1145)));
        let render = session.render_settings().unwrap();
        assert_eq!((render.width, render.height), (2048, 858));
        assert_eq!(render.frame_padding, 4);
        assert_eq!(render.output_name, "seq010_sh010");
    }

    #[test]
    fn setup_shot_rejects_assets() {
        let (mut maya, _session) = adapter_with_session(true);
        let project = Project::new(Uuid::new_v4(), "show01");
        let category = Category::new(Uuid::new_v4(), "Characters", models::EntityKind::Asset);
        let err = maya.setup_shot(&project, &category, &asset()).unwrap_err();
        assert!(matches!(err, IntegrationError::Validation(_)));
    }

    #[test]
    fn assembly_round_trip_through_extract_and_build() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(false);
        let hero = asset();
        let version = abc_version(tmp.path(), "hero.abc");
        maya.load_asset(&hero, &version).unwrap();

        let object = maya.markers().iter().next().map(|(o, _)| o.clone()).unwrap();
        let mut placed = crate::session::IDENTITY;
        placed[3] = 12.5;
        session
            .borrow_mut()
            .set_world_transform(&object, placed)
            .unwrap();

        let extracted = maya.extract_assets().unwrap();
        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].asset_id, hero.id);
        assert_eq!(extracted[0].transform[3], 12.5);

        // Serialize, then rebuild in a fresh adapter.
        let assembly = ShotAssembly {
            items: extracted
                .into_iter()
                .map(|e| crate::assembly::AssemblyItem {
                    asset_id: e.asset_id,
                    version_id: e.version_id,
                    is_static: e.is_static,
                    source_path: e.source_path,
                    transform: e.transform,
                })
                .collect(),
        };
        let assembly_path = tmp.path().join("sh010.hshot");
        assembly.write(&assembly_path).unwrap();

        let (mut fresh, fresh_session) = adapter_with_session(false);
        assert_eq!(fresh.build_shot(&assembly_path).unwrap(), Outcome::Done);
        let rebuilt = fresh.extract_assets().unwrap();
        assert_eq!(rebuilt.len(), 1);
        assert_eq!(rebuilt[0].asset_id, hero.id);
        assert_eq!(rebuilt[0].transform[3], 12.5);
        assert!(fresh_session.borrow().object_count() > 0);
    }

    #[test]
    fn build_shot_missing_assembly_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, _session) = adapter_with_session(false);
        let err = maya.build_shot(&tmp.path().join("gone.hshot")).unwrap_err();
        assert!(matches!(err, IntegrationError::NotFound(_)));
    }

    #[test]
    fn assign_shader_needs_a_tagged_selection() {
        let tmp = tempfile::tempdir().unwrap();
        let (mut maya, session) = adapter_with_session(false);
        let shader_version = abc_version(tmp.path(), "shader.ma");

        assert!(!maya.assign_shader_to_selected(&shader_version).unwrap());

        let hero = asset();
        maya.load_asset(&hero, &abc_version(tmp.path(), "hero.abc")).unwrap();
        let object = maya.markers().iter().next().map(|(o, _)| o.clone()).unwrap();
        session.borrow_mut().select(&[object.clone()]);

        assert!(maya.assign_shader_to_selected(&shader_version).unwrap());
        assert_eq!(
            maya.markers().get(&object).unwrap().markers.shader_id,
            Some(shader_version.id)
        );

        // Untagged selection reports false.
        session.borrow_mut().select(&["free_floating".to_string()]);
        assert!(!maya.assign_shader_to_selected(&shader_version).unwrap());
    }
}
