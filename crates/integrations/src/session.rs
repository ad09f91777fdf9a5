//! The seam between adapters and a live host runtime.
//!
//! `HostSession` is the set of primitive scene calls an adapter needs; the
//! adapters own all protocol logic (tagging, update-in-place, timelines) and
//! only reach the host through this trait. `MemorySession` is the in-process
//! implementation used by tests and by the standalone tooling.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Host-side node identifier (a DAG path or node name).
pub type ObjectId = String;

/// Identity transform, row-major 4x4.
pub const IDENTITY: [f64; 16] = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Object '{0}' does not exist in the scene")]
    MissingObject(String),
    #[error("Object '{0}' is not a reference")]
    NotAReference(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Host call failed: {0}")]
    HostCall(String),
}

/// Render configuration pushed to the host by shot setup.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Digit count of the final frame number.
    pub frame_padding: u32,
    pub output_name: String,
}

pub trait HostSession {
    /// Replaces the current scene with the file at `path`.
    fn open_scene(&mut self, path: &Path) -> Result<(), SessionError>;

    /// Flattened import: file content grouped under a new node. Returns the
    /// group's id.
    fn import_file(&mut self, path: &Path, group: &str) -> Result<ObjectId, SessionError>;

    /// Imports file content under an existing node.
    fn import_under(&mut self, path: &Path, parent: &str) -> Result<(), SessionError>;

    /// Creates a file reference node pointing at `path`.
    fn create_reference(&mut self, path: &Path, namespace: &str)
        -> Result<ObjectId, SessionError>;

    /// Points an existing reference node at a different file.
    fn retarget_reference(&mut self, object: &str, path: &Path) -> Result<(), SessionError>;

    fn delete_children(&mut self, object: &str) -> Result<(), SessionError>;

    fn object_exists(&self, object: &str) -> bool;

    fn selection(&self) -> Vec<ObjectId>;

    fn select(&mut self, objects: &[ObjectId]);

    fn world_transform(&self, object: &str) -> Result<[f64; 16], SessionError>;

    fn set_world_transform(&mut self, object: &str, transform: [f64; 16])
        -> Result<(), SessionError>;

    /// Path of the currently open scene, if it has one.
    fn scene_path(&self) -> Option<PathBuf>;

    fn save_scene(&mut self, path: &Path) -> Result<(), SessionError>;

    fn export_selection(&mut self, path: &Path) -> Result<(), SessionError>;

    /// Attempts to load a host plugin. `false` means unavailable, which the
    /// caller treats as a smaller format set, never a failure.
    fn load_plugin(&mut self, name: &str) -> bool;

    fn configure_render(&mut self, settings: &RenderSettings) -> Result<(), SessionError>;

    fn set_frame_range(&mut self, start: i32, end: i32) -> Result<(), SessionError>;

    fn current_frame(&self) -> i32;

    /// Captures a single frame to `path`. `None` captures the current frame.
    fn capture_still(
        &mut self,
        frame: Option<i32>,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), SessionError>;

    /// Captures `start..=end` as a sequence/movie at `path`.
    fn capture_range(
        &mut self,
        start: i32,
        end: i32,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), SessionError>;
}

/// Shared-handle delegation: the GUI thread owns the session while an
/// adapter drives it. Everything here is single-threaded by design.
impl<S: HostSession> HostSession for std::rc::Rc<std::cell::RefCell<S>> {
    fn open_scene(&mut self, path: &Path) -> Result<(), SessionError> {
        self.borrow_mut().open_scene(path)
    }

    fn import_file(&mut self, path: &Path, group: &str) -> Result<ObjectId, SessionError> {
        self.borrow_mut().import_file(path, group)
    }

    fn import_under(&mut self, path: &Path, parent: &str) -> Result<(), SessionError> {
        self.borrow_mut().import_under(path, parent)
    }

    fn create_reference(
        &mut self,
        path: &Path,
        namespace: &str,
    ) -> Result<ObjectId, SessionError> {
        self.borrow_mut().create_reference(path, namespace)
    }

    fn retarget_reference(&mut self, object: &str, path: &Path) -> Result<(), SessionError> {
        self.borrow_mut().retarget_reference(object, path)
    }

    fn delete_children(&mut self, object: &str) -> Result<(), SessionError> {
        self.borrow_mut().delete_children(object)
    }

    fn object_exists(&self, object: &str) -> bool {
        self.borrow().object_exists(object)
    }

    fn selection(&self) -> Vec<ObjectId> {
        self.borrow().selection()
    }

    fn select(&mut self, objects: &[ObjectId]) {
        self.borrow_mut().select(objects);
    }

    fn world_transform(&self, object: &str) -> Result<[f64; 16], SessionError> {
        self.borrow().world_transform(object)
    }

    fn set_world_transform(
        &mut self,
        object: &str,
        transform: [f64; 16],
    ) -> Result<(), SessionError> {
        self.borrow_mut().set_world_transform(object, transform)
    }

    fn scene_path(&self) -> Option<PathBuf> {
        self.borrow().scene_path()
    }

    fn save_scene(&mut self, path: &Path) -> Result<(), SessionError> {
        self.borrow_mut().save_scene(path)
    }

    fn export_selection(&mut self, path: &Path) -> Result<(), SessionError> {
        self.borrow_mut().export_selection(path)
    }

    fn load_plugin(&mut self, name: &str) -> bool {
        self.borrow_mut().load_plugin(name)
    }

    fn configure_render(&mut self, settings: &RenderSettings) -> Result<(), SessionError> {
        self.borrow_mut().configure_render(settings)
    }

    fn set_frame_range(&mut self, start: i32, end: i32) -> Result<(), SessionError> {
        self.borrow_mut().set_frame_range(start, end)
    }

    fn current_frame(&self) -> i32 {
        self.borrow().current_frame()
    }

    fn capture_still(
        &mut self,
        frame: Option<i32>,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), SessionError> {
        self.borrow_mut().capture_still(frame, path, width, height)
    }

    fn capture_range(
        &mut self,
        start: i32,
        end: i32,
        path: &Path,
        width: u32,
        height: u32,
    ) -> Result<(), SessionError> {
        self.borrow_mut().capture_range(start, end, path, width, height)
    }
}

#[derive(Debug, Clone, Default)]
struct SceneObject {
    parent: Option<ObjectId>,
    transform: [f64; 16],
    source: Option<PathBuf>,
    is_reference: bool,
}

impl SceneObject {
    fn new(parent: Option<ObjectId>, source: Option<PathBuf>, is_reference: bool) -> Self {
        Self {
            parent,
            transform: IDENTITY,
            source,
            is_reference,
        }
    }
}

/// In-memory scene graph implementing `HostSession`.
#[derive(Default)]
pub struct MemorySession {
    objects: BTreeMap<ObjectId, SceneObject>,
    selection: Vec<ObjectId>,
    scene_path: Option<PathBuf>,
    loadable_plugins: BTreeSet<String>,
    render: Option<RenderSettings>,
    frame_range: Option<(i32, i32)>,
    current_frame: i32,
    counter: u64,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session whose `load_plugin` succeeds only for the given names.
    pub fn with_plugins<I: IntoIterator<Item = S>, S: Into<String>>(plugins: I) -> Self {
        Self {
            loadable_plugins: plugins.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn set_current_frame(&mut self, frame: i32) {
        self.current_frame = frame;
    }

    pub fn render_settings(&self) -> Option<&RenderSettings> {
        self.render.as_ref()
    }

    pub fn frame_range(&self) -> Option<(i32, i32)> {
        self.frame_range
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn children_of(&self, parent: &str) -> Vec<ObjectId> {
        self.objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(parent))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn reference_source(&self, object: &str) -> Option<&Path> {
        let obj = self.objects.get(object)?;
        if obj.is_reference {
            obj.source.as_deref()
        } else {
            None
        }
    }

    fn next_id(&mut self, base: &str) -> ObjectId {
        self.counter += 1;
        format!("{base}#{}", self.counter)
    }

    fn require(&self, object: &str) -> Result<&SceneObject, SessionError> {
        self.objects
            .get(object)
            .ok_or_else(|| SessionError::MissingObject(object.to_string()))
    }
}

impl HostSession for MemorySession {
    fn open_scene(&mut self, path: &Path) -> Result<(), SessionError> {
        if !path.is_file() {
            return Err(SessionError::HostCall(format!(
                "cannot open missing scene {}",
                path.display()
            )));
        }
        self.objects.clear();
        self.selection.clear();
        self.scene_path = Some(path.to_path_buf());
        Ok(())
    }

    fn import_file(&mut self, path: &Path, group: &str) -> Result<ObjectId, SessionError> {
        let group_id = self.next_id(group);
        self.objects
            .insert(group_id.clone(), SceneObject::new(None, Some(path.to_path_buf()), false));
        let child = self.next_id(&format!("{group_id}|mesh"));
        self.objects
            .insert(child, SceneObject::new(Some(group_id.clone()), Some(path.to_path_buf()), false));
        Ok(group_id)
    }

    fn import_under(&mut self, path: &Path, parent: &str) -> Result<(), SessionError> {
        self.require(parent)?;
        let child = self.next_id(&format!("{parent}|mesh"));
        self.objects.insert(
            child,
            SceneObject::new(Some(parent.to_string()), Some(path.to_path_buf()), false),
        );
        if let Some(obj) = self.objects.get_mut(parent) {
            obj.source = Some(path.to_path_buf());
        }
        Ok(())
    }

    fn create_reference(
        &mut self,
        path: &Path,
        namespace: &str,
    ) -> Result<ObjectId, SessionError> {
        let id = self.next_id(namespace);
        self.objects
            .insert(id.clone(), SceneObject::new(None, Some(path.to_path_buf()), true));
        Ok(id)
    }

    fn retarget_reference(&mut self, object: &str, path: &Path) -> Result<(), SessionError> {
        let obj = self
            .objects
            .get_mut(object)
            .ok_or_else(|| SessionError::MissingObject(object.to_string()))?;
        if !obj.is_reference {
            return Err(SessionError::NotAReference(object.to_string()));
        }
        obj.source = Some(path.to_path_buf());
        Ok(())
    }

    fn delete_children(&mut self, object: &str) -> Result<(), SessionError> {
        self.require(object)?;
        self.objects
            .retain(|_, o| o.parent.as_deref() != Some(object));
        Ok(())
    }

    fn object_exists(&self, object: &str) -> bool {
        self.objects.contains_key(object)
    }

    fn selection(&self) -> Vec<ObjectId> {
        self.selection.clone()
    }

    fn select(&mut self, objects: &[ObjectId]) {
        self.selection = objects.to_vec();
    }

    fn world_transform(&self, object: &str) -> Result<[f64; 16], SessionError> {
        Ok(self.require(object)?.transform)
    }

    fn set_world_transform(
        &mut self,
        object: &str,
        transform: [f64; 16],
    ) -> Result<(), SessionError> {
        let obj = self
            .objects
            .get_mut(object)
            .ok_or_else(|| SessionError::MissingObject(object.to_string()))?;
        obj.transform = transform;
        Ok(())
    }

    fn scene_path(&self) -> Option<PathBuf> {
        self.scene_path.clone()
    }

    fn save_scene(&mut self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, b"scene")?;
        self.scene_path = Some(path.to_path_buf());
        Ok(())
    }

    fn export_selection(&mut self, path: &Path) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.selection.join("\n"))?;
        Ok(())
    }

    fn load_plugin(&mut self, name: &str) -> bool {
        self.loadable_plugins.contains(name)
    }

    fn configure_render(&mut self, settings: &RenderSettings) -> Result<(), SessionError> {
        self.render = Some(settings.clone());
        Ok(())
    }

    fn set_frame_range(&mut self, start: i32, end: i32) -> Result<(), SessionError> {
        self.frame_range = Some((start, end));
        Ok(())
    }

    fn current_frame(&self) -> i32 {
        self.current_frame
    }

    fn capture_still(
        &mut self,
        frame: Option<i32>,
        path: &Path,
        _width: u32,
        _height: u32,
    ) -> Result<(), SessionError> {
        let frame = frame.unwrap_or(self.current_frame);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, format!("still:{frame}"))?;
        Ok(())
    }

    fn capture_range(
        &mut self,
        start: i32,
        end: i32,
        path: &Path,
        _width: u32,
        _height: u32,
    ) -> Result<(), SessionError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, format!("range:{start}-{end}"))?;
        Ok(())
    }
}
