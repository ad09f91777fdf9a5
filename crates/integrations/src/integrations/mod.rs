//! The capability contract every host adapter implements, and the adapters
//! themselves.

pub mod guerilla;
pub mod maya;
pub mod standalone;

use std::path::{Path, PathBuf};

use models::{Category, Entity, FileType, Project, Version};
use strum_macros::{Display, EnumString};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    assembly::AssemblyError,
    session::{ObjectId, SessionError},
};

pub use guerilla::Guerilla;
pub use maya::Maya;
pub use standalone::Standalone;

/// Fixed playblast capture resolution.
pub const PLAYBLAST_WIDTH: u32 = 1920;
pub const PLAYBLAST_HEIGHT: u32 = 1080;

/// Known host applications. Selection happens by name; unknown names fall
/// back to `Standalone` at the manager level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum HostKind {
    Standalone,
    Maya,
    Guerilla,
}

impl HostKind {
    /// Parses a host name, falling back to `Standalone` for anything
    /// unrecognized.
    pub fn parse_or_standalone(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown host '{name}', falling back to standalone");
            HostKind::Standalone
        })
    }
}

/// Lifecycle of an adapter instance. `Inactive` is terminal: the host
/// runtime was unavailable at construction and every scene call fails fast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    FormatsInitialized,
    Active,
    Inactive,
}

/// Result of an adapter operation that completed without error.
/// `Unsupported` is a real answer, distinct from success and from failure;
/// callers must not treat it as either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Unsupported,
}

/// A host extension module and the formats it unlocks.
#[derive(Debug, Clone)]
pub struct PluginSpec {
    pub name: String,
    pub formats: Vec<FileType>,
}

impl PluginSpec {
    pub fn new(name: impl Into<String>, formats: Vec<FileType>) -> Self {
        Self {
            name: name.into(),
            formats,
        }
    }
}

/// A tagged scene object reported by `extract_assets`.
#[derive(Debug, Clone)]
pub struct ExtractedAsset {
    pub object: ObjectId,
    pub asset_id: Uuid,
    pub version_id: Uuid,
    pub is_static: bool,
    pub source_path: PathBuf,
    pub transform: [f64; 16],
}

#[derive(Debug, Error)]
pub enum IntegrationError {
    #[error("Host runtime for {0} is not available")]
    HostUnavailable(HostKind),
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Target path already exists: {0}")]
    TargetExists(PathBuf),
    #[error("Nothing is selected in the scene")]
    NothingSelected,
    #[error("Asset {0} is already in the scene with a different import mode")]
    MixedImportModes(Uuid),
    #[error("Format '{0}' is not available in this host")]
    UnsupportedFormat(FileType),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
    #[error(transparent)]
    Fs(#[from] utils::fs::FsError),
}

/// Four-region frame layout of a shot: pre-roll, animation, post-roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTimeline {
    pub start: i32,
    pub pre_roll_end: i32,
    pub animation_end: i32,
    pub end: i32,
}

impl FrameTimeline {
    pub fn for_shot(project: &Project, frame_count: i32) -> Self {
        let start = project.start_frame;
        let pre_roll_end = start + project.pre_roll;
        let animation_end = pre_roll_end + frame_count;
        let end = animation_end + project.post_roll;
        Self {
            start,
            pre_roll_end,
            animation_end,
            end,
        }
    }

    /// Digit count of the final frame number, used as frame padding.
    pub fn padding(&self) -> u32 {
        let mut n = self.end.max(1);
        let mut digits = 0;
        while n > 0 {
            digits += 1;
            n /= 10;
        }
        digits
    }
}

/// Parses a `WIDTHxHEIGHT` resolution string.
pub(crate) fn parse_resolution(raw: &str) -> Option<(u32, u32)> {
    let (w, h) = raw.split_once('x')?;
    Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
}

/// Reads every tagged object back out of the scene. Objects deleted since
/// import are skipped; their markers are stale, not an error.
pub(crate) fn extract_tagged(
    session: &dyn crate::session::HostSession,
    markers: &crate::markers::MarkerTable,
) -> Result<Vec<ExtractedAsset>, IntegrationError> {
    let mut extracted = Vec::new();
    for (object, entry) in markers.iter() {
        if !session.object_exists(object) {
            tracing::debug!("Tagged object '{object}' no longer in scene, skipping");
            continue;
        }
        let transform = session.world_transform(object)?;
        extracted.push(ExtractedAsset {
            object: object.clone(),
            asset_id: entry.markers.asset_id,
            version_id: entry.markers.version_id,
            is_static: entry.markers.is_static,
            source_path: entry.source_path.clone(),
            transform,
        });
    }
    Ok(extracted)
}

/// Shared playblast protocol: still frame when `start == end` (current
/// frame for `-1`), otherwise a range capture. Fixed 1920x1080.
pub(crate) fn capture_playblast(
    session: &mut dyn crate::session::HostSession,
    start_frame: i32,
    end_frame: i32,
    path: &Path,
) -> Result<Outcome, IntegrationError> {
    if start_frame == end_frame {
        let frame = if start_frame == -1 { None } else { Some(start_frame) };
        session.capture_still(frame, path, PLAYBLAST_WIDTH, PLAYBLAST_HEIGHT)?;
    } else {
        session.capture_range(start_frame, end_frame, path, PLAYBLAST_WIDTH, PLAYBLAST_HEIGHT)?;
    }
    Ok(Outcome::Done)
}

/// Shared shot setup: four-region timeline plus render configuration.
/// Warns, without failing, when the open scene does not live under the
/// project's folder layout.
pub(crate) fn apply_shot_setup(
    session: &mut dyn crate::session::HostSession,
    project: &Project,
    category: &Category,
    shot: &Entity,
) -> Result<Outcome, IntegrationError> {
    let frame_count = shot.frame_count().ok_or_else(|| {
        IntegrationError::Validation(format!("'{}' is not a shot", shot.name))
    })?;
    let timeline = FrameTimeline::for_shot(project, frame_count);

    let project_segment = utils::sanitize::sanitize_segment(&project.name);
    match session.scene_path() {
        Some(scene) if scene.to_string_lossy().contains(&project_segment) => {}
        Some(scene) => tracing::warn!(
            "Scene {} does not appear to live in the '{}' project tree",
            scene.display(),
            project.name
        ),
        None => tracing::warn!("Current scene is unsaved, cannot check project layout"),
    }

    let (width, height) = parse_resolution(&project.resolution).unwrap_or_else(|| {
        tracing::warn!(
            "Project '{}' has unparsable resolution '{}', using 1920x1080",
            project.name,
            project.resolution
        );
        (1920, 1080)
    });

    session.set_frame_range(timeline.start, timeline.end)?;
    session.configure_render(&crate::session::RenderSettings {
        width,
        height,
        frame_padding: timeline.padding(),
        output_name: format!("{}_{}", category.name, shot.name),
    })?;
    Ok(Outcome::Done)
}

/// The operations every host adapter supports. Adapters that cannot perform
/// an operation answer `Outcome::Unsupported` — never a silent no-op.
pub trait HostIntegration {
    fn kind(&self) -> HostKind;

    fn state(&self) -> AdapterState;

    fn default_format(&self) -> FileType;

    fn available_formats(&self) -> &[FileType];

    fn supports_instances(&self) -> bool;

    fn supports_screenshots(&self) -> bool;

    /// Attempts to load host plugins. Every failure is non-fatal and only
    /// shrinks the available-format set.
    fn initialize_formats(&mut self, plugins: &[PluginSpec]);

    /// Inserts the version's published content into the live scene and tags
    /// it with asset markers.
    fn load_asset(&mut self, asset: &Entity, version: &Version)
        -> Result<Outcome, IntegrationError>;

    /// Opens a shot: native scene formats replace the scene, assembly
    /// documents are delegated to `build_shot`.
    fn load_shot(&mut self, shot: &Entity, version: &Version)
        -> Result<Outcome, IntegrationError>;

    /// Rebuilds a shot scene from an assembly document.
    fn build_shot(&mut self, path: &Path) -> Result<Outcome, IntegrationError>;

    /// Applies the shot's frame timeline and the project's render settings
    /// to the host.
    fn setup_shot(
        &mut self,
        project: &Project,
        category: &Category,
        shot: &Entity,
    ) -> Result<Outcome, IntegrationError>;

    /// Captures a still (`start == end`, current frame when `start == -1`)
    /// or a range, at the fixed capture resolution.
    fn take_playblast(
        &mut self,
        start_frame: i32,
        end_frame: i32,
        path: &Path,
    ) -> Result<Outcome, IntegrationError>;

    fn open_file(&mut self, version: &Version) -> Result<Outcome, IntegrationError>;

    fn save_file(&mut self, path: &Path) -> Result<Outcome, IntegrationError>;

    /// Exports the current selection. Fails when the target already exists
    /// or nothing is selected.
    fn export_selection(
        &mut self,
        path: &Path,
        extension: &str,
    ) -> Result<Outcome, IntegrationError>;

    /// Writes the shader marker on the selected tagged object. `false` when
    /// nothing is selected or the object carries no markers.
    fn assign_shader_to_selected(
        &mut self,
        version: &Version,
    ) -> Result<bool, IntegrationError>;

    /// Reports every tagged object with its identity and world transform —
    /// the inverse of `load_asset`'s tagging.
    fn extract_assets(&mut self) -> Result<Vec<ExtractedAsset>, IntegrationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_kind_parse_is_lenient() {
        assert_eq!(HostKind::parse_or_standalone("Maya"), HostKind::Maya);
        assert_eq!(HostKind::parse_or_standalone("maya"), HostKind::Maya);
        assert_eq!(HostKind::parse_or_standalone("Guerilla"), HostKind::Guerilla);
        assert_eq!(HostKind::parse_or_standalone("houdini"), HostKind::Standalone);
    }

    #[test]
    fn timeline_regions_accumulate() {
        let mut project = Project::new(Uuid::new_v4(), "show");
        project.start_frame = 1001;
        project.pre_roll = 24;
        project.post_roll = 12;

        let timeline = FrameTimeline::for_shot(&project, 120);
        assert_eq!(timeline.start, 1001);
        assert_eq!(timeline.pre_roll_end, 1025);
        assert_eq!(timeline.animation_end, 1145);
        assert_eq!(timeline.end, 1157);
        assert_eq!(timeline.padding(), 4);
    }

    #[test]
    fn padding_counts_digits_of_final_frame() {
        let mut project = Project::new(Uuid::new_v4(), "show");
        project.start_frame = 1;
        project.pre_roll = 0;
        project.post_roll = 0;
        assert_eq!(FrameTimeline::for_shot(&project, 8).padding(), 1);
        assert_eq!(FrameTimeline::for_shot(&project, 98).padding(), 2);
        assert_eq!(FrameTimeline::for_shot(&project, 9_998).padding(), 4);
    }

    #[test]
    fn resolution_parsing() {
        assert_eq!(parse_resolution("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_resolution("1920 x 1080"), Some((1920, 1080)));
        assert_eq!(parse_resolution("bogus"), None);
    }
}
