pub mod assembly;
pub mod integrations;
pub mod markers;
pub mod session;

pub use integrations::{
    AdapterState, ExtractedAsset, FrameTimeline, Guerilla, HostIntegration, HostKind,
    IntegrationError, Maya, Outcome, PluginSpec, Standalone,
};
pub use session::{HostSession, MemorySession, ObjectId, RenderSettings, SessionError};
