pub mod link;
pub mod manager;
pub mod preferences;
pub mod publish;

pub use link::{Credentials, LocalLink, PublishMetadata, RemoteServiceError, ServiceLink};
pub use manager::Manager;
pub use preferences::{Preferences, PreferencesError};
pub use publish::{PublishError, PublishRequest};
