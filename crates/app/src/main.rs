use anyhow::Error as AnyhowError;
use services::services::{
    preferences::{load_preferences, preferences_path, save_preferences},
    LocalLink, Manager,
};
use thiserror::Error;
use tracing_subscriber::{EnvFilter, prelude::*};

#[derive(Debug, Error)]
pub enum HestiaError {
    #[error(transparent)]
    Preferences(#[from] services::services::PreferencesError),
    #[error(transparent)]
    Other(#[from] AnyhowError),
}

fn log_filter(level: &str) -> String {
    format!(
        "warn,hestia={level},services={level},integrations={level},templates={level},models={level},utils={level}",
        level = level
    )
}

fn main() -> Result<(), HestiaError> {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_new(log_filter(&log_level)).map_err(AnyhowError::from)?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(env_filter))
        .init();

    let prefs_path = preferences_path();
    let preferences = load_preferences(&prefs_path);
    tracing::info!(
        "Preferences loaded from {} (host '{}')",
        prefs_path.display(),
        preferences.manager.host
    );

    // Running outside any DCC: no host session, the adapter stays inactive
    // unless the host is standalone.
    let mut manager = Manager::new(preferences, Box::new(LocalLink), None);

    for (index, project) in manager.projects().iter().enumerate() {
        tracing::info!("Project {index}: {}", project.name);
    }
    let kind = manager.integration().kind();
    let format_count = manager.integration().available_formats().len();
    tracing::info!("Host adapter: {kind} ({format_count} formats)");

    // Rewrite so new schema keys land on disk with their defaults.
    save_preferences(manager.preferences(), &prefs_path)?;

    utils::tempdir::clear_scratch();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_string_parses() {
        assert!(EnvFilter::try_new(log_filter("info")).is_ok());
    }

    #[test]
    fn garbage_level_is_a_filter_error() {
        assert!(EnvFilter::try_new(log_filter("not a level=")).is_err());
    }
}
