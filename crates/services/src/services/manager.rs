//! Orchestration: one project list, one host adapter, one remote link.
//!
//! The manager owns the only mutable copy of the data model. Remote read
//! failures degrade to the last known state with a warning; only publish
//! failures surface to the caller.

use std::path::PathBuf;

use integrations::{
    Guerilla, HostIntegration, HostKind, HostSession, Maya, PluginSpec, Standalone,
};
use models::{FileType, Project, Version};
use uuid::Uuid;

use crate::services::{
    link::{Credentials, RemoteServiceError, ServiceLink},
    preferences::Preferences,
    publish::{self, PublishError, PublishRequest},
};

/// Formats unlocked by the plugin names preferences can carry. Unknown
/// names are still probed, they just do not widen the format set.
fn plugin_specs(names: &[String]) -> Vec<PluginSpec> {
    names
        .iter()
        .map(|name| {
            let formats = match name.as_str() {
                "AbcImport" | "AbcExport" => vec![FileType::Alembic],
                "fbxmaya" => vec![FileType::Fbx],
                "objExport" => vec![FileType::Obj],
                _ => Vec::new(),
            };
            PluginSpec::new(name.clone(), formats)
        })
        .collect()
}

fn build_integration(
    preferences: &Preferences,
    session: Option<Box<dyn HostSession>>,
) -> Box<dyn HostIntegration> {
    let kind = HostKind::parse_or_standalone(&preferences.manager.host);
    let mut integration: Box<dyn HostIntegration> = match kind {
        HostKind::Standalone => Box::new(Standalone::new()),
        HostKind::Maya => Box::new(Maya::new(session, preferences.maya.use_instances)),
        HostKind::Guerilla => Box::new(Guerilla::new(session)),
    };
    let plugins = match kind {
        HostKind::Maya => plugin_specs(&preferences.maya.plugins),
        HostKind::Guerilla => plugin_specs(&preferences.guerilla.plugins),
        HostKind::Standalone => Vec::new(),
    };
    integration.initialize_formats(&plugins);
    integration
}

pub struct Manager {
    projects: Vec<Project>,
    current: usize,
    integration: Box<dyn HostIntegration>,
    link: Box<dyn ServiceLink>,
    preferences: Preferences,
}

impl Manager {
    /// The host adapter is picked from the preferences' host name; the
    /// session is whatever runtime handle the embedding host provides
    /// (`None` outside a host, which leaves the adapter inactive).
    pub fn new(
        preferences: Preferences,
        link: Box<dyn ServiceLink>,
        session: Option<Box<dyn HostSession>>,
    ) -> Self {
        let integration = build_integration(&preferences, session);
        tracing::info!("Manager starting with {} host", integration.kind());
        Self {
            projects: vec![Project::local()],
            current: 0,
            integration,
            link,
            preferences,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn current_project(&self) -> &Project {
        &self.projects[self.current]
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn integration(&mut self) -> &mut dyn HostIntegration {
        self.integration.as_mut()
    }

    /// Selects the current project. Out-of-range indices fall back to the
    /// local project instead of failing.
    pub fn set_current_project(&mut self, index: usize) {
        if index < self.projects.len() {
            self.current = index;
        } else {
            tracing::warn!(
                "Project index {index} out of range ({} projects), selecting local",
                self.projects.len()
            );
            self.current = 0;
        }
    }

    /// Logs in and replaces the project list with the tracker's open
    /// projects. Returns whether the connection succeeded; on any failure
    /// the existing list is kept untouched.
    pub fn connect_remote(&mut self, credentials: &Credentials) -> bool {
        match self.link.login(credentials) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!("Login rejected for '{}'", credentials.username);
                return false;
            }
            Err(err) => {
                tracing::warn!("Login failed: {err}");
                return false;
            }
        }

        let raws = match self.link.get_open_projects() {
            Ok(raws) => raws,
            Err(err) => {
                tracing::warn!("Could not list open projects: {err}");
                return false;
            }
        };

        let mut fetched = Vec::with_capacity(raws.len());
        for raw in &raws {
            match self.link.get_data_from_project(raw) {
                Ok(project) => fetched.push(project),
                Err(err) => {
                    tracing::warn!("Could not read project data: {err}");
                    return false;
                }
            }
        }

        let mut projects = vec![Project::local()];
        projects.extend(fetched);
        tracing::info!("Connected, {} remote projects", projects.len() - 1);
        self.projects = projects;
        self.current = 0;
        true
    }

    /// Fetches the entity's versions from the link, at most once. Entities
    /// already loaded (and unknown ids) are a no-op.
    pub fn ensure_loaded(
        &mut self,
        category_id: Uuid,
        entity_id: Uuid,
    ) -> Result<(), RemoteServiceError> {
        let Self {
            projects,
            current,
            link,
            ..
        } = self;
        let project = &projects[*current];
        let versions = {
            let entity = project
                .categories
                .iter()
                .find(|c| c.id == category_id)
                .and_then(|c| c.entity_by_id(entity_id));
            match entity {
                Some(entity) if !entity.loaded => link.get_versions(project, entity)?,
                _ => return Ok(()),
            }
        };

        if let Some(entity) = projects[*current]
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .and_then(|c| c.entity_by_id_mut(entity_id))
        {
            entity.versions = versions;
            entity.loaded = true;
        }
        Ok(())
    }

    /// Downloads the entity's preview into the scratch dir and remembers the
    /// local path. Failures degrade: the preview just stays absent.
    pub fn refresh_preview(&mut self, category_id: Uuid, entity_id: Uuid) -> Option<PathBuf> {
        let Self {
            projects,
            current,
            link,
            ..
        } = self;
        let entity = projects[*current]
            .categories
            .iter_mut()
            .find(|c| c.id == category_id)
            .and_then(|c| c.entity_by_id_mut(entity_id))?;

        match link.download_preview(entity) {
            Ok(path) => {
                entity.preview_path = Some(path.clone());
                Some(path)
            }
            Err(err) => {
                tracing::warn!("Preview download failed for '{}': {err}", entity.name);
                None
            }
        }
    }

    /// Publishes a working file as the next revision on the current project.
    pub fn publish(&mut self, request: &PublishRequest<'_>) -> Result<Version, PublishError> {
        let Self {
            projects,
            current,
            link,
            ..
        } = self;
        publish::publish_version(link.as_mut(), &mut projects[*current], request)
    }
}
