//! Persistent settings: display mode, routing rules and the connection
//! profiles of every migration project.

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{BridgeError, Result};
use crate::rules::MigrationRule;
use crate::time_format::DisplayMode;

/// Credentials for one Jira site, optionally with a Tempo token.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionProfile {
    pub name: String,
    pub base_url: String,
    pub email: String,
    pub api_token: String,
    pub tempo_token: String,
}

impl ConnectionProfile {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.base_url.trim().is_empty()
            && !self.email.trim().is_empty()
            && !self.api_token.trim().is_empty()
    }

    pub fn uses_tempo(&self) -> bool {
        !self.tempo_token.trim().is_empty()
    }
}

/// A source/destination pair the user migrates between.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectProfile {
    pub id: String,
    pub name: String,
    pub source: ConnectionProfile,
    pub destination: ConnectionProfile,
    pub created_at: String,
}

impl ProjectProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("proj-{}", Uuid::new_v4().simple()),
            name: name.into(),
            source: ConnectionProfile::named("Source Jira"),
            destination: ConnectionProfile::named("Destination Jira"),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.source.is_complete() && self.destination.is_complete()
    }
}

/// Fields replaced by [`AppConfig::update_project`]; id and creation time never change.
#[derive(Clone, Debug, Default)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub source: Option<ConnectionProfile>,
    pub destination: Option<ConnectionProfile>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    pub display_mode: DisplayMode,
    pub rules: Vec<MigrationRule>,
    pub projects: Vec<ProjectProfile>,
    pub active_project_id: Option<String>,
}

impl AppConfig {
    /// Adds an empty project; the first one becomes active.
    pub fn add_project(&mut self, name: impl Into<String>) -> &ProjectProfile {
        let project = ProjectProfile::new(name);
        if self.active_project_id.is_none() {
            self.active_project_id = Some(project.id.clone());
        }
        self.projects.push(project);
        &self.projects[self.projects.len() - 1]
    }

    /// Removes a project; an active one hands over to the first remaining project.
    pub fn remove_project(&mut self, project_id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|project| project.id != project_id);
        if self.active_project_id.as_deref() == Some(project_id) {
            self.active_project_id = self.projects.first().map(|project| project.id.clone());
        }
        self.projects.len() != before
    }

    pub fn update_project(&mut self, project_id: &str, update: ProjectUpdate) -> Result<()> {
        let project = self
            .projects
            .iter_mut()
            .find(|project| project.id == project_id)
            .ok_or_else(|| BridgeError::Config(format!("unknown project {}", project_id)))?;
        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(source) = update.source {
            project.source = source;
        }
        if let Some(destination) = update.destination {
            project.destination = destination;
        }
        Ok(())
    }

    /// Activates a project if it exists.
    pub fn set_active_project(&mut self, project_id: &str) -> bool {
        if self.projects.iter().any(|project| project.id == project_id) {
            self.active_project_id = Some(project_id.to_string());
            return true;
        }
        false
    }

    pub fn active_project(&self) -> Option<&ProjectProfile> {
        let active = self.active_project_id.as_deref()?;
        self.projects.iter().find(|project| project.id == active)
    }

    pub fn is_configured(&self) -> bool {
        self.active_project().is_some_and(ProjectProfile::is_configured)
    }

    pub fn uses_tempo(&self) -> bool {
        self.active_project()
            .is_some_and(|project| project.destination.uses_tempo())
    }
}

/// Loads and saves [`AppConfig`] as JSON in the platform config directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("io", "worklog-bridge", "worklog-bridge")
            .ok_or_else(|| BridgeError::Config("could not determine config directory".into()))?;
        Ok(Self {
            path: dirs.config_dir().join("config.json"),
        })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads config from disk, falling back to defaults on read/parse errors.
    pub fn load(&self) -> AppConfig {
        if !self.path.exists() {
            return AppConfig::default();
        }
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) => {
                warn!("Failed to read {}: {}", self.path.display(), err);
                return AppConfig::default();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|err| {
            warn!("Ignoring invalid config {}: {}", self.path.display(), err);
            AppConfig::default()
        })
    }

    /// Persists config to disk, creating parent directories when needed.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}
