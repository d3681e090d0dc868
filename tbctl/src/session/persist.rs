//! Durable storage for the environment registry.
//!
//! Only environments and the active selection are written. Credential pairs,
//! identities and impersonation state stay in process memory and die with it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::state::{Environment, Session};

const APP_DIR: &str = ".tbctl";
const REGISTRY_FILE: &str = "environments.json";

/// On-disk schema, the non-sensitive slice of the session.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegistryFile {
    environments: Vec<Environment>,
    active_env_id: Option<String>,
}

/// Loads and saves the registry at a fixed path.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    /// Store at the default location, `~/.tbctl/environments.json`.
    pub fn open_default() -> Result<Self> {
        let home = dirs::home_dir().context("could not find home directory")?;
        Ok(Self::open_at(home.join(APP_DIR).join(REGISTRY_FILE)))
    }

    /// Store at a specific path.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load a session from disk. A missing file seeds the default local
    /// environment instead of erroring, so a fresh install works immediately.
    pub fn load(&self) -> Result<Session> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no registry file, seeding default environment");
            return Ok(Session::from_registry(
                vec![default_environment()],
                Some("1".to_string()),
            ));
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let file: RegistryFile = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        Ok(Session::from_registry(file.environments, file.active_env_id))
    }

    /// Write the session's registry back to disk.
    pub fn save(&self, session: &Session) -> Result<()> {
        let file = RegistryFile {
            environments: session.environments().to_vec(),
            active_env_id: session.active_environment().map(|e| e.id.clone()),
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        debug!(path = %self.path.display(), "registry saved");
        Ok(())
    }
}

/// The environment seeded on first run, matching a local platform install.
fn default_environment() -> Environment {
    Environment {
        id: "1".to_string(),
        name: "Localhost".to_string(),
        base_url: "http://localhost:8080".to_string(),
        last_used: None,
    }
}
