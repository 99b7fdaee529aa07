use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Listener and admin listener use the same address: {0}")]
    ConflictingListeners(String),

    #[error("Duplicate chart repository name: {0}")]
    DuplicateRepository(String),

    #[error("Empty chart repository name")]
    EmptyRepositoryName,

    #[error("Chart cache directory cannot be empty")]
    EmptyCacheDir,
}

/// Release API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the REST endpoints
    pub listener: Listener,
    /// Listener for health and readiness probes
    pub admin_listener: Listener,
    /// Release backend connection
    pub tiller: TillerConfig,
    /// Chart repositories and the local archive cache
    pub chart_repo: chart_repo::config::Config,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        if self.listener == self.admin_listener {
            return Err(ValidationError::ConflictingListeners(format!(
                "{}:{}",
                self.listener.host, self.listener.port
            )));
        }

        if self.chart_repo.cache_dir.as_os_str().is_empty() {
            return Err(ValidationError::EmptyCacheDir);
        }

        let mut names = HashSet::new();
        for repo in &self.chart_repo.repositories {
            if repo.name.is_empty() {
                return Err(ValidationError::EmptyRepositoryName);
            }
            if !names.insert(&repo.name) {
                return Err(ValidationError::DuplicateRepository(repo.name.clone()));
            }
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TillerConfig {
    /// gRPC endpoint of the backend release service
    pub url: Url,
    /// Client version announced to the backend, which rejects incompatible clients
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

fn default_api_version() -> String {
    "v2.17.0".to_string()
}
