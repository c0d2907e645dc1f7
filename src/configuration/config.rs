use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error_handling::types::ConfigError;
use crate::job_management::job_store::DEFAULT_JOB_TTL_SECS;
use crate::job_management::worker_pool::DEFAULT_WORKERS;
use crate::storage::StorageLayout;

/// Application configuration, read from a TOML file.
///
/// Every section and every field is optional; anything left out falls back
/// to the defaults below, so an empty file is a valid configuration.
///
/// ```toml
/// [server]
/// bind_address = "0.0.0.0"
/// port = 8000
///
/// [storage]
/// posters_dir = "posters"
/// examples_dir = "examples"
/// trash_dir = "trashcan"
/// themes_dir = "themes"
///
/// [jobs]
/// workers = 2
/// ttl_secs = 21600
///
/// [geocoder]
/// base_url = "https://nominatim.openstreetmap.org"
/// user_agent = "city_map_poster_webui"
/// throttle_ms = 1000
///
/// [renderer]
/// program = "python3"
/// args = ["create_map_poster.py"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub jobs: JobsConfig,
    pub geocoder: GeocoderConfig,
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub posters_dir: PathBuf,
    pub examples_dir: PathBuf,
    pub trash_dir: PathBuf,
    pub themes_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            posters_dir: PathBuf::from("posters"),
            examples_dir: PathBuf::from("examples"),
            trash_dir: PathBuf::from("trashcan"),
            themes_dir: PathBuf::from("themes"),
        }
    }
}

impl StorageConfig {
    pub fn layout(&self) -> StorageLayout {
        StorageLayout {
            active: self.posters_dir.clone(),
            trash: self.trash_dir.clone(),
            examples: self.examples_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobsConfig {
    pub workers: usize,
    pub ttl_secs: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            ttl_secs: DEFAULT_JOB_TTL_SECS,
        }
    }
}

impl JobsConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub user_agent: String,
    pub throttle_ms: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "city_map_poster_webui".to_string(),
            throttle_ms: 1000,
        }
    }
}

impl GeocoderConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: "python3".to_string(),
            args: vec!["create_map_poster.py".to_string()],
        }
    }
}

impl Config {
    /// Reads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::BadIPFormatting(format!("{}: {}", self.server.bind_address, e))
            })?;
        if self.jobs.workers == 0 {
            return Err(ConfigError::NotInRange(
                "jobs.workers must be at least 1".to_string(),
            ));
        }
        if self.jobs.ttl_secs == 0 {
            return Err(ConfigError::NotInRange(
                "jobs.ttl_secs must be at least 1".to_string(),
            ));
        }
        if self.renderer.program.trim().is_empty() {
            return Err(ConfigError::NotInRange(
                "renderer.program must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the web server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = self
            .server
            .bind_address
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::BadIPFormatting(format!("{}: {}", self.server.bind_address, e))
            })?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}
