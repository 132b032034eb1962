/// Application configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tunebox_playback::PlaybackConfig;
use tunebox_server_client::ServerConfig;

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "tunebox.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_server_url")]
    pub url: String,

    /// Pause between a download request and fetching the file
    #[serde(default = "default_download_delay_ms")]
    pub download_delay_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Where downloaded audio files are written
    #[serde(default = "default_songs_dir")]
    pub songs_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist. Otherwise `tunebox.toml` in the working
    /// directory is read when present. Environment variables prefixed with
    /// `TUNEBOX_` override both, using `__` between sections
    /// (e.g. `TUNEBOX_SERVER__URL`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    pub(crate) fn load_with(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        let config = settings.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.url.trim().is_empty() {
            return Err(CliError::Config(
                "server URL is required (set TUNEBOX_SERVER__URL)".to_string(),
            ));
        }

        if self.playback.status_interval_ms == 0 {
            return Err(CliError::Config(
                "playback.status_interval_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

impl ServerSettings {
    /// Client configuration for `MusicServerClient`
    pub fn client_config(&self) -> ServerConfig {
        ServerConfig::new(self.url.clone())
            .with_download_delay(Duration::from_millis(self.download_delay_ms))
            .with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

impl StorageSettings {
    /// File behind `database_url`, if it names one
    pub fn database_path(&self) -> Option<PathBuf> {
        let rest = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = rest.split('?').next().unwrap_or_default();

        if path.is_empty() || path == ":memory:" {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("TUNEBOX")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_server_url(),
            download_delay_ms: default_download_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            songs_dir: default_songs_dir(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:11936".to_string()
}

fn default_download_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_database_url() -> String {
    "sqlite://./data/tunebox.db".to_string()
}

fn default_songs_dir() -> PathBuf {
    PathBuf::from("./data/songs")
}
