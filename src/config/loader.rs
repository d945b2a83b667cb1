//! Configuration structures and loading logic.

use crate::config::modes::DownloadMode;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory first.
pub const CONFIG_FILE_NAME: &str = "mediagrab.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,
}

/// Outbound HTTP settings shared by every provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Browser user agent string. Several upstreams reject unbranded clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum redirects followed per request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Defaults for requests built from the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Download mode (auto, audio).
    #[serde(default)]
    pub mode: DownloadMode,

    /// Video quality hint, passed to upstreams that honor one.
    #[serde(default = "default_quality")]
    pub quality: String,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            mode: DownloadMode::default(),
            quality: default_quality(),
        }
    }
}

/// Provider chain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Provider names removed from the chain.
    #[serde(default)]
    pub disabled: Vec<String>,

    /// Cobalt instances, tried in order.
    #[serde(default = "default_cobalt_instances")]
    pub cobalt_instances: Vec<String>,

    /// User agent sent to Cobalt instances.
    #[serde(default = "default_cobalt_user_agent")]
    pub cobalt_user_agent: String,

    /// Public site key expected by the OceanSaver endpoint.
    #[serde(default = "default_oceansaver_api_key")]
    pub oceansaver_api_key: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            disabled: Vec::new(),
            cobalt_instances: default_cobalt_instances(),
            cobalt_user_agent: default_cobalt_user_agent(),
            oceansaver_api_key: default_oceansaver_api_key(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_timeout() -> u64 {
    25
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_redirects() -> usize {
    10
}

fn default_quality() -> String {
    "720".to_string()
}

fn default_cobalt_instances() -> Vec<String> {
    [
        "https://co.eepy.today",
        "https://api.cobalt.tools",
        "https://cobalt-api.meowing.de",
        "https://cobalt-backend.canine.tools",
        "https://kityune.imput.net",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cobalt_user_agent() -> String {
    "MediaGrab/1.0".to_string()
}

fn default_oceansaver_api_key() -> String {
    "dfcb6d76f2f6a9894gjkege8a4ab232222".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one with --init-config",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Find the configuration file to use when none was given explicitly.
    ///
    /// Checks the working directory, then the per-user config directory.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }

        let user = user_config_path()?;
        user.exists().then_some(user)
    }
}

/// The per-user configuration path (e.g. `~/.config/mediagrab/mediagrab.toml`).
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mediagrab").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
