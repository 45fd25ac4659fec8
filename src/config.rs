//! Configuration file handling for reelprompt.
//!
//! Loads configuration from `~/.config/reelprompt/config.toml` or a custom path,
//! then merges it with environment and command-line overrides into [`Settings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, SERVER_URL_ENV};
use crate::studio::{
    DownloadHelper, NotificationQueue, NotificationTiming, StudioTiming, DEFAULT_RESET_DELAY,
    DEFAULT_SUCCESS_DELAY, DEFAULT_TICK,
};

/// Configuration file structure for reelprompt.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Deserialize, Default)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UiConfig {
    pub success_delay_ms: Option<u64>,
    pub progress_tick_ms: Option<u64>,
    pub progress_reset_ms: Option<u64>,
    pub notification_capacity: Option<usize>,
    pub notification_duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DownloadConfig {
    pub dir: Option<PathBuf>,
}

/// Commented default config written by `config init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# reelprompt configuration

[server]
# Video generation backend (overridden by REELPROMPT_SERVER_URL and --server)
base_url = "http://127.0.0.1:8000"
# Give up on a generation request after this many seconds
timeout_secs = 300

[ui]
# Pause at 100% before showing the result
success_delay_ms = 500
# Progress bar step interval
progress_tick_ms = 500
# Delay before the progress bar returns to zero
progress_reset_ms = 1000
# Notifications kept at once (oldest dropped first)
notification_capacity = 3
# How long a notification stays on screen
notification_duration_ms = 3000

[download]
# Where saved videos go (default: your downloads folder)
# dir = "~/Videos"
"#;

impl Config {
    /// Load configuration from a file path, or the default path when `None`.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::read(&path)
        } else {
            Ok(Config::default())
        }
    }

    /// Load configuration from a path the user named explicitly.
    /// Unlike [`Config::load`], a missing file is an error.
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub server: Option<String>,
    pub timeout_secs: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

/// Effective settings after merging CLI > environment > file > defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub timing: StudioTiming,
    pub notification_capacity: usize,
    pub notification_timing: NotificationTiming,
    pub download_dir: PathBuf,
}

impl Settings {
    /// Merge a config file with overrides and the server URL from the environment.
    pub fn resolve(config: &Config, overrides: &Overrides) -> Self {
        Self::resolve_with_env(config, overrides, std::env::var(SERVER_URL_ENV).ok())
    }

    /// Like [`Settings::resolve`], with the environment value passed in.
    pub fn resolve_with_env(config: &Config, overrides: &Overrides, env_server: Option<String>) -> Self {
        let base_url = overrides
            .server
            .clone()
            .or(env_server.filter(|s| !s.trim().is_empty()))
            .or_else(|| config.server.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let request_timeout = overrides
            .timeout_secs
            .or(config.server.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let ui = &config.ui;
        let timing = StudioTiming {
            success_delay: ui
                .success_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_SUCCESS_DELAY),
            progress_tick: ui
                .progress_tick_ms
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_TICK),
            progress_reset_delay: ui
                .progress_reset_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_RESET_DELAY),
        };

        let mut notification_timing = NotificationTiming::default();
        if let Some(ms) = ui.notification_duration_ms {
            notification_timing.duration = Duration::from_millis(ms);
        }

        let download_dir = overrides
            .download_dir
            .clone()
            .or_else(|| config.download.dir.clone())
            .map(expand_home)
            .unwrap_or_else(DownloadHelper::default_dir);

        Self {
            base_url,
            request_timeout,
            timing,
            notification_capacity: ui
                .notification_capacity
                .unwrap_or(NotificationQueue::DEFAULT_CAPACITY),
            notification_timing,
            download_dir,
        }
    }

    pub fn notification_queue(&self) -> NotificationQueue {
        NotificationQueue::with_timing(self.notification_capacity, self.notification_timing)
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir().map(|h| h.join(rest)).unwrap_or(path),
        Err(_) => path,
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    NotFound {
        path: PathBuf,
    },
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound { path } => {
                write!(f, "Config file '{}' does not exist", path.display())
            }
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::NotFound { .. } => None,
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("reelprompt").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/reelprompt/config.toml")
        })
}
