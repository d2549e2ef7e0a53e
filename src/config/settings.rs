//! Configuration file support for kubectl-ssh-proxy

use crate::k8s::wait::PollSettings;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings file name looked up in the current directory
pub const LOCAL_CONFIG_FILE: &str = ".kubectl-ssh-proxy.toml";

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub wait: WaitSettings,

    #[serde(default)]
    pub pod: PodSettings,

    #[serde(default)]
    pub behavior: Behavior,
}

/// Readiness wait settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct WaitSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval_millis")]
    pub poll_interval_millis: u64,
}

/// Helper pod provisioned when none exists
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PodSettings {
    #[serde(default = "default_image")]
    pub image: String,

    /// Argument to `sleep` inside the helper container
    #[serde(default = "default_sleep")]
    pub sleep: String,
}

/// Behavior settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Behavior {
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Print the transport command line before running it
    #[serde(default = "default_true")]
    pub echo_command: bool,
}

// Default value functions
fn default_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_millis() -> u64 {
    1000
}

fn default_image() -> String {
    "public.ecr.aws/docker/library/busybox:glibc".to_string()
}

fn default_sleep() -> String {
    "12h".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_millis: default_poll_interval_millis(),
        }
    }
}

impl Default for PodSettings {
    fn default() -> Self {
        Self {
            image: default_image(),
            sleep: default_sleep(),
        }
    }
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            show_progress: default_true(),
            echo_command: default_true(),
        }
    }
}

impl WaitSettings {
    pub fn poll_settings(&self) -> PollSettings {
        PollSettings::new(
            Duration::from_millis(self.poll_interval_millis),
            Duration::from_secs(self.timeout_secs),
        )
    }
}

impl Settings {
    /// Load settings.
    ///
    /// An explicit path must exist and parse. Otherwise the standard
    /// locations are searched, and a broken file there only costs a warning.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::find_config_file() {
            Some(path) => Ok(Self::load_from_file(&path).unwrap_or_else(|e| {
                crate::log_warn!("Ignoring config file: {:#}", e);
                Self::default()
            })),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        crate::log_debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject values that would make the readiness wait meaningless
    pub fn validate(&self) -> Result<()> {
        if self.wait.poll_interval_millis == 0 {
            bail!("wait.poll_interval_millis must be greater than zero");
        }
        if self.wait.timeout_secs == 0 {
            bail!("wait.timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Find config file in standard locations
    /// Priority:
    /// 1. .kubectl-ssh-proxy.toml in current directory
    /// 2. ~/.config/kubectl-ssh-proxy/config.toml (XDG config directory)
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("kubectl-ssh-proxy").join("config.toml");
            if xdg_config.exists() {
                return Some(xdg_config);
            }
        }

        None
    }
}
