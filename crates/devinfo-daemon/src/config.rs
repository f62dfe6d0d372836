//! Configuration management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP API configuration
    #[serde(default)]
    pub web: WebConfig,

    /// D-Bus configuration
    #[serde(default)]
    pub dbus: DbusConfig,

    /// Platform source locations and poll rates
    #[serde(default)]
    pub platform: PlatformConfig,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// Whether to serve the HTTP API
    #[serde(default = "default_web_enable")]
    pub enable: bool,

    /// Server listen address (e.g., "127.0.0.1:8687")
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enable: default_web_enable(),
            listen: default_listen(),
        }
    }
}

/// Which bus the daemon registers on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbusBusType {
    /// Session bus, falling back to the system bus
    #[default]
    Auto,
    Session,
    System,
}

/// D-Bus configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbusConfig {
    #[serde(default)]
    pub bus: DbusBusType,
}

/// Platform configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// sysfs mount point
    #[serde(default = "default_sysfs_root")]
    pub sysfs_root: PathBuf,

    /// procfs mount point
    #[serde(default = "default_procfs_root")]
    pub procfs_root: PathBuf,

    /// Ambient sensor poll interval in milliseconds
    #[serde(default = "default_sensor_poll")]
    pub sensor_poll_ms: u64,

    /// Battery poll interval in milliseconds
    #[serde(default = "default_power_poll")]
    pub power_poll_ms: u64,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            sysfs_root: default_sysfs_root(),
            procfs_root: default_procfs_root(),
            sensor_poll_ms: default_sensor_poll(),
            power_poll_ms: default_power_poll(),
        }
    }
}

#[cfg(target_os = "linux")]
impl PlatformConfig {
    /// Converts to the Linux backend settings.
    pub fn linux(&self) -> devinfo_core::linux::LinuxConfig {
        devinfo_core::linux::LinuxConfig {
            sysfs_root: self.sysfs_root.clone(),
            procfs_root: self.procfs_root.clone(),
            sensor_poll: std::time::Duration::from_millis(self.sensor_poll_ms.max(1)),
            power_poll: std::time::Duration::from_millis(self.power_poll_ms.max(1)),
        }
    }
}

// Default value functions
fn default_web_enable() -> bool {
    true
}

fn default_listen() -> String {
    "127.0.0.1:8687".to_string()
}

fn default_sysfs_root() -> PathBuf {
    PathBuf::from("/sys")
}

fn default_procfs_root() -> PathBuf {
    PathBuf::from("/proc")
}

fn default_sensor_poll() -> u64 {
    200
}

fn default_power_poll() -> u64 {
    5000
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        Ok(config)
    }
}
