//! Application state management.

use devinfo_core::{Dispatcher, Platform, PropertyId, Reading};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// Configuration
    config: Config,

    /// Property dispatcher, driven one request at a time
    dispatcher: Mutex<Dispatcher>,
}

impl AppState {
    /// Creates a new application state with the platform for this target.
    pub fn new(config: Config) -> Self {
        let platform = platform_for(&config);
        Self::with_platform(config, platform)
    }

    /// Creates a new application state over an explicit platform.
    pub fn with_platform(config: Config, platform: Platform) -> Self {
        Self {
            config,
            dispatcher: Mutex::new(Dispatcher::new(platform)),
        }
    }

    /// Returns the configuration the daemon was started with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn dispatcher(&self) -> MutexGuard<'_, Dispatcher> {
        self.dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads a property.
    pub fn get(&self, property: &str) -> devinfo_core::Result<Reading> {
        self.dispatcher().get(property)
    }

    /// Reports whether a property is available.
    pub fn has(&self, property: &str) -> devinfo_core::Result<bool> {
        self.dispatcher().has(property)
    }

    /// Attempts to monitor a property.
    pub fn monitor(&self, property: &str) -> devinfo_core::Result<()> {
        self.dispatcher().monitor(property)
    }

    /// Lists every property with its capability flag.
    pub fn properties(&self) -> Vec<(PropertyId, bool)> {
        self.dispatcher().properties()
    }

    /// Daemon version string.
    pub fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(target_os = "linux")]
fn platform_for(config: &Config) -> Platform {
    let linux = config.platform.linux();
    info!(
        "Using Linux platform (sysfs: {}, procfs: {})",
        linux.sysfs_root.display(),
        linux.procfs_root.display()
    );
    devinfo_core::linux::platform(&linux)
}

#[cfg(not(target_os = "linux"))]
fn platform_for(_config: &Config) -> Platform {
    info!("No platform backend for this target; all sources report unavailable");
    Platform::unsupported()
}
