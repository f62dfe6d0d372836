//! Linux platform backends.
//!
//! Everything is read from sysfs and procfs. Both roots are configurable so
//! the readers can run against a fixture tree. Sensor and battery callbacks
//! are driven by polling threads owned by their [`Registration`].

mod iio;
mod mounts;
mod net;
mod power_supply;
mod proc_stat;

pub use iio::IioSensorHub;
pub use mounts::MountedVolumes;
pub use net::LinuxConnectivity;
pub use power_supply::PowerSupplyClass;
pub use proc_stat::ProcStat;

use crate::platform::{Platform, Registration};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Locations and poll rates for the Linux backends.
#[derive(Debug, Clone)]
pub struct LinuxConfig {
    /// sysfs mount point, normally `/sys`.
    pub sysfs_root: PathBuf,
    /// procfs mount point, normally `/proc`.
    pub procfs_root: PathBuf,
    /// How often IIO sensors are read.
    pub sensor_poll: Duration,
    /// How often the power supply class is read.
    pub power_poll: Duration,
}

impl Default for LinuxConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            procfs_root: PathBuf::from("/proc"),
            sensor_poll: Duration::from_millis(200),
            power_poll: Duration::from_secs(5),
        }
    }
}

/// Builds a [`Platform`] backed by sysfs and procfs.
pub fn platform(config: &LinuxConfig) -> Platform {
    Platform {
        sensors: Arc::new(IioSensorHub::new(&config.sysfs_root, config.sensor_poll)),
        power: Arc::new(PowerSupplyClass::new(&config.sysfs_root, config.power_poll)),
        cpu: Arc::new(ProcStat::new(&config.procfs_root)),
        connectivity: Arc::new(LinuxConnectivity::new(
            &config.procfs_root,
            &config.sysfs_root,
        )),
        storage: Arc::new(MountedVolumes::new(&config.procfs_root, &config.sysfs_root)),
    }
}

/// Runs `tick` every `interval` on a named thread until the returned
/// registration is cancelled or dropped.
fn spawn_poller(
    name: String,
    interval: Duration,
    mut tick: impl FnMut() + Send + 'static,
) -> Result<Registration> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let handle = std::thread::Builder::new().name(name).spawn(move || {
        while !flag.load(Ordering::Acquire) {
            tick();
            std::thread::park_timeout(interval);
        }
    })?;

    Ok(Registration::new(move || {
        stop.store(true, Ordering::Release);
        handle.thread().unpark();
    }))
}

fn read_trimmed(path: &Path) -> Option<String> {
    std::fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
}

fn read_i64(path: &Path) -> Option<i64> {
    read_trimmed(path)?.parse().ok()
}

fn read_f64(path: &Path) -> Option<f64> {
    read_trimmed(path)?.parse().ok()
}
