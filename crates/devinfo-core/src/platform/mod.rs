//! Platform collaborators.
//!
//! The dispatcher never touches the operating system directly. Each source of
//! telemetry sits behind one of the traits below; [`Platform`] bundles one
//! implementation of each.

#[cfg(test)]
pub(crate) mod fake;
mod unsupported;

pub use unsupported::Unsupported;

use crate::Result;
use std::fmt;
use std::sync::Arc;

/// Ambient sensor kinds backed by a sensor adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    Light,
    Pressure,
    Proximity,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Light => write!(f, "light"),
            SensorKind::Pressure => write!(f, "pressure"),
            SensorKind::Proximity => write!(f, "proximity"),
        }
    }
}

/// A physical sensor found by a [`SensorHub`].
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfo {
    /// Backend-specific sensor name.
    pub name: String,
    /// Kind of quantity the sensor measures.
    pub kind: SensorKind,
    /// Largest value the sensor reports.
    pub max_range: f32,
}

/// A value-change event delivered by a sensor backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub values: Vec<f32>,
}

/// Receives sensor value changes.
pub trait SensorListener: Send + Sync {
    fn on_sensor_changed(&self, event: &SensorEvent);
}

/// Battery state-changed notification.
///
/// Fields the platform did not report are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatteryNotification {
    /// Charge level, 0-100.
    pub level: Option<i32>,
    /// 0 when on battery, positive when plugged in (1 = AC, 2 = USB).
    pub plugged: Option<i32>,
    /// Battery temperature in tenths of a degree Celsius.
    pub temperature: Option<i32>,
}

/// Receives battery notifications.
pub trait PowerListener: Send + Sync {
    fn on_battery_changed(&self, notification: &BatteryNotification);
}

/// Cumulative CPU counters since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuCounters {
    /// user + nice + system time.
    pub used: f64,
    /// idle time.
    pub idle: f64,
}

/// Currently active network connection as reported by the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConnection {
    /// Interface carrying the connection.
    pub interface: String,
    /// Network type name, e.g. "WIFI", "MOBILE", "ETHERNET".
    pub type_name: String,
    /// Network subtype name, e.g. "LTE". Empty when not applicable.
    pub subtype_name: String,
    pub roaming: bool,
}

/// Wifi link details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WifiInfo {
    /// Link speed in Mbps.
    pub link_speed: i64,
    /// Received signal strength in dBm.
    pub rssi: i32,
}

/// A mounted storage volume.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Volume {
    /// Backing device, e.g. "/dev/sda1".
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
    pub read_only: bool,
    pub removable: bool,
    /// Total size in bytes.
    pub capacity: u64,
    /// Free bytes available to unprivileged users.
    pub available: u64,
}

/// Sensor subsystem.
pub trait SensorHub: Send + Sync {
    /// Lists sensors of the given kind. Empty when the hardware is absent.
    fn sensors(&self, kind: SensorKind) -> Vec<SensorInfo>;

    /// Starts delivering value changes for `sensor` to `listener`.
    fn register(&self, sensor: &SensorInfo, listener: Arc<dyn SensorListener>)
        -> Result<Registration>;
}

/// Battery/power subsystem.
pub trait PowerSource: Send + Sync {
    /// Starts delivering battery notifications to `listener`.
    fn subscribe(&self, listener: Arc<dyn PowerListener>) -> Result<Registration>;
}

/// CPU statistics source.
pub trait CounterSource: Send + Sync {
    fn read_cpu_counters(&self) -> Result<CpuCounters>;
}

/// Connectivity subsystem.
pub trait ConnectivitySource: Send + Sync {
    /// Returns the active connection, or `None` when offline.
    fn active_network(&self) -> Result<Option<RawConnection>>;

    /// Returns wifi link details for `interface`.
    fn wifi_info(&self, interface: &str) -> Result<WifiInfo>;
}

/// Storage subsystem.
pub trait StorageSource: Send + Sync {
    fn volumes(&self) -> Result<Vec<Volume>>;
}

/// Handle for an active callback registration.
///
/// Dropping the handle unregisters the callback.
pub struct Registration {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Registration {
    /// Creates a registration that runs `cancel` when unregistered.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unregisters the callback.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// One implementation of every platform collaborator.
#[derive(Clone)]
pub struct Platform {
    pub sensors: Arc<dyn SensorHub>,
    pub power: Arc<dyn PowerSource>,
    pub cpu: Arc<dyn CounterSource>,
    pub connectivity: Arc<dyn ConnectivitySource>,
    pub storage: Arc<dyn StorageSource>,
}

impl Platform {
    /// Platform whose sources are all unavailable.
    pub fn unsupported() -> Self {
        let stub = Arc::new(Unsupported);
        Self {
            sensors: stub.clone(),
            power: stub.clone(),
            cpu: stub.clone(),
            connectivity: stub.clone(),
            storage: stub,
        }
    }
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
