//! devinfo core library
//!
//! Exposes device telemetry (CPU usage, battery and thermal state, ambient
//! sensors, network connection type, storage units, codecs) through a single
//! property-keyed dispatcher. Platform access goes through the narrow traits in
//! [`platform`]; [`linux`] implements them on top of sysfs and procfs.

pub mod catalog;
pub mod cell;
pub mod cpu;
pub mod dispatcher;
pub mod error;
pub mod network;
pub mod platform;
pub mod power;
pub mod property;
pub mod sensor;

#[cfg(target_os = "linux")]
pub mod linux;

pub use dispatcher::{Dispatcher, Reading, Response};
pub use error::{Error, Result};
pub use platform::Platform;
pub use property::{Action, PropertyId};

/// D-Bus well-known name of the daemon.
pub const DBUS_SERVICE: &str = "org.devinfo.Daemon";
/// D-Bus object path of the telemetry interface.
pub const DBUS_PATH: &str = "/org/devinfo/Daemon";
