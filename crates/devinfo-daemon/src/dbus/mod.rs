//! D-Bus interface for the devinfo daemon.
//!
//! Provides the `org.devinfo.Telemetry1` interface.

mod interface;

pub use interface::run_dbus_server;
