//! Battery and thermal state adapter.
//!
//! Passive: the adapter never polls. It holds whatever the last battery
//! notification said and reports zeros until the first one arrives.

use crate::cell::SnapshotCell;
use crate::platform::{BatteryNotification, PowerListener, PowerSource, Registration};
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Last received battery state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PowerSnapshot {
    /// Charge level, 0-100.
    pub level: i32,
    /// Never computed; always 0.
    pub time_remaining: i64,
    pub is_battery: bool,
    pub is_charging: bool,
    /// Battery temperature in tenths of a degree Celsius.
    pub thermal_state: i32,
}

impl PowerSnapshot {
    fn from_notification(notification: &BatteryNotification) -> Self {
        let plugged = notification.plugged.unwrap_or(-1);
        Self {
            level: notification.level.unwrap_or(0),
            time_remaining: 0,
            is_battery: plugged == 0,
            is_charging: plugged > 0,
            thermal_state: notification.temperature.unwrap_or(-1),
        }
    }
}

/// Response record for the `power` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerStatus {
    pub level: i32,
    pub time_remaining: i64,
    pub is_battery: bool,
    pub is_charging: bool,
}

/// Response record for the `thermal` property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThermalStatus {
    pub state: i32,
}

struct Receiver {
    snapshot: SnapshotCell<PowerSnapshot>,
}

impl PowerListener for Receiver {
    fn on_battery_changed(&self, notification: &BatteryNotification) {
        let snapshot = PowerSnapshot::from_notification(notification);
        debug!(
            "Battery level {}, charging {}, temperature {}",
            snapshot.level, snapshot.is_charging, snapshot.thermal_state
        );
        self.snapshot.store(snapshot);
    }
}

/// Power adapter holding its platform subscription.
pub struct PowerMonitor {
    receiver: Arc<Receiver>,
    _registration: Registration,
}

impl PowerMonitor {
    /// Creates the adapter and subscribes it to battery notifications.
    pub fn subscribe(source: &dyn PowerSource) -> Result<Self> {
        let receiver = Arc::new(Receiver {
            snapshot: SnapshotCell::new(PowerSnapshot::default()),
        });
        let listener: Arc<dyn PowerListener> = receiver.clone();
        let registration = source.subscribe(listener).map_err(|e| match e {
            Error::Io(e) => Error::unavailable("power", format!("cannot subscribe: {}", e)),
            other => other,
        })?;
        debug!("Subscribed to battery notifications");
        Ok(Self {
            receiver,
            _registration: registration,
        })
    }

    /// Returns the raw snapshot.
    pub fn snapshot(&self) -> PowerSnapshot {
        self.receiver.snapshot.load()
    }

    /// Returns the `power` record.
    pub fn power_status(&self) -> PowerStatus {
        let snapshot = self.snapshot();
        PowerStatus {
            level: snapshot.level,
            time_remaining: snapshot.time_remaining,
            is_battery: snapshot.is_battery,
            is_charging: snapshot.is_charging,
        }
    }

    /// Returns the `thermal` record.
    pub fn thermal_status(&self) -> ThermalStatus {
        ThermalStatus {
            state: self.snapshot().thermal_state,
        }
    }
}

impl std::fmt::Debug for PowerMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PowerMonitor")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakePower;

    #[test]
    fn test_defaults_before_notification() {
        let source = FakePower::default();
        let monitor = PowerMonitor::subscribe(&source).unwrap();

        assert_eq!(monitor.snapshot(), PowerSnapshot::default());
        assert_eq!(
            monitor.power_status(),
            PowerStatus {
                level: 0,
                time_remaining: 0,
                is_battery: false,
                is_charging: false,
            }
        );
        assert_eq!(monitor.thermal_status().state, 0);
    }

    struct NoThreads;

    impl PowerSource for NoThreads {
        fn subscribe(&self, _listener: Arc<dyn PowerListener>) -> Result<Registration> {
            Err(std::io::Error::new(std::io::ErrorKind::WouldBlock, "thread limit").into())
        }
    }

    #[test]
    fn test_subscribe_io_failure_is_unavailable() {
        assert!(matches!(
            PowerMonitor::subscribe(&NoThreads),
            Err(Error::SourceUnavailable {
                source_name: "power",
                ..
            })
        ));
    }

    #[test]
    fn test_on_battery() {
        let source = FakePower::default();
        let monitor = PowerMonitor::subscribe(&source).unwrap();

        source.notify(BatteryNotification {
            level: Some(57),
            plugged: Some(0),
            temperature: Some(312),
        });

        let status = monitor.power_status();
        assert_eq!(status.level, 57);
        assert!(status.is_battery);
        assert!(!status.is_charging);
        assert_eq!(monitor.thermal_status().state, 312);
    }

    #[test]
    fn test_plugged_in() {
        let snapshot = PowerSnapshot::from_notification(&BatteryNotification {
            level: Some(90),
            plugged: Some(2),
            temperature: None,
        });
        assert!(!snapshot.is_battery);
        assert!(snapshot.is_charging);
        assert_eq!(snapshot.thermal_state, -1);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let snapshot = PowerSnapshot::from_notification(&BatteryNotification::default());
        assert_eq!(snapshot.level, 0);
        assert!(!snapshot.is_battery);
        assert!(!snapshot.is_charging);
        assert_eq!(snapshot.thermal_state, -1);
        assert_eq!(snapshot.time_remaining, 0);
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(PowerStatus {
            level: 10,
            time_remaining: 0,
            is_battery: true,
            is_charging: false,
        })
        .unwrap();
        assert_eq!(json["timeRemaining"], 0);
        assert_eq!(json["isBattery"], true);
    }
}
