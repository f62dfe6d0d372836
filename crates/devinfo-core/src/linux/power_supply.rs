//! Battery notifications from `/sys/class/power_supply`.
//!
//! Linux has no battery broadcast, so a poller reads the class directory and
//! emits a notification whenever the reading changes.

use super::{read_i64, read_trimmed, spawn_poller};
use crate::platform::{BatteryNotification, PowerListener, PowerSource, Registration};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Power supply class reader.
#[derive(Debug, Clone)]
pub struct PowerSupplyClass {
    class_dir: PathBuf,
    thermal_zone: PathBuf,
    interval: Duration,
}

impl PowerSupplyClass {
    pub fn new(sysfs_root: &Path, interval: Duration) -> Self {
        Self {
            class_dir: sysfs_root.join("class/power_supply"),
            thermal_zone: sysfs_root.join("class/thermal/thermal_zone0/temp"),
            interval,
        }
    }

    /// Reads the current battery state.
    pub fn read(&self) -> Result<BatteryNotification> {
        let entries = std::fs::read_dir(&self.class_dir).map_err(|e| {
            Error::unavailable("power", format!("{}: {}", self.class_dir.display(), e))
        })?;

        let mut notification = BatteryNotification::default();
        let mut has_battery = false;
        let mut mains_online = false;
        let mut usb_online = false;

        let mut supplies: Vec<PathBuf> = entries.flatten().map(|e| e.path()).collect();
        supplies.sort();

        for dir in supplies {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let kind = read_trimmed(&dir.join("type")).unwrap_or_else(|| guess_type(&name));
            let online = read_i64(&dir.join("online")) == Some(1);

            match kind.as_str() {
                "Battery" if !has_battery => {
                    has_battery = true;
                    notification.level = read_i64(&dir.join("capacity")).map(|v| v as i32);
                    // Reported in tenths of a degree Celsius.
                    notification.temperature = read_i64(&dir.join("temp")).map(|v| v as i32);
                }
                "Mains" => mains_online |= online,
                "USB" | "USB_C" | "USB_PD" => usb_online |= online,
                _ => {}
            }
        }

        notification.plugged = if mains_online {
            Some(1)
        } else if usb_online {
            Some(2)
        } else if has_battery {
            Some(0)
        } else {
            None
        };

        if notification.temperature.is_none() {
            // Millidegrees Celsius.
            notification.temperature =
                read_i64(&self.thermal_zone).map(|millis| (millis / 100) as i32);
        }

        Ok(notification)
    }
}

fn guess_type(name: &str) -> String {
    if name.starts_with("BAT") {
        "Battery".to_string()
    } else if name.starts_with("AC") || name.starts_with("ADP") {
        "Mains".to_string()
    } else if name.starts_with("USB") || name.starts_with("ucsi") {
        "USB".to_string()
    } else {
        "Unknown".to_string()
    }
}

impl PowerSource for PowerSupplyClass {
    fn subscribe(&self, listener: Arc<dyn PowerListener>) -> Result<Registration> {
        // Fail up front when the class is missing entirely.
        let first = self.read()?;
        listener.on_battery_changed(&first);

        let reader = self.clone();
        let mut last = first;
        debug!("Polling {} every {:?}", self.class_dir.display(), self.interval);
        spawn_poller("power-supply".to_string(), self.interval, move || {
            let Ok(current) = reader.read() else {
                return;
            };
            if current != last {
                last = current;
                listener.on_battery_changed(&current);
            }
        })
    }
}
