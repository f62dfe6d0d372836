//! Ambient sensors from the Industrial I/O subsystem.
//!
//! Devices live under `/sys/bus/iio/devices/iio:deviceN`. A device provides a
//! kind of sensor if it exposes the matching channel, either as a processed
//! `<channel>_input` or as `<channel>_raw` with an optional `<channel>_scale`.

use super::{read_f64, spawn_poller};
use crate::platform::{
    Registration, SensorEvent, SensorHub, SensorInfo, SensorKind, SensorListener,
};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// IIO-backed sensor hub.
#[derive(Debug, Clone)]
pub struct IioSensorHub {
    devices_dir: PathBuf,
    interval: Duration,
}

impl IioSensorHub {
    pub fn new(sysfs_root: &Path, interval: Duration) -> Self {
        Self {
            devices_dir: sysfs_root.join("bus/iio/devices"),
            interval,
        }
    }
}

fn channel(kind: SensorKind) -> &'static str {
    match kind {
        SensorKind::Light => "in_illuminance",
        SensorKind::Pressure => "in_pressure",
        SensorKind::Proximity => "in_proximity",
    }
}

/// Upper bound used for normalization: lux, kPa, and raw proximity counts.
fn max_range(kind: SensorKind) -> f32 {
    match kind {
        SensorKind::Light => 10_000.0,
        SensorKind::Pressure => 110.0,
        SensorKind::Proximity => 255.0,
    }
}

fn provides(device: &Path, kind: SensorKind) -> bool {
    let channel = channel(kind);
    device.join(format!("{channel}_input")).exists() || device.join(format!("{channel}_raw")).exists()
}

/// Reads one value of `kind` from an IIO device directory.
fn read_channel(device: &Path, kind: SensorKind) -> Option<f32> {
    let channel = channel(kind);
    if let Some(value) = read_f64(&device.join(format!("{channel}_input"))) {
        return Some(value as f32);
    }
    let raw = read_f64(&device.join(format!("{channel}_raw")))?;
    let scale = read_f64(&device.join(format!("{channel}_scale"))).unwrap_or(1.0);
    Some((raw * scale) as f32)
}

impl SensorHub for IioSensorHub {
    fn sensors(&self, kind: SensorKind) -> Vec<SensorInfo> {
        let Ok(entries) = std::fs::read_dir(&self.devices_dir) else {
            return Vec::new();
        };

        let mut sensors: Vec<SensorInfo> = entries
            .flatten()
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|n| n.starts_with("iio:device"))
            })
            .filter(|e| provides(&e.path(), kind))
            .map(|e| SensorInfo {
                name: e.file_name().to_string_lossy().to_string(),
                kind,
                max_range: max_range(kind),
            })
            .collect();
        sensors.sort_by(|a, b| a.name.cmp(&b.name));
        sensors
    }

    fn register(
        &self,
        sensor: &SensorInfo,
        listener: Arc<dyn SensorListener>,
    ) -> Result<Registration> {
        let device = self.devices_dir.join(&sensor.name);
        let kind = sensor.kind;
        let mut last: Option<f32> = None;

        debug!("Polling {} on {} every {:?}", kind, device.display(), self.interval);
        spawn_poller(format!("iio-{}", kind), self.interval, move || {
            let Some(value) = read_channel(&device, kind) else {
                return;
            };
            if last == Some(value) {
                return;
            }
            last = Some(value);
            listener.on_sensor_changed(&SensorEvent {
                kind,
                values: vec![value],
            });
        })
    }
}
