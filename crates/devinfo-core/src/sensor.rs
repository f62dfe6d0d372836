//! Ambient sensor adapter.
//!
//! Wraps one physical sensor (light, pressure or proximity). The adapter
//! registers itself with the [`SensorHub`] on `start()` and keeps the most
//! recent value in a [`SnapshotCell`] that the hub's callback thread writes.

use crate::cell::SnapshotCell;
use crate::platform::{Registration, SensorEvent, SensorHub, SensorKind, SensorListener};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Listener lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorState {
    #[default]
    Stopped,
    /// Registered, no value received yet.
    Starting,
    /// At least one value received since the last start.
    Running,
    /// No sensor of the requested kind, or registration failed.
    FailedToStart,
}

/// Most recent sensor value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub value: f32,
    pub min: f32,
    pub max: f32,
    /// `value` scaled into 0.0-1.0 against the sensor's range.
    pub normalized_value: f32,
}

impl SensorReading {
    fn from_value(value: f32, max_range: f32) -> Self {
        let normalized_value = if max_range > 0.0 {
            (value / max_range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            value,
            min: 0.0,
            max: max_range,
            normalized_value,
        }
    }
}

/// State shared with the hub's callback thread.
struct Shared {
    kind: SensorKind,
    state: SnapshotCell<SensorState>,
    reading: SnapshotCell<SensorReading>,
    max_range: SnapshotCell<f32>,
}

impl SensorListener for Shared {
    fn on_sensor_changed(&self, event: &SensorEvent) {
        if event.kind != self.kind {
            return;
        }
        let Some(&value) = event.values.first() else {
            return;
        };

        self.reading
            .store(SensorReading::from_value(value, self.max_range.load()));
        self.state.update(|state| match state {
            SensorState::Starting => SensorState::Running,
            other => other,
        });
    }
}

/// Adapter for one ambient sensor.
pub struct AmbientSensor {
    hub: Arc<dyn SensorHub>,
    shared: Arc<Shared>,
    registration: Option<Registration>,
}

impl AmbientSensor {
    /// Creates a stopped adapter. Does not touch the hardware.
    pub fn new(hub: Arc<dyn SensorHub>, kind: SensorKind) -> Self {
        Self {
            hub,
            shared: Arc::new(Shared {
                kind,
                state: SnapshotCell::new(SensorState::Stopped),
                reading: SnapshotCell::new(SensorReading::default()),
                max_range: SnapshotCell::new(0.0),
            }),
            registration: None,
        }
    }

    /// Returns the sensor kind.
    pub fn kind(&self) -> SensorKind {
        self.shared.kind
    }

    /// Returns the listener state.
    pub fn state(&self) -> SensorState {
        self.shared.state.load()
    }

    /// Starts listening. Returns the resulting state.
    ///
    /// Calling this while starting or running is a no-op.
    pub fn start(&mut self) -> SensorState {
        let current = self.state();
        if matches!(current, SensorState::Starting | SensorState::Running) {
            return current;
        }

        let kind = self.shared.kind;
        let sensors = self.hub.sensors(kind);
        debug!("Found {} sensor(s) of type {}", sensors.len(), kind);

        let Some(sensor) = sensors.into_iter().next() else {
            self.shared.state.store(SensorState::FailedToStart);
            return SensorState::FailedToStart;
        };

        self.shared.max_range.store(sensor.max_range);
        self.shared.state.store(SensorState::Starting);

        let listener: Arc<dyn SensorListener> = self.shared.clone();
        match self.hub.register(&sensor, listener) {
            Ok(registration) => {
                debug!("Registered {} listener on {}", kind, sensor.name);
                self.registration = Some(registration);
            }
            Err(e) => {
                warn!("Failed to register {} listener: {}", kind, e);
                self.shared.state.store(SensorState::FailedToStart);
            }
        }

        self.state()
    }

    /// Stops listening. Safe to call in any state.
    pub fn stop(&mut self) {
        self.shared.state.store(SensorState::Stopped);
        if let Some(registration) = self.registration.take() {
            registration.cancel();
            debug!("Unregistered {} listener", self.shared.kind);
        }
    }

    /// Whether the device has a sensor of this kind.
    pub fn has_sensor(&self) -> bool {
        !self.hub.sensors(self.shared.kind).is_empty()
    }

    /// Returns the most recent value; all zero until the first callback.
    pub fn reading(&self) -> SensorReading {
        self.shared.reading.load()
    }
}

impl std::fmt::Debug for AmbientSensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientSensor")
            .field("kind", &self.shared.kind)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakeSensorHub;
    use std::sync::atomic::Ordering;

    fn light_hub() -> Arc<FakeSensorHub> {
        Arc::new(FakeSensorHub::with_sensors(&[SensorKind::Light]))
    }

    #[test]
    fn test_start_is_idempotent() {
        let hub = light_hub();
        let mut sensor = AmbientSensor::new(hub.clone(), SensorKind::Light);

        assert_eq!(sensor.start(), SensorState::Starting);
        assert_eq!(sensor.start(), SensorState::Starting);
        assert_eq!(hub.registrations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_start_without_hardware_fails() {
        let hub = light_hub();
        let mut sensor = AmbientSensor::new(hub.clone(), SensorKind::Pressure);

        assert_eq!(sensor.start(), SensorState::FailedToStart);
        assert_eq!(hub.registrations.load(Ordering::SeqCst), 0);
        assert!(!sensor.has_sensor());
    }

    #[test]
    fn test_callback_updates_reading_and_state() {
        let hub = light_hub();
        let mut sensor = AmbientSensor::new(hub.clone(), SensorKind::Light);
        assert_eq!(sensor.reading(), SensorReading::default());

        sensor.start();
        hub.emit(SensorKind::Light, &[25.0, 1.0]);

        assert_eq!(sensor.state(), SensorState::Running);
        let reading = sensor.reading();
        assert_eq!(reading.value, 25.0);
        assert_eq!(reading.min, 0.0);
        assert_eq!(reading.max, 100.0);
        assert!((reading.normalized_value - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ignores_other_kinds_and_empty_events() {
        let shared = Shared {
            kind: SensorKind::Light,
            state: SnapshotCell::new(SensorState::Starting),
            reading: SnapshotCell::new(SensorReading::default()),
            max_range: SnapshotCell::new(10.0),
        };
        shared.on_sensor_changed(&SensorEvent {
            kind: SensorKind::Proximity,
            values: vec![5.0],
        });
        shared.on_sensor_changed(&SensorEvent {
            kind: SensorKind::Light,
            values: vec![],
        });
        assert_eq!(shared.reading.load(), SensorReading::default());
        assert_eq!(shared.state.load(), SensorState::Starting);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let hub = light_hub();
        let mut sensor = AmbientSensor::new(hub.clone(), SensorKind::Light);

        sensor.stop();
        assert_eq!(sensor.state(), SensorState::Stopped);

        sensor.start();
        sensor.stop();
        sensor.stop();
        assert_eq!(sensor.state(), SensorState::Stopped);
        assert_eq!(hub.cancellations.load(Ordering::SeqCst), 1);

        // Restart after stop registers again.
        assert_eq!(sensor.start(), SensorState::Starting);
        assert_eq!(hub.registrations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_has_sensor_does_not_start() {
        let hub = light_hub();
        let sensor = AmbientSensor::new(hub.clone(), SensorKind::Light);
        assert!(sensor.has_sensor());
        assert_eq!(sensor.state(), SensorState::Stopped);
        assert_eq!(hub.registrations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_normalized_value_is_clamped() {
        assert_eq!(SensorReading::from_value(250.0, 100.0).normalized_value, 1.0);
        assert_eq!(SensorReading::from_value(-3.0, 100.0).normalized_value, 0.0);
        assert_eq!(SensorReading::from_value(3.0, 0.0).normalized_value, 0.0);
    }
}
