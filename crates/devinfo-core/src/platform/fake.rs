//! In-memory platform used by unit tests.

use super::{
    BatteryNotification, ConnectivitySource, CounterSource, CpuCounters, Platform, PowerListener,
    PowerSource, RawConnection, Registration, SensorEvent, SensorHub, SensorInfo, SensorKind,
    SensorListener, StorageSource, Volume, WifiInfo,
};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct FakeSensorHub {
    pub present: Mutex<Vec<SensorInfo>>,
    pub listeners: Mutex<Vec<(SensorKind, Arc<dyn SensorListener>)>>,
    pub registrations: AtomicUsize,
    pub cancellations: Arc<AtomicUsize>,
}

impl FakeSensorHub {
    pub fn with_sensors(kinds: &[SensorKind]) -> Self {
        let hub = Self::default();
        *hub.present.lock().unwrap() = kinds
            .iter()
            .map(|&kind| SensorInfo {
                name: format!("fake-{}", kind),
                kind,
                max_range: 100.0,
            })
            .collect();
        hub
    }

    /// Delivers an event to every listener registered for `kind`.
    pub fn emit(&self, kind: SensorKind, values: &[f32]) {
        let event = SensorEvent {
            kind,
            values: values.to_vec(),
        };
        for (registered, listener) in self.listeners.lock().unwrap().iter() {
            if *registered == kind {
                listener.on_sensor_changed(&event);
            }
        }
    }
}

impl SensorHub for FakeSensorHub {
    fn sensors(&self, kind: SensorKind) -> Vec<SensorInfo> {
        self.present
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.kind == kind)
            .cloned()
            .collect()
    }

    fn register(
        &self,
        sensor: &SensorInfo,
        listener: Arc<dyn SensorListener>,
    ) -> Result<Registration> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().push((sensor.kind, listener));
        let cancellations = self.cancellations.clone();
        Ok(Registration::new(move || {
            cancellations.fetch_add(1, Ordering::SeqCst);
        }))
    }
}

#[derive(Default)]
pub struct FakePower {
    pub listeners: Mutex<Vec<Arc<dyn PowerListener>>>,
    pub subscriptions: AtomicUsize,
}

impl FakePower {
    pub fn notify(&self, notification: BatteryNotification) {
        for listener in self.listeners.lock().unwrap().iter() {
            listener.on_battery_changed(&notification);
        }
    }
}

impl PowerSource for FakePower {
    fn subscribe(&self, listener: Arc<dyn PowerListener>) -> Result<Registration> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().push(listener);
        Ok(Registration::new(|| {}))
    }
}

/// Returns queued counter readings in order; `None` entries fail.
#[derive(Default)]
pub struct ScriptedCounters {
    pub readings: Mutex<VecDeque<Option<CpuCounters>>>,
}

impl ScriptedCounters {
    pub fn new(readings: &[Option<(f64, f64)>]) -> Self {
        Self {
            readings: Mutex::new(
                readings
                    .iter()
                    .map(|r| r.map(|(used, idle)| CpuCounters { used, idle }))
                    .collect(),
            ),
        }
    }
}

impl CounterSource for ScriptedCounters {
    fn read_cpu_counters(&self) -> Result<CpuCounters> {
        match self.readings.lock().unwrap().pop_front() {
            Some(Some(counters)) => Ok(counters),
            _ => Err(Error::unavailable("cpu", "scripted failure")),
        }
    }
}

#[derive(Default)]
pub struct FakeConnectivity {
    pub active: Mutex<Option<RawConnection>>,
    pub wifi: WifiInfo,
}

impl FakeConnectivity {
    pub fn connected(type_name: &str, subtype_name: &str) -> Self {
        Self {
            active: Mutex::new(Some(RawConnection {
                interface: "test0".to_string(),
                type_name: type_name.to_string(),
                subtype_name: subtype_name.to_string(),
                roaming: false,
            })),
            wifi: WifiInfo::default(),
        }
    }
}

impl ConnectivitySource for FakeConnectivity {
    fn active_network(&self) -> Result<Option<RawConnection>> {
        Ok(self.active.lock().unwrap().clone())
    }

    fn wifi_info(&self, _interface: &str) -> Result<WifiInfo> {
        Ok(self.wifi)
    }
}

#[derive(Default)]
pub struct FakeStorage {
    pub volumes: Vec<Volume>,
}

impl StorageSource for FakeStorage {
    fn volumes(&self) -> Result<Vec<Volume>> {
        Ok(self.volumes.clone())
    }
}

/// Handles to the fakes behind a [`Platform`].
pub struct FakePlatform {
    pub sensors: Arc<FakeSensorHub>,
    pub power: Arc<FakePower>,
    pub cpu: Arc<ScriptedCounters>,
    pub connectivity: Arc<FakeConnectivity>,
    pub storage: Arc<FakeStorage>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            sensors: Arc::new(FakeSensorHub::with_sensors(&[
                SensorKind::Light,
                SensorKind::Proximity,
            ])),
            power: Arc::new(FakePower::default()),
            cpu: Arc::new(ScriptedCounters::default()),
            connectivity: Arc::new(FakeConnectivity::default()),
            storage: Arc::new(FakeStorage::default()),
        }
    }

    pub fn platform(&self) -> Platform {
        Platform {
            sensors: self.sensors.clone(),
            power: self.power.clone(),
            cpu: self.cpu.clone(),
            connectivity: self.connectivity.clone(),
            storage: self.storage.clone(),
        }
    }
}
