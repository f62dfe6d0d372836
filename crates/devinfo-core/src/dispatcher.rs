//! Property dispatcher.
//!
//! Routes `(action, property)` requests to the adapter that owns the property.
//! Adapters are built on first use and kept for the dispatcher's lifetime.

use crate::catalog::{self, AvCodecs, StorageUnit};
use crate::cpu::{CpuSampler, CpuUsage};
use crate::network::{ConnectionInfo, NetworkConnections};
use crate::platform::{Platform, SensorKind};
use crate::power::{PowerMonitor, PowerStatus, ThermalStatus};
use crate::property::{Action, PropertyId};
use crate::sensor::{AmbientSensor, SensorReading, SensorState};
use crate::{Error, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Record returned by `get`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reading {
    Cpu(CpuUsage),
    Power(PowerStatus),
    Thermal(ThermalStatus),
    Sensor(SensorReading),
    Network(Vec<ConnectionInfo>),
    Storage(Vec<StorageUnit>),
    Codecs(AvCodecs),
}

/// Result of a dispatched request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Answer to `get`.
    Value(Reading),
    /// Answer to `has`.
    Capability(bool),
}

/// Owns one adapter per telemetry source.
pub struct Dispatcher {
    platform: Platform,
    light: Option<AmbientSensor>,
    pressure: Option<AmbientSensor>,
    proximity: Option<AmbientSensor>,
    power: Option<PowerMonitor>,
    cpu: Option<CpuSampler>,
    network: Option<NetworkConnections>,
}

impl Dispatcher {
    /// Creates a dispatcher. No adapter is built until first requested.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            light: None,
            pressure: None,
            proximity: None,
            power: None,
            cpu: None,
            network: None,
        }
    }

    /// Dispatches a request named by strings, as received from a host.
    pub fn execute(&mut self, action: &str, property: &str) -> Result<Response> {
        let action: Action = action.parse()?;
        let property: PropertyId = property.parse()?;
        self.dispatch(action, property)
    }

    /// Dispatches a typed request.
    pub fn dispatch(&mut self, action: Action, property: PropertyId) -> Result<Response> {
        debug!("Dispatch {} {}", action, property);
        match action {
            Action::Get => self.get_property(property).map(Response::Value),
            Action::Has => Ok(Response::Capability(self.has_property(property))),
            Action::Monitor => Err(Error::NotSupported {
                action,
                property: property.to_string(),
            }),
        }
    }

    /// `get` for a property name.
    pub fn get(&mut self, property: &str) -> Result<Reading> {
        self.get_property(property.parse()?)
    }

    /// `has` for a property name.
    pub fn has(&mut self, property: &str) -> Result<bool> {
        Ok(self.has_property(property.parse()?))
    }

    /// `monitor` for a property name. Always fails with `NotSupported`
    /// once the name is valid.
    pub fn monitor(&mut self, property: &str) -> Result<()> {
        let property: PropertyId = property.parse()?;
        self.dispatch(Action::Monitor, property).map(|_| ())
    }

    /// The capability map as `(property, queryable)` pairs.
    pub fn properties(&self) -> Vec<(PropertyId, bool)> {
        PropertyId::ALL
            .into_iter()
            .map(|p| (p, p.is_queryable()))
            .collect()
    }

    /// Reads the current value of `property`.
    pub fn get_property(&mut self, property: PropertyId) -> Result<Reading> {
        match property {
            PropertyId::Cpu => {
                let source = self.platform.cpu.clone();
                let cpu = self.cpu.get_or_insert_with(|| CpuSampler::new(source));
                cpu.sample().map(Reading::Cpu)
            }
            PropertyId::Power => Ok(Reading::Power(self.power_monitor()?.power_status())),
            PropertyId::Thermal => Ok(Reading::Thermal(self.power_monitor()?.thermal_status())),
            PropertyId::AmbientLight => self.sensor_reading(SensorKind::Light),
            PropertyId::AmbientAtmosphericPressure => self.sensor_reading(SensorKind::Pressure),
            PropertyId::Proximity => self.sensor_reading(SensorKind::Proximity),
            PropertyId::Network => {
                let source = self.platform.connectivity.clone();
                let network = self
                    .network
                    .get_or_insert_with(|| NetworkConnections::new(source));
                network.active_connections().map(Reading::Network)
            }
            PropertyId::Storage => {
                let volumes = self.platform.storage.volumes()?;
                Ok(Reading::Storage(
                    volumes.iter().map(StorageUnit::from).collect(),
                ))
            }
            PropertyId::AvCodecs => Ok(Reading::Codecs(catalog::codecs())),
            PropertyId::AmbientNoise
            | PropertyId::AmbientTemperature
            | PropertyId::Connection
            | PropertyId::AudioCodec
            | PropertyId::VideoCodec
            | PropertyId::StorageUnit
            | PropertyId::OutputDevices
            | PropertyId::InputDevices => Err(Error::NotSupported {
                action: Action::Get,
                property: property.to_string(),
            }),
        }
    }

    /// Whether the device supports `property`.
    ///
    /// Ambient sensors are checked against the hardware without starting
    /// them; everything else comes from the capability map.
    pub fn has_property(&mut self, property: PropertyId) -> bool {
        match property {
            PropertyId::AmbientLight => self.sensor(SensorKind::Light).has_sensor(),
            PropertyId::AmbientAtmosphericPressure => {
                self.sensor(SensorKind::Pressure).has_sensor()
            }
            PropertyId::Proximity => self.sensor(SensorKind::Proximity).has_sensor(),
            other => other.is_queryable(),
        }
    }

    fn sensor(&mut self, kind: SensorKind) -> &mut AmbientSensor {
        let slot = match kind {
            SensorKind::Light => &mut self.light,
            SensorKind::Pressure => &mut self.pressure,
            SensorKind::Proximity => &mut self.proximity,
        };
        let hub = self.platform.sensors.clone();
        slot.get_or_insert_with(|| AmbientSensor::new(hub, kind))
    }

    fn sensor_reading(&mut self, kind: SensorKind) -> Result<Reading> {
        let sensor = self.sensor(kind);
        let retrying = sensor.state() == SensorState::FailedToStart;
        match sensor.start() {
            SensorState::Starting | SensorState::Running => Ok(Reading::Sensor(sensor.reading())),
            SensorState::FailedToStart | SensorState::Stopped => {
                if retrying {
                    debug!("Still no {} sensor available", kind);
                } else {
                    warn!("No {} sensor available", kind);
                }
                Err(Error::unavailable(
                    "sensor",
                    format!("no {} sensor could be started", kind),
                ))
            }
        }
    }

    fn power_monitor(&mut self) -> Result<&PowerMonitor> {
        if self.power.is_none() {
            self.power = Some(PowerMonitor::subscribe(self.platform.power.as_ref())?);
        }
        match &self.power {
            Some(power) => Ok(power),
            None => Err(Error::unavailable("power", "adapter not initialized")),
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("light", &self.light)
            .field("pressure", &self.pressure)
            .field("proximity", &self.proximity)
            .field("power", &self.power.is_some())
            .field("cpu", &self.cpu.is_some())
            .field("network", &self.network.is_some())
            .finish()
    }
}
