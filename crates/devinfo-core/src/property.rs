//! Property identifiers, actions and the capability map.

use crate::{Error, Result};
use serde::Serialize;
use std::str::FromStr;

/// A named piece of device telemetry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyId {
    Cpu,
    Power,
    Thermal,
    AmbientLight,
    AmbientAtmosphericPressure,
    Proximity,
    Storage,
    AvCodecs,
    Network,
    AmbientNoise,
    AmbientTemperature,
    Connection,
    AudioCodec,
    VideoCodec,
    StorageUnit,
    OutputDevices,
    InputDevices,
}

impl PropertyId {
    /// Every property, in capability-map order.
    pub const ALL: [PropertyId; 17] = [
        PropertyId::Power,
        PropertyId::Cpu,
        PropertyId::Thermal,
        PropertyId::Network,
        PropertyId::Connection,
        PropertyId::AmbientLight,
        PropertyId::AmbientNoise,
        PropertyId::AmbientTemperature,
        PropertyId::AmbientAtmosphericPressure,
        PropertyId::Proximity,
        PropertyId::AvCodecs,
        PropertyId::AudioCodec,
        PropertyId::VideoCodec,
        PropertyId::Storage,
        PropertyId::StorageUnit,
        PropertyId::OutputDevices,
        PropertyId::InputDevices,
    ];

    /// Returns the canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyId::Cpu => "cpu",
            PropertyId::Power => "power",
            PropertyId::Thermal => "thermal",
            PropertyId::AmbientLight => "ambientlight",
            PropertyId::AmbientAtmosphericPressure => "ambientatmosphericpressure",
            PropertyId::Proximity => "proximity",
            PropertyId::Storage => "storage",
            PropertyId::AvCodecs => "avcodecs",
            PropertyId::Network => "network",
            PropertyId::AmbientNoise => "ambientnoise",
            PropertyId::AmbientTemperature => "ambienttemperature",
            PropertyId::Connection => "connection",
            PropertyId::AudioCodec => "audiocodec",
            PropertyId::VideoCodec => "videocodec",
            PropertyId::StorageUnit => "storageunit",
            PropertyId::OutputDevices => "outputdevices",
            PropertyId::InputDevices => "inputdevices",
        }
    }

    /// Capability map entry: true if the property is separately gettable,
    /// false if it only describes a field of another property.
    pub fn is_queryable(&self) -> bool {
        match self {
            PropertyId::Power
            | PropertyId::Cpu
            | PropertyId::Thermal
            | PropertyId::Network
            | PropertyId::AmbientLight
            | PropertyId::AmbientNoise
            | PropertyId::AmbientTemperature
            | PropertyId::AmbientAtmosphericPressure
            | PropertyId::Proximity
            | PropertyId::AvCodecs
            | PropertyId::Storage => true,
            PropertyId::Connection
            | PropertyId::AudioCodec
            | PropertyId::VideoCodec
            | PropertyId::StorageUnit
            | PropertyId::OutputDevices
            | PropertyId::InputDevices => false,
        }
    }
}

impl FromStr for PropertyId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::MissingProperty);
        }
        let lower = trimmed.to_lowercase();
        PropertyId::ALL
            .into_iter()
            .find(|p| p.as_str() == lower)
            .ok_or_else(|| Error::UnknownProperty(trimmed.to_string()))
    }
}

impl std::fmt::Display for PropertyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read the current value of a property.
    Get,
    /// Check whether the device supports a property.
    Has,
    /// Subscribe to property changes (not implemented).
    Monitor,
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "get" => Ok(Action::Get),
            "has" => Ok(Action::Has),
            "monitor" => Ok(Action::Monitor),
            _ => Err(Error::UnknownAction(s.to_string())),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Get => write!(f, "get"),
            Action::Has => write!(f, "has"),
            Action::Monitor => write!(f, "monitor"),
        }
    }
}
