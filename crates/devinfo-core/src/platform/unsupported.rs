//! Stub sources for platforms without a backend.

use super::{
    ConnectivitySource, CounterSource, CpuCounters, PowerListener, PowerSource, RawConnection,
    Registration, SensorHub, SensorInfo, SensorKind, SensorListener, StorageSource, Volume,
    WifiInfo,
};
use crate::{Error, Result};
use std::sync::Arc;

/// Every source reports itself unavailable; no sensors are present.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl SensorHub for Unsupported {
    fn sensors(&self, _kind: SensorKind) -> Vec<SensorInfo> {
        Vec::new()
    }

    fn register(
        &self,
        sensor: &SensorInfo,
        _listener: Arc<dyn SensorListener>,
    ) -> Result<Registration> {
        Err(Error::unavailable("sensor", format!("{} has no backend", sensor.name)))
    }
}

impl PowerSource for Unsupported {
    fn subscribe(&self, _listener: Arc<dyn PowerListener>) -> Result<Registration> {
        Err(Error::unavailable("power", "no backend on this platform"))
    }
}

impl CounterSource for Unsupported {
    fn read_cpu_counters(&self) -> Result<CpuCounters> {
        Err(Error::unavailable("cpu", "no backend on this platform"))
    }
}

impl ConnectivitySource for Unsupported {
    fn active_network(&self) -> Result<Option<RawConnection>> {
        Err(Error::unavailable("network", "no backend on this platform"))
    }

    fn wifi_info(&self, _interface: &str) -> Result<WifiInfo> {
        Err(Error::unavailable("wifi", "no backend on this platform"))
    }
}

impl StorageSource for Unsupported {
    fn volumes(&self) -> Result<Vec<Volume>> {
        Err(Error::unavailable("storage", "no backend on this platform"))
    }
}
