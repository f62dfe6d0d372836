//! CPU usage sampler.

use crate::platform::{CounterSource, CpuCounters};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Response record for the `cpu` property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CpuUsage {
    /// Busy percentage since the previous sample (0-100).
    pub usage: f64,
}

/// Computes CPU usage from successive cumulative counter readings.
///
/// The baseline starts at zero, so the first sample reports usage since boot
/// rather than since the sampler was created.
pub struct CpuSampler {
    source: Arc<dyn CounterSource>,
    baseline: CpuCounters,
}

impl CpuSampler {
    /// Creates a sampler with a zero baseline.
    pub fn new(source: Arc<dyn CounterSource>) -> Self {
        Self {
            source,
            baseline: CpuCounters::default(),
        }
    }

    /// Reads the counters and returns usage since the previous sample.
    ///
    /// On a read failure the baseline is left untouched.
    pub fn sample(&mut self) -> Result<CpuUsage> {
        let current = self.source.read_cpu_counters()?;
        debug!("cpu used = {} idle = {}", current.used, current.idle);

        // Counters can step backwards (idle on NO_HZ kernels, resets).
        let used_delta = (current.used - self.baseline.used).max(0.0);
        let idle_delta = (current.idle - self.baseline.idle).max(0.0);
        let total_delta = used_delta + idle_delta;

        let usage = if total_delta > 0.0 {
            used_delta * 100.0 / total_delta
        } else {
            0.0
        };

        self.baseline = current;
        Ok(CpuUsage { usage })
    }

    /// Returns the counters the next sample is measured against.
    pub fn baseline(&self) -> CpuCounters {
        self.baseline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::ScriptedCounters;
    use crate::Error;

    fn sampler(readings: &[Option<(f64, f64)>]) -> CpuSampler {
        CpuSampler::new(Arc::new(ScriptedCounters::new(readings)))
    }

    #[test]
    fn test_delta_usage() {
        let mut cpu = sampler(&[Some((100.0, 900.0)), Some((150.0, 950.0))]);

        // First sample is measured against a zero baseline: usage since boot.
        assert_eq!(cpu.sample().unwrap().usage, 10.0);
        assert_eq!(cpu.sample().unwrap().usage, 50.0);
    }

    #[test]
    fn test_zero_delta_reports_zero() {
        let mut cpu = sampler(&[Some((100.0, 900.0)), Some((100.0, 900.0))]);
        cpu.sample().unwrap();
        assert_eq!(cpu.sample().unwrap().usage, 0.0);
    }

    #[test]
    fn test_backwards_counters_stay_in_range() {
        let mut cpu = sampler(&[
            Some((100.0, 900.0)),
            Some((150.0, 890.0)),
            Some((140.0, 990.0)),
        ]);
        cpu.sample().unwrap();

        // Idle went backwards: all elapsed time counts as busy.
        assert_eq!(cpu.sample().unwrap().usage, 100.0);
        // Used went backwards: nothing counts as busy.
        assert_eq!(cpu.sample().unwrap().usage, 0.0);
        assert_eq!(cpu.baseline(), CpuCounters { used: 140.0, idle: 990.0 });
    }

    #[test]
    fn test_unreadable_source_keeps_baseline() {
        let mut cpu = sampler(&[Some((100.0, 900.0)), None, Some((150.0, 950.0))]);
        cpu.sample().unwrap();

        assert!(matches!(
            cpu.sample(),
            Err(Error::SourceUnavailable { .. })
        ));
        assert_eq!(cpu.baseline(), CpuCounters { used: 100.0, idle: 900.0 });
        assert_eq!(cpu.sample().unwrap().usage, 50.0);
    }
}
