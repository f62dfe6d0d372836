//! CPU counters from `/proc/stat`.

use crate::platform::{CounterSource, CpuCounters};
use crate::{Error, Result};
use std::path::{Path, PathBuf};

/// Reads the aggregate `cpu` line of `/proc/stat`.
#[derive(Debug, Clone)]
pub struct ProcStat {
    path: PathBuf,
}

impl ProcStat {
    pub fn new(procfs_root: &Path) -> Self {
        Self {
            path: procfs_root.join("stat"),
        }
    }
}

impl CounterSource for ProcStat {
    fn read_cpu_counters(&self) -> Result<CpuCounters> {
        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| Error::unavailable("cpu", format!("{}: {}", self.path.display(), e)))?;
        parse_cpu_line(&content)
            .ok_or_else(|| Error::unavailable("cpu", "malformed cpu line in /proc/stat"))
    }
}

/// Parses "cpu  user nice system idle ..." into (user+nice+system, idle).
fn parse_cpu_line(content: &str) -> Option<CpuCounters> {
    let line = content.lines().next()?;
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }

    let values: Vec<f64> = fields.take(4).map(|f| f.parse().ok()).collect::<Option<_>>()?;
    if values.len() < 4 {
        return None;
    }

    Some(CpuCounters {
        used: values[0] + values[1] + values[2],
        idle: values[3],
    })
}
