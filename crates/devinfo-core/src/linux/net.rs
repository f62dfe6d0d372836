//! Active connection detection from procfs and sysfs.

use super::{read_i64, read_trimmed};
use crate::platform::{ConnectivitySource, RawConnection, WifiInfo};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Connectivity source backed by the routing table.
#[derive(Debug, Clone)]
pub struct LinuxConnectivity {
    proc_net: PathBuf,
    sys_net: PathBuf,
}

impl LinuxConnectivity {
    pub fn new(procfs_root: &Path, sysfs_root: &Path) -> Self {
        Self {
            proc_net: procfs_root.join("net"),
            sys_net: sysfs_root.join("class/net"),
        }
    }

    /// Platform type name for an interface: WIFI, MOBILE or ETHERNET.
    fn type_name(&self, interface: &str) -> &'static str {
        let dir = self.sys_net.join(interface);
        if dir.join("wireless").exists() || dir.join("phy80211").exists() {
            return "WIFI";
        }
        let uevent = read_trimmed(&dir.join("uevent")).unwrap_or_default();
        if uevent.lines().any(|l| l.trim() == "DEVTYPE=wwan") {
            "MOBILE"
        } else {
            "ETHERNET"
        }
    }
}

/// Returns the interface holding the default route.
fn default_route_interface(route_table: &str) -> Option<String> {
    // Iface Destination Gateway Flags ...
    route_table.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() >= 2 && fields[1] == "00000000" {
            Some(fields[0].to_string())
        } else {
            None
        }
    })
}

/// Returns the signal level in dBm for `interface` from `/proc/net/wireless`.
fn wireless_level(wireless: &str, interface: &str) -> Option<i32> {
    // Two header lines, then "wlan0: 0000   70.  -40.  -256  ..."
    wireless.lines().skip(2).find_map(|line| {
        let (name, rest) = line.split_once(':')?;
        if name.trim() != interface {
            return None;
        }
        let level = rest.split_whitespace().nth(2)?;
        let level: f64 = level.trim_end_matches('.').parse().ok()?;
        Some(level as i32)
    })
}

impl ConnectivitySource for LinuxConnectivity {
    fn active_network(&self) -> Result<Option<RawConnection>> {
        let route_path = self.proc_net.join("route");
        let routes = std::fs::read_to_string(&route_path).map_err(|e| {
            Error::unavailable("network", format!("{}: {}", route_path.display(), e))
        })?;

        let Some(interface) = default_route_interface(&routes) else {
            return Ok(None);
        };
        if read_trimmed(&self.sys_net.join(&interface).join("operstate")).as_deref() == Some("down")
        {
            return Ok(None);
        }

        Ok(Some(RawConnection {
            type_name: self.type_name(&interface).to_string(),
            subtype_name: String::new(),
            roaming: false,
            interface,
        }))
    }

    /// Signal level and link speed; either is 0 when the kernel does not
    /// expose it. Most 802.11 drivers reject reads of `speed`.
    fn wifi_info(&self, interface: &str) -> Result<WifiInfo> {
        let wireless_path = self.proc_net.join("wireless");
        let rssi = match std::fs::read_to_string(&wireless_path) {
            Ok(wireless) => wireless_level(&wireless, interface).unwrap_or_else(|| {
                debug!("No {} row in {}", interface, wireless_path.display());
                0
            }),
            Err(e) => {
                warn!("Cannot read {}: {}", wireless_path.display(), e);
                0
            }
        };

        let link_speed = read_i64(&self.sys_net.join(interface).join("speed"))
            .filter(|&speed| speed > 0)
            .unwrap_or(0);

        Ok(WifiInfo { link_speed, rssi })
    }
}
