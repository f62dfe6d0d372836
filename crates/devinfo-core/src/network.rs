//! Active network connection classifier.

use crate::platform::{ConnectivitySource, RawConnection, WifiInfo};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Connection type taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionType {
    #[serde(rename = "wifi")]
    Wifi,
    #[serde(rename = "2g")]
    Mobile2g,
    #[serde(rename = "3g")]
    Mobile3g,
    #[serde(rename = "4g")]
    Mobile4g,
    /// Mobile connection with an unrecognized subtype.
    #[serde(rename = "x-mobile")]
    XMobile,
    #[serde(rename = "unknown")]
    Unknown,
}

impl ConnectionType {
    /// Classifies a platform type name and subtype name.
    pub fn classify(type_name: &str, subtype_name: &str) -> Self {
        if type_name.eq_ignore_ascii_case("wifi") {
            return ConnectionType::Wifi;
        }
        if !type_name.eq_ignore_ascii_case("mobile") {
            return ConnectionType::Unknown;
        }

        match subtype_name.to_lowercase().as_str() {
            "gsm" | "gprs" | "edge" => ConnectionType::Mobile2g,
            "cdma" | "umts" => ConnectionType::Mobile3g,
            "lte" | "umb" => ConnectionType::Mobile4g,
            _ => ConnectionType::XMobile,
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionType::Wifi => write!(f, "wifi"),
            ConnectionType::Mobile2g => write!(f, "2g"),
            ConnectionType::Mobile3g => write!(f, "3g"),
            ConnectionType::Mobile4g => write!(f, "4g"),
            ConnectionType::XMobile => write!(f, "x-mobile"),
            ConnectionType::Unknown => write!(f, "unknown"),
        }
    }
}

/// One active connection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionInfo {
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub roaming: bool,
    pub current_download_bandwidth: i64,
    pub current_upload_bandwidth: i64,
    pub max_download_bandwidth: i64,
    pub max_upload_bandwidth: i64,
    pub current_signal_strength: i32,
}

/// Builds the connection record. `wifi` is only consulted for wifi links;
/// other link types do not expose these figures uniformly.
pub fn classify(raw: &RawConnection, wifi: Option<WifiInfo>) -> ConnectionInfo {
    let connection_type = ConnectionType::classify(&raw.type_name, &raw.subtype_name);
    let wifi = match connection_type {
        ConnectionType::Wifi => wifi.unwrap_or_default(),
        _ => WifiInfo::default(),
    };

    ConnectionInfo {
        connection_type,
        roaming: raw.roaming,
        current_download_bandwidth: wifi.link_speed,
        current_upload_bandwidth: 0,
        max_download_bandwidth: 0,
        max_upload_bandwidth: 0,
        current_signal_strength: wifi.rssi,
    }
}

/// Network adapter.
pub struct NetworkConnections {
    source: Arc<dyn ConnectivitySource>,
}

impl NetworkConnections {
    pub fn new(source: Arc<dyn ConnectivitySource>) -> Self {
        Self { source }
    }

    /// Returns the active connection, if any. Offline is an empty list.
    pub fn active_connections(&self) -> Result<Vec<ConnectionInfo>> {
        let Some(raw) = self.source.active_network()? else {
            debug!("No active network connection");
            return Ok(Vec::new());
        };

        let wifi = if raw.type_name.eq_ignore_ascii_case("wifi") {
            Some(self.source.wifi_info(&raw.interface)?)
        } else {
            None
        };

        let info = classify(&raw, wifi);
        debug!(
            "Active connection on {}: {}",
            raw.interface, info.connection_type
        );
        Ok(vec![info])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fake::FakeConnectivity;

    fn raw(type_name: &str, subtype_name: &str) -> RawConnection {
        RawConnection {
            interface: "test0".to_string(),
            type_name: type_name.to_string(),
            subtype_name: subtype_name.to_string(),
            roaming: false,
        }
    }

    #[test]
    fn test_classification_table() {
        let cases = [
            ("WIFI", "", ConnectionType::Wifi),
            ("mobile", "GSM", ConnectionType::Mobile2g),
            ("MOBILE", "gprs", ConnectionType::Mobile2g),
            ("Mobile", "Edge", ConnectionType::Mobile2g),
            ("MOBILE", "CDMA", ConnectionType::Mobile3g),
            ("MOBILE", "umts", ConnectionType::Mobile3g),
            ("MOBILE", "LTE", ConnectionType::Mobile4g),
            ("MOBILE", "UMB", ConnectionType::Mobile4g),
            ("MOBILE", "unknown-subtype", ConnectionType::XMobile),
            ("bluetooth", "", ConnectionType::Unknown),
            ("ETHERNET", "", ConnectionType::Unknown),
        ];
        for (type_name, subtype, expected) in cases {
            assert_eq!(
                ConnectionType::classify(type_name, subtype),
                expected,
                "{type_name}/{subtype}"
            );
        }
    }

    #[test]
    fn test_wifi_fields() {
        let wifi = WifiInfo {
            link_speed: 144,
            rssi: -52,
        };
        let info = classify(&raw("WIFI", ""), Some(wifi));
        assert_eq!(info.current_download_bandwidth, 144);
        assert_eq!(info.current_signal_strength, -52);
        assert_eq!(info.current_upload_bandwidth, 0);
    }

    #[test]
    fn test_non_wifi_fields_are_zero() {
        let wifi = WifiInfo {
            link_speed: 144,
            rssi: -52,
        };
        let info = classify(&raw("MOBILE", "LTE"), Some(wifi));
        assert_eq!(info.connection_type, ConnectionType::Mobile4g);
        assert_eq!(info.current_download_bandwidth, 0);
        assert_eq!(info.current_signal_strength, 0);
    }

    #[test]
    fn test_offline_is_empty() {
        let network = NetworkConnections::new(Arc::new(FakeConnectivity::default()));
        assert!(network.active_connections().unwrap().is_empty());
    }

    #[test]
    fn test_active_wifi_connection() {
        let mut source = FakeConnectivity::connected("wifi", "");
        source.wifi = WifiInfo {
            link_speed: 300,
            rssi: -40,
        };
        let network = NetworkConnections::new(Arc::new(source));

        let connections = network.active_connections().unwrap();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].connection_type, ConnectionType::Wifi);
        assert_eq!(connections[0].current_signal_strength, -40);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_value(classify(&raw("MOBILE", "edge"), None)).unwrap();
        assert_eq!(json["type"], "2g");
        assert_eq!(json["roaming"], false);
        assert_eq!(json["maxUploadBandwidth"], 0);
    }
}
