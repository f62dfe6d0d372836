//! D-Bus interface implementation using zbus.

use std::sync::Arc;

use devinfo_core::{DBUS_PATH, DBUS_SERVICE};
use tracing::{debug, info, warn};
use zbus::{interface, Connection};

use crate::config::DbusBusType;
use crate::state::AppState;

/// D-Bus interface exposing the property dispatcher.
pub struct Telemetry1Interface {
    state: Arc<AppState>,
    shutdown_tx: tokio::sync::mpsc::Sender<()>,
}

impl Telemetry1Interface {
    /// Creates a new D-Bus interface.
    pub fn new(state: Arc<AppState>, shutdown_tx: tokio::sync::mpsc::Sender<()>) -> Self {
        Self { state, shutdown_tx }
    }
}

/// Maps a dispatcher error onto the closest standard D-Bus error.
fn to_fdo_error(error: devinfo_core::Error) -> zbus::fdo::Error {
    use devinfo_core::Error;

    match error {
        Error::MissingProperty | Error::UnknownProperty(_) | Error::UnknownAction(_) => {
            zbus::fdo::Error::InvalidArgs(error.to_string())
        }
        Error::NotSupported { .. } => zbus::fdo::Error::NotSupported(error.to_string()),
        Error::SourceUnavailable { .. } | Error::Io(_) => zbus::fdo::Error::Failed(error.to_string()),
    }
}

#[interface(name = "org.devinfo.Telemetry1")]
impl Telemetry1Interface {
    /// Reads a property and returns it as a JSON document.
    #[zbus(name = "Get")]
    fn read(&self, property: &str) -> zbus::fdo::Result<String> {
        let reading = self.state.get(property).map_err(to_fdo_error)?;
        debug!("D-Bus: Get({})", property);
        serde_json::to_string(&reading).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    /// Reports whether the device provides a property.
    fn has(&self, property: &str) -> zbus::fdo::Result<bool> {
        debug!("D-Bus: Has({})", property);
        self.state.has(property).map_err(to_fdo_error)
    }

    /// Monitoring is not available for any property.
    fn monitor(&self, property: &str) -> zbus::fdo::Result<()> {
        debug!("D-Bus: Monitor({})", property);
        self.state.monitor(property).map_err(to_fdo_error)
    }

    /// Lists every property name with its capability flag.
    fn list_properties(&self) -> Vec<(String, bool)> {
        self.state
            .properties()
            .into_iter()
            .map(|(property, queryable)| (property.to_string(), queryable))
            .collect()
    }

    /// Shuts down the daemon.
    async fn quit(&self) -> zbus::fdo::Result<()> {
        info!("D-Bus: Quit requested");
        self.shutdown_tx
            .send(())
            .await
            .map_err(|e| zbus::fdo::Error::Failed(e.to_string()))?;
        Ok(())
    }

    // Properties

    /// Daemon version.
    #[zbus(property)]
    fn version(&self) -> String {
        self.state.version().to_string()
    }
}

/// Connects to the appropriate D-Bus bus based on configuration.
async fn connect_to_bus(bus_type: DbusBusType) -> anyhow::Result<(Connection, &'static str)> {
    match bus_type {
        DbusBusType::Session => {
            let conn = Connection::session()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to session bus: {}", e))?;
            Ok((conn, "session"))
        }
        DbusBusType::System => {
            let conn = Connection::system()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to system bus: {}", e))?;
            Ok((conn, "system"))
        }
        DbusBusType::Auto => match Connection::session().await {
            Ok(conn) => Ok((conn, "session")),
            Err(session_err) => {
                warn!(
                    "Session bus unavailable ({}), trying system bus",
                    session_err
                );
                let conn = Connection::system().await.map_err(|system_err| {
                    anyhow::anyhow!(
                        "Failed to connect to any D-Bus: session={}, system={}",
                        session_err,
                        system_err
                    )
                })?;
                Ok((conn, "system"))
            }
        },
    }
}

/// Runs the D-Bus server.
pub async fn run_dbus_server(
    state: Arc<AppState>,
    shutdown_tx: tokio::sync::mpsc::Sender<()>,
    bus_type: DbusBusType,
) -> anyhow::Result<Connection> {
    let interface = Telemetry1Interface::new(state, shutdown_tx);

    let (connection, bus_name) = connect_to_bus(bus_type).await?;

    connection
        .object_server()
        .at(DBUS_PATH, interface)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to register object: {}", e))?;

    connection
        .request_name(DBUS_SERVICE)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to request bus name: {}", e))?;

    info!(
        "D-Bus service registered at {} on {} bus",
        DBUS_SERVICE, bus_name
    );
    Ok(connection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devinfo_core::{Action, Error};

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            to_fdo_error(Error::UnknownProperty("gps".to_string())),
            zbus::fdo::Error::InvalidArgs(_)
        ));
        assert!(matches!(
            to_fdo_error(Error::MissingProperty),
            zbus::fdo::Error::InvalidArgs(_)
        ));
        assert!(matches!(
            to_fdo_error(Error::NotSupported {
                action: Action::Monitor,
                property: "cpu".to_string(),
            }),
            zbus::fdo::Error::NotSupported(_)
        ));
        assert!(matches!(
            to_fdo_error(Error::unavailable("cpu", "no /proc")),
            zbus::fdo::Error::Failed(_)
        ));
    }

    #[test]
    fn test_error_message_preserved() {
        match to_fdo_error(Error::UnknownProperty("gps".to_string())) {
            zbus::fdo::Error::InvalidArgs(message) => assert_eq!(message, "Unknown property: gps"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
