//! D-Bus client library for communicating with the devinfo daemon.

use anyhow::{Context, Result};
use devinfo_core::DBUS_SERVICE;
use tracing::debug;
use zbus::{names::BusName, proxy, Connection};

/// D-Bus bus type selection.
#[derive(Debug, Clone, Copy, Default)]
pub enum BusType {
    /// Session bus (user session).
    Session,
    /// System bus (system-wide).
    System,
    /// Try session first, fall back to system.
    #[default]
    Auto,
}

/// D-Bus proxy for the telemetry interface.
#[proxy(
    interface = "org.devinfo.Telemetry1",
    default_service = "org.devinfo.Daemon",
    default_path = "/org/devinfo/Daemon"
)]
trait Telemetry1 {
    /// Reads a property as a JSON document.
    #[zbus(name = "Get")]
    fn read(&self, property: &str) -> zbus::Result<String>;

    /// Reports whether the device provides a property.
    fn has(&self, property: &str) -> zbus::Result<bool>;

    /// Requests monitoring of a property.
    fn monitor(&self, property: &str) -> zbus::Result<()>;

    /// Lists every property with its capability flag.
    fn list_properties(&self) -> zbus::Result<Vec<(String, bool)>>;

    /// Shuts down the daemon.
    fn quit(&self) -> zbus::Result<()>;

    /// Daemon version.
    #[zbus(property)]
    fn version(&self) -> zbus::Result<String>;
}

/// D-Bus client wrapper for the daemon.
pub struct DaemonClient {
    proxy: Telemetry1Proxy<'static>,
}

impl DaemonClient {
    /// Attempts to connect to the daemon via D-Bus with auto bus detection.
    pub async fn connect() -> Result<Self> {
        Self::connect_with_bus(BusType::Auto).await
    }

    /// Attempts to connect to the daemon via D-Bus with specified bus type.
    pub async fn connect_with_bus(bus_type: BusType) -> Result<Self> {
        let connection = match bus_type {
            BusType::Session => {
                debug!("Connecting to session bus");
                Connection::session()
                    .await
                    .context("Failed to connect to session bus")?
            }
            BusType::System => {
                debug!("Connecting to system bus");
                Connection::system()
                    .await
                    .context("Failed to connect to system bus")?
            }
            BusType::Auto => {
                // The daemon may run on either bus; pick the one that has it.
                if let Ok(conn) = Connection::session().await {
                    if Self::service_exists(&conn).await {
                        debug!("Found daemon on session bus");
                        conn
                    } else {
                        debug!("Daemon not on session bus, trying system bus");
                        let sys_conn = Connection::system()
                            .await
                            .context("Failed to connect to system bus")?;
                        if Self::service_exists(&sys_conn).await {
                            debug!("Found daemon on system bus");
                            sys_conn
                        } else {
                            anyhow::bail!(
                                "Daemon service not found on session or system bus. Is devinfod running?"
                            )
                        }
                    }
                } else {
                    debug!("Session bus unavailable, trying system bus");
                    Connection::system()
                        .await
                        .context("Failed to connect to any D-Bus")?
                }
            }
        };

        let proxy = Telemetry1Proxy::new(&connection)
            .await
            .context("Failed to create D-Bus proxy")?;

        Ok(Self { proxy })
    }

    /// Checks if the daemon service exists on the given connection.
    async fn service_exists(conn: &Connection) -> bool {
        use zbus::fdo::DBusProxy;

        let Ok(name) = BusName::try_from(DBUS_SERVICE) else {
            return false;
        };
        match DBusProxy::new(conn).await {
            Ok(dbus_proxy) => dbus_proxy.name_has_owner(name).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Reads a property.
    pub async fn get(&self, property: &str) -> Result<serde_json::Value> {
        let json = self
            .proxy
            .read(property)
            .await
            .with_context(|| format!("Failed to get '{}' via D-Bus", property))?;
        parse_reading(&json)
    }

    /// Reports whether the device provides a property.
    pub async fn has(&self, property: &str) -> Result<bool> {
        self.proxy
            .has(property)
            .await
            .with_context(|| format!("Failed to query '{}' via D-Bus", property))
    }

    /// Requests monitoring of a property.
    pub async fn monitor(&self, property: &str) -> Result<()> {
        self.proxy
            .monitor(property)
            .await
            .with_context(|| format!("Failed to monitor '{}' via D-Bus", property))
    }

    /// Lists every property with its capability flag.
    pub async fn list_properties(&self) -> Result<Vec<(String, bool)>> {
        self.proxy
            .list_properties()
            .await
            .context("Failed to list properties via D-Bus")
    }

    /// Shuts down the daemon.
    pub async fn quit(&self) -> Result<()> {
        self.proxy
            .quit()
            .await
            .context("Failed to quit daemon via D-Bus")
    }

    /// Gets the daemon version.
    pub async fn version(&self) -> Result<String> {
        self.proxy
            .version()
            .await
            .context("Failed to get daemon version via D-Bus")
    }
}

fn parse_reading(json: &str) -> Result<serde_json::Value> {
    serde_json::from_str(json).context("Daemon returned malformed JSON")
}
