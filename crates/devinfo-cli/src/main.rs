//! devinfo control tool
//!
//! CLI for querying device telemetry from the devinfo daemon via D-Bus.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devinfo_client::{BusType, DaemonClient};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum CliBusType {
    /// Try session bus first, fall back to system bus
    #[default]
    Auto,
    /// Use session bus (for user services)
    Session,
    /// Use system bus (for system services)
    System,
}

impl From<CliBusType> for BusType {
    fn from(bus: CliBusType) -> Self {
        match bus {
            CliBusType::Auto => BusType::Auto,
            CliBusType::Session => BusType::Session,
            CliBusType::System => BusType::System,
        }
    }
}

#[derive(Parser)]
#[command(name = "devinfoctl")]
#[command(about = "Query device telemetry from the devinfo daemon")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// D-Bus bus type to use
    #[arg(long, default_value = "auto", value_enum)]
    bus: CliBusType,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read the current value of a property
    Get {
        /// Property name (e.g., cpu, power, ambientlight)
        property: String,

        /// Print JSON on a single line
        #[arg(long)]
        compact: bool,
    },
    /// Check whether the device provides a property
    Has {
        /// Property name
        property: String,
    },
    /// Monitor a property for changes
    Monitor {
        /// Property name
        property: String,
    },
    /// List known properties and whether each can be queried
    Properties,
    /// Daemon control commands
    Daemon {
        #[command(subcommand)]
        action: DaemonCommands,
    },
}

#[derive(Subcommand)]
enum DaemonCommands {
    /// Check if daemon is running
    Status,
    /// Request daemon shutdown
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Connect to daemon
    let client = DaemonClient::connect_with_bus(cli.bus.into())
        .await
        .context("Failed to connect to daemon. Is devinfod running?")?;

    match cli.command {
        Commands::Get { property, compact } => handle_get(&property, compact, &client).await,
        Commands::Has { property } => {
            let available = client.has(&property).await?;
            println!("{}: {}", property, if available { "yes" } else { "no" });
            Ok(())
        }
        Commands::Monitor { property } => {
            client.monitor(&property).await?;
            println!("Monitoring {}", property);
            Ok(())
        }
        Commands::Properties => handle_properties(&client).await,
        Commands::Daemon { action } => handle_daemon(action, &client).await,
    }
}

async fn handle_get(property: &str, compact: bool, client: &DaemonClient) -> Result<()> {
    let value = client.get(property).await?;
    let output = if compact {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{}", output);
    Ok(())
}

async fn handle_properties(client: &DaemonClient) -> Result<()> {
    let properties = client.list_properties().await?;
    let width = properties
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or(0);

    println!("Properties:");
    for (name, queryable) in properties {
        let kind = if queryable { "queryable" } else { "informational" };
        println!("  {:width$}  {}", name, kind, width = width);
    }
    Ok(())
}

async fn handle_daemon(action: DaemonCommands, client: &DaemonClient) -> Result<()> {
    match action {
        DaemonCommands::Status => {
            let version = client.version().await?;
            println!("Daemon: running");
            println!("Version: {}", version);
        }
        DaemonCommands::Quit => {
            client.quit().await?;
            println!("Shutdown request sent to daemon");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get() {
        let cli = Cli::try_parse_from(["devinfoctl", "--bus", "system", "get", "cpu", "--compact"])
            .unwrap();
        assert!(matches!(cli.bus, CliBusType::System));
        match cli.command {
            Commands::Get { property, compact } => {
                assert_eq!(property, "cpu");
                assert!(compact);
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_property_is_required() {
        assert!(Cli::try_parse_from(["devinfoctl", "has"]).is_err());
        assert!(Cli::try_parse_from(["devinfoctl", "--bus", "tcp", "properties"]).is_err());
    }
}
