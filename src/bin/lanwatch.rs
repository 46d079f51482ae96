//! lanwatch - command-line client for the lanwatch daemon
//!
//! # Usage
//!
//! ```bash
//! lanwatch devices
//! lanwatch add "NAS" 192.168.1.4
//! lanwatch remove 6f1c2b9e-...
//! lanwatch status
//! lanwatch --url http://nas.local:5000 status --json
//! ```

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use lanwatch_cli::{render, DaemonClient, DEFAULT_URL};
use lanwatch_core::DeviceId;

/// lanwatch - LAN device reachability client
#[derive(Parser, Debug)]
#[command(name = "lanwatch", version, about)]
struct Args {
    /// Daemon base URL
    #[arg(long, env = "LANWATCH_URL", default_value = DEFAULT_URL, global = true)]
    url: String,

    /// Log requests to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered devices
    Devices {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Register a device
    Add {
        /// Display name
        name: String,
        /// IP address or hostname
        ip: String,
    },
    /// Remove a device by ID
    Remove {
        /// Device ID as shown by `lanwatch devices`
        id: String,
    },
    /// Probe every device now and show which are online
    Status {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn run(args: Args) -> Result<()> {
    let client = DaemonClient::new(&args.url)?;
    debug!(url = %client.base_url(), "Using daemon");

    match args.command {
        Command::Devices { json } => {
            let devices = client.list().await.context("Failed to list devices")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&devices)?);
            } else {
                print!("{}", render::devices_table(&devices));
            }
        }
        Command::Add { name, ip } => {
            let device = client
                .add(&name, &ip)
                .await
                .with_context(|| format!("Failed to add {name} ({ip})"))?;
            println!("Added {} ({}) as {}", device.name, device.ip, device.id);
        }
        Command::Remove { id } => {
            client
                .remove(&DeviceId::new(id.clone()))
                .await
                .with_context(|| format!("Failed to remove {id}"))?;
            println!("Removed {id}");
        }
        Command::Status { json } => {
            let health = client.health().await?;
            debug!(version = %health.version, api = %health.api_version, "Daemon healthy");

            let report = client.status().await.context("Failed to fetch status")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", render::report_table(&report));
            }
        }
    }

    Ok(())
}
