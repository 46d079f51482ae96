//! lanwatch daemon - device registry and reachability API server
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP server (default)
//! lanwatchd start --bind 0.0.0.0:5000
//!
//! # Probe every registered device once and print the report
//! lanwatchd sweep
//! lanwatchd sweep --json
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use lanwatch_cli::render;
use lanwatchd::config::DaemonConfig;
use lanwatchd::coordinator::ProbeCoordinator;
use lanwatchd::probe::{build_prober, ProbeMethod};
use lanwatchd::registry::{
    default_seed, spawn_registry, DeviceEvent, DeviceRegistry, JsonFileStorage, RegistryHandle,
};
use lanwatchd::server::{AppState, HttpServer};

/// lanwatch daemon - LAN device reachability
#[derive(Parser, Debug)]
#[command(name = "lanwatchd", version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server
    Start {
        #[command(flatten)]
        opts: ConfigOpts,

        /// Address to listen on
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Probe every registered device once and print the report
    Sweep {
        #[command(flatten)]
        opts: ConfigOpts,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Flags shared by every subcommand. They override file and environment.
#[derive(ClapArgs, Debug, Default)]
struct ConfigOpts {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Device registry file
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Per-probe timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Probe strategy (command or icmp)
    #[arg(long)]
    method: Option<ProbeMethod>,
}

impl ConfigOpts {
    fn load(self, bind: Option<SocketAddr>) -> Result<DaemonConfig> {
        let mut config =
            DaemonConfig::load(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(bind) = bind {
            config.bind = bind;
        }
        if let Some(data_file) = self.data_file {
            config.data_file = data_file;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.probe.timeout_ms = timeout_ms;
        }
        if let Some(method) = self.method {
            config.probe.method = method;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let command = args.command.unwrap_or(Command::Start {
        opts: ConfigOpts::default(),
        bind: None,
    });

    match command {
        Command::Start { opts, bind } => {
            let config = opts.load(bind)?;
            run_daemon(config)
        }
        Command::Sweep { opts, json } => {
            let config = opts.load(None)?;
            run_sweep(config, json)
        }
    }
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("lanwatchd=info".parse()?)
                .add_directive("lanwatch_core=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();
    Ok(())
}

fn spawn_file_registry(config: &DaemonConfig) -> RegistryHandle {
    let seed = if config.seed_defaults {
        default_seed()
    } else {
        Vec::new()
    };
    let storage = JsonFileStorage::new(&config.data_file);
    spawn_registry(DeviceRegistry::new(storage).with_seed(seed))
}

fn build_coordinator(config: &DaemonConfig) -> ProbeCoordinator {
    ProbeCoordinator::with_config(
        build_prober(config.probe.method),
        config.probe.coordinator_config(),
    )
}

#[tokio::main]
async fn run_daemon(config: DaemonConfig) -> Result<()> {
    init_logging()?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        "lanwatch daemon starting"
    );
    info!(
        bind = %config.bind,
        data_file = %config.data_file.display(),
        method = %config.probe.method,
        timeout_ms = config.probe.timeout_ms,
        "Configuration loaded"
    );

    let cancel_token = CancellationToken::new();

    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        if let Err(e) = wait_for_shutdown_signal().await {
            error!(error = %e, "Error waiting for shutdown signal");
        }
        info!("Shutdown signal received");
        shutdown_token.cancel();
    });

    let registry = spawn_file_registry(&config);
    spawn_event_logger(registry.subscribe(), cancel_token.clone());

    // Fail fast on an unreadable data file rather than on the first request.
    let devices = registry
        .snapshot()
        .await
        .context("Failed to load device registry")?;
    info!(count = devices.len(), "Device registry started");

    let state = AppState::new(registry, build_coordinator(&config));
    let server = HttpServer::bind(config.bind, state, cancel_token).await?;

    if let Err(e) = server.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("lanwatch daemon stopped");
    Ok(())
}

#[tokio::main]
async fn run_sweep(config: DaemonConfig, json: bool) -> Result<()> {
    init_logging()?;

    let registry = spawn_file_registry(&config);
    let devices = registry
        .snapshot()
        .await
        .with_context(|| format!("Failed to read {}", config.data_file.display()))?;

    let report = build_coordinator(&config).run(devices).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        );
    } else {
        print!("{}", render::report_table(&report));
    }
    Ok(())
}

/// Logs registry mutations until shutdown.
fn spawn_event_logger(mut events: broadcast::Receiver<DeviceEvent>, cancel_token: CancellationToken) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => break,
                result = events.recv() => match result {
                    Ok(DeviceEvent::Added { device }) => {
                        debug!(id = %device.id, "Registry event: added");
                    }
                    Ok(DeviceEvent::Removed { id }) => debug!(id = %id, "Registry event: removed"),
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(skipped = n, "Event logger lagged, skipped events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("Event channel closed");
                        break;
                    }
                },
            }
        }
    });
}

async fn wait_for_shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
