//! # wattbridged
//!
//! Composition root that wires the adapters together and polls devices.
//!
//! ## Responsibilities
//! - Parse the command line and configuration (file, env vars)
//! - Initialise logging
//! - Construct the reqwest fetcher, the in-process value store and the
//!   status reporters, and bundle them into a `HostContext`
//! - Build every configured device and spawn one polling task per device
//! - Stop all tasks on Ctrl-C
//! - Serve the positional `legacy` entry point as a one-shot read
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer: no domain logic belongs here.

mod config;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;
use wattbridge_adapter_http_reqwest::ReqwestFetcher;
use wattbridge_app::ports::DeviceContext;
use wattbridge_app::services::host_context::HostContext;
use wattbridge_app::services::legacy::{LegacyRequest, read_legacy};
use wattbridge_app::services::poller::poll_device;
use wattbridge_app::status_log::TracingStatusReporter;
use wattbridge_app::value_store::InProcessValueStore;

use crate::config::{Config, DeviceEntry};

#[derive(Debug, Parser)]
#[command(name = "wattbridged")]
#[command(about = "Polls BatterX devices and publishes battery, counter and inverter states")]
#[command(version)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll every configured device until interrupted (default)
    Run,
    /// Read a device once, described by positional arguments
    Legacy(LegacyArgs),
}

#[derive(Debug, Args)]
struct LegacyArgs {
    /// Primary component type (bat, counter, inverter, external_inverter)
    component_type: String,
    /// Host or host:port of the device
    ip_address: String,
    /// Id of the primary component
    num: Option<u32>,
    /// `bezug_batterx` to also read the grid counter
    evu_counter: Option<String>,
    /// `speicher_batterx` to also read the battery
    bat_module: Option<String>,
    /// Non-zero to add the external inverter to the inverter's reading
    #[arg(default_value_t = 0)]
    ext_inverter: u32,
}

impl From<LegacyArgs> for LegacyRequest {
    fn from(args: LegacyArgs) -> Self {
        Self {
            component_type: args.component_type,
            ip_address: args.ip_address,
            num: args.num,
            evu_counter: args.evu_counter,
            bat_module: args.bat_module,
            ext_inverter: args.ext_inverter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .with_target(true)
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wattbridged starting");

    // Adapters
    let fetcher = Arc::new(ReqwestFetcher::new(&config.http)?);
    let store = Arc::new(InProcessValueStore::new(256));
    let reporter = Arc::new((TracingStatusReporter, Arc::clone(&store)));
    let ctx = HostContext::new(fetcher, Arc::clone(&store), reporter)
        .with_fetch_timeout(config.http.timeout());

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&config, ctx).await,
        Command::Legacy(args) => legacy(args.into(), &ctx, &store).await,
    }
}

async fn run<C>(config: &Config, ctx: C) -> Result<(), Box<dyn Error>>
where
    C: DeviceContext + Clone + 'static,
{
    let devices = config
        .devices
        .iter()
        .map(DeviceEntry::build)
        .collect::<Result<Vec<_>, _>>()?;
    if devices.is_empty() {
        tracing::warn!("no devices configured, waiting for shutdown");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let tasks: Vec<_> = devices
        .into_iter()
        .map(|device| {
            tracing::info!(
                device = device.name(),
                address = device.address(),
                components = device.components().len(),
                "device configured"
            );
            tokio::spawn(poll_device(
                device,
                ctx.clone(),
                config.poll_interval(),
                shutdown_rx.clone(),
            ))
        })
        .collect();

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    // receivers may already be gone if every task ended
    let _ = shutdown_tx.send(true);
    for task in tasks {
        task.await?;
    }
    Ok(())
}

async fn legacy<C: DeviceContext>(
    request: LegacyRequest,
    ctx: &C,
    store: &InProcessValueStore,
) -> Result<(), Box<dyn Error>> {
    let mut published = store.subscribe();
    let report = read_legacy(request, ctx).await?;

    while let Ok((id, state)) = published.try_recv() {
        let line = serde_json::json!({ "component": id, "state": state });
        println!("{line}");
    }

    let failed = report.failures().count();
    if failed > 0 {
        return Err(format!("{failed} of {} components not updated", report.outcomes.len()).into());
    }
    Ok(())
}
