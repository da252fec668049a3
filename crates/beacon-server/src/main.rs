mod config;
mod dispatch;
mod http;
mod location;
mod metrics;
mod state;
mod tui;

use anyhow::{bail, Context};
use beacon_core::APP_VERSION;
use clap::Parser;
use config::{AppConfig, Cli, Commands, LogFormat};
use dispatch::{Dispatcher, TriggerIntent};
use http::router;
use location::{spawn_location_lookup, SimulatedLocation};
use state::{AppState, SeedData};
use std::fs::File;
use std::io;
use std::sync::Mutex;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;
use tui::{run_tui, TuiApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => {
            let config = AppConfig::from_args(args)?;
            init_tracing(&config)?;
            run(config).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins over `--log-level`. While the TUI owns the terminal, logs
/// go to `--log-file` or nowhere.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .with_context(|| format!("Invalid log level '{}'", config.log_level))?,
    };

    let writer = match &config.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None if config.tui => BoxMakeWriter::new(io::sink),
        None => BoxMakeWriter::new(io::stdout),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.with_ansi(config.log_file.is_none()).init(),
    }
    Ok(())
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    info!("Starting Emergency Beacon v{}", APP_VERSION);
    info!(
        "HTTP: {:?}, TUI: {}, dispatch delay: {:?}, location delay: {:?}",
        config.http_addr, config.tui, config.dispatch_delay, config.location_delay
    );

    let metrics_handle =
        metrics::init_metrics().context("Failed to install Prometheus metrics recorder")?;

    let seed = if config.seed {
        SeedData::builtin()
    } else {
        SeedData::empty()
    };
    let state = AppState::new(seed, config.location.clone());

    let _location_task = spawn_location_lookup(
        state.clone(),
        SimulatedLocation::new(config.location_delay, config.location.clone()),
    );

    let (intent_tx, intent_rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(state.clone(), config.dispatch_delay, intent_tx);

    let server_handle = match &config.http_addr {
        Some(addr) => {
            let app = router(dispatcher.clone(), Some(metrics_handle));
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind HTTP server to {}", addr))?;
            info!("HTTP server listening on http://{}", addr);
            Some(tokio::spawn(async move { axum::serve(listener, app).await }))
        }
        None => None,
    };

    if config.tui {
        let app = TuiApp::new(dispatcher).await;
        run_tui(app, intent_rx).await?;
        info!("TUI closed, shutting down");
        return Ok(());
    }

    let Some(server_handle) = server_handle else {
        bail!("Nothing to run without the HTTP server or the TUI");
    };
    let intents_handle = tokio::spawn(log_intents(intent_rx));

    tokio::select! {
        result = server_handle => {
            match result {
                Ok(Ok(())) => warn!("HTTP server task ended"),
                Ok(Err(e)) => error!("HTTP server error: {}", e),
                Err(e) => error!("HTTP server task failed: {}", e),
            }
        }
        _ = intents_handle => {
            warn!("Intent channel closed");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl-C, shutting down");
        }
    }

    let pending = state.dispatches.pending();
    if !pending.is_empty() {
        warn!("Discarding {} pending dispatch(es)", pending.len());
        for info in pending {
            state.dispatches.cancel(info.id);
        }
    }

    Ok(())
}

/// Without a UI there is nothing to navigate; record where it would have gone.
async fn log_intents(mut intents: mpsc::UnboundedReceiver<TriggerIntent>) {
    while let Some(intent) = intents.recv().await {
        info!(
            "Alert {} ready ({}), UI would open the alerts screen",
            intent.alert_id, intent.category
        );
    }
}
