//! SIA DC-09 alarm receiver binary.
//!
//! Loads the JSON config, builds the code table and dispatch sinks, then
//! runs the TCP receiver until interrupted.

mod config;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use siagate_dispatch::{Dispatcher, EventCodeTable, OutputFormat, SinkConfig};
use siagate_network::{ReceiverConfig, SiaReceiver};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(name = "siagate", version, about = "SIA DC-09 alarm panel receiver")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen port, overriding the config file.
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Event-code table file, replacing the built-in SIA codes.
    #[arg(long, value_name = "FILE")]
    codes: Option<PathBuf>,

    /// Print every event to stdout in human-readable form.
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path).context("loading configuration")?,
        None => Config::default(),
    };
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let mut sink_configs = config.dispatcher.clone();
    if cli.debug {
        sink_configs.push(SinkConfig::Console {
            format: OutputFormat::Human,
        });
    }

    let codes = match &cli.codes {
        Some(path) => EventCodeTable::from_path(path).context("loading code table")?,
        None => EventCodeTable::builtin(),
    };
    info!(codes = codes.len(), sinks = sink_configs.len(), "dispatch configured");

    let dispatcher = Arc::new(
        Dispatcher::from_configs(&sink_configs, Arc::new(codes))
            .await
            .context("building sinks")?,
    );

    let receiver_config = ReceiverConfig {
        bind_addr: ([0, 0, 0, 0], config.server.port).into(),
        window: config.server.window,
        ..Default::default()
    };
    info!(window = %receiver_config.window, "validation window");

    let receiver = SiaReceiver::bind(receiver_config)
        .await
        .context("binding receiver")?;

    tokio::select! {
        result = receiver.run(Arc::clone(&dispatcher)) => result.context("receiver loop")?,
        _ = tokio::signal::ctrl_c() => info!("shutting down"),
    }

    dispatcher.shutdown().await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_port_override() {
        let cli = Cli::try_parse_from(["siagate", "-p", "9000"]).unwrap();
        assert_eq!(cli.port, Some(9000));
        assert!(!cli.debug);
    }

    #[test]
    fn parses_debug_and_config() {
        let cli =
            Cli::try_parse_from(["siagate", "--config", "siagate.json", "-d"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("siagate.json")));
        assert!(cli.debug);
    }

    #[test]
    fn rejects_unknown_flag() {
        let err = Cli::try_parse_from(["siagate", "--nope"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
    }
}
