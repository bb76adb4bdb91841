//! Dataplane in-process driver.
//!
//! Loads a catalog snapshot, serves it through an in-process `DataplaneServer`
//! and prints what a dataplane would receive for the requested proxy.

mod app;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "dataplane-inmem")]
#[command(about = "Query an in-process dataplane service")]
pub struct Args {
    /// Catalog snapshot (JSON) to serve
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Datacenter reported in bootstrap params
    #[arg(long, default_value = "dc1")]
    pub datacenter: String,

    /// Node the proxy is registered on, by name
    #[arg(long, conflicts_with = "node_id")]
    pub node_name: Option<String>,

    /// Node the proxy is registered on, by ID
    #[arg(long)]
    pub node_id: Option<String>,

    /// Service ID of the proxy
    #[arg(long)]
    pub proxy_id: Option<String>,

    #[arg(long, default_value = "")]
    pub namespace: String,

    #[arg(long, default_value = "")]
    pub partition: String,

    /// Per-call timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub timeout_ms: u64,

    /// Print supported dataplane features instead of bootstrap params
    #[arg(long)]
    pub features: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG can add per-target directives on top.
    let log_level = if args.debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    info!("Starting in-process dataplane service");

    let output = app::run(&args).await?;
    println!("{}", output);

    Ok(())
}
