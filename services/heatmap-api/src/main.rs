//! Heatmap tile server.
//!
//! Serves 256x256 heatmap tiles rendered on demand from a point source.

use anyhow::Result;
use clap::Parser;
use std::{env, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use heatmap_api::config::{resolve_listen_addr, ServiceConfig};
use heatmap_api::state::AppState;
use heatmap_api::{build_router, metrics};

#[derive(Parser, Debug)]
#[command(name = "heatmap-api")]
#[command(about = "Heatmap tile server")]
struct Args {
    /// Listen address; the PORT environment variable overrides its port
    #[arg(short, long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of tokio worker threads (default: number of CPU cores)
    #[arg(long, env = "TOKIO_WORKER_THREADS")]
    worker_threads: Option<usize>,
}

fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(args))?;
    Ok(())
}

async fn async_main(args: Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(threads) = args.worker_threads {
        info!(threads, "Configured tokio worker threads");
    }

    let prometheus_handle = metrics::install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let config = ServiceConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config).await?);

    let app = build_router(state, prometheus_handle);

    let port = env::var("PORT").ok();
    let addr = resolve_listen_addr(&args.listen, port.as_deref())?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
