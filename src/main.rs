//! Gift-sharing marketplace API (v1)
//!
//! One transport-agnostic dispatcher behind two interchangeable host adapters.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                    GIFTSHARE API                      │
//!                     │                                                       │
//!  Client Request     │  ┌────────────┐    ┌────────────┐    ┌────────────┐   │
//!  ───────────────────┼─▶│  adapter   │───▶│ dispatcher │───▶│  handlers  │   │
//!                     │  │ server  or │    │ match+auth │    │ items/users│   │
//!                     │  │ serverless │    └─────┬──────┘    └─────┬──────┘   │
//!                     │  └────────────┘          │                 │          │
//!                     │        ▲                 ▼                 ▼          │
//!  Client Response    │        │          ┌────────────┐    ┌────────────┐    │
//!  ◀──────────────────┼────────┘          │  verifier  │    │record store│    │
//!                     │                   └────────────┘    └────────────┘    │
//!                     │                                                       │
//!                     │  Cross-cutting: config · CORS · logging · metrics ·   │
//!                     │                 lifecycle (startup / shutdown)        │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use giftshare_api::config::{self, AdapterKind, AppConfig};
use giftshare_api::http::serve;
use giftshare_api::lifecycle::{trigger_on_signal, Application, Shutdown};
use giftshare_api::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "giftshare-api")]
#[command(about = "Gift-sharing marketplace API server", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured host adapter.
    #[arg(short, long, value_enum)]
    adapter: Option<AdapterKind>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config: AppConfig = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };
    if let Some(adapter) = args.adapter {
        config.adapter = adapter;
    }

    logging::init_logging(&config.observability);
    tracing::info!("giftshare-api v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        adapter = ?config.adapter,
        base_path = %config.api.base_path,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let app = Application::build(config)?;

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        trigger_on_signal(&shutdown).await;
    });

    serve(app.router(), listener, receiver).await?;

    app.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}
