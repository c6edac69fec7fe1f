//! Tablewise server binary.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tablewise::api;

#[derive(Parser)]
#[command(name = "tablewise")]
#[command(about = "Tabular Data Analysis & Excel Report Service")]
struct Cli {
    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind to
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Maximum file upload size in megabytes
    #[arg(long, default_value_t = api::DEFAULT_UPLOAD_LIMIT_MB)]
    upload_limit_mb: usize,

    /// Per-request processing deadline in seconds
    #[arg(long, default_value_t = api::DEFAULT_REQUEST_TIMEOUT_SECS)]
    request_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tablewise=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let app = api::router(
        cli.upload_limit_mb * 1024 * 1024,
        Duration::from_secs(cli.request_timeout_secs),
    );

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    info!("Starting tablewise on {addr}");
    info!("Upload limit: {} MB", cli.upload_limit_mb);
    info!("  POST /analyze - analyze an uploaded table");
    info!("  GET  /health  - liveness check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
