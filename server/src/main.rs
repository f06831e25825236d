use anyhow::{Context, Result};
use clap::Parser;
use search_core::DEFAULT_SNIPPET_CHARS;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// Read-only HTTP search over a persisted index.
#[derive(Parser)]
#[command(name = "server")]
struct Args {
    /// Directory written by `indexer build`
    #[arg(long, default_value = "./index")]
    index: PathBuf,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Maximum snippet length in characters
    #[arg(long, default_value_t = DEFAULT_SNIPPET_CHARS)]
    snippet_chars: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app = server::build_app(&args.index, args.snippet_chars)
        .with_context(|| format!("loading index from {}", args.index.display()))?;

    let listener = TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("binding {}:{}", args.host, args.port))?;
    tracing::info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "cannot listen for ctrl-c; serving until killed");
        std::future::pending::<()>().await;
    }
}
