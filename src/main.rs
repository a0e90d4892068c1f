use anyhow::{Context, Result};
use clap::Parser;
use job_discovery::{create_router, AppState, Config};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "job-discovery", about = "Voice-driven job discovery service")]
struct Args {
    /// Path to the configuration file (without extension)
    #[arg(long, default_value = "config/job-discovery")]
    config: String,

    /// Override the configured bind address (host:port)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Discovery webhook: {}", cfg.webhook.url);

    let addr = args
        .bind
        .unwrap_or_else(|| format!("{}:{}", cfg.service.http.bind, cfg.service.http.port));

    let state = AppState::new(cfg);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
