use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dubber::infrastructure::media::FfmpegTool;
use dubber::{AppConfig, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dubber=info,tower_http=info")),
        )
        .init();

    info!("Starting server...");

    let config = AppConfig::new().context("invalid configuration")?;
    let port = config.server_port;

    FfmpegTool::new(config.ffmpeg_path.clone(), config.media_timeout)
        .check_availability()
        .await;

    let state = AppState::from_config(config).context("failed to build HTTP client")?;
    state
        .pipeline
        .storage()
        .ensure_dirs()
        .await
        .context("failed to create storage directories")?;

    let app = dubber::create_app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;
    info!("Server running on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}
