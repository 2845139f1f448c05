use anyhow::{Context, Result};
use clap::Parser;
use recita_api::{build_router, state::AppState};
use recita_config::Settings;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str =
    "recita_api=info,recita_services=info,recita_transcription=info,tower_http=info";

/// Recitation assessment HTTP service
#[derive(Parser, Debug)]
#[command(name = "recita-api", version)]
struct Args {
    /// Directory holding default.toml and an optional local.toml
    #[arg(short, long, default_value = "config", env = "RECITA_CONFIG_DIR")]
    config: String,

    /// Overrides app.port
    #[arg(short, long)]
    port: Option<u16>,

    /// Keep attempts in memory instead of MongoDB
    #[arg(long)]
    no_db: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("RECITA_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let args = Args::parse();

    let mut settings = Settings::load_from(&args.config).context("Failed to load settings")?;
    if let Some(port) = args.port {
        settings.app.port = port;
    }
    if args.no_db {
        settings.database.enabled = false;
    }

    let addr = format!("{}:{}", settings.app.host, settings.app.port);
    let state = AppState::from_settings(settings)
        .await
        .context("Failed to initialize services")?;
    info!(
        speech = ?state.gateway.backend_names(),
        judges = ?state.judge.backend_names(),
        "Services ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
