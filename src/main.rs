use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use movie_booking_api::config::AppConfig;
use movie_booking_api::database::{MemoryStore, PgStore, Store};
use movie_booking_api::{router, AppState};

#[derive(Parser)]
#[command(name = "movie-booking-api")]
#[command(about = "Movie booking REST API server")]
#[command(version)]
struct Args {
    #[arg(long, help = "Port to listen on (overrides PORT)")]
    port: Option<u16>,

    #[arg(long, help = "Use the process-local store instead of PostgreSQL")]
    in_memory: bool,
}

#[tokio::main]
async fn main() {
    // Load .env if present so DATABASE_URL and JWT_SECRET can live there
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Server failed to start: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::info!("Starting movie booking API in {:?} mode", config.environment);

    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(
            PgStore::connect(&config.database)
                .await
                .context("could not connect to the database")?,
        )
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let app = router(AppState::new(config, store));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")
}
