use std::net::SocketAddr;

use podnapisi_addon::config::AppConfig;
use podnapisi_addon::{build_router, build_state};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let state = build_state(&config)?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("🚀 Server listening on {}", addr);
    tracing::info!("Public base URL: {}", config.public_base_url);
    tracing::info!(
        "Catalog: {} (mode {:?}, language {})",
        config.podnapisi_base_url,
        config.catalog_mode,
        config.language
    );
    if config.credentials().is_some() {
        tracing::info!("Login credentials configured; login happens on first search");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
