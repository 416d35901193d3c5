use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use apify_client::ApifyClient;
use posts_api::apify_source::ApifyPostSource;
use posts_api::config::Config;
use posts_api::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    config.log_summary();

    let mut client = ApifyClient::new(config.apify_api_token.clone());
    if let Some(base_url) = &config.apify_base_url {
        client = client.with_base_url(base_url.clone());
    }
    let app = build_router(AppState::new(ApifyPostSource::new(client)));

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Serving Facebook Scraper API on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
