/// Main application entry point
use exo_explorer::config::AppConfig;
use exo_explorer::repo::load_catalog;
use exo_explorer::services::ExplorerService;
use exo_explorer::store::ExplorerState;
use exo_explorer::{build_router, AppState};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!("Configuration loaded successfully");

    // Load the catalog once; failures degrade to an empty catalog
    let catalog = load_catalog(&config).await;

    // Initialize the state owner
    let explorer = Arc::new(ExplorerService::new(
        catalog,
        ExplorerState::with_page_size(config.default_page_size),
    ));
    explorer.finish_loading().await;

    let state = AppState { explorer };

    // Build router
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("exo_explorer listening on {}", config.bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
