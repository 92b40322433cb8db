use omise_search::config::{CATALOG_ENV, Config};
use omise_search::{SearchServer, SearchState, WardGeocoder};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interfere with MCP protocol on stdout
    omise_search::tracing::init();

    tracing::info!("Starting omise-search MCP server");

    let config = Config::discover()?;
    let geocoder = Arc::new(WardGeocoder::new(config.default_location));
    let state = Arc::new(SearchState::new(config, geocoder));

    if let Some(path) = std::env::var_os(CATALOG_ENV).map(PathBuf::from) {
        match state.load(&path).await {
            Ok(summary) => tracing::info!(
                "Loaded catalog {}: {} businesses, {} reviews",
                path.display(),
                summary.businesses,
                summary.reviews
            ),
            Err(e) => tracing::warn!("{:#}; starting without a catalog", e),
        }
    } else {
        tracing::info!("{} not set; waiting for reload_catalog", CATALOG_ENV);
    }

    // Create and serve the MCP server over stdio
    let server = SearchServer::new(state);
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("Error serving MCP server: {:?}", e);
    })?;

    // Wait for the service to complete
    service.waiting().await?;

    Ok(())
}
