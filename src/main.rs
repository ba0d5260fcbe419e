//! # opensearch-twitter
//!
//! A Rust web service that serves a set of Twitter/X accounts as an OpenSearch
//! collection, returning tweets as Atom, JSON or HTML feeds.
//!
//! ## Environment Variables
//!
//! - `xapi_consumer_key`, `xapi_consumer_secret`: Twitter application credentials
//! - `TWITTER_API_URL`: Twitter API base URL (defaults to `https://api.twitter.com`)
//! - `TWITTER_ACCOUNTS`: Accounts to search, e.g. `ESA_EO:EGU17+EGU18,terradue`
//! - `OPENSEARCH_BASE_URL`: Public base URL advertised in the description document
//! - `OPENSEARCH_COLLECTION_ID`: Collection identifier (defaults to `twitter`)
//! - `HTTP_TIMEOUT_SECS`: Outbound request timeout (defaults to 30)
//! - `PORT`: Server port (defaults to 3000)
//!
//! ## API Endpoints
//!
//! - `GET /`: Points at the description document
//! - `GET /health`: Returns service health status
//! - `GET /{identifier}/search`: Runs an OpenSearch query
//! - `GET /{identifier}/description`: Returns the OpenSearch description document

use axum::http::{header, HeaderValue, Method};
use log::{error, info};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use opensearch_twitter::{
    build_router, get_server_port, AppState, CollectionConfig, TwitterClient, TwitterCollection,
    TwitterConfig,
};

/// Main entry point for the opensearch-twitter web service.
///
/// Initializes logging, loads the Twitter and collection configuration, and
/// serves the OpenSearch routes until Ctrl+C is received.
///
/// # Middleware
///
/// - HTTP request tracing
/// - CORS allowing `GET` from any origin, so feed readers in the browser can query
/// - `X-Content-Type-Options: nosniff` on every response
///
/// # Example Usage
///
/// ```bash
/// # Run with default port 3000
/// TWITTER_ACCOUNTS=ESA_EO,terradue cargo run --bin opensearch-twitter
///
/// # Run with debug logging
/// RUST_LOG=debug cargo run --bin opensearch-twitter
/// ```
///
/// # Errors
///
/// Returns an error if the credentials are missing, the HTTP client cannot be
/// built, or the server cannot bind its port.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    // Initialize the logging system
    env_logger::init();

    let port = get_server_port();
    let twitter_config = TwitterConfig::from_env()?;
    let collection_config = CollectionConfig::from_env(port);

    if collection_config.accounts.is_empty() {
        info!("TWITTER_ACCOUNTS is empty, only timeline searches will return results");
    }

    let client = TwitterClient::new(&twitter_config)?;
    let collection = TwitterCollection::new(
        collection_config.identifier,
        collection_config.base_url,
        collection_config.accounts,
        client,
    );
    info!(
        "Serving collection '{}' with {} account(s), description at {}/{}/description",
        collection.identifier,
        collection.accounts.len(),
        collection.base_url,
        collection.identifier
    );

    let state = Arc::new(AppState { collection });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_origin(Any);

    // Build the HTTP application with all routes and middleware
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .layer(SetResponseHeaderLayer::overriding(
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            )),
    );

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Starting opensearch-twitter server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}
