//! Market Movers API Server
//!
//! HTTP surface exposing the quote cache, degraded-mode state, and chart
//! series to the mobile UI.

mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use movers_alphavantage::AlphaVantageClient;
use movers_services::{ChartService, QuoteService};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub quote_service: Arc<QuoteService>,
    pub chart_service: Arc<ChartService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,movers_api=debug")),
        )
        .init();

    info!("Starting Market Movers API");

    if std::env::var("ALPHAVANTAGE_API_KEY").is_ok() {
        info!("Alpha Vantage API key found in environment");
    } else {
        info!("No Alpha Vantage API key found - using the demo key");
    }

    // Initialize the upstream client; it backs both services
    let client = Arc::new(AlphaVantageClient::from_env()?);

    let state = AppState {
        quote_service: Arc::new(QuoteService::new(client.clone())),
        chart_service: Arc::new(ChartService::new(client)),
    };

    // Configure CORS for the frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    let app = Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::health_routes())
        .layer(cors)
        .with_state(state);

    // Start server
    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
