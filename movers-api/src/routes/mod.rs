//! API route definitions

mod charts;
mod health;
mod movers;

use crate::AppState;
use axum::Router;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(movers::routes()).merge(charts::routes())
}

/// Create health routes (outside the /api prefix)
pub fn health_routes() -> Router<AppState> {
    health::routes()
}
