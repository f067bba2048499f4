//! Chart series endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use movers_core::ChartPeriod;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::AppState;

/// Query parameters for a chart series
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    /// Period tab (1D, 1W, 1M, 1Y); defaults to 1D
    pub period: Option<String>,
    /// Base price for the synthetic fallback
    pub base_price: Option<f64>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create chart routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/charts/{symbol}", get(get_series))
}

/// Fetch or synthesize a series for (symbol, period)
async fn get_series(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<ChartQuery>,
) -> Response {
    let period = match params.period.as_deref().map(ChartPeriod::from_str).transpose() {
        Ok(period) => period.unwrap_or(ChartPeriod::OneDay),
        Err(error) => {
            return (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
        }
    };

    info!(%symbol, %period, "Fetching chart series");

    let base_price = params.base_price.unwrap_or(0.0);
    let series = state.chart_service.get_series(&symbol, period, base_price).await;

    Json(series).into_response()
}
