//! Market movers endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{error, info};

use crate::AppState;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Create movers routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/movers", get(get_state))
        .route("/movers/refresh", post(refresh))
        .route("/movers/{ticker}/watchlist-entry", get(watchlist_entry))
}

/// Current observable quote state; does not touch the upstream
async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.quote_service.state())
}

/// Run one refresh and return what the UI is allowed to show
async fn refresh(State(state): State<AppState>) -> impl IntoResponse {
    info!("Refreshing movers snapshot");

    let result = state.quote_service.refresh().await;

    // A degraded (cached) response is still a 200; only a hard error
    // with nothing to show maps to a gateway failure
    let code = if result.snapshot.is_some() {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };

    (code, Json(result))
}

/// Convert a quote from the last snapshot into the watchlist shape.
/// This is the sole data shape crossing into the persistence subsystem.
async fn watchlist_entry(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
) -> Response {
    let Some(snapshot) = state.quote_service.last_snapshot() else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "no snapshot loaded".to_string(),
            }),
        )
            .into_response();
    };

    let Some(quote) = snapshot.find_ticker(&ticker) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("ticker {} not in the last snapshot", ticker),
            }),
        )
            .into_response();
    };

    match quote.to_watchlist_entry() {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => {
            error!("Failed to convert {} to watchlist entry: {}", ticker, e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
