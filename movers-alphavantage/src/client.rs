//! Alpha Vantage API client
//!
//! Provides methods for fetching the market-movers snapshot and per-symbol
//! time series. Rate-limit classification is checked on both the HTTP
//! status and the response body, because the provider sometimes returns
//! HTTP 200 with an in-body notice instead of a 429.

use crate::types::{
    ApiNotice, TopMoversResponse, ALPHAVANTAGE_API_BASE, FUNCTION_TIME_SERIES_DAILY,
    FUNCTION_TIME_SERIES_INTRADAY, FUNCTION_TIME_SERIES_MONTHLY, FUNCTION_TOP_GAINERS_LOSERS,
    TIME_SERIES_KEYS,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use movers_core::{ChartPeriod, MoversError, MoversResult, QuoteSnapshot};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Phrases that mark a provider message as a rate-limit/quota notice
const RATE_LIMIT_PATTERNS: [&str; 4] = ["rate limit", "quota", "limit exceeded", "call frequency"];

/// Intraday interval requested for 1D charts
const INTRADAY_INTERVAL: &str = "60min";

/// Alpha Vantage API client
#[derive(Clone)]
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    /// Create a new client with an explicit API key
    pub fn new(api_key: impl Into<String>) -> MoversResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| MoversError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: ALPHAVANTAGE_API_BASE.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a client from `ALPHAVANTAGE_API_KEY`, falling back to the
    /// provider's `demo` key (limited but works for the movers feed)
    pub fn from_env() -> MoversResult<Self> {
        let api_key = std::env::var("ALPHAVANTAGE_API_KEY").unwrap_or_else(|_| "demo".to_string());
        Self::new(api_key)
    }

    /// Override the base URL (tests, proxies)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the top gainers / losers / most active snapshot
    #[instrument(skip(self))]
    pub async fn top_movers(&self) -> MoversResult<QuoteSnapshot> {
        debug!("Fetching top movers from: {}", self.base_url);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("function", FUNCTION_TOP_GAINERS_LOSERS),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| MoversError::network(format!("Failed to fetch top movers: {}", e)))?;

        let response = check_status(response).await?;

        let payload: TopMoversResponse = response
            .json()
            .await
            .map_err(|e| MoversError::parse(format!("Failed to parse movers response: {}", e)))?;

        check_notice(&payload.notice)?;

        let snapshot = payload.into_snapshot();
        debug!(
            gainers = snapshot.top_gainers.len(),
            losers = snapshot.top_losers.len(),
            active = snapshot.most_active.len(),
            "Fetched top movers snapshot"
        );
        Ok(snapshot)
    }

    /// Fetch the close-price series for a symbol, scoped to the requested
    /// period bucket (1D intraday, 1W/1M daily, 1Y monthly). Returns
    /// (timestamp, close) pairs oldest first; truncation to the period's
    /// point count is the chart service's job.
    #[instrument(skip(self))]
    pub async fn time_series(
        &self,
        symbol: &str,
        period: ChartPeriod,
    ) -> MoversResult<Vec<(DateTime<Utc>, f64)>> {
        let function = match period {
            ChartPeriod::OneDay => FUNCTION_TIME_SERIES_INTRADAY,
            ChartPeriod::OneWeek | ChartPeriod::OneMonth => FUNCTION_TIME_SERIES_DAILY,
            ChartPeriod::OneYear => FUNCTION_TIME_SERIES_MONTHLY,
        };

        let mut params = vec![
            ("function", function.to_string()),
            ("symbol", symbol.to_string()),
            ("apikey", self.api_key.clone()),
        ];
        if period == ChartPeriod::OneDay {
            params.push(("interval", INTRADAY_INTERVAL.to_string()));
        }

        debug!(function, symbol, "Fetching time series");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| MoversError::network(format!("Failed to fetch time series: {}", e)))?;

        let response = check_status(response).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| MoversError::parse(format!("Failed to parse time series response: {}", e)))?;

        let notice: ApiNotice = serde_json::from_value(body.clone()).unwrap_or_default();
        check_notice(&notice)?;

        extract_series_points(&body)
    }
}

/// Map a non-success HTTP status to the error taxonomy, classifying 429
/// and rate-limit body text as `RateLimited`
async fn check_status(response: reqwest::Response) -> MoversResult<reqwest::Response> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().await.unwrap_or_default();
        return Err(MoversError::rate_limited(format!("HTTP 429: {}", body)));
    }

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        if is_rate_limit_text(&body) {
            return Err(MoversError::rate_limited(format!(
                "Alpha Vantage error ({}): {}",
                status, body
            )));
        }
        return Err(MoversError::api(format!(
            "Alpha Vantage error ({}): {}",
            status, body
        )));
    }

    Ok(response)
}

/// Treat any in-body notice as a failure, classified by its text.
/// The provider emits these with HTTP 200.
fn check_notice(notice: &ApiNotice) -> MoversResult<()> {
    match notice.message() {
        Some(msg) if is_rate_limit_text(msg) => Err(MoversError::rate_limited(msg.to_string())),
        Some(msg) => Err(MoversError::api(msg.to_string())),
        None => Ok(()),
    }
}

fn is_rate_limit_text(text: &str) -> bool {
    let lower = text.to_lowercase();
    RATE_LIMIT_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Pull (timestamp, close) pairs out of whichever time-series object the
/// response carries, sorted oldest first. Bars with a missing or
/// unparsable close are skipped.
fn extract_series_points(body: &Value) -> MoversResult<Vec<(DateTime<Utc>, f64)>> {
    let series = TIME_SERIES_KEYS
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_object))
        .ok_or_else(|| MoversError::parse("no time series object in response"))?;

    let mut points = Vec::with_capacity(series.len());
    let mut skipped = 0usize;

    for (stamp, bar) in series {
        let close = bar
            .get("4. close")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<f64>().ok());

        match (parse_series_timestamp(stamp), close) {
            (Some(timestamp), Some(close)) => points.push((timestamp, close)),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, total = series.len(), "Skipped bars with missing data");
    }

    points.sort_by_key(|(timestamp, _)| *timestamp);
    Ok(points)
}

/// Series keys are either `2024-01-19 16:00:00` (intraday) or
/// `2024-01-19` (daily/monthly)
fn parse_series_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rate_limit_text_matching() {
        assert!(is_rate_limit_text(
            "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        ));
        assert!(is_rate_limit_text("API call frequency is 5 calls per minute"));
        assert!(is_rate_limit_text("Daily QUOTA exhausted"));
        assert!(!is_rate_limit_text("Invalid API call for symbol FOO"));
    }

    #[test]
    fn test_notice_with_rate_limit_phrase_classifies_as_rate_limited() {
        let notice = ApiNotice {
            note: Some("Our standard API rate limit is 25 requests per day.".to_string()),
            ..Default::default()
        };

        let err = check_notice(&notice).unwrap_err();
        assert!(err.is_rate_limited(), "got {:?}", err);
    }

    #[test]
    fn test_notice_without_rate_limit_phrase_is_api_error() {
        let notice = ApiNotice {
            error_message: Some("Invalid API call. Please retry with a valid symbol.".to_string()),
            ..Default::default()
        };

        let err = check_notice(&notice).unwrap_err();
        assert!(matches!(err, MoversError::Api(_)), "got {:?}", err);
    }

    #[test]
    fn test_information_key_is_also_a_failure() {
        let notice = ApiNotice {
            information: Some("The demo API key is for demonstration only.".to_string()),
            ..Default::default()
        };

        assert!(check_notice(&notice).is_err());
    }

    #[test]
    fn test_extract_series_points_daily() {
        let body = json!({
            "Meta Data": {"2. Symbol": "AAPL"},
            "Time Series (Daily)": {
                "2024-01-19": {"1. open": "180.00", "4. close": "191.56"},
                "2024-01-18": {"1. open": "179.00", "4. close": "188.63"},
                "2024-01-17": {"1. open": "178.00", "4. close": "182.68"}
            }
        });

        let points = extract_series_points(&body).unwrap();
        assert_eq!(points.len(), 3);
        // Oldest first regardless of object order
        assert!(points[0].0 < points[1].0 && points[1].0 < points[2].0);
        assert_eq!(points[2].1, 191.56);
    }

    #[test]
    fn test_extract_series_points_skips_malformed_bars() {
        let body = json!({
            "Time Series (60min)": {
                "2024-01-19 16:00:00": {"4. close": "191.56"},
                "2024-01-19 15:00:00": {"4. close": "not a number"},
                "2024-01-19 14:00:00": {"1. open": "190.00"}
            }
        });

        let points = extract_series_points(&body).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].1, 191.56);
    }

    #[test]
    fn test_extract_series_points_requires_a_series_object() {
        let body = json!({"Meta Data": {}});
        let err = extract_series_points(&body).unwrap_err();
        assert!(matches!(err, MoversError::Parse(_)), "got {:?}", err);
    }

    #[test]
    fn test_parse_series_timestamp_formats() {
        assert!(parse_series_timestamp("2024-01-19 16:00:00").is_some());
        assert!(parse_series_timestamp("2024-01-19").is_some());
        assert!(parse_series_timestamp("Jan 19 2024").is_none());
    }
}
