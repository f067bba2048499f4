//! Alpha Vantage API response types
//!
//! These types mirror the Alpha Vantage wire payloads and are converted
//! to movers-core types for use in the application.

use movers_core::{Quote, QuoteSnapshot};
use serde::Deserialize;

/// Base URL for the Alpha Vantage query API
pub const ALPHAVANTAGE_API_BASE: &str = "https://www.alphavantage.co/query";

/// `function=` values the client uses
pub const FUNCTION_TOP_GAINERS_LOSERS: &str = "TOP_GAINERS_LOSERS";
pub const FUNCTION_TIME_SERIES_INTRADAY: &str = "TIME_SERIES_INTRADAY";
pub const FUNCTION_TIME_SERIES_DAILY: &str = "TIME_SERIES_DAILY";
pub const FUNCTION_TIME_SERIES_MONTHLY: &str = "TIME_SERIES_MONTHLY";

/// Keys under which the time-series endpoints nest their data object,
/// depending on the function and interval requested
pub const TIME_SERIES_KEYS: [&str; 4] = [
    "Time Series (5min)",
    "Time Series (60min)",
    "Time Series (Daily)",
    "Monthly Time Series",
];

/// One entry in the gainers/losers/most-active lists, exactly as sent
#[derive(Debug, Clone, Deserialize)]
pub struct RawMover {
    pub ticker: String,
    pub price: String,
    pub change_amount: String,
    pub change_percentage: String,
    pub volume: String,
}

impl RawMover {
    pub fn into_quote(self) -> Quote {
        Quote {
            ticker: self.ticker,
            price: self.price,
            change_amount: self.change_amount,
            change_percentage: self.change_percentage,
            volume: self.volume,
        }
    }
}

/// The provider's in-body failure envelope.
///
/// Alpha Vantage frequently answers HTTP 200 with one of these keys
/// instead of an error status; any of them present means the call failed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiNotice {
    #[serde(rename = "Error Message", default)]
    pub error_message: Option<String>,

    #[serde(rename = "Note", default)]
    pub note: Option<String>,

    #[serde(rename = "Information", default)]
    pub information: Option<String>,
}

impl ApiNotice {
    /// The notice text, if any of the three keys is present
    pub fn message(&self) -> Option<&str> {
        self.error_message
            .as_deref()
            .or(self.note.as_deref())
            .or(self.information.as_deref())
    }
}

/// `TOP_GAINERS_LOSERS` payload
#[derive(Debug, Clone, Deserialize)]
pub struct TopMoversResponse {
    #[serde(default)]
    pub metadata: Option<String>,

    #[serde(default)]
    pub last_updated: Option<String>,

    #[serde(default)]
    pub top_gainers: Vec<RawMover>,

    #[serde(default)]
    pub top_losers: Vec<RawMover>,

    #[serde(default)]
    pub most_actively_traded: Vec<RawMover>,

    #[serde(flatten)]
    pub notice: ApiNotice,
}

impl TopMoversResponse {
    pub fn into_snapshot(self) -> QuoteSnapshot {
        QuoteSnapshot {
            top_gainers: self.top_gainers.into_iter().map(RawMover::into_quote).collect(),
            top_losers: self.top_losers.into_iter().map(RawMover::into_quote).collect(),
            most_active: self
                .most_actively_traded
                .into_iter()
                .map(RawMover::into_quote)
                .collect(),
            last_updated: self.last_updated.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_movers_payload_deserializes() {
        let body = r#"{
            "metadata": "Top gainers, losers, and most actively traded US tickers",
            "last_updated": "2024-01-19 16:15:59 US/Eastern",
            "top_gainers": [
                {"ticker": "AMPG", "price": "4.22", "change_amount": "1.52", "change_percentage": "56.2963%", "volume": "44291335"}
            ],
            "top_losers": [
                {"ticker": "BNED", "price": "0.23", "change_amount": "-0.08", "change_percentage": "-25.8065%", "volume": "9315923"}
            ],
            "most_actively_traded": [
                {"ticker": "TSLA", "price": "211.88", "change_amount": "0.25", "change_percentage": "0.1181%", "volume": "102260343"}
            ]
        }"#;

        let response: TopMoversResponse = serde_json::from_str(body).unwrap();
        assert!(response.notice.message().is_none());

        let snapshot = response.into_snapshot();
        assert_eq!(snapshot.top_gainers.len(), 1);
        assert_eq!(snapshot.top_gainers[0].ticker, "AMPG");
        assert_eq!(snapshot.top_losers[0].change_percentage, "-25.8065%");
        assert_eq!(snapshot.most_active[0].ticker, "TSLA");
        assert_eq!(snapshot.last_updated, "2024-01-19 16:15:59 US/Eastern");
    }

    #[test]
    fn test_notice_keys_flatten_out_of_payload() {
        let body = r#"{
            "Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."
        }"#;

        let response: TopMoversResponse = serde_json::from_str(body).unwrap();
        let msg = response.notice.message().unwrap();
        assert!(msg.contains("rate limit"));
        assert!(response.top_gainers.is_empty());
    }

    #[test]
    fn test_notice_prefers_error_message() {
        let notice = ApiNotice {
            error_message: Some("Invalid API call".to_string()),
            note: Some("something else".to_string()),
            information: None,
        };
        assert_eq!(notice.message(), Some("Invalid API call"));
    }
}
