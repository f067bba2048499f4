//! Quote data structures for market movers

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{MoversError, MoversResult};

/// A single instrument's price/volume snapshot from the upstream provider.
///
/// All numeric fields are kept as the provider's decimal strings
/// (e.g. `"231.44"`, `"0.5432%"`); parsing happens only at the watchlist
/// boundary via [`Quote::to_watchlist_entry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Ticker symbol, the natural key within each movers list
    pub ticker: String,

    /// Last price as a decimal string
    pub price: String,

    /// Absolute change as a decimal string
    pub change_amount: String,

    /// Percentage change as a decimal string with a trailing `%`
    pub change_percentage: String,

    /// Traded volume as a decimal string
    pub volume: String,
}

impl Quote {
    /// Convert this quote to the shape the watchlist persistence layer
    /// stores. This is the sole data shape crossing that boundary.
    pub fn to_watchlist_entry(&self) -> MoversResult<WatchlistEntry> {
        let price = parse_decimal(&self.price, "price", &self.ticker)?;
        let change = parse_decimal(&self.change_amount, "change_amount", &self.ticker)?;
        let change_percent = parse_decimal(
            self.change_percentage.trim_end_matches('%'),
            "change_percentage",
            &self.ticker,
        )?;

        Ok(WatchlistEntry {
            symbol: self.ticker.clone(),
            // The provider's movers feed carries no company names
            name: format!("Company {}", self.ticker),
            price,
            change,
            change_percent,
        })
    }
}

fn parse_decimal(raw: &str, field: &str, ticker: &str) -> MoversResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| MoversError::parse(format!("invalid {} {:?} for {}: {}", field, raw, ticker, e)))
}

/// One upstream snapshot of the market movers lists
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Top gaining instruments
    pub top_gainers: Vec<Quote>,

    /// Top losing instruments
    pub top_losers: Vec<Quote>,

    /// Most actively traded instruments
    pub most_active: Vec<Quote>,

    /// The provider's own "last updated" timestamp, passed through verbatim
    /// (e.g. `"2024-01-19 16:15:59 US/Eastern"`)
    pub last_updated: String,
}

impl QuoteSnapshot {
    /// Whether the snapshot carries no quotes at all
    pub fn is_empty(&self) -> bool {
        self.top_gainers.is_empty() && self.top_losers.is_empty() && self.most_active.is_empty()
    }

    /// Look a ticker up across all three lists. Lists may share tickers;
    /// the first match wins (gainers, then losers, then most active).
    pub fn find_ticker(&self, ticker: &str) -> Option<&Quote> {
        self.top_gainers
            .iter()
            .chain(self.top_losers.iter())
            .chain(self.most_active.iter())
            .find(|q| q.ticker == ticker)
    }
}

/// The shape a quote takes when a UI action adds it to a persisted
/// watchlist. Owned by the out-of-scope persistence subsystem; defined
/// here because the conversion is part of the core's boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn quote(ticker: &str) -> Quote {
        Quote {
            ticker: ticker.to_string(),
            price: "231.44".to_string(),
            change_amount: "-2.13".to_string(),
            change_percentage: "-0.9118%".to_string(),
            volume: "53201345".to_string(),
        }
    }

    #[test]
    fn test_to_watchlist_entry_parses_decimal_strings() {
        let entry = quote("AAPL").to_watchlist_entry().unwrap();

        assert_eq!(entry.symbol, "AAPL");
        assert_eq!(entry.name, "Company AAPL");
        assert_eq!(entry.price, dec!(231.44));
        assert_eq!(entry.change, dec!(-2.13));
        assert_eq!(entry.change_percent, dec!(-0.9118));
    }

    #[test]
    fn test_to_watchlist_entry_rejects_malformed_price() {
        let mut q = quote("AAPL");
        q.price = "n/a".to_string();

        let err = q.to_watchlist_entry().unwrap_err();
        assert!(matches!(err, MoversError::Parse(_)), "got {:?}", err);
    }

    #[test]
    fn test_find_ticker_searches_all_lists() {
        let snapshot = QuoteSnapshot {
            top_gainers: vec![quote("NVDA")],
            top_losers: vec![quote("AAPL")],
            most_active: vec![quote("TSLA")],
            last_updated: "2024-01-19 16:15:59 US/Eastern".to_string(),
        };

        assert!(snapshot.find_ticker("AAPL").is_some());
        assert!(snapshot.find_ticker("TSLA").is_some());
        assert!(snapshot.find_ticker("MSFT").is_none());
        assert!(!snapshot.is_empty());
        assert!(QuoteSnapshot::default().is_empty());
    }
}
