//! Chart data provider
//!
//! Produces a renderable price series for each (symbol, period) pair,
//! independent of the quote cache. A live fetch that yields nothing usable
//! is replaced by a deterministic synthetic series, so the chart is always
//! renderable; the `source` field discloses which one the UI is looking at.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use dashmap::DashMap;
use movers_alphavantage::AlphaVantageClient;
use movers_core::{ChartPeriod, ChartPoint, ChartSeries, MoversResult, SeriesSource};
use tracing::{debug, warn};

/// Smallest value a synthetic point may take
const MIN_SYNTHETIC_VALUE: f64 = 0.01;

/// Base price used when the caller has none
const DEFAULT_BASE_PRICE: f64 = 100.0;

/// Upstream close-price source for charts
#[async_trait]
pub trait ChartSource: Send + Sync {
    /// (timestamp, close) pairs, oldest first
    async fn fetch_series(
        &self,
        symbol: &str,
        period: ChartPeriod,
    ) -> MoversResult<Vec<(DateTime<Utc>, f64)>>;
}

#[async_trait]
impl ChartSource for AlphaVantageClient {
    async fn fetch_series(
        &self,
        symbol: &str,
        period: ChartPeriod,
    ) -> MoversResult<Vec<(DateTime<Utc>, f64)>> {
        self.time_series(symbol, period).await
    }
}

#[derive(Debug, Clone, Default)]
struct KeyState {
    loading: bool,
    error: Option<String>,
}

/// Per-(symbol, period) fetch-or-synthesize service.
///
/// Loading and error state are tracked per key, so loading one
/// symbol/period never affects another's displayed state.
pub struct ChartService {
    source: Arc<dyn ChartSource>,
    states: DashMap<(String, ChartPeriod), KeyState>,
}

impl ChartService {
    pub fn new(source: Arc<dyn ChartSource>) -> Self {
        Self {
            source,
            states: DashMap::new(),
        }
    }

    /// Produce a series for (symbol, period). Never fails: synthesis is
    /// the universal fallback.
    ///
    /// The per-key error slot still records a live-fetch failure, so the
    /// UI can say why it is looking at fabricated data.
    pub async fn get_series(
        &self,
        symbol: &str,
        period: ChartPeriod,
        base_price: f64,
    ) -> ChartSeries {
        let key = (symbol.to_string(), period);
        self.states.insert(
            key.clone(),
            KeyState {
                loading: true,
                error: None,
            },
        );

        let now = Utc::now();
        let (points, source, error) = match self.source.fetch_series(symbol, period).await {
            Ok(raw) if raw.is_empty() => {
                debug!(symbol, %period, "Upstream returned an empty series, synthesizing");
                (
                    synthesize(period, base_price, now),
                    SeriesSource::Synthetic,
                    Some("upstream returned an empty series".to_string()),
                )
            }
            Ok(raw) => {
                let points = live_points(&raw, period);
                debug!(symbol, %period, points = points.len(), "Using live series");
                (points, SeriesSource::Live, None)
            }
            Err(e) => {
                warn!(symbol, %period, error = %e, "Live fetch failed, synthesizing");
                (
                    synthesize(period, base_price, now),
                    SeriesSource::Synthetic,
                    Some(e.to_string()),
                )
            }
        };

        self.states.insert(
            key,
            KeyState {
                loading: false,
                error,
            },
        );

        ChartSeries {
            symbol: symbol.to_string(),
            period,
            points,
            source,
            fetched_at: now,
        }
    }

    /// Whether a fetch for this key is in flight
    pub fn is_loading(&self, symbol: &str, period: ChartPeriod) -> bool {
        self.states
            .get(&(symbol.to_string(), period))
            .map(|state| state.loading)
            .unwrap_or(false)
    }

    /// The last live-fetch failure for this key, if any
    pub fn error(&self, symbol: &str, period: ChartPeriod) -> Option<String> {
        self.states
            .get(&(symbol.to_string(), period))
            .and_then(|state| state.error.clone())
    }
}

/// Keep at most the period's point count of the most recent closes,
/// oldest first, with period-specific labels
fn live_points(raw: &[(DateTime<Utc>, f64)], period: ChartPeriod) -> Vec<ChartPoint> {
    let count = period.point_count().min(raw.len());
    let window = &raw[raw.len() - count..];

    window
        .iter()
        .enumerate()
        .map(|(index, (timestamp, close))| ChartPoint {
            value: *close,
            label: point_label(period, *timestamp, index, count),
            timestamp: *timestamp,
        })
        .collect()
}

/// Deterministic fallback series: a ±1% sinusoid over the series index
/// plus a +2% linear trend, floored at a minimal positive value
fn synthesize(period: ChartPeriod, base_price: f64, now: DateTime<Utc>) -> Vec<ChartPoint> {
    let total = period.point_count();
    let price = if base_price > 0.0 {
        base_price
    } else {
        DEFAULT_BASE_PRICE
    };

    (0..total)
        .map(|index| {
            let timestamp = synthetic_timestamp(period, now, index, total);
            ChartPoint {
                value: synthetic_value(price, index, total),
                label: point_label(period, timestamp, index, total),
                timestamp,
            }
        })
        .collect()
}

fn synthetic_value(price: f64, index: usize, total: usize) -> f64 {
    let progress = index as f64 / total as f64;
    let wave = (progress * std::f64::consts::TAU).sin() * 0.01;
    let trend = progress * 0.02;
    (price * (1.0 + wave + trend)).max(MIN_SYNTHETIC_VALUE)
}

fn synthetic_timestamp(
    period: ChartPeriod,
    now: DateTime<Utc>,
    index: usize,
    total: usize,
) -> DateTime<Utc> {
    match period {
        ChartPeriod::OneDay => {
            // One point per trading hour, 9 AM through 3 PM
            let hour = 9 + index as u32;
            now.date_naive()
                .and_hms_opt(hour, 0, 0)
                .map(|dt| dt.and_utc())
                .unwrap_or(now)
        }
        ChartPeriod::OneWeek | ChartPeriod::OneMonth => {
            now - Duration::days((total - 1 - index) as i64)
        }
        ChartPeriod::OneYear => {
            let back = (total - 1 - index) as u32;
            let date = now
                .date_naive()
                .checked_sub_months(Months::new(back))
                .unwrap_or_else(|| now.date_naive());
            let date = date.with_day(1).unwrap_or(date);
            date.and_time(NaiveTime::MIN).and_utc()
        }
    }
}

/// Period-specific axis labels; 1M thins labels to every 5th point plus
/// the first and last
fn point_label(period: ChartPeriod, timestamp: DateTime<Utc>, index: usize, total: usize) -> String {
    match period {
        ChartPeriod::OneDay => timestamp.format("%-H:%M").to_string(),
        ChartPeriod::OneWeek => timestamp.format("%a").to_string(),
        ChartPeriod::OneMonth => {
            if index % 5 == 0 || index + 1 == total {
                timestamp.format("%-d").to_string()
            } else {
                String::new()
            }
        }
        ChartPeriod::OneYear => timestamp.format("%b").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use movers_core::MoversError;

    /// Source that always fails, as if offline or rate limited
    struct FailingSource;

    #[async_trait]
    impl ChartSource for FailingSource {
        async fn fetch_series(
            &self,
            _symbol: &str,
            _period: ChartPeriod,
        ) -> MoversResult<Vec<(DateTime<Utc>, f64)>> {
            Err(MoversError::rate_limited("25 requests per day"))
        }
    }

    /// Source that returns a fixed number of daily closes
    struct FixedSource(usize);

    #[async_trait]
    impl ChartSource for FixedSource {
        async fn fetch_series(
            &self,
            symbol: &str,
            _period: ChartPeriod,
        ) -> MoversResult<Vec<(DateTime<Utc>, f64)>> {
            if symbol == "EMPTY" {
                return Ok(vec![]);
            }
            let start = Utc::now() - Duration::days(self.0 as i64);
            Ok((0..self.0)
                .map(|i| (start + Duration::days(i as i64), 100.0 + i as f64))
                .collect())
        }
    }

    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];

    #[tokio::test]
    async fn test_failed_fetch_synthesizes_for_every_period() {
        let service = ChartService::new(Arc::new(FailingSource));

        for (period, count) in [
            (ChartPeriod::OneDay, 7),
            (ChartPeriod::OneWeek, 5),
            (ChartPeriod::OneMonth, 30),
            (ChartPeriod::OneYear, 12),
        ] {
            let series = service.get_series("AAPL", period, 150.0).await;

            assert_eq!(series.points.len(), count);
            assert_eq!(series.source, SeriesSource::Synthetic);
            assert!(series.points.iter().all(|p| p.value > 0.0));
        }
    }

    #[tokio::test]
    async fn test_synthetic_year_labels_are_month_abbreviations() {
        let service = ChartService::new(Arc::new(FailingSource));

        let series = service.get_series("AAPL", ChartPeriod::OneYear, 150.0).await;

        assert_eq!(series.points.len(), 12);
        for point in &series.points {
            assert!(MONTHS.contains(&point.label.as_str()), "label {:?}", point.label);
        }
    }

    #[tokio::test]
    async fn test_empty_series_falls_back_to_synthetic() {
        let service = ChartService::new(Arc::new(FixedSource(10)));

        let series = service.get_series("EMPTY", ChartPeriod::OneWeek, 50.0).await;

        assert_eq!(series.source, SeriesSource::Synthetic);
        assert_eq!(series.points.len(), 5);
        assert!(service.error("EMPTY", ChartPeriod::OneWeek).is_some());
    }

    #[tokio::test]
    async fn test_live_series_is_truncated_to_period_count() {
        let service = ChartService::new(Arc::new(FixedSource(40)));

        let series = service.get_series("AAPL", ChartPeriod::OneMonth, 0.0).await;

        assert_eq!(series.source, SeriesSource::Live);
        assert_eq!(series.points.len(), 30);
        // The window keeps the most recent closes
        assert_eq!(series.points.last().unwrap().value, 139.0);
        assert!(series.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert!(service.error("AAPL", ChartPeriod::OneMonth).is_none());
    }

    #[tokio::test]
    async fn test_month_labels_thin_to_every_fifth_point() {
        let service = ChartService::new(Arc::new(FailingSource));

        let series = service.get_series("AAPL", ChartPeriod::OneMonth, 150.0).await;

        for (index, point) in series.points.iter().enumerate() {
            let expect_label = index % 5 == 0 || index + 1 == series.points.len();
            assert_eq!(!point.label.is_empty(), expect_label, "index {}", index);
        }
    }

    #[tokio::test]
    async fn test_per_key_state_is_independent() {
        let service = ChartService::new(Arc::new(FixedSource(10)));

        service.get_series("EMPTY", ChartPeriod::OneDay, 10.0).await;
        service.get_series("AAPL", ChartPeriod::OneDay, 10.0).await;

        assert!(service.error("EMPTY", ChartPeriod::OneDay).is_some());
        assert!(service.error("AAPL", ChartPeriod::OneDay).is_none());
        assert!(!service.is_loading("EMPTY", ChartPeriod::OneDay));
        assert!(!service.is_loading("AAPL", ChartPeriod::OneDay));
    }

    #[test]
    fn test_synthetic_values_are_deterministic_and_floored() {
        assert_eq!(synthetic_value(150.0, 3, 12), synthetic_value(150.0, 3, 12));
        // A vanishingly small base price still yields a plottable value
        assert_eq!(synthetic_value(0.0001, 0, 7), MIN_SYNTHETIC_VALUE);
    }

    #[test]
    fn test_non_positive_base_price_uses_default() {
        let points = synthesize(ChartPeriod::OneDay, 0.0, Utc::now());
        // First point: no wave, no trend yet
        assert!((points[0].value - DEFAULT_BASE_PRICE).abs() < 1e-9);
    }
}
