//! Chart series types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Chart period buckets offered by the UI's period tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartPeriod {
    #[serde(rename = "1D")]
    OneDay,
    #[serde(rename = "1W")]
    OneWeek,
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "1Y")]
    OneYear,
}

impl ChartPeriod {
    /// Number of points a series for this period carries.
    /// Synthetic series have exactly this many; live series at most.
    pub fn point_count(&self) -> usize {
        match self {
            ChartPeriod::OneDay => 7,
            ChartPeriod::OneWeek => 5,
            ChartPeriod::OneMonth => 30,
            ChartPeriod::OneYear => 12,
        }
    }

    /// The tab label form ("1D", "1W", "1M", "1Y")
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartPeriod::OneDay => "1D",
            ChartPeriod::OneWeek => "1W",
            ChartPeriod::OneMonth => "1M",
            ChartPeriod::OneYear => "1Y",
        }
    }
}

impl fmt::Display for ChartPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ChartPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1D" => Ok(ChartPeriod::OneDay),
            "1W" => Ok(ChartPeriod::OneWeek),
            "1M" => Ok(ChartPeriod::OneMonth),
            "1Y" => Ok(ChartPeriod::OneYear),
            _ => Err(format!("Unknown chart period: {}", s)),
        }
    }
}

/// Where a chart series came from. Synthetic data is clearly fabricated;
/// the UI uses this to indicate provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    Live,
    Synthetic,
}

/// A single point on a price chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Price value to plot
    pub value: f64,

    /// Axis label; may be empty when the period thins labels out
    pub label: String,

    /// When this point is for
    pub timestamp: DateTime<Utc>,
}

/// A renderable price series for one (symbol, period) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub symbol: String,
    pub period: ChartPeriod,
    pub points: Vec<ChartPoint>,
    pub source: SeriesSource,
    pub fetched_at: DateTime<Utc>,
}
