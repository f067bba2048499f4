//! Core types for the market movers client
//!
//! This crate defines the shared data structures used across the client,
//! including quote snapshots, chart series, and the error taxonomy.

pub mod chart;
pub mod error;
pub mod quote;

pub use chart::{ChartPeriod, ChartPoint, ChartSeries, SeriesSource};
pub use error::{MoversError, MoversResult};
pub use quote::{Quote, QuoteSnapshot, WatchlistEntry};
