//! Business logic services for the market movers client
//!
//! This crate provides the layer between the UI and the upstream quote
//! provider: the TTL cache, the refresh orchestrator that decides what
//! data the UI is allowed to show and why, and the chart data provider.

pub mod chart_service;
pub mod quote_service;
pub mod ttl_cache;

pub use chart_service::{ChartService, ChartSource};
pub use quote_service::{QuoteService, QuoteSource, QuoteState, RefreshResult};
pub use ttl_cache::{CacheStats, TtlCache};
