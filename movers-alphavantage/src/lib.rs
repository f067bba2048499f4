//! Alpha Vantage API client
//!
//! Thin adapter over the Alpha Vantage REST API: one upstream request per
//! operation, no retries. Failures are classified into rate-limit vs.
//! transport errors here so the service layer can decide what the UI is
//! allowed to show.

pub mod client;
pub mod types;

pub use client::AlphaVantageClient;
pub use types::{ApiNotice, RawMover, TopMoversResponse, ALPHAVANTAGE_API_BASE};
