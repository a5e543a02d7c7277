//! # Comp Finder
//!
//! Aggregation and recommendation engine for top-war team compositions.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (raw rows, comp keys, buckets, stats)
//! - **fetch**: Paged row retrieval from the hosted comps store
//! - **calculate**: Aggregation, filtering, and conflict-free selection
//! - **cache**: Mode-keyed TTL cache of fetched row snapshots
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod cache;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod models;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "1d", "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}
