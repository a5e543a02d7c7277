//! Mode-keyed snapshots of fetched rows.
//!
//! Aggregation and recommendation are cheap to re-run; fetching 20k rows
//! is not. The cache holds one raw-row snapshot per mode so filter
//! changes re-run the pure pipeline without refetching. The pipeline
//! itself never touches the cache; it is owned by the caller.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::models::RawComp;

/// One fetched row set for a mode.
#[derive(Debug, Clone, PartialEq)]
pub struct RowsSnapshot {
    pub rows: Vec<RawComp>,
    /// True when the fetch stopped at the row-count safety cap.
    pub truncated: bool,
    pub fetched_at: DateTime<Utc>,
}

impl RowsSnapshot {
    pub fn new(rows: Vec<RawComp>, truncated: bool) -> Self {
        Self {
            rows,
            truncated,
            fetched_at: Utc::now(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Snapshot cache keyed by mode, with TTL expiry.
#[derive(Debug)]
pub struct ModeCache {
    ttl: Duration,
    entries: HashMap<String, RowsSnapshot>,
}

impl ModeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// A snapshot for the mode, if present and not past its TTL.
    pub fn get_fresh(&self, mode: &str) -> Option<&RowsSnapshot> {
        let snapshot = self.entries.get(mode)?;
        let age = Utc::now().signed_duration_since(snapshot.fetched_at);
        if age.num_seconds() > self.ttl.as_secs() as i64 {
            return None;
        }
        Some(snapshot)
    }

    pub fn insert(&mut self, mode: &str, snapshot: RowsSnapshot) {
        self.entries.insert(mode.to_string(), snapshot);
    }

    /// Drop one mode's snapshot.
    pub fn invalidate(&mut self, mode: &str) -> bool {
        self.entries.remove(mode).is_some()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_aged(seconds_old: i64) -> RowsSnapshot {
        RowsSnapshot {
            rows: vec![RawComp {
                heroes: Some("A - B".to_string()),
                pet: Some("Fox".to_string()),
                winrate: Some(50.0),
                teams: None,
                region: None,
            }],
            truncated: false,
            fetched_at: Utc::now() - chrono::Duration::seconds(seconds_old),
        }
    }

    #[test]
    fn test_fresh_hit() {
        let mut cache = ModeCache::new(Duration::from_secs(600));
        cache.insert("ts-forest", snapshot_aged(10));

        let hit = cache.get_fresh("ts-forest").unwrap();
        assert_eq!(hit.row_count(), 1);
    }

    #[test]
    fn test_expired_entry_misses() {
        let mut cache = ModeCache::new(Duration::from_secs(600));
        cache.insert("ts-forest", snapshot_aged(601));

        assert!(cache.get_fresh("ts-forest").is_none());
        // Entry is still stored; only freshness is gone.
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_unknown_mode_misses() {
        let cache = ModeCache::new(Duration::from_secs(600));
        assert!(cache.get_fresh("ts-desert").is_none());
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ModeCache::new(Duration::from_secs(600));
        cache.insert("ts-forest", snapshot_aged(0));

        assert!(cache.invalidate("ts-forest"));
        assert!(!cache.invalidate("ts-forest"));
        assert!(cache.get_fresh("ts-forest").is_none());
    }

    #[test]
    fn test_clear() {
        let mut cache = ModeCache::new(Duration::from_secs(600));
        cache.insert("a", snapshot_aged(0));
        cache.insert("b", snapshot_aged(0));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_modes_are_independent() {
        let mut cache = ModeCache::new(Duration::from_secs(600));
        cache.insert("a", snapshot_aged(0));
        cache.insert("b", snapshot_aged(700));

        assert!(cache.get_fresh("a").is_some());
        assert!(cache.get_fresh("b").is_none());
    }
}
