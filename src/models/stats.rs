//! Aggregated composition statistics.

use serde::{Deserialize, Serialize};

use super::{CompDisplay, CompKey, Density};

/// One aggregated composition within a bucket.
///
/// Immutable once built for an aggregation pass; recomputed whenever the
/// input row set or filters change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompStats {
    /// Canonical identity
    pub key: CompKey,

    /// Display heroes/pet from the first record observed for this key
    pub display: CompDisplay,

    /// Number of records aggregated
    pub sample_count: u32,

    /// Arithmetic mean of observed win rates (percentage)
    pub mean_win_rate: f64,

    /// Confidence tier from sample count
    pub density: Density,
}

impl CompStats {
    /// True if this comp shares a non-unknown hero or pet with `other`.
    pub fn conflicts_with(&self, other: &CompStats) -> bool {
        if self.key.has_known_pet() && other.key.has_known_pet() && self.key.pet() == other.key.pet()
        {
            return true;
        }
        self.key
            .known_heroes()
            .any(|h| other.key.contains_hero(h))
    }
}
