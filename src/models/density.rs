//! Sample-density tiers for aggregated comps.

use serde::{Deserialize, Serialize};

/// Confidence tier derived from how many records back a comp's win rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    /// Too few samples to trust the average
    Low,
    /// Some corroboration, still noisy
    Medium,
    /// Well-sampled
    High,
}

/// Tier boundaries. These are presentation tuning, not correctness:
/// they never affect the win-rate math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DensityThresholds {
    /// Largest sample count still classified Low.
    pub low_max: u32,
    /// Largest sample count still classified Medium.
    pub medium_max: u32,
}

impl Default for DensityThresholds {
    fn default() -> Self {
        Self {
            low_max: 2,
            medium_max: 6,
        }
    }
}

impl Density {
    /// Classify a sample count against the given thresholds.
    pub fn from_sample_count(n: u32, thresholds: DensityThresholds) -> Self {
        if n <= thresholds.low_max {
            Density::Low
        } else if n <= thresholds.medium_max {
            Density::Medium
        } else {
            Density::High
        }
    }

    /// Parse a tier name ("low", "medium", "high").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "low" => Some(Density::Low),
            "medium" => Some(Density::Medium),
            "high" => Some(Density::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Density {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Density::Low => write!(f, "low"),
            Density::Medium => write!(f, "medium"),
            Density::High => write!(f, "high"),
        }
    }
}
