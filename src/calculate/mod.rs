//! Aggregation engine.
//!
//! Turns raw comp rows into per-bucket composition statistics:
//! - Validity filtering with rejection tallies
//! - Grouping by canonical comp key per teams bucket
//! - Mean win rate and sample density per group
//!
//! Aggregation is pure and synchronous: given the same rows in the same
//! order it produces identical output. Malformed rows never raise; they
//! are skipped and counted.

pub mod filter;
pub mod recommend;

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::models::{
    normalize_comp, CompDisplay, CompKey, CompStats, Density, DensityThresholds, RawComp,
    TeamsBucket,
};

/// Why rows were excluded from aggregation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectCounts {
    /// Team count missing or outside 2..=7
    pub no_teams: u32,
    /// Win rate missing or not finite
    pub bad_winrate: u32,
    /// Too many unknown hero/pet slots
    pub too_unknown: u32,
}

impl RejectCounts {
    pub fn total(&self) -> u32 {
        self.no_teams + self.bad_winrate + self.too_unknown
    }
}

/// Tunables for one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Reject a record when unknown slots (5 heroes + pet) reach this
    /// count. 6 rejects only fully-unknown comps; lower values are
    /// stricter.
    pub unknown_limit: u32,

    /// Density tier boundaries.
    pub density: DensityThresholds,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            unknown_limit: 6,
            density: DensityThresholds::default(),
        }
    }
}

/// Result of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregation {
    /// Per-bucket comp lists, sorted by mean win rate descending.
    /// Every bucket is present; an empty bucket is an empty list.
    pub buckets: BTreeMap<TeamsBucket, Vec<CompStats>>,

    /// Rejection tallies for diagnostics.
    pub rejects: RejectCounts,
}

impl Aggregation {
    /// Comps for one bucket, win-rate descending.
    pub fn bucket(&self, bucket: TeamsBucket) -> &[CompStats] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total records that contributed to any bucket.
    pub fn aggregated_records(&self) -> u32 {
        self.buckets
            .values()
            .flatten()
            .map(|c| c.sample_count)
            .sum()
    }
}

/// Running group state; display fields come from the first record seen.
struct Group {
    display: CompDisplay,
    sum: f64,
    count: u32,
}

/// Insertion-ordered grouping for one bucket. Keeping groups in a Vec
/// (with a key index beside it) makes tie order deterministic.
#[derive(Default)]
struct BucketAccum {
    index: HashMap<CompKey, usize>,
    groups: Vec<(CompKey, Group)>,
}

impl BucketAccum {
    fn add(&mut self, key: CompKey, display: CompDisplay, win_rate: f64) {
        match self.index.get(&key) {
            Some(&i) => {
                let group = &mut self.groups[i].1;
                group.sum += win_rate;
                group.count += 1;
            }
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((
                    key,
                    Group {
                        display,
                        sum: win_rate,
                        count: 1,
                    },
                ));
            }
        }
    }

    fn finalize(self, thresholds: DensityThresholds) -> Vec<CompStats> {
        let mut comps: Vec<CompStats> = self
            .groups
            .into_iter()
            .map(|(key, g)| CompStats {
                key,
                display: g.display,
                sample_count: g.count,
                mean_win_rate: g.sum / g.count as f64,
                density: Density::from_sample_count(g.count, thresholds),
            })
            .collect();

        // Stable sort keeps first-seen order for exact win-rate ties.
        comps.sort_by(|a, b| {
            b.mean_win_rate
                .partial_cmp(&a.mean_win_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        comps
    }
}

/// Group rows into per-bucket comp statistics.
pub fn aggregate(rows: &[RawComp], opts: &AggregateOptions) -> Aggregation {
    let mut rejects = RejectCounts::default();
    let mut accums: BTreeMap<TeamsBucket, BucketAccum> = TeamsBucket::ALL
        .into_iter()
        .map(|b| (b, BucketAccum::default()))
        .collect();

    for row in rows {
        let bucket = match row.teams_count().and_then(TeamsBucket::from_teams_count) {
            Some(b) => b,
            None => {
                rejects.no_teams += 1;
                continue;
            }
        };

        let win_rate = match row.winrate {
            Some(w) if w.is_finite() => w,
            _ => {
                rejects.bad_winrate += 1;
                continue;
            }
        };

        let norm = normalize_comp(row.heroes.as_deref(), row.pet.as_deref());
        if norm.key.unknown_slots() >= opts.unknown_limit {
            rejects.too_unknown += 1;
            continue;
        }

        accums
            .get_mut(&bucket)
            .expect("all buckets present")
            .add(norm.key, norm.display, win_rate);
    }

    let buckets = accums
        .into_iter()
        .map(|(bucket, accum)| (bucket, accum.finalize(opts.density)))
        .collect();

    Aggregation { buckets, rejects }
}
