//! Conflict-free comp selection.
//!
//! From a bucket's win-rate-sorted comp list, pick at most K comps such
//! that no non-unknown hero or pet appears twice and no excluded hero
//! appears at all, maximizing the summed mean win rate. The selection has
//! exactly K comps whenever a conflict-free K-set exists.
//!
//! Two tiers: a greedy pass when the eligible pool is small, and an exact
//! branch-and-bound search over a capped candidate pool otherwise, with
//! the greedy pass as fallback when no exact-size solution exists.

use std::collections::{HashMap, HashSet};

use crate::models::{CompKey, CompStats, TeamsBucket};

use super::filter::HeroExclusions;

/// Tunables for one selection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendOptions {
    /// Number of comps to select (K). Zero means no recommendation.
    pub target: usize,

    /// Minimum sample count for a comp to be considered at all.
    pub min_samples: u32,

    /// Upper bound on the branch-and-bound candidate pool. Performance
    /// safeguard only; never affects which solutions are valid.
    pub candidate_cap: usize,
}

impl RecommendOptions {
    /// Options for an explicit target size.
    pub fn for_target(target: usize) -> Self {
        Self {
            target,
            min_samples: 3,
            candidate_cap: if target <= 5 { 70 } else { 140 },
        }
    }

    /// Options for a bucket's standard target (0 / 5 / 7).
    pub fn for_bucket(bucket: TeamsBucket) -> Self {
        Self::for_target(bucket.recommend_target())
    }

    pub fn with_min_samples(mut self, min_samples: u32) -> Self {
        self.min_samples = min_samples;
        self
    }
}

/// Select a conflict-free set of comps from a bucket's aggregated list.
///
/// `comps` is expected in mean-win-rate-descending order, as produced by
/// aggregation. The result preserves that order. Never errors: an empty
/// pool or a zero target yields an empty selection.
pub fn recommend(
    comps: &[CompStats],
    exclusions: &HeroExclusions,
    opts: &RecommendOptions,
) -> Vec<CompStats> {
    let k = opts.target;
    if k == 0 {
        return Vec::new();
    }

    let eligible: Vec<&CompStats> = comps
        .iter()
        .filter(|c| c.sample_count >= opts.min_samples && !exclusions.blocks(&c.key))
        .collect();

    if eligible.is_empty() {
        return Vec::new();
    }

    // Trivial case: nothing to optimize over, greedy is exact enough.
    if eligible.len() <= k {
        return greedy(&eligible, k);
    }

    // Dedup by key, keeping the best-win-rate representative, then sort
    // best-first and cap the pool to bound the search.
    let mut candidates = dedup_best_per_key(&eligible);
    candidates.sort_by(|a, b| {
        b.mean_win_rate
            .partial_cmp(&a.mean_win_rate)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(opts.candidate_cap);

    if candidates.len() < k {
        return greedy(&eligible, k);
    }

    match branch_and_bound(&candidates, k) {
        Some(selected) => selected.into_iter().map(|i| candidates[i].clone()).collect(),
        None => greedy(&eligible, k),
    }
}

/// Greedy pass: scan best-first, keep anything that does not conflict
/// with what is already picked. May return fewer than `k`.
fn greedy(eligible: &[&CompStats], k: usize) -> Vec<CompStats> {
    let mut picked: Vec<CompStats> = Vec::with_capacity(k);
    for comp in eligible {
        if picked.len() == k {
            break;
        }
        if picked.iter().all(|p| !p.conflicts_with(comp)) {
            picked.push((*comp).clone());
        }
    }
    picked
}

/// Keep one comp per key: the highest win rate wins, first seen on ties.
fn dedup_best_per_key<'a>(eligible: &[&'a CompStats]) -> Vec<&'a CompStats> {
    let mut best: HashMap<&CompKey, usize> = HashMap::new();
    for (i, comp) in eligible.iter().enumerate() {
        match best.get(&comp.key) {
            Some(&j) if eligible[j].mean_win_rate >= comp.mean_win_rate => {}
            _ => {
                best.insert(&comp.key, i);
            }
        }
    }
    let mut indices: Vec<usize> = best.into_values().collect();
    indices.sort_unstable();
    indices.into_iter().map(|i| eligible[i]).collect()
}

/// Mutable search state threaded through the recursion.
struct SearchState<'a> {
    selected: Vec<usize>,
    used_heroes: HashSet<&'a str>,
    used_pets: HashSet<&'a str>,
    sum: f64,
}

impl<'a> SearchState<'a> {
    fn new(k: usize) -> Self {
        Self {
            selected: Vec::with_capacity(k),
            used_heroes: HashSet::new(),
            used_pets: HashSet::new(),
            sum: 0.0,
        }
    }

    fn conflicts(&self, comp: &CompStats) -> bool {
        if comp.key.has_known_pet() && self.used_pets.contains(comp.key.pet()) {
            return true;
        }
        comp.key.known_heroes().any(|h| self.used_heroes.contains(h))
    }

    fn push(&mut self, index: usize, comp: &'a CompStats) {
        self.selected.push(index);
        self.sum += comp.mean_win_rate;
        for hero in comp.key.known_heroes() {
            self.used_heroes.insert(hero);
        }
        if comp.key.has_known_pet() {
            self.used_pets.insert(comp.key.pet());
        }
    }

    fn pop(&mut self, comp: &'a CompStats) {
        self.selected.pop();
        self.sum -= comp.mean_win_rate;
        for hero in comp.key.known_heroes() {
            self.used_heroes.remove(hero);
        }
        if comp.key.has_known_pet() {
            self.used_pets.remove(comp.key.pet());
        }
    }
}

/// Best complete solution found so far.
struct Incumbent {
    selected: Vec<usize>,
    sum: f64,
}

/// Exact search for the max-sum conflict-free subset of exactly size `k`.
///
/// Candidates must be sorted win-rate descending; the include branch is
/// explored first so good solutions arrive early and tighten the bound.
/// Returns `None` when no size-`k` conflict-free subset exists.
fn branch_and_bound(candidates: &[&CompStats], k: usize) -> Option<Vec<usize>> {
    // prefix[i] = sum of the first i win rates. Since the list is sorted
    // descending, prefix[i + r] - prefix[i] is an upper bound on the best
    // r candidates available from position i onward.
    let mut prefix = Vec::with_capacity(candidates.len() + 1);
    prefix.push(0.0);
    for comp in candidates {
        prefix.push(prefix.last().copied().unwrap_or(0.0) + comp.mean_win_rate);
    }

    let mut state = SearchState::new(k);
    let mut incumbent: Option<Incumbent> = None;
    search(candidates, &prefix, k, 0, &mut state, &mut incumbent);
    incumbent.map(|inc| inc.selected)
}

fn search<'a>(
    candidates: &[&'a CompStats],
    prefix: &[f64],
    k: usize,
    position: usize,
    state: &mut SearchState<'a>,
    incumbent: &mut Option<Incumbent>,
) {
    if state.selected.len() == k {
        let better = incumbent.as_ref().map_or(true, |inc| state.sum > inc.sum);
        if better {
            *incumbent = Some(Incumbent {
                selected: state.selected.clone(),
                sum: state.sum,
            });
        }
        return;
    }

    let need = k - state.selected.len();
    if position + need > candidates.len() {
        return;
    }

    // Optimistic completion ignoring conflicts; prune when it cannot beat
    // the incumbent.
    let bound = state.sum + prefix[position + need] - prefix[position];
    if let Some(inc) = incumbent {
        if bound <= inc.sum {
            return;
        }
    }

    let comp = candidates[position];
    if !state.conflicts(comp) {
        state.push(position, comp);
        search(candidates, prefix, k, position + 1, state, incumbent);
        state.pop(comp);
    }

    search(candidates, prefix, k, position + 1, state, incumbent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{normalize_comp, Density, DensityThresholds};

    fn comp(heroes: &str, pet: &str, win_rate: f64, samples: u32) -> CompStats {
        let norm = normalize_comp(Some(heroes), Some(pet));
        CompStats {
            key: norm.key,
            display: norm.display,
            sample_count: samples,
            mean_win_rate: win_rate,
            density: Density::from_sample_count(samples, DensityThresholds::default()),
        }
    }

    fn sorted_desc(mut comps: Vec<CompStats>) -> Vec<CompStats> {
        comps.sort_by(|a, b| {
            b.mean_win_rate
                .partial_cmp(&a.mean_win_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        comps
    }

    fn assert_unique(selection: &[CompStats]) {
        let mut heroes: HashSet<String> = HashSet::new();
        let mut pets: HashSet<String> = HashSet::new();
        for comp in selection {
            for hero in comp.key.known_heroes() {
                assert!(heroes.insert(hero.to_string()), "duplicate hero {hero}");
            }
            if comp.key.has_known_pet() {
                let pet = comp.key.pet().to_string();
                assert!(pets.insert(pet.clone()), "duplicate pet {pet}");
            }
        }
    }

    /// Ten disjoint-ish synthetic comps for brute-force comparison.
    fn synthetic_pool() -> Vec<CompStats> {
        sorted_desc(vec![
            comp("a1 - a2 - a3 - a4 - a5", "p1", 92.0, 10),
            comp("b1 - b2 - b3 - b4 - b5", "p2", 88.0, 9),
            comp("a1 - c2 - c3 - c4 - c5", "p3", 85.0, 8),
            comp("d1 - d2 - d3 - d4 - d5", "p1", 82.0, 7),
            comp("e1 - e2 - e3 - e4 - e5", "p4", 79.0, 6),
            comp("f1 - f2 - f3 - f4 - f5", "p5", 74.0, 6),
            comp("g1 - g2 - g3 - g4 - g5", "p6", 71.0, 5),
            comp("b1 - h2 - h3 - h4 - h5", "p7", 69.0, 5),
            comp("i1 - i2 - i3 - i4 - i5", "p8", 64.0, 4),
            comp("j1 - j2 - j3 - j4 - j5", "p9", 61.0, 3),
        ])
    }

    fn brute_force_best(pool: &[CompStats], k: usize) -> f64 {
        fn rec(pool: &[CompStats], k: usize, start: usize, chosen: &mut Vec<usize>) -> Option<f64> {
            if chosen.len() == k {
                return Some(chosen.iter().map(|&i| pool[i].mean_win_rate).sum());
            }
            let mut best: Option<f64> = None;
            for i in start..pool.len() {
                let ok = chosen.iter().all(|&j| !pool[j].conflicts_with(&pool[i]));
                if !ok {
                    continue;
                }
                chosen.push(i);
                if let Some(sum) = rec(pool, k, i + 1, chosen) {
                    best = Some(best.map_or(sum, |b: f64| b.max(sum)));
                }
                chosen.pop();
            }
            best
        }
        rec(pool, k, 0, &mut Vec::new()).expect("a valid subset exists")
    }

    #[test]
    fn test_zero_target_returns_empty() {
        let pool = synthetic_pool();
        let opts = RecommendOptions::for_bucket(TeamsBucket::Teams2To3);
        assert!(recommend(&pool, &HeroExclusions::default(), &opts).is_empty());
    }

    #[test]
    fn test_empty_pool_returns_empty() {
        let opts = RecommendOptions::for_target(5);
        assert!(recommend(&[], &HeroExclusions::default(), &opts).is_empty());
    }

    #[test]
    fn test_greedy_path_small_pool() {
        let pool = sorted_desc(vec![
            comp("a - b - c - d - e", "p1", 80.0, 5),
            comp("f - g - h - i - j", "p2", 70.0, 5),
        ]);
        let opts = RecommendOptions::for_target(5);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);
        assert_eq!(picked.len(), 2);
        assert_unique(&picked);
    }

    #[test]
    fn test_min_samples_gate() {
        let pool = sorted_desc(vec![
            comp("a - b - c - d - e", "p1", 95.0, 1),
            comp("f - g - h - i - j", "p2", 70.0, 5),
        ]);
        let opts = RecommendOptions::for_target(5);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].mean_win_rate, 70.0);
    }

    #[test]
    fn test_exactness_matches_brute_force() {
        let pool = synthetic_pool();
        let opts = RecommendOptions::for_target(5);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);

        assert_eq!(picked.len(), 5);
        assert_unique(&picked);

        let total: f64 = picked.iter().map(|c| c.mean_win_rate).sum();
        let best = brute_force_best(&pool, 5);
        assert!((total - best).abs() < 1e-9, "got {total}, brute force {best}");
    }

    #[test]
    fn test_exact_size_preferred_over_greedy_sum() {
        // Greedy grabs the 100 comp, which conflicts with both others and
        // strands the selection at size 1. The exact search must return
        // the two compatible comps instead.
        let pool = sorted_desc(vec![
            comp("a - b - x1 - x2 - x3", "p1", 100.0, 5),
            comp("a - c - y1 - y2 - y3", "p2", 90.0, 5),
            comp("b - d - z1 - z2 - z3", "p3", 89.0, 5),
        ]);
        let opts = RecommendOptions::for_target(2);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);

        assert_eq!(picked.len(), 2);
        assert_unique(&picked);
        let total: f64 = picked.iter().map(|c| c.mean_win_rate).sum();
        assert_eq!(total, 179.0);
    }

    #[test]
    fn test_greedy_fallback_when_no_exact_set() {
        // Every pair conflicts, so no 2-set exists; fall back to greedy.
        let pool = sorted_desc(vec![
            comp("a - b - x1 - x2 - x3", "p1", 90.0, 5),
            comp("a - c - y1 - y2 - y3", "p2", 80.0, 5),
            comp("b - c - z1 - z2 - z3", "p3", 70.0, 5),
        ]);
        let opts = RecommendOptions::for_target(2);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);

        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].mean_win_rate, 90.0);
    }

    #[test]
    fn test_excluded_hero_never_selected() {
        let pool = synthetic_pool();
        let exclusions = HeroExclusions::from_csv("a1,b1");
        let opts = RecommendOptions::for_target(5);
        let picked = recommend(&pool, &exclusions, &opts);

        assert_unique(&picked);
        for comp in &picked {
            assert!(!comp.key.contains_hero("a1"));
            assert!(!comp.key.contains_hero("b1"));
        }
    }

    #[test]
    fn test_shared_pet_blocks_selection() {
        // Heroes disjoint but both use p1; only one may be picked.
        let pool = sorted_desc(vec![
            comp("a - b - c - d - e", "p1", 90.0, 5),
            comp("f - g - h - i - j", "p1", 85.0, 5),
            comp("k - l - m - n - o", "p2", 80.0, 5),
        ]);
        let opts = RecommendOptions::for_target(2);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);

        assert_eq!(picked.len(), 2);
        assert_unique(&picked);
        let rates: Vec<f64> = picked.iter().map(|c| c.mean_win_rate).collect();
        assert_eq!(rates, vec![90.0, 80.0]);
    }

    #[test]
    fn test_unknown_pets_do_not_conflict() {
        let pool = sorted_desc(vec![
            comp("a - b - c - d - e", "", 90.0, 5),
            comp("f - g - h - i - j", "", 85.0, 5),
        ]);
        let opts = RecommendOptions::for_target(2);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn test_deterministic_over_reruns() {
        let pool = synthetic_pool();
        let opts = RecommendOptions::for_target(5);
        let first = recommend(&pool, &HeroExclusions::default(), &opts);
        let second = recommend(&pool, &HeroExclusions::default(), &opts);
        assert_eq!(first, second);
    }

    #[test]
    fn test_tight_candidate_cap_falls_back_to_greedy() {
        let pool = synthetic_pool();
        let opts = RecommendOptions {
            target: 5,
            min_samples: 3,
            candidate_cap: 3,
        };
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);

        // Greedy over the full eligible list still finds a full set here.
        assert_eq!(picked.len(), 5);
        assert_unique(&picked);
    }

    #[test]
    fn test_uniqueness_invariant_holds_for_target_seven() {
        let mut pool = synthetic_pool();
        // Extra comps sharing heroes with the pool to force conflicts.
        pool.push(comp("a1 - b1 - q1 - q2 - q3", "p1", 60.0, 5));
        pool.push(comp("q4 - q5 - q6 - q7 - q8", "p2", 58.0, 5));
        let pool = sorted_desc(pool);

        let opts = RecommendOptions::for_bucket(TeamsBucket::Teams6To7);
        let picked = recommend(&pool, &HeroExclusions::default(), &opts);

        assert!(picked.len() <= 7);
        assert_unique(&picked);
    }
}
