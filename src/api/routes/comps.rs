//! Aggregated comps endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::filter::RegionSelection;
use crate::calculate::{aggregate, RejectCounts};
use crate::models::{CompStats, Density, TeamsBucket};

use super::{load_snapshot, DEFAULT_MODE};

#[derive(Debug, Deserialize)]
pub struct CompsParams {
    pub mode: Option<String>,
    /// Comma-separated region preset keys ("r1-20,r41p").
    pub regions: Option<String>,
    /// Comma-separated density names to show ("medium,high").
    pub density: Option<String>,
}

/// One aggregated comp as shown to clients.
#[derive(Debug, Serialize)]
pub struct CompView {
    pub heroes: [String; 5],
    pub pet: String,
    pub win_rate: f64,
    pub samples: u32,
    pub density: Density,
}

impl CompView {
    pub(crate) fn from_stats(stats: &CompStats) -> Self {
        Self {
            heroes: stats.display.heroes.clone(),
            pet: stats.display.pet.clone(),
            win_rate: round1(stats.mean_win_rate),
            samples: stats.sample_count,
            density: stats.density,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BucketView {
    pub bucket: TeamsBucket,
    pub comps: Vec<CompView>,
}

#[derive(Debug, Serialize)]
pub struct CompsResponse {
    pub mode: String,
    pub regions: String,
    pub row_count: usize,
    /// True when the row fetch stopped at the safety cap.
    pub truncated: bool,
    pub buckets: Vec<BucketView>,
    pub skipped: RejectCounts,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Density tiers selected for display. Empty or unrecognized input
/// shows everything.
fn density_selection(csv: Option<&str>) -> Vec<Density> {
    let selected: Vec<Density> = csv
        .unwrap_or("")
        .split(',')
        .filter_map(Density::from_name)
        .collect();
    if selected.is_empty() {
        vec![Density::Low, Density::Medium, Density::High]
    } else {
        selected
    }
}

pub async fn list_comps(
    State(state): State<AppState>,
    Query(params): Query<CompsParams>,
) -> Result<Json<CompsResponse>, ApiError> {
    let mode = params.mode.as_deref().unwrap_or(DEFAULT_MODE).to_string();
    let regions = RegionSelection::from_csv(params.regions.as_deref().unwrap_or(""));
    let densities = density_selection(params.density.as_deref());

    let snapshot = load_snapshot(&state, &mode).await?;
    let rows = regions.apply(&snapshot.rows);
    let aggregation = aggregate(&rows, &state.config.pipeline.aggregate_options());

    let buckets = TeamsBucket::ALL
        .iter()
        .map(|bucket| BucketView {
            bucket: *bucket,
            comps: aggregation
                .bucket(*bucket)
                .iter()
                .filter(|s| densities.contains(&s.density))
                .map(CompView::from_stats)
                .collect(),
        })
        .collect();

    Ok(Json(CompsResponse {
        mode,
        regions: regions.label(),
        row_count: snapshot.row_count(),
        truncated: snapshot.truncated,
        buckets,
        skipped: aggregation.rejects,
    }))
}
