//! Comp recommendation endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::calculate::filter::{HeroExclusions, RegionSelection};
use crate::calculate::recommend::{recommend, RecommendOptions};
use crate::calculate::aggregate;
use crate::models::TeamsBucket;

use super::comps::CompView;
use super::{load_snapshot, DEFAULT_MODE};

#[derive(Debug, Deserialize)]
pub struct RecommendParams {
    pub mode: Option<String>,
    /// Teams bucket label ("2-3", "4-5", "6-7"). Required.
    pub bucket: Option<String>,
    /// Comma-separated hero names to keep out of the selection.
    pub exclude: Option<String>,
    /// Comma-separated region preset keys.
    pub regions: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub mode: String,
    pub bucket: TeamsBucket,
    pub regions: String,
    /// How many comps the bucket asks for.
    pub target: usize,
    /// True when a full conflict-free set of `target` comps was found.
    pub complete: bool,
    pub selections: Vec<CompView>,
    pub total_win_rate: f64,
}

pub async fn recommend_comps(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let mode = params.mode.as_deref().unwrap_or(DEFAULT_MODE).to_string();

    let bucket = params
        .bucket
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("bucket is required".to_string()))?;
    let bucket = TeamsBucket::from_label(bucket)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown bucket: {bucket}")))?;

    let regions = RegionSelection::from_csv(params.regions.as_deref().unwrap_or(""));
    let exclusions = HeroExclusions::from_csv(params.exclude.as_deref().unwrap_or(""));

    let snapshot = load_snapshot(&state, &mode).await?;
    let rows = regions.apply(&snapshot.rows);
    let aggregation = aggregate(&rows, &state.config.pipeline.aggregate_options());

    let opts = RecommendOptions::for_bucket(bucket)
        .with_min_samples(state.config.pipeline.min_samples);
    let selected = recommend(aggregation.bucket(bucket), &exclusions, &opts);

    let total_win_rate = selected.iter().map(|c| c.mean_win_rate).sum::<f64>();
    let selections: Vec<CompView> = selected.iter().map(CompView::from_stats).collect();

    Ok(Json(RecommendResponse {
        mode,
        bucket,
        regions: regions.label(),
        target: opts.target,
        complete: selections.len() == opts.target,
        selections,
        total_win_rate: (total_win_rate * 10.0).round() / 10.0,
    }))
}
