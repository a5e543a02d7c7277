//! Route handlers.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::cache::RowsSnapshot;

pub mod comps;
pub mod recommend;

/// Default game mode when a request does not name one.
pub const DEFAULT_MODE: &str = "ts-forest";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub cached_modes: usize,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let cached_modes = state.cache.read().await.len();
    Json(HealthResponse {
        status: "ok",
        cached_modes,
    })
}

#[derive(Debug, Deserialize)]
pub struct InvalidateParams {
    pub mode: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: bool,
}

/// Drop cached rows for one mode, or all modes when none is given.
pub async fn invalidate_cache(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> Json<InvalidateResponse> {
    let mut cache = state.cache.write().await;
    let invalidated = match params.mode.as_deref() {
        Some(mode) => cache.invalidate(mode),
        None => {
            let had_entries = !cache.is_empty();
            cache.clear();
            had_entries
        }
    };
    Json(InvalidateResponse { invalidated })
}

/// Rows for a mode, from cache when fresh, else refetched.
pub(crate) async fn load_snapshot(
    state: &AppState,
    mode: &str,
) -> Result<RowsSnapshot, ApiError> {
    if let Some(snapshot) = state.cache.read().await.get_fresh(mode) {
        return Ok(snapshot.clone());
    }

    let fetched = state
        .source
        .fetch_rows(mode)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let snapshot = RowsSnapshot::new(fetched.rows, fetched.truncated);
    info!(
        mode,
        row_count = snapshot.row_count(),
        truncated = snapshot.truncated,
        "cached fresh row snapshot"
    );
    state
        .cache
        .write()
        .await
        .insert(mode, snapshot.clone());
    Ok(snapshot)
}
