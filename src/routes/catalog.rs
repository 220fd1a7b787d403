use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{ContentKind, Mood},
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct MoodInfo {
    pub mood: Mood,
    pub movie_genres: &'static [u32],
    pub series_genres: &'static [u32],
}

#[derive(Debug, Serialize)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
}

/// Selectable moods with the genres each one weights
pub async fn list_moods() -> Json<Vec<MoodInfo>> {
    let moods = Mood::ALL
        .into_iter()
        .map(|mood| MoodInfo {
            mood,
            movie_genres: mood.genres(ContentKind::Movie),
            series_genres: mood.genres(ContentKind::Series),
        })
        .collect();
    Json(moods)
}

/// Regions the catalog has streaming provider data for
///
/// A failed catalog lookup yields an empty list rather than an error.
pub async fn list_regions(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<Json<RegionsResponse>> {
    let catalog = state.catalog_for(&headers)?;
    let regions = match catalog.provider_regions().await {
        Ok(regions) => regions,
        Err(e) => {
            tracing::warn!(error = %e, "Provider region lookup failed, returning none");
            Vec::new()
        }
    };
    Ok(Json(RegionsResponse { regions }))
}
