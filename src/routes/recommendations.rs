use axum::{extract::State, http::HeaderMap, Json};
use rand::{rngs::StdRng, SeedableRng};
use serde::Deserialize;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    services::recommendations::{self, RecommendationOutcome, RecommendationParams},
};

use super::AppState;

const MAX_INTENSITY: u8 = 5;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    #[serde(default)]
    pub moods: Vec<String>,
    #[serde(default)]
    pub intensities: HashMap<String, u8>,
    #[serde(default = "default_true")]
    pub include_movies: bool,
    #[serde(default = "default_true")]
    pub include_series: bool,
    pub pages: Option<u32>,
    pub region: Option<String>,
    pub provider_id: Option<u64>,
    #[serde(default = "default_true")]
    pub allow_fallback: bool,
}

impl RecommendationRequest {
    /// Validates the request and fills unset fields from configuration
    pub fn into_params(self, config: &Config) -> AppResult<RecommendationParams> {
        if !self.include_movies && !self.include_series {
            return Err(AppError::InvalidInput(
                "At least one of include_movies or include_series must be set".to_string(),
            ));
        }

        let pages = self.pages.unwrap_or(config.default_pages);
        if pages == 0 || pages > config.max_pages {
            return Err(AppError::InvalidInput(format!(
                "pages must be between 1 and {}, got {}",
                config.max_pages, pages
            )));
        }

        if let Some((mood, intensity)) = self
            .intensities
            .iter()
            .find(|(_, intensity)| **intensity > MAX_INTENSITY)
        {
            return Err(AppError::InvalidInput(format!(
                "Intensity for {} must be at most {}, got {}",
                mood, MAX_INTENSITY, intensity
            )));
        }

        let mut seen = HashSet::with_capacity(self.intensities.len());
        if let Some(duplicate) = self
            .intensities
            .keys()
            .find(|mood| !seen.insert(mood.trim().to_ascii_lowercase()))
        {
            return Err(AppError::InvalidInput(format!(
                "Intensity for {} is given more than once",
                duplicate.trim().to_ascii_lowercase()
            )));
        }

        let region = match self.region.as_deref().map(str::trim) {
            None | Some("") => config.default_region.clone(),
            Some(region) if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) => {
                region.to_ascii_uppercase()
            }
            Some(region) => {
                return Err(AppError::InvalidInput(format!(
                    "region must be a two-letter country code, got {}",
                    region
                )))
            }
        };

        Ok(RecommendationParams {
            moods: self.moods,
            intensities: self.intensities,
            include_movies: self.include_movies,
            include_series: self.include_series,
            pages,
            region,
            provider_id: self.provider_id,
            allow_fallback: self.allow_fallback,
        })
    }
}

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<RecommendationOutcome>> {
    let params = request.into_params(&state.config)?;
    let catalog = state.catalog_for(&headers)?;

    tracing::info!(
        moods = ?params.moods,
        pages = params.pages,
        region = %params.region,
        provider_id = ?params.provider_id,
        "Recommendation requested"
    );

    let mut rng = StdRng::from_entropy();
    let outcome = recommendations::recommend(
        catalog.as_ref(),
        &params,
        &state.config.tmdb_image_url,
        &mut rng,
    )
    .await;

    Ok(Json(outcome))
}
