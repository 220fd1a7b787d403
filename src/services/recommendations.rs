use futures_util::{stream, StreamExt};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    models::{Candidate, Card, ContentKind, MoodSelection, TitleDetails},
    services::{
        availability::{apply_fallback, partition_by_availability, shuffle_and_truncate, Selection},
        discovery::{discover_and_rank, FETCH_CONCURRENCY},
        providers::CatalogProvider,
        weighting::build_genre_weights,
    },
};

/// Validated inputs for one recommendation run
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationParams {
    pub moods: Vec<String>,
    pub intensities: HashMap<String, u8>,
    pub include_movies: bool,
    pub include_series: bool,
    pub pages: u32,
    pub region: String,
    /// Streaming provider to filter on; `None` skips the regional filter
    pub provider_id: Option<u64>,
    pub allow_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoResultsReason {
    /// Discovery produced nothing to rank
    NoCandidates,
    /// Nothing streams on the provider in the region and fallback was off
    NoRegionalMatch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Found { items: Vec<Card>, fallback_used: bool },
    NoResults { reason: NoResultsReason },
}

/// Runs the whole pipeline: weights, discovery and ranking per kind, the
/// regional filter, shuffle, and card enrichment
///
/// Catalog failures never surface here. They shrink the result instead, and
/// an empty result is reported as [`RecommendationOutcome::NoResults`].
pub async fn recommend<R: Rng + Send>(
    provider: &dyn CatalogProvider,
    params: &RecommendationParams,
    image_base_url: &str,
    rng: &mut R,
) -> RecommendationOutcome {
    let (moods, intensities) = if params.moods.is_empty() {
        let fallback = MoodSelection::default();
        tracing::info!(mood = fallback.mood.as_str(), "No moods selected, using default");
        (
            vec![fallback.mood.as_str().to_string()],
            HashMap::from([(fallback.mood.as_str().to_string(), fallback.intensity)]),
        )
    } else {
        (params.moods.clone(), params.intensities.clone())
    };

    let weights = build_genre_weights(
        &moods,
        &intensities,
        params.include_movies,
        params.include_series,
    );

    // movies first, then series
    let mut ranked: Vec<Candidate> = Vec::new();
    for kind in ContentKind::ALL {
        ranked.extend(discover_and_rank(provider, weights.for_kind(kind), kind, params.pages).await);
    }

    if ranked.is_empty() {
        tracing::info!(moods = ?moods, "No candidates discovered");
        return RecommendationOutcome::NoResults {
            reason: NoResultsReason::NoCandidates,
        };
    }

    let selection = match params.provider_id {
        Some(provider_id) => {
            let partition =
                partition_by_availability(provider, ranked, provider_id, &params.region).await;
            apply_fallback(partition, params.allow_fallback)
        }
        None => Selection {
            items: ranked,
            fallback_used: false,
        },
    };

    if selection.items.is_empty() {
        return RecommendationOutcome::NoResults {
            reason: NoResultsReason::NoRegionalMatch,
        };
    }

    let fallback_used = selection.fallback_used;
    let chosen = shuffle_and_truncate(selection.items, rng);
    let items = enrich(provider, chosen, image_base_url).await;

    tracing::info!(
        count = items.len(),
        fallback_used,
        region = %params.region,
        "Recommendations ready"
    );

    RecommendationOutcome::Found {
        items,
        fallback_used,
    }
}

/// Attaches cast and trailer to each candidate; a failed lookup leaves both empty
async fn enrich(
    provider: &dyn CatalogProvider,
    candidates: Vec<Candidate>,
    image_base_url: &str,
) -> Vec<Card> {
    stream::iter(candidates)
        .map(|candidate| async move {
            let details = match provider.details(candidate.kind, candidate.id).await {
                Ok(details) => details,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        kind = %candidate.kind,
                        title_id = candidate.id,
                        "Detail lookup failed, card left without cast or trailer"
                    );
                    TitleDetails::default()
                }
            };
            Card::new(candidate, details, image_base_url)
        })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await
}
