use futures_util::{stream, StreamExt};
use std::collections::HashSet;

use crate::{
    models::{Candidate, ContentKind},
    services::{providers::CatalogProvider, weighting::GenreWeights},
};

/// Candidates kept per kind after scoring
pub const RANKED_POOL_SIZE: usize = 60;

/// Catalog requests in flight at once; results keep request order regardless
pub(crate) const FETCH_CONCURRENCY: usize = 4;

const RATING_WEIGHT: f64 = 0.6;
const POPULARITY_WEIGHT: f64 = 0.4;

/// Genre ids by descending weight; equal weights keep ascending genre id
pub fn genre_order(weights: &GenreWeights) -> Vec<u32> {
    let mut ordered: Vec<(u32, u32)> = weights.iter().map(|(&id, &w)| (id, w)).collect();
    ordered.sort_by(|a, b| b.1.cmp(&a.1));
    ordered.into_iter().map(|(id, _)| id).collect()
}

/// Ranking heuristic: `0.6 * rating + 0.4 * popularity`
///
/// Popularity is TMDB's raw, unbounded metric, so the score has no fixed range
/// and popular titles dominate. It is not a normalized relevance measure.
pub fn score(candidate: &Candidate) -> f64 {
    RATING_WEIGHT * candidate.rating + POPULARITY_WEIGHT * candidate.popularity
}

/// Keeps the first occurrence of every id
pub fn dedup_by_id(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(candidates.len());
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(candidate.id))
        .collect()
}

/// Sorts by descending score and keeps the top [`RANKED_POOL_SIZE`]
///
/// The sort is stable: equal scores keep their discovery order.
pub fn rank_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut scored: Vec<(f64, Candidate)> = candidates
        .into_iter()
        .map(|candidate| (score(&candidate), candidate))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored
        .into_iter()
        .take(RANKED_POOL_SIZE)
        .map(|(_, candidate)| candidate)
        .collect()
}

/// Fetches `pages` pages per genre, heaviest genre first, and dedups the result
///
/// A failed (genre, page) fetch contributes no items and never aborts the
/// rest. An empty weight map returns immediately without touching the catalog.
pub async fn discover_candidates(
    provider: &dyn CatalogProvider,
    weights: &GenreWeights,
    kind: ContentKind,
    pages: u32,
) -> Vec<Candidate> {
    if weights.is_empty() {
        return Vec::new();
    }

    let slices: Vec<(u32, u32)> = genre_order(weights)
        .into_iter()
        .flat_map(|genre_id| (1..=pages).map(move |page| (genre_id, page)))
        .collect();

    tracing::info!(
        kind = %kind,
        genres = weights.len(),
        pages,
        requests = slices.len(),
        provider = provider.name(),
        "Discovering candidates"
    );

    let pages_fetched: Vec<Vec<Candidate>> = stream::iter(slices)
        .map(|(genre_id, page)| async move {
            match provider.discover(kind, genre_id, page).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        kind = %kind,
                        genre_id,
                        page,
                        "Discover request failed, skipping slice"
                    );
                    Vec::new()
                }
            }
        })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await;

    let working: Vec<Candidate> = pages_fetched.into_iter().flatten().collect();
    let fetched = working.len();
    let unique = dedup_by_id(working);

    tracing::info!(kind = %kind, fetched, unique = unique.len(), "Discovery completed");

    unique
}

/// Discovery followed by scoring and truncation to the ranked pool
pub async fn discover_and_rank(
    provider: &dyn CatalogProvider,
    weights: &GenreWeights,
    kind: ContentKind,
    pages: u32,
) -> Vec<Candidate> {
    let candidates = discover_candidates(provider, weights, kind, pages).await;
    rank_candidates(candidates)
}
