use futures_util::{stream, StreamExt};
use rand::{seq::SliceRandom, Rng};

use crate::{
    models::Candidate,
    services::{discovery::FETCH_CONCURRENCY, providers::CatalogProvider},
};

/// Most recommendations handed to the presentation layer
pub const MAX_RECOMMENDATIONS: usize = 18;

/// Ranked candidates split by whether the target provider offers them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub available: Vec<Candidate>,
    pub unavailable: Vec<Candidate>,
}

/// Candidates surviving the regional filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    pub items: Vec<Candidate>,
    /// Set when nothing matched and the unfiltered set was used instead
    pub fallback_used: bool,
}

/// Splits candidates by whether `provider_id` offers them in `region`
///
/// A candidate whose offer record cannot be fetched, or whose record has no
/// entry for `region`, counts as unavailable. Both halves keep input order.
pub async fn partition_by_availability(
    provider: &dyn CatalogProvider,
    candidates: Vec<Candidate>,
    provider_id: u64,
    region: &str,
) -> Partition {
    let checks: Vec<(Candidate, bool)> = stream::iter(candidates)
        .map(|candidate| async move {
            let available = match provider.watch_providers(candidate.kind, candidate.id).await {
                Ok(offers) => offers.is_available(region, provider_id),
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        kind = %candidate.kind,
                        title_id = candidate.id,
                        "Watch provider lookup failed, treating as unavailable"
                    );
                    false
                }
            };
            (candidate, available)
        })
        .buffered(FETCH_CONCURRENCY)
        .collect()
        .await;

    let (available, unavailable): (Vec<_>, Vec<_>) =
        checks.into_iter().partition(|(_, available)| *available);

    let partition = Partition {
        available: available.into_iter().map(|(c, _)| c).collect(),
        unavailable: unavailable.into_iter().map(|(c, _)| c).collect(),
    };

    tracing::info!(
        region = %region,
        provider_id,
        available = partition.available.len(),
        unavailable = partition.unavailable.len(),
        "Regional availability checked"
    );

    partition
}

/// Uses the available set, or the unavailable one if nothing matched and
/// `allow_fallback` is set
pub fn apply_fallback(partition: Partition, allow_fallback: bool) -> Selection {
    if partition.available.is_empty() && allow_fallback {
        tracing::info!(
            fallback = partition.unavailable.len(),
            "No regional match, falling back to unfiltered candidates"
        );
        return Selection {
            items: partition.unavailable,
            fallback_used: true,
        };
    }

    Selection {
        items: partition.available,
        fallback_used: false,
    }
}

/// Randomizes order for presentation variety and keeps [`MAX_RECOMMENDATIONS`]
///
/// This is not a ranking step; ranking happened before filtering.
pub fn shuffle_and_truncate<R: Rng + ?Sized>(mut items: Vec<Candidate>, rng: &mut R) -> Vec<Candidate> {
    items.shuffle(rng);
    items.truncate(MAX_RECOMMENDATIONS);
    items
}
