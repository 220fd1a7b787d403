use std::collections::{BTreeMap, HashMap};

use crate::models::{ContentKind, Mood};

/// Genre id → accumulated mood intensity
///
/// Ordered by genre id so iteration, and therefore tie-breaking between genres
/// of equal weight, is deterministic.
pub type GenreWeights = BTreeMap<u32, u32>;

/// Genre weights for both content kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeightedGenres {
    pub movie: GenreWeights,
    pub series: GenreWeights,
}

impl WeightedGenres {
    pub fn for_kind(&self, kind: ContentKind) -> &GenreWeights {
        match kind {
            ContentKind::Movie => &self.movie,
            ContentKind::Series => &self.series,
        }
    }

    fn for_kind_mut(&mut self, kind: ContentKind) -> &mut GenreWeights {
        match kind {
            ContentKind::Movie => &mut self.movie,
            ContentKind::Series => &mut self.series,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.movie.is_empty() && self.series.is_empty()
    }
}

/// Intensity used for a mood: unspecified counts as 1, and so does 0
fn effective_intensity(intensity: Option<u8>) -> u32 {
    u32::from(intensity.unwrap_or(1).max(1))
}

/// Builds genre weights from selected moods
///
/// Every genre a mood references for a requested kind gains that mood's
/// intensity. `intensities` is keyed by mood label (case-insensitive). Labels
/// that are not known moods contribute nothing.
pub fn build_genre_weights(
    moods: &[String],
    intensities: &HashMap<String, u8>,
    include_movies: bool,
    include_series: bool,
) -> WeightedGenres {
    // Keys differing only in case resolve to the same mood; the larger value wins
    let mut intensity_by_mood: HashMap<Mood, u8> = HashMap::new();
    for (label, &intensity) in intensities {
        if let Ok(mood) = label.parse::<Mood>() {
            let entry = intensity_by_mood.entry(mood).or_insert(intensity);
            *entry = (*entry).max(intensity);
        }
    }

    let kinds: Vec<ContentKind> = ContentKind::ALL
        .into_iter()
        .filter(|kind| match kind {
            ContentKind::Movie => include_movies,
            ContentKind::Series => include_series,
        })
        .collect();

    let mut weights = WeightedGenres::default();

    for label in moods {
        let Ok(mood) = label.parse::<Mood>() else {
            tracing::debug!(mood = %label, "Ignoring unknown mood");
            continue;
        };
        let intensity = effective_intensity(intensity_by_mood.get(&mood).copied());

        for &kind in &kinds {
            let target = weights.for_kind_mut(kind);
            for &genre_id in mood.genres(kind) {
                *target.entry(genre_id).or_insert(0) += intensity;
            }
        }
    }

    weights
}
