use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

use super::ContentKind;
use crate::error::AppError;

/// TMDB movie genre ids
pub mod movie_genre {
    pub const ACTION: u32 = 28;
    pub const ADVENTURE: u32 = 12;
    pub const ANIMATION: u32 = 16;
    pub const COMEDY: u32 = 35;
    pub const DOCUMENTARY: u32 = 99;
    pub const DRAMA: u32 = 18;
    pub const FAMILY: u32 = 10751;
    pub const FANTASY: u32 = 14;
    pub const HISTORY: u32 = 36;
    pub const MUSIC: u32 = 10402;
    pub const MYSTERY: u32 = 9648;
    pub const ROMANCE: u32 = 10749;
    pub const SCIENCE_FICTION: u32 = 878;
    pub const THRILLER: u32 = 53;
}

/// TMDB TV genre ids
pub mod tv_genre {
    pub const ACTION_ADVENTURE: u32 = 10759;
    pub const ANIMATION: u32 = 16;
    pub const COMEDY: u32 = 35;
    pub const DOCUMENTARY: u32 = 99;
    pub const DRAMA: u32 = 18;
    pub const FAMILY: u32 = 10751;
    pub const KIDS: u32 = 10762;
    pub const MYSTERY: u32 = 9648;
    pub const REALITY: u32 = 10764;
    pub const SCI_FI_FANTASY: u32 = 10765;
    pub const SOAP: u32 = 10766;
}

/// Emotional-state tag a user can select
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Anxious,
    Tired,
    Lonely,
    Curious,
    Adventurous,
    Romantic,
    Inspired,
    Calm,
}

impl Mood {
    pub const ALL: [Mood; 10] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Anxious,
        Mood::Tired,
        Mood::Lonely,
        Mood::Curious,
        Mood::Adventurous,
        Mood::Romantic,
        Mood::Inspired,
        Mood::Calm,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Tired => "tired",
            Mood::Lonely => "lonely",
            Mood::Curious => "curious",
            Mood::Adventurous => "adventurous",
            Mood::Romantic => "romantic",
            Mood::Inspired => "inspired",
            Mood::Calm => "calm",
        }
    }

    /// Genre ids this mood pulls toward for the given kind
    pub fn genres(self, kind: ContentKind) -> &'static [u32] {
        use self::movie_genre as m;
        use self::tv_genre as t;

        match (self, kind) {
            (Mood::Happy, ContentKind::Movie) => &[m::COMEDY, m::MUSIC],
            (Mood::Happy, ContentKind::Series) => &[t::COMEDY, t::FAMILY],
            (Mood::Sad, ContentKind::Movie) => &[m::DRAMA, m::FAMILY, m::ANIMATION],
            (Mood::Sad, ContentKind::Series) => &[t::DRAMA, t::FAMILY],
            (Mood::Anxious, ContentKind::Movie) => &[m::ANIMATION, m::COMEDY, m::FAMILY],
            (Mood::Anxious, ContentKind::Series) => &[t::ANIMATION, t::COMEDY],
            (Mood::Tired, ContentKind::Movie) => &[m::COMEDY, m::ROMANCE],
            (Mood::Tired, ContentKind::Series) => &[t::COMEDY, t::REALITY],
            (Mood::Lonely, ContentKind::Movie) => &[m::ROMANCE, m::DRAMA],
            (Mood::Lonely, ContentKind::Series) => &[t::DRAMA, t::SOAP],
            (Mood::Curious, ContentKind::Movie) => &[m::DOCUMENTARY, m::HISTORY],
            (Mood::Curious, ContentKind::Series) => &[t::DOCUMENTARY, t::MYSTERY],
            (Mood::Adventurous, ContentKind::Movie) => &[m::ADVENTURE, m::ACTION, m::THRILLER],
            (Mood::Adventurous, ContentKind::Series) => &[t::ACTION_ADVENTURE],
            (Mood::Romantic, ContentKind::Movie) => &[m::ROMANCE, m::MUSIC],
            (Mood::Romantic, ContentKind::Series) => &[t::SOAP, t::DRAMA],
            (Mood::Inspired, ContentKind::Movie) => {
                &[m::SCIENCE_FICTION, m::FANTASY, m::MYSTERY]
            }
            (Mood::Inspired, ContentKind::Series) => &[t::SCI_FI_FANTASY],
            (Mood::Calm, ContentKind::Movie) => &[m::ANIMATION, m::FAMILY],
            (Mood::Calm, ContentKind::Series) => &[t::ANIMATION, t::KIDS],
        }
    }
}

impl Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown mood: {}", s)))
    }
}

/// A mood together with how strongly it is felt (1-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSelection {
    pub mood: Mood,
    pub intensity: u8,
}

/// Feel-good selection used when nothing else applies
impl Default for MoodSelection {
    fn default() -> Self {
        MoodSelection {
            mood: Mood::Happy,
            intensity: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Happy".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!("  curious ".parse::<Mood>().unwrap(), Mood::Curious);
    }

    #[test]
    fn test_parse_unknown_mood() {
        assert!("hangry".parse::<Mood>().is_err());
    }

    #[test]
    fn test_every_mood_maps_to_genres_for_both_kinds() {
        for mood in Mood::ALL {
            for kind in ContentKind::ALL {
                assert!(!mood.genres(kind).is_empty(), "{} has no {} genres", mood, kind);
            }
        }
    }

    #[test]
    fn test_happy_and_curious_movie_genres() {
        assert_eq!(Mood::Happy.genres(ContentKind::Movie), &[35, 10402]);
        assert_eq!(Mood::Curious.genres(ContentKind::Movie), &[99, 36]);
    }

    #[test]
    fn test_as_str_round_trips_through_serde() {
        for mood in Mood::ALL {
            let json = serde_json::to_string(&mood).unwrap();
            assert_eq!(json, format!("\"{}\"", mood.as_str()));
        }
    }
}
