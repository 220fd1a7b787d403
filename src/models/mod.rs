use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt::Display};

pub mod mood;
pub mod offers;
pub mod survey;

pub use mood::{Mood, MoodSelection};
pub use offers::OfferCategory;
pub use survey::{Interpretation, Profile, Section, SurveyAnswers};

/// Kind of catalog content a recommendation can be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Movie, ContentKind::Series];

    /// Path segment TMDB uses for this kind
    pub fn path_segment(self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "tv",
        }
    }
}

impl Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "movie"),
            ContentKind::Series => write!(f, "series"),
        }
    }
}

/// A discovered title before ranking and filtering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub id: u64,
    pub kind: ContentKind,
    pub title: String,
    pub overview: Option<String>,
    /// TMDB vote average, 0-10
    pub rating: f64,
    /// TMDB popularity, unbounded
    pub popularity: f64,
    pub poster_path: Option<String>,
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

impl Candidate {
    pub fn from_api(item: ApiDiscoverItem, kind: ContentKind) -> Self {
        let release_date = item
            .release_date
            .as_deref()
            .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok());

        Candidate {
            id: item.id,
            kind,
            title: item.title,
            overview: item.overview.filter(|o| !o.trim().is_empty()),
            rating: item.vote_average,
            popularity: item.popularity,
            poster_path: item.poster_path,
            release_date,
            genre_ids: item.genre_ids,
        }
    }
}

/// Cast and trailer for a single title
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TitleDetails {
    /// Top-billed cast as "Name (Character)"
    pub cast: Vec<String>,
    pub trailer_url: Option<String>,
}

const MAX_CAST: usize = 5;

impl From<ApiTitleDetails> for TitleDetails {
    fn from(details: ApiTitleDetails) -> Self {
        let cast = details
            .credits
            .cast
            .into_iter()
            .take(MAX_CAST)
            .map(|member| match member.character.filter(|c| !c.trim().is_empty()) {
                Some(character) => format!("{} ({})", member.name, character),
                None => member.name,
            })
            .collect();

        let youtube: Vec<&ApiVideo> = details
            .videos
            .results
            .iter()
            .filter(|v| v.site.eq_ignore_ascii_case("youtube") && !v.key.is_empty())
            .collect();

        // Prefer an actual trailer, then any YouTube clip
        let trailer_url = youtube
            .iter()
            .find(|v| v.video_type.eq_ignore_ascii_case("trailer"))
            .or_else(|| youtube.first())
            .map(|v| format!("https://www.youtube.com/watch?v={}", v.key));

        TitleDetails { cast, trailer_url }
    }
}

/// Flat record handed to the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Card {
    pub kind: ContentKind,
    pub id: u64,
    pub title: String,
    pub overview: Option<String>,
    pub rating: f64,
    pub popularity: f64,
    pub release_year: Option<i32>,
    pub poster_url: Option<String>,
    pub cast: Vec<String>,
    pub trailer_url: Option<String>,
}

impl Card {
    pub fn new(candidate: Candidate, details: TitleDetails, image_base_url: &str) -> Self {
        let poster_url = candidate
            .poster_path
            .as_deref()
            .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path));

        Card {
            kind: candidate.kind,
            id: candidate.id,
            title: candidate.title,
            overview: candidate.overview,
            rating: candidate.rating,
            popularity: candidate.popularity,
            release_year: candidate.release_date.map(|d| d.year()),
            poster_url,
            cast: details.cast,
            trailer_url: details.trailer_url,
        }
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// One page of GET /discover/{movie|tv}
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDiscoverPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<ApiDiscoverItem>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Discover result; movies carry `title`/`release_date`, series `name`/`first_air_date`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiDiscoverItem {
    pub id: u64,
    #[serde(default, alias = "name")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default, alias = "first_air_date")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub adult: bool,
}

/// Response from GET /{movie|tv}/{id}/watch/providers, keyed by region code
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionOffers>,
}

/// Offers for one region, grouped by category
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegionOffers {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<ProviderOffer>,
    #[serde(default)]
    pub ads: Vec<ProviderOffer>,
    #[serde(default)]
    pub buy: Vec<ProviderOffer>,
    #[serde(default)]
    pub rent: Vec<ProviderOffer>,
    #[serde(default)]
    pub free: Vec<ProviderOffer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderOffer {
    pub provider_id: u64,
    #[serde(default)]
    pub provider_name: String,
}

/// Response from GET /{movie|tv}/{id}?append_to_response=credits,videos
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTitleDetails {
    pub id: u64,
    #[serde(default)]
    pub credits: ApiCredits,
    #[serde(default)]
    pub videos: ApiVideos,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCredits {
    #[serde(default)]
    pub cast: Vec<ApiCastMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiVideos {
    #[serde(default)]
    pub results: Vec<ApiVideo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiVideo {
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type", default)]
    pub video_type: String,
}

/// Response from GET /watch/providers/regions
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRegionList {
    #[serde(default)]
    pub results: Vec<ApiRegion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRegion {
    #[serde(default)]
    pub iso_3166_1: String,
}
