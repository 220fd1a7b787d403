use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::{Interpretation, MoodSelection, Profile, Section, SurveyAnswers},
    services::profile::{derive_moods, interpret_profile, score_profile},
};

#[derive(Debug, Serialize)]
pub struct SurveySection {
    pub section: Section,
    /// Agreeing signals difficulty; the score is inverted into comfort
    pub difficulty_scale: bool,
    pub statements: [&'static str; Section::ITEMS],
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub answers: SurveyAnswers,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub profile: Profile,
    pub moods: Vec<MoodSelection>,
    pub interpretation: Interpretation,
    pub assessed_at: DateTime<Utc>,
}

/// Lists the questionnaire, answered on a 1-5 scale
pub async fn survey() -> Json<Vec<SurveySection>> {
    let sections = Section::ALL
        .into_iter()
        .map(|section| SurveySection {
            section,
            difficulty_scale: section.is_difficulty_scale(),
            statements: section.statements(),
        })
        .collect();
    Json(sections)
}

/// Scores survey answers, interprets the profile and suggests moods
pub async fn assess(Json(request): Json<ProfileRequest>) -> AppResult<Json<ProfileResponse>> {
    let profile = score_profile(&request.answers)?;
    let moods = derive_moods(&profile);
    let interpretation = interpret_profile(&profile);

    tracing::info!(
        moods = ?moods.iter().map(|m| m.mood.as_str()).collect::<Vec<_>>(),
        "Profile assessed"
    );

    Ok(Json(ProfileResponse {
        profile,
        moods,
        interpretation,
        assessed_at: Utc::now(),
    }))
}
