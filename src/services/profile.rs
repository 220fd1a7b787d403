use crate::{
    error::{AppError, AppResult},
    models::{Interpretation, Mood, MoodSelection, Profile, Section, SurveyAnswers},
};

/// Answer assumed for an unanswered statement
const NEUTRAL_ANSWER: u8 = 3;

/// Comfort below this flags a difficulty mood
const DIFFICULTY_THRESHOLD: f64 = 50.0;
/// Strength at or above this flags an energetic mood
const STRENGTH_THRESHOLD: f64 = 60.0;
/// Coping below this is a red flag on its own
const LOW_COPING_THRESHOLD: f64 = 40.0;

const SUGGESTIONS: [&str; 5] = [
    "Fix your sleep: same bedtime and wake time for 7 days, naps capped at 20 minutes.",
    "Breathe 4-7-8 for 3 rounds as soon as anxiety rises.",
    "Timebox 30 minutes on one small piece, then take a 5-minute reward.",
    "Prepare three boundary lines in advance: 'Not right now', 'Let's talk later', 'I'll go at my own pace'.",
    "Write down 10 ideas a day without judging them; pick from them once a week.",
];

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Section average mapped onto 0-100, one decimal
fn section_percentage(section: Section, answers: Option<&Vec<u8>>) -> AppResult<f64> {
    let given = answers.map(Vec::as_slice).unwrap_or_default();
    if given.len() > Section::ITEMS {
        return Err(AppError::InvalidInput(format!(
            "Section {:?} takes at most {} answers, got {}",
            section,
            Section::ITEMS,
            given.len()
        )));
    }
    if let Some(bad) = given.iter().find(|a| !(1..=5).contains(*a)) {
        return Err(AppError::InvalidInput(format!(
            "Answers must be between 1 and 5, got {} in {:?}",
            bad, section
        )));
    }

    let total: u32 = (0..Section::ITEMS)
        .map(|i| u32::from(given.get(i).copied().unwrap_or(NEUTRAL_ANSWER)))
        .sum();
    let avg = f64::from(total) / Section::ITEMS as f64;

    Ok(round1(((avg - 1.0) / 4.0 * 100.0).clamp(0.0, 100.0)))
}

/// Comfort-oriented score: difficulty scales are inverted so higher is better
fn comfort_score(section: Section, answers: &SurveyAnswers) -> AppResult<f64> {
    let pct = section_percentage(section, answers.get(&section))?;
    if section.is_difficulty_scale() {
        Ok(round1(100.0 - pct))
    } else {
        Ok(pct)
    }
}

/// Scores survey answers into a profile
///
/// Unanswered statements count as neutral. Any answer outside 1-5, or more
/// answers than a section has statements, is rejected.
pub fn score_profile(answers: &SurveyAnswers) -> AppResult<Profile> {
    let profile = Profile {
        emotional_comfort: comfort_score(Section::EmotionalState, answers)?,
        stress_coping: comfort_score(Section::StressCoping, answers)?,
        relationship_stability: comfort_score(Section::Attachment, answers)?,
        drive: comfort_score(Section::Motivation, answers)?,
        flow: comfort_score(Section::Flow, answers)?,
    };

    tracing::debug!(?profile, "Survey scored");

    Ok(profile)
}

fn to_intensity(raw: f64) -> u8 {
    raw.round().clamp(1.0, 5.0) as u8
}

/// The further below 50, the stronger the mood
fn difficulty_intensity(score: f64) -> u8 {
    to_intensity(1.0 + (DIFFICULTY_THRESHOLD - score) / 12.5)
}

/// The further above 60, the stronger the mood
fn strength_intensity(score: f64) -> u8 {
    to_intensity(1.0 + (score - STRENGTH_THRESHOLD) / 10.0)
}

/// Moods suggested by a profile
///
/// Low comfort axes map to comforting moods, high drive and flow to
/// energetic ones. A profile that triggers nothing gets `happy` at 1.
pub fn derive_moods(profile: &Profile) -> Vec<MoodSelection> {
    let difficulties = [
        (profile.emotional_comfort, Mood::Sad),
        (profile.stress_coping, Mood::Tired),
        (profile.relationship_stability, Mood::Lonely),
    ];
    let strengths = [(profile.drive, Mood::Adventurous), (profile.flow, Mood::Curious)];

    let mut moods: Vec<MoodSelection> = difficulties
        .into_iter()
        .filter(|(score, _)| *score < DIFFICULTY_THRESHOLD)
        .map(|(score, mood)| MoodSelection {
            mood,
            intensity: difficulty_intensity(score),
        })
        .collect();

    moods.extend(
        strengths
            .into_iter()
            .filter(|(score, _)| *score >= STRENGTH_THRESHOLD)
            .map(|(score, mood)| MoodSelection {
                mood,
                intensity: strength_intensity(score),
            }),
    );

    if moods.is_empty() {
        moods.push(MoodSelection::default());
    }

    moods
}

fn triggered(items: &[(bool, &str)]) -> Vec<String> {
    items
        .iter()
        .filter(|(hit, _)| *hit)
        .map(|(_, text)| text.to_string())
        .collect()
}

/// Highlights, cautions, fixed suggestions and a one-line advice for a profile
pub fn interpret_profile(profile: &Profile) -> Interpretation {
    let highlights = [
        (
            profile.drive >= STRENGTH_THRESHOLD,
            "Your drive and resilience are alive. Dig in and it will pay off.",
        ),
        (
            profile.flow >= STRENGTH_THRESHOLD,
            "You focus well. Switch on creative mode and time flies.",
        ),
        (
            profile.stress_coping >= STRENGTH_THRESHOLD,
            "You can design around stress. Priorities, splitting and expression are working.",
        ),
    ];

    let cautions = [
        (
            profile.emotional_comfort < DIFFICULTY_THRESHOLD,
            "Emotional waves are frequent. Sleep, breathing and routine need attention.",
        ),
        (
            profile.relationship_stability < DIFFICULTY_THRESHOLD,
            "Relationship fatigue is piling up. Setting boundaries and saying one honest line helps.",
        ),
        (
            profile.stress_coping < LOW_COPING_THRESHOLD,
            "Coping is running on empty. Recover your energy first with a minimal routine.",
        ),
    ];

    let today = if profile.emotional_comfort < DIFFICULTY_THRESHOLD
        && profile.stress_coping < DIFFICULTY_THRESHOLD
    {
        "Look after your body first and keep tasks small. Today, start instead of perfect."
    } else if profile.drive >= STRENGTH_THRESHOLD && profile.flow >= STRENGTH_THRESHOLD {
        "Raise the sails while the wind blows. Execution mode is on."
    } else {
        "One small step is enough. Rhythm becomes stability."
    };

    Interpretation {
        highlights: triggered(&highlights),
        cautions: triggered(&cautions),
        suggestions: SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
        today: today.to_string(),
    }
}
