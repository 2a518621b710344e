//! Lenient parsing of model output into [`AnalysisSections`].
//!
//! The model's JSON is read into permissive raw shapes (wrong types become
//! "absent", legacy keys are accepted) and then normalized once: scores are
//! coerced and clamped, and empty text or lists take fixed placeholders.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::schema::*;
use crate::llm_client::strip_json_fences;

const AXIS_MAX: u8 = 100;
const BONUS_MAX: u8 = 5;

#[derive(Debug, Error)]
pub enum ModelOutputError {
    #[error("Model output is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Model output is JSON but not an object")]
    NotAnObject,
}

/// Parses a raw completion (code fences allowed) and normalizes it.
pub fn parse_model_output(text: &str) -> Result<AnalysisSections, ModelOutputError> {
    let value: Value = serde_json::from_str(strip_json_fences(text))?;
    if !value.is_object() {
        return Err(ModelOutputError::NotAnObject);
    }
    let raw: RawReport = serde_json::from_value(value)?;
    Ok(raw.normalize())
}

/// Coerces a model-supplied score: numbers and numeric strings are truncated
/// toward zero and clamped to `[0, max]`; anything else is 0.
pub fn coerce_score(value: &Value, max: u8) -> u8 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(v) if v.is_finite() => v.trunc().clamp(0.0, f64::from(max)) as u8,
        _ => 0,
    }
}

/// Any value that fails to deserialize as `T` is treated as absent.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps the well-formed elements of a list; a non-list is empty.
pub(crate) fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

fn text_or(value: Option<String>, placeholder: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

fn strings_or(values: Vec<String>, placeholder: &str) -> Vec<String> {
    let kept: Vec<String> = values
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if kept.is_empty() {
        vec![placeholder.to_string()]
    } else {
        kept
    }
}

fn list_or<T>(values: Vec<T>, placeholder: impl FnOnce() -> T) -> Vec<T> {
    if values.is_empty() {
        vec![placeholder()]
    } else {
        values
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawReport {
    #[serde(deserialize_with = "lenient")]
    shared: RawShared,
    #[serde(alias = "student_view", deserialize_with = "lenient")]
    candidate_view: RawCandidateView,
    #[serde(alias = "employer_view", deserialize_with = "lenient")]
    evaluator_view: RawEvaluatorView,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawShared {
    skills_score: Value,
    experience_score: Value,
    culture_fit_score: Value,
    growth_potential_score: Value,
    preferences_bonus: Value,
    #[serde(deserialize_with = "lenient")]
    skills_analysis: RawSkills,
    #[serde(deserialize_with = "lenient")]
    experience_analysis: RawExperience,
    #[serde(deserialize_with = "lenient")]
    culture_fit_analysis: RawSubScores,
    #[serde(deserialize_with = "lenient")]
    growth_potential_analysis: RawSubScores,
    #[serde(deserialize_with = "lenient_list")]
    preferences_analysis: Vec<RawPreference>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSkills {
    #[serde(deserialize_with = "lenient_list")]
    matching_skills: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    missing_skills: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    summary: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawExperience {
    #[serde(deserialize_with = "lenient_list")]
    relevant_experience: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    experience_gaps: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    summary: Option<String>,
}

/// Culture-fit and growth sub-objects share a shape: a summary plus scores.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawSubScores {
    #[serde(deserialize_with = "lenient")]
    summary: Option<String>,
    teamwork: Value,
    values_alignment: Value,
    communication: Value,
    learning_agility: Value,
    upskilling_history: Value,
    motivation: Value,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawPreference {
    title: Option<String>,
    description: Option<String>,
    impact: Option<String>,
    match_level: Option<String>,
    preference_type: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawInsight {
    #[serde(rename = "type", alias = "kind")]
    kind: Option<String>,
    title: Option<String>,
    description: Option<String>,
    impact: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawRecommendation {
    category: Option<String>,
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawAction {
    title: Option<String>,
    description: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawCandidateView {
    #[serde(deserialize_with = "lenient_list")]
    career_insights: Vec<RawInsight>,
    #[serde(deserialize_with = "lenient_list")]
    personalized_recommendations: Vec<RawRecommendation>,
    #[serde(deserialize_with = "lenient")]
    encouragement: Option<String>,
    #[serde(deserialize_with = "lenient")]
    next_career_goal: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawEvaluatorView {
    #[serde(deserialize_with = "lenient_list")]
    risk_flags: Vec<RawInsight>,
    #[serde(deserialize_with = "lenient_list")]
    opportunity_flags: Vec<RawInsight>,
    #[serde(alias = "recruiter_recommendations", deserialize_with = "lenient_list")]
    recommended_actions: Vec<RawAction>,
    #[serde(deserialize_with = "lenient")]
    fit_summary: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    follow_up_questions: Vec<String>,
}

impl RawReport {
    fn normalize(self) -> AnalysisSections {
        AnalysisSections {
            shared: self.shared.normalize(),
            candidate_view: self.candidate_view.normalize(),
            evaluator_view: self.evaluator_view.normalize(),
        }
    }
}

impl RawShared {
    fn normalize(self) -> SharedAnalysis {
        let culture = self.culture_fit_analysis;
        let growth = self.growth_potential_analysis;
        SharedAnalysis {
            skills_score: coerce_score(&self.skills_score, AXIS_MAX),
            experience_score: coerce_score(&self.experience_score, AXIS_MAX),
            culture_fit_score: coerce_score(&self.culture_fit_score, AXIS_MAX),
            growth_potential_score: coerce_score(&self.growth_potential_score, AXIS_MAX),
            preferences_bonus: coerce_score(&self.preferences_bonus, BONUS_MAX),
            // Recomputed from the weights when the payload is assembled.
            overall_score: 0,
            skills_analysis: SkillsAnalysis {
                matching_skills: strings_or(
                    self.skills_analysis.matching_skills,
                    "No matching skills identified.",
                ),
                missing_skills: strings_or(
                    self.skills_analysis.missing_skills,
                    "No missing skills identified.",
                ),
                summary: text_or(self.skills_analysis.summary, SKILLS_PLACEHOLDER),
            },
            experience_analysis: ExperienceAnalysis {
                relevant_experience: strings_or(
                    self.experience_analysis.relevant_experience,
                    "No relevant experience identified.",
                ),
                experience_gaps: strings_or(
                    self.experience_analysis.experience_gaps,
                    "No experience gaps identified.",
                ),
                summary: text_or(self.experience_analysis.summary, EXPERIENCE_PLACEHOLDER),
            },
            culture_fit_analysis: CultureFitAnalysis {
                summary: text_or(culture.summary, CULTURE_FIT_PLACEHOLDER),
                teamwork: coerce_score(&culture.teamwork, AXIS_MAX),
                values_alignment: coerce_score(&culture.values_alignment, AXIS_MAX),
                communication: coerce_score(&culture.communication, AXIS_MAX),
            },
            growth_potential_analysis: GrowthPotentialAnalysis {
                summary: text_or(growth.summary, GROWTH_PLACEHOLDER),
                learning_agility: coerce_score(&growth.learning_agility, AXIS_MAX),
                upskilling_history: coerce_score(&growth.upskilling_history, AXIS_MAX),
                motivation: coerce_score(&growth.motivation, AXIS_MAX),
            },
            preferences_analysis: list_or(
                self.preferences_analysis
                    .into_iter()
                    .map(RawPreference::normalize)
                    .collect(),
                PreferenceInsight::placeholder,
            ),
        }
    }
}

impl RawPreference {
    fn normalize(self) -> PreferenceInsight {
        let title = text_or(self.title, PREFERENCES_PLACEHOLDER);
        PreferenceInsight {
            description: text_or(self.description, &title),
            impact: text_or(self.impact, "low"),
            match_level: text_or(self.match_level, "moderate"),
            preference_type: text_or(self.preference_type, "industry"),
            title,
        }
    }
}

impl RawInsight {
    fn normalize(self, default_kind: &str, placeholder: &str) -> Insight {
        let title = text_or(self.title, placeholder);
        Insight {
            kind: text_or(self.kind, default_kind),
            description: text_or(self.description, &title),
            impact: text_or(self.impact, "medium"),
            title,
        }
    }
}

impl RawCandidateView {
    fn normalize(self) -> CandidateView {
        let fallback = CandidateView::placeholder();
        CandidateView {
            career_insights: non_empty_or(
                self.career_insights
                    .into_iter()
                    .map(|i| i.normalize("opportunity", "Career insight"))
                    .collect(),
                fallback.career_insights,
            ),
            personalized_recommendations: non_empty_or(
                self.personalized_recommendations
                    .into_iter()
                    .map(|r| {
                        let title = text_or(r.title, "Recommendation");
                        Recommendation {
                            category: text_or(r.category, "application"),
                            description: text_or(r.description, &title),
                            priority: text_or(r.priority, "medium"),
                            title,
                        }
                    })
                    .collect(),
                fallback.personalized_recommendations,
            ),
            encouragement: text_or(self.encouragement, ENCOURAGEMENT_PLACEHOLDER),
            next_career_goal: text_or(self.next_career_goal, CAREER_GOAL_PLACEHOLDER),
        }
    }
}

impl RawEvaluatorView {
    fn normalize(self) -> EvaluatorView {
        let fallback = EvaluatorView::placeholder();
        EvaluatorView {
            risk_flags: non_empty_or(
                self.risk_flags
                    .into_iter()
                    .map(|i| i.normalize("potential_risk", "Risk"))
                    .collect(),
                fallback.risk_flags,
            ),
            opportunity_flags: non_empty_or(
                self.opportunity_flags
                    .into_iter()
                    .map(|i| i.normalize("unique_strength", "Opportunity"))
                    .collect(),
                fallback.opportunity_flags,
            ),
            recommended_actions: non_empty_or(
                self.recommended_actions
                    .into_iter()
                    .map(|a| {
                        let title = text_or(a.title, "Recommended action");
                        RecommendedAction {
                            description: text_or(a.description, &title),
                            title,
                        }
                    })
                    .collect(),
                fallback.recommended_actions,
            ),
            fit_summary: text_or(self.fit_summary, FIT_SUMMARY_PLACEHOLDER),
            follow_up_questions: non_empty_or(
                strings_or(self.follow_up_questions, "")
                    .into_iter()
                    .filter(|q| !q.is_empty())
                    .collect(),
                fallback.follow_up_questions,
            ),
        }
    }
}

fn non_empty_or<T>(values: Vec<T>, fallback: Vec<T>) -> Vec<T> {
    if values.is_empty() {
        fallback
    } else {
        values
    }
}
