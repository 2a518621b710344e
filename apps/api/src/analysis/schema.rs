//! Persisted match report schema.
//!
//! Every string, list and sub-object is populated. Empty model output is
//! replaced with a fixed placeholder during normalization, never stored as-is.

use serde::{Deserialize, Serialize};

use super::weights::AxisWeights;

pub const MATCH_REPORT_VERSION: &str = "4.0";
pub const AUDIENCE_DUAL: &str = "dual";

pub const SKILLS_PLACEHOLDER: &str = "No skills analysis provided.";
pub const EXPERIENCE_PLACEHOLDER: &str = "No experience analysis provided.";
pub const CULTURE_FIT_PLACEHOLDER: &str = "No culture/team fit analysis provided.";
pub const GROWTH_PLACEHOLDER: &str = "No growth potential analysis provided.";
pub const PREFERENCES_PLACEHOLDER: &str = "No preferences analysis provided.";
pub const ENCOURAGEMENT_PLACEHOLDER: &str = "No encouragement provided.";
pub const CAREER_GOAL_PLACEHOLDER: &str = "No career goal suggested.";
pub const FIT_SUMMARY_PLACEHOLDER: &str = "No fit summary provided.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReportPayload {
    pub shared: SharedAnalysis,
    pub candidate_view: CandidateView,
    pub evaluator_view: EvaluatorView,
    pub audience: String,
    #[serde(rename = "employer_weightage", alias = "axis_weights")]
    pub axis_weights: AxisWeights,
}

impl MatchReportPayload {
    /// Combines normalized model output with the weights used to score it and
    /// fills in `shared.overall_score`.
    pub fn assemble(sections: AnalysisSections, weights: AxisWeights) -> Self {
        let mut shared = sections.shared;
        shared.overall_score = shared.weighted_overall(&weights);
        Self {
            shared,
            candidate_view: sections.candidate_view,
            evaluator_view: sections.evaluator_view,
            audience: AUDIENCE_DUAL.to_string(),
            axis_weights: weights,
        }
    }

    /// The all-placeholder report with every score at 0.
    #[cfg(test)]
    pub fn placeholder() -> Self {
        Self::placeholder_with(AxisWeights::default_normalized())
    }

    /// Placeholder sections under the job's resolved weights.
    pub fn placeholder_with(weights: AxisWeights) -> Self {
        Self::assemble(AnalysisSections::placeholder(), weights)
    }
}

/// The three audience sections as produced by the model, after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSections {
    pub shared: SharedAnalysis,
    pub candidate_view: CandidateView,
    pub evaluator_view: EvaluatorView,
}

impl AnalysisSections {
    pub fn placeholder() -> Self {
        Self {
            shared: SharedAnalysis::placeholder(),
            candidate_view: CandidateView::placeholder(),
            evaluator_view: EvaluatorView::placeholder(),
        }
    }
}

/// Axis scores and breakdowns, identical for both audiences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedAnalysis {
    pub skills_score: u8,
    pub experience_score: u8,
    pub culture_fit_score: u8,
    pub growth_potential_score: u8,
    pub preferences_bonus: u8,
    pub overall_score: u8,
    pub skills_analysis: SkillsAnalysis,
    pub experience_analysis: ExperienceAnalysis,
    pub culture_fit_analysis: CultureFitAnalysis,
    pub growth_potential_analysis: GrowthPotentialAnalysis,
    pub preferences_analysis: Vec<PreferenceInsight>,
}

impl SharedAnalysis {
    /// round(clamp(Σ axis·weight + bonus, 0, 100))
    pub fn weighted_overall(&self, weights: &AxisWeights) -> u8 {
        let weighted = weights.apply(
            f64::from(self.skills_score),
            f64::from(self.experience_score),
            f64::from(self.culture_fit_score),
            f64::from(self.growth_potential_score),
        );
        (weighted + f64::from(self.preferences_bonus))
            .clamp(0.0, 100.0)
            .round() as u8
    }

    pub fn placeholder() -> Self {
        Self {
            skills_score: 0,
            experience_score: 0,
            culture_fit_score: 0,
            growth_potential_score: 0,
            preferences_bonus: 0,
            overall_score: 0,
            skills_analysis: SkillsAnalysis {
                matching_skills: vec!["No matching skills identified.".to_string()],
                missing_skills: vec!["No missing skills identified.".to_string()],
                summary: SKILLS_PLACEHOLDER.to_string(),
            },
            experience_analysis: ExperienceAnalysis {
                relevant_experience: vec!["No relevant experience identified.".to_string()],
                experience_gaps: vec!["No experience gaps identified.".to_string()],
                summary: EXPERIENCE_PLACEHOLDER.to_string(),
            },
            culture_fit_analysis: CultureFitAnalysis {
                summary: CULTURE_FIT_PLACEHOLDER.to_string(),
                teamwork: 0,
                values_alignment: 0,
                communication: 0,
            },
            growth_potential_analysis: GrowthPotentialAnalysis {
                summary: GROWTH_PLACEHOLDER.to_string(),
                learning_agility: 0,
                upskilling_history: 0,
                motivation: 0,
            },
            preferences_analysis: vec![PreferenceInsight::placeholder()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillsAnalysis {
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceAnalysis {
    pub relevant_experience: Vec<String>,
    pub experience_gaps: Vec<String>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CultureFitAnalysis {
    pub summary: String,
    pub teamwork: u8,
    pub values_alignment: u8,
    pub communication: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPotentialAnalysis {
    pub summary: String,
    pub learning_agility: u8,
    pub upskilling_history: u8,
    pub motivation: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceInsight {
    pub title: String,
    pub description: String,
    pub impact: String,
    pub match_level: String,
    pub preference_type: String,
}

impl PreferenceInsight {
    pub fn placeholder() -> Self {
        Self {
            title: PREFERENCES_PLACEHOLDER.to_string(),
            description: PREFERENCES_PLACEHOLDER.to_string(),
            impact: "low".to_string(),
            match_level: "poor".to_string(),
            preference_type: "industry".to_string(),
        }
    }
}

/// Typed insight used for career insights and evaluator flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub impact: String,
}

impl Insight {
    pub fn placeholder(kind: &str, title: &str) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            description: title.to_string(),
            impact: "low".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub title: String,
    pub description: String,
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateView {
    pub career_insights: Vec<Insight>,
    pub personalized_recommendations: Vec<Recommendation>,
    pub encouragement: String,
    pub next_career_goal: String,
}

impl CandidateView {
    pub fn placeholder() -> Self {
        Self {
            career_insights: vec![Insight::placeholder(
                "opportunity",
                "No career insights provided.",
            )],
            personalized_recommendations: vec![Recommendation {
                category: "application".to_string(),
                title: "No recommendations provided.".to_string(),
                description: "No recommendations provided.".to_string(),
                priority: "low".to_string(),
            }],
            encouragement: ENCOURAGEMENT_PLACEHOLDER.to_string(),
            next_career_goal: CAREER_GOAL_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorView {
    pub risk_flags: Vec<Insight>,
    pub opportunity_flags: Vec<Insight>,
    #[serde(alias = "recruiter_recommendations")]
    pub recommended_actions: Vec<RecommendedAction>,
    pub fit_summary: String,
    pub follow_up_questions: Vec<String>,
}

impl EvaluatorView {
    pub fn placeholder() -> Self {
        Self {
            risk_flags: vec![Insight::placeholder("soft_risk", "No risk flags provided.")],
            opportunity_flags: vec![Insight::placeholder(
                "unique_strength",
                "No opportunity flags provided.",
            )],
            recommended_actions: vec![RecommendedAction {
                title: "No recruiter recommendations provided.".to_string(),
                description: "No recruiter recommendations provided.".to_string(),
            }],
            fit_summary: FIT_SUMMARY_PLACEHOLDER.to_string(),
            follow_up_questions: vec!["No follow-up questions provided.".to_string()],
        }
    }
}
