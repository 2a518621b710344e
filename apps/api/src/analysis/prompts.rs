// Prompt for the dual-audience match analysis.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{fill_template, NO_EMPTY_FIELDS_INSTRUCTION};
use crate::models::document::CandidateDocument;
use crate::models::job::JobPosting;

const NOT_SPECIFIED: &str = "Not specified";
const NONE_SPECIFIED: &str = "None specified";

/// Match analysis prompt template. Every `{placeholder}` is replaced before sending.
pub const MATCH_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are an expert job matching analyst. Analyze the resume against the job posting and produce ONE JSON report that serves two audiences: the CANDIDATE and the EVALUATOR (recruiter or hiring manager).

- "shared" holds the axis scores and their breakdowns. It is identical for both audiences.
- "candidate_view" holds feedback for the candidate: career insights, practical recommendations, a short encouragement and the best-fit next role.
- "evaluator_view" holds feedback for the evaluator: risk flags, opportunity flags, recommended actions, a 2-3 sentence fit summary and 3-5 follow-up interview questions.

{no_empty_fields}

RESUME TEXT:
{resume_text}

JOB DETAILS:
Title: {title}
Company: {company}
Industry: {industry}
Location: {location}
Job Type: {job_type}
Remote Option: {remote_option}
Salary Range: {salary_min} - {salary_max}
Description: {description}
Requirements: {requirements}
Responsibilities: {responsibilities}

CANDIDATE CAREER PREFERENCES:
Preferred Industries: {pref_industries}
Preferred Locations: {pref_locations}
Preferred Work Types: {pref_work_types}
Preferred Roles: {pref_roles}

Return a JSON object with this EXACT schema:
{
  "shared": {
    "skills_score": <0-100>,
    "experience_score": <0-100>,
    "culture_fit_score": <0-100>,
    "growth_potential_score": <0-100>,
    "preferences_bonus": <0-5>,
    "skills_analysis": {"matching_skills": ["..."], "missing_skills": ["..."], "summary": "..."},
    "experience_analysis": {"relevant_experience": ["..."], "experience_gaps": ["..."], "summary": "..."},
    "culture_fit_analysis": {"summary": "...", "teamwork": <0-100>, "values_alignment": <0-100>, "communication": <0-100>},
    "growth_potential_analysis": {"summary": "...", "learning_agility": <0-100>, "upskilling_history": <0-100>, "motivation": <0-100>},
    "preferences_analysis": [
      {"title": "...", "description": "...", "impact": "high|medium|low", "match_level": "excellent|good|moderate|poor", "preference_type": "industry|location|work_type|role"}
    ]
  },
  "candidate_view": {
    "career_insights": [
      {"type": "strength|improvement|opportunity|warning|gap", "title": "...", "description": "...", "impact": "high|medium|low"}
    ],
    "personalized_recommendations": [
      {"category": "skill_development|experience|networking|application", "title": "...", "description": "...", "priority": "high|medium|low"}
    ],
    "encouragement": "...",
    "next_career_goal": "..."
  },
  "evaluator_view": {
    "risk_flags": [
      {"type": "hard_filter|potential_risk|soft_risk", "title": "...", "description": "...", "impact": "high|medium|low"}
    ],
    "opportunity_flags": [
      {"type": "unique_strength|growth_potential|diversity", "title": "...", "description": "...", "impact": "high|medium|low"}
    ],
    "recommended_actions": [
      {"title": "...", "description": "..."}
    ],
    "fit_summary": "...",
    "follow_up_questions": ["..."]
  }
}

Guidelines:
- All axis scores are integers 0-100; preferences_bonus is an integer 0-5.
- Only put scores and factual breakdowns in "shared".
- Keep audience-specific feedback in the matching view.
- Use supportive, concise language."#;

pub fn build_match_prompt(document: &CandidateDocument, job: &JobPosting) -> String {
    let prefs = &document.career_preferences;
    let resume_text = document
        .parsed_text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("No resume text available.");

    let requirements = joined(&job.requirements, NOT_SPECIFIED);
    let responsibilities = joined(&job.responsibilities, NOT_SPECIFIED);
    let salary_min = or_not_specified(job.salary_min);
    let salary_max = or_not_specified(job.salary_max);
    let pref_industries = joined(&prefs.industries, NONE_SPECIFIED);
    let pref_locations = joined(&prefs.locations, NONE_SPECIFIED);
    let pref_work_types = joined(&prefs.work_types, NONE_SPECIFIED);
    let pref_roles = joined(&prefs.roles, NONE_SPECIFIED);

    fill_template(
        MATCH_ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("no_empty_fields", NO_EMPTY_FIELDS_INSTRUCTION),
            ("resume_text", resume_text),
            ("title", job.title.as_str()),
            ("company", job.company_name.as_str()),
            ("industry", job.industry.as_deref().unwrap_or(NOT_SPECIFIED)),
            ("location", job.location.as_deref().unwrap_or(NOT_SPECIFIED)),
            ("job_type", job.job_type.as_str()),
            ("remote_option", job.remote_option.as_str()),
            ("salary_min", salary_min.as_str()),
            ("salary_max", salary_max.as_str()),
            ("description", job.description.as_str()),
            ("requirements", requirements.as_str()),
            ("responsibilities", responsibilities.as_str()),
            ("pref_industries", pref_industries.as_str()),
            ("pref_locations", pref_locations.as_str()),
            ("pref_work_types", pref_work_types.as_str()),
            ("pref_roles", pref_roles.as_str()),
        ],
    )
}

fn or_not_specified(value: Option<i32>) -> String {
    value.map_or_else(|| NOT_SPECIFIED.to_string(), |v| v.to_string())
}

fn joined(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::CareerPreferences;
    use crate::testing::{document_with_embedding, job_with_embedding};
    use uuid::Uuid;

    #[test]
    fn test_prompt_includes_job_and_preferences() {
        let document = document_with_embedding(Uuid::new_v4(), None);
        let job = job_with_embedding(Uuid::new_v4(), None);
        let prompt = build_match_prompt(&document, &job);

        assert!(prompt.contains("Title: Backend Engineer"));
        assert!(prompt.contains("Company: Acme Logistics"));
        assert!(prompt.contains("Salary Range: 70000 - 90000"));
        assert!(prompt.contains("Requirements: Rust, PostgreSQL, Docker"));
        assert!(prompt.contains("Preferred Locations: Berlin"));
        assert!(prompt.contains("Five years of Rust"));
        assert!(!prompt.contains("{title}"));
        assert!(!prompt.contains("{no_empty_fields}"));
    }

    #[test]
    fn test_missing_values_are_spelled_out() {
        let mut document = document_with_embedding(Uuid::new_v4(), None);
        document.career_preferences = CareerPreferences::default();
        document.parsed_text = None;
        let mut job = job_with_embedding(Uuid::new_v4(), None);
        job.industry = None;
        job.salary_max = None;

        let prompt = build_match_prompt(&document, &job);
        assert!(prompt.contains("Industry: Not specified"));
        assert!(prompt.contains("Salary Range: 70000 - Not specified"));
        assert!(prompt.contains("Preferred Industries: None specified"));
        assert!(prompt.contains("Preferred Roles: None specified"));
        assert!(prompt.contains("No resume text available."));
    }

    #[test]
    fn test_placeholder_text_in_job_fields_is_kept_verbatim() {
        let document = document_with_embedding(Uuid::new_v4(), None);
        let mut job = job_with_embedding(Uuid::new_v4(), None);
        job.description = "Paste {resume_text} and {pref_roles} here".to_string();

        let prompt = build_match_prompt(&document, &job);
        assert!(prompt.contains("Paste {resume_text} and {pref_roles} here"));
        assert_eq!(prompt.matches("Five years of Rust").count(), 1);
    }
}
