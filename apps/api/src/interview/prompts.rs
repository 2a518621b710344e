// All LLM prompt templates for the Interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde_json::json;

use super::orchestrator::MAX_QUESTIONS;
use crate::analysis::schema::MatchReportPayload;
use crate::llm_client::prompts::{fill_template, NO_EMPTY_FIELDS_INSTRUCTION};
use crate::models::document::CandidateDocument;
use crate::models::interview::InterviewSession;
use crate::models::job::JobPosting;

/// Opening question prompt. Replace `{title}`, `{description}`, `{requirements}`, `{resume_text}`.
pub const OPENING_QUESTION_PROMPT_TEMPLATE: &str = r#"As an expert technical interviewer, write ONE compelling opening question for an interview.
Base it on the job and resume below and use it to assess a key qualification right away.
Do NOT ask "Tell me about yourself". Ask about a core requirement of the role or a significant project on the resume.

JOB: {title}
DESCRIPTION: {description}
REQUIREMENTS: {requirements}

RESUME:
{resume_text}

Return a JSON object: {"question_text": "...", "type": "deep-dive|technical|behavioral"}"#;

/// Follow-up question prompt. Replace `{title}`, `{requirements}`, `{history}`,
/// `{question_number}`, `{max_questions}`.
pub const FOLLOW_UP_QUESTION_PROMPT_TEMPLATE: &str = r#"You are an expert technical interviewer continuing a conversation. Write the next question.
- Probe deeper into the candidate's last answer, or explore a requirement of the role that has not been covered yet.
- Do NOT repeat or rephrase a previous question.
- Stay focused on the candidate's fit for this specific role.
- The interview has {max_questions} questions in total. This is question number {question_number}.

JOB: {title}
REQUIREMENTS: {requirements}

CONVERSATION SO FAR:
{history}

Return a JSON object: {"question_text": "...", "type": "deep-dive|technical|behavioral"}"#;

/// Evaluator report prompt. Replace every `{placeholder}` before sending.
pub const INTERVIEW_REPORT_PROMPT_TEMPLATE: &str = r#"You are an expert technical interviewer and hiring assistant. Write an evaluator-facing interview report for this candidate and job application.

CONTEXT:
- Job Title: {title}
- Company: {company}
- Industry: {industry}
- Location: {location}
- Job Description: {description}
- Requirements: {requirements}
- Responsibilities: {responsibilities}
- Candidate Resume: {resume_text}
- Match Analysis: {match_report}
- Interview Q&A:
{transcript}

INSTRUCTIONS:
- Analyze the candidate's strengths and weaknesses from the interview and the match analysis.
- Assess fit against the job description and requirements.
- Score culture fit, communication and technical depth as demonstrated in the interview.
- Suggest exactly one next step: "Offer", "Reject" or "Further Interview", with a rationale.
- {no_empty_fields}

Return a JSON object with this EXACT schema:
{
  "summary": "...",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "fit_score": <0-100>,
  "culture_fit_score": <0-100>,
  "communication_score": <0-100>,
  "technical_depth_score": <0-100>,
  "suggested_next_step": "Offer|Reject|Further Interview",
  "rationale": "...",
  "follow_up_questions": ["..."],
  "version": "1.0"
}"#;

const NOT_SPECIFIED: &str = "Not specified";

fn resume_text(document: &CandidateDocument) -> &str {
    document
        .parsed_text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or("No resume text.")
}

fn joined(items: &[String]) -> String {
    if items.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        items.join(", ")
    }
}

pub fn build_opening_prompt(job: &JobPosting, document: &CandidateDocument) -> String {
    fill_template(
        OPENING_QUESTION_PROMPT_TEMPLATE,
        &[
            ("title", job.title.as_str()),
            ("description", job.description.as_str()),
            ("requirements", joined(&job.requirements).as_str()),
            ("resume_text", resume_text(document)),
        ],
    )
}

pub fn build_follow_up_prompt(job: &JobPosting, session: &InterviewSession) -> String {
    let history = session
        .transcript()
        .map(|(q, a)| format!("Q: {}\nA: {}", q.question_text, a.text))
        .collect::<Vec<_>>()
        .join("\n\n");

    fill_template(
        FOLLOW_UP_QUESTION_PROMPT_TEMPLATE,
        &[
            ("max_questions", MAX_QUESTIONS.to_string().as_str()),
            ("question_number", (session.questions.len() + 1).to_string().as_str()),
            ("title", job.title.as_str()),
            ("requirements", joined(&job.requirements).as_str()),
            ("history", history.as_str()),
        ],
    )
}

pub fn build_report_prompt(
    job: &JobPosting,
    document: &CandidateDocument,
    match_report: Option<&MatchReportPayload>,
    session: &InterviewSession,
) -> String {
    let transcript: Vec<_> = session
        .transcript()
        .map(|(q, a)| json!({"question": q.question_text, "answer": a.text}))
        .collect();
    let transcript = serde_json::to_string_pretty(&transcript).unwrap_or_else(|_| "[]".to_string());
    let match_report = match_report
        .and_then(|r| serde_json::to_string(r).ok())
        .unwrap_or_else(|| "{}".to_string());

    fill_template(
        INTERVIEW_REPORT_PROMPT_TEMPLATE,
        &[
            ("no_empty_fields", NO_EMPTY_FIELDS_INSTRUCTION),
            ("title", job.title.as_str()),
            ("company", job.company_name.as_str()),
            ("industry", job.industry.as_deref().unwrap_or(NOT_SPECIFIED)),
            ("location", job.location.as_deref().unwrap_or(NOT_SPECIFIED)),
            ("description", job.description.as_str()),
            ("requirements", joined(&job.requirements).as_str()),
            ("responsibilities", joined(&job.responsibilities).as_str()),
            ("resume_text", resume_text(document)),
            ("match_report", match_report.as_str()),
            ("transcript", transcript.as_str()),
        ],
    )
}
