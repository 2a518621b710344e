// Shared prompt constants. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds cross-cutting fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that asks for a report-shaped JSON object.
pub const NO_EMPTY_FIELDS_INSTRUCTION: &str = "\
    Never leave any field as an empty string, object or array. \
    If there is no data for a field, write a short summary or explanation instead.";

/// Substitutes `{name}` placeholders in a single pass over `template`.
/// Inserted values are never rescanned, so text containing `{name}` is kept
/// verbatim. Braces that do not name a known placeholder are left alone.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            let name = &after[..close];
            values
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_replaces_known_placeholders() {
        let out = fill_template("Job: {title} at {company}", &[("title", "SRE"), ("company", "Acme")]);
        assert_eq!(out, "Job: SRE at Acme");
    }

    #[test]
    fn test_fill_template_does_not_rescan_inserted_text() {
        let out = fill_template(
            "D: {description}\nR: {resume_text}",
            &[("description", "We like {resume_text}"), ("resume_text", "secret resume")],
        );
        assert_eq!(out, "D: We like {resume_text}\nR: secret resume");
    }

    #[test]
    fn test_fill_template_keeps_json_braces() {
        let out = fill_template(r#"Return {"question_text": "..."} for {title}"#, &[("title", "SRE")]);
        assert_eq!(out, r#"Return {"question_text": "..."} for SRE"#);
    }
}
