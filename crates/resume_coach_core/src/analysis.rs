//! crates/resume_coach_core/src/analysis.rs
//!
//! Tolerant parsing of model output into an `AnalysisRecord`.
//!
//! Language-model output is unreliable input: the model is *asked* to return
//! bare JSON with a fixed key set, but it may wrap the payload in markdown
//! fences, prepend prose, or return something that is not JSON at all. The
//! parser here degrades into a usable fallback record instead of surfacing a
//! parse error to the render path.

use crate::domain::AnalysisRecord;

/// Shown as the profile summary when the model's output could not be parsed.
pub const FALLBACK_SUMMARY: &str = "Could not analyze resume properly. Please try again.";

/// Placeholder entry for every array field of the fallback record.
pub const FALLBACK_ENTRY: &str = "Not available";

/// Diagnostic stored in the `error` field of the fallback record.
pub const FALLBACK_ERROR: &str = "Failed to parse AI response";

/// The outcome of parsing raw model output.
///
/// The repair path is explicit: callers that only need a record call
/// [`AnalysisOutcome::into_record`], callers that want to log or count
/// failures can match on `Fallback` first.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// The output parsed as a well-shaped analysis.
    Parsed(AnalysisRecord),
    /// The output could not be parsed; `reason` is a diagnostic for logs.
    Fallback { reason: String },
}

impl AnalysisOutcome {
    /// Converts the outcome into a well-formed record. Total: a fallback
    /// becomes the canned record with every array populated by a placeholder
    /// and the `error` marker set.
    pub fn into_record(self) -> AnalysisRecord {
        match self {
            AnalysisOutcome::Parsed(record) => record,
            AnalysisOutcome::Fallback { .. } => fallback_record(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, AnalysisOutcome::Fallback { .. })
    }
}

/// Parses raw model output into an [`AnalysisOutcome`]. Never fails.
///
/// Strategy: try a strict parse of the whole output; if that fails, look for
/// a fenced code block (``` with an optional `json` tag) and retry on its
/// inner content. Wrong-shaped JSON (missing keys, wrong field types) is
/// treated the same as unparseable text.
pub fn parse_analysis(raw: &str) -> AnalysisOutcome {
    let direct = serde_json::from_str::<AnalysisRecord>(raw.trim());
    let reason = match direct {
        Ok(record) => return AnalysisOutcome::Parsed(record),
        Err(e) => e.to_string(),
    };

    if let Some(inner) = fenced_block(raw) {
        if let Ok(record) = serde_json::from_str::<AnalysisRecord>(inner) {
            return AnalysisOutcome::Parsed(record);
        }
    }

    AnalysisOutcome::Fallback { reason }
}

/// Builds the canned record substituted when parsing fails.
pub fn fallback_record() -> AnalysisRecord {
    let placeholder = || vec![FALLBACK_ENTRY.to_string()];
    AnalysisRecord {
        profile_summary: FALLBACK_SUMMARY.to_string(),
        key_skills: placeholder(),
        experience_highlights: placeholder(),
        education: placeholder(),
        strengths: placeholder(),
        areas_for_improvement: placeholder(),
        suggested_career_paths: placeholder(),
        recommended_skills: placeholder(),
        recommended_certifications: placeholder(),
        error: Some(FALLBACK_ERROR.to_string()),
    }
}

/// Returns the inner content of the first ``` fenced block, if any.
/// An opening fence without a closing one yields everything after it, which
/// still gives the strict parser a chance on truncated output.
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let mut inner = &text[start + 3..];
    if let Some(rest) = inner.strip_prefix("json") {
        inner = rest;
    }
    match inner.find("```") {
        Some(end) => Some(inner[..end].trim()),
        None => Some(inner.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED: &str = r#"{
        "profileSummary": "Experienced software engineer.",
        "keySkills": ["Rust", "SQL"],
        "experienceHighlights": ["Led a platform migration"],
        "education": ["BSc Computer Science, MIT, 2019"],
        "strengths": ["Clear writing"],
        "areasForImprovement": ["More metrics"],
        "suggestedCareerPaths": ["Staff engineer"],
        "recommendedSkills": ["Kubernetes"],
        "recommendedCertifications": ["CKA"]
    }"#;

    fn assert_is_fallback(outcome: AnalysisOutcome) {
        assert!(outcome.is_fallback());
        let record = outcome.into_record();
        assert_eq!(record.profile_summary, FALLBACK_SUMMARY);
        assert_eq!(record.key_skills, vec![FALLBACK_ENTRY.to_string()]);
        assert_eq!(record.recommended_certifications, vec![FALLBACK_ENTRY.to_string()]);
        assert_eq!(record.error.as_deref(), Some(FALLBACK_ERROR));
    }

    #[test]
    fn parses_bare_json() {
        match parse_analysis(WELL_FORMED) {
            AnalysisOutcome::Parsed(record) => {
                assert_eq!(record.profile_summary, "Experienced software engineer.");
                assert_eq!(record.key_skills, vec!["Rust", "SQL"]);
                assert!(record.error.is_none());
            }
            other => panic!("expected Parsed, got {:?}", other),
        }
    }

    #[test]
    fn parses_json_inside_tagged_fence() {
        let wrapped = format!("Here is the analysis:\n```json\n{}\n```\nHope that helps!", WELL_FORMED);
        assert!(matches!(parse_analysis(&wrapped), AnalysisOutcome::Parsed(_)));
    }

    #[test]
    fn parses_json_inside_plain_fence() {
        let wrapped = format!("```\n{}\n```", WELL_FORMED);
        assert!(matches!(parse_analysis(&wrapped), AnalysisOutcome::Parsed(_)));
    }

    #[test]
    fn garbage_yields_fallback() {
        assert_is_fallback(parse_analysis("Sorry, I can't help with that."));
    }

    #[test]
    fn empty_input_yields_fallback() {
        assert_is_fallback(parse_analysis(""));
    }

    #[test]
    fn missing_field_yields_fallback() {
        // profileSummary is present but every array field is absent.
        assert_is_fallback(parse_analysis(r#"{"profileSummary": "ok"}"#));
    }

    #[test]
    fn wrong_field_type_yields_fallback() {
        let wrong = WELL_FORMED.replace(
            r#""education": ["BSc Computer Science, MIT, 2019"]"#,
            r#""education": [{"degree": "BSc"}]"#,
        );
        assert_is_fallback(parse_analysis(&wrong));
    }

    #[test]
    fn unterminated_fence_still_parses() {
        let wrapped = format!("```json\n{}", WELL_FORMED);
        assert!(matches!(parse_analysis(&wrapped), AnalysisOutcome::Parsed(_)));
    }
}
