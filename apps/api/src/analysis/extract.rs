//! Extraction of the candidate profile from a free-text model reply.
//!
//! Contract: the payload is the span from the FIRST `{` to the LAST `}` of the
//! reply. That span must parse as a JSON object with a top-level
//! `candidateProfile` object. Text before and after the span is ignored.
//!
//! Known limitation: brace-delimited text in the preamble shifts the start of
//! the span and makes the extraction fail with a parse error rather than
//! finding the real payload. The analysis prompt tells the model not to emit
//! braces before the object.

use serde_json::Value;

use crate::errors::AppError;
use crate::profile::types::CandidateProfile;

pub const PROFILE_KEY: &str = "candidateProfile";

/// Returns the greedy `{ ... }` span of `reply`, if any.
pub fn json_span(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

pub fn extract_profile(reply: &str) -> Result<CandidateProfile, AppError> {
    let span = json_span(reply)
        .ok_or_else(|| AppError::Parse("Model reply contains no JSON object".to_string()))?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| AppError::Parse(format!("Model reply is not valid JSON: {e}")))?;

    let profile = value
        .get(PROFILE_KEY)
        .filter(|p| p.is_object())
        .ok_or_else(|| {
            AppError::Parse(format!(
                "Model reply has no top-level '{PROFILE_KEY}' object"
            ))
        })?;

    serde_json::from_value(profile.clone())
        .map_err(|e| AppError::Parse(format!("Malformed '{PROFILE_KEY}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::Recommendation;

    const VALID: &str = r#"{"candidateProfile": {
        "personal": {"location": "Berlin"},
        "career": {"currentRole": "SRE", "yearsExperience": "6 years"},
        "interview": {},
        "skills": {"technical": {"overallScore": 88, "skills": [{"name": "Go", "score": 90}]},
                   "soft": {"overallScore": 75, "skills": []},
                   "culture": {"overallScore": 80, "skills": []}},
        "cv": {"highlights": ["On-call lead"], "keyInsights": ["Strong ops"], "score": 84},
        "skillInsights": {"matchedSkills": ["Go"], "missingSkills": ["Rust"],
                          "skillGaps": [{"name": "Rust", "percentage": 40}],
                          "learningPaths": [{"title": "Rust book", "provider": "rust-lang"}]},
        "recommendation": "Recommend"
    }}"#;

    #[test]
    fn test_extracts_with_preamble_and_trailing_text() {
        let reply = format!("Here is my analysis:\n{VALID}\nLet me know if you need more.");
        let profile = extract_profile(&reply).unwrap();
        assert_eq!(profile.personal.location, "Berlin");
        assert_eq!(profile.cv.score, Some(84.0));
        assert_eq!(profile.skills.technical.skills[0].name, "Go");
        assert_eq!(profile.recommendation, Recommendation::Recommend);
    }

    #[test]
    fn test_extracts_from_code_fence() {
        let reply = format!("```json\n{VALID}\n```");
        assert!(extract_profile(&reply).is_ok());
    }

    #[test]
    fn test_no_brace_is_parse_error() {
        let err = extract_profile("I could not read the document.").unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_missing_profile_key_is_parse_error() {
        let err = extract_profile(r#"{"profile": {}}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_profile_key_must_be_object() {
        let err = extract_profile(r#"{"candidateProfile": "n/a"}"#).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_braces_in_preamble_break_extraction() {
        let reply = format!("Using template {{name}} for the output: {VALID}");
        let err = extract_profile(&reply).unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn test_reversed_braces_have_no_span() {
        assert_eq!(json_span("} nothing {"), None);
    }

    #[test]
    fn test_partial_sections_are_defaulted() {
        let profile = extract_profile(r#"{"candidateProfile": {"cv": {"score": 61}}}"#).unwrap();
        assert_eq!(profile.cv.score, Some(61.0));
        assert!(profile.skill_insights.matched_skills.is_empty());
        assert_eq!(profile.recommendation, Recommendation::Consider);
    }
}
