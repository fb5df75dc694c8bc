//! Read-path normalization for candidate records.
//!
//! Rows written before `cv.score` existed (or with a non-numeric score) must
//! still serialize to callers as a well-formed profile. Every read path runs
//! candidates through here.

use serde_json::{Map, Number, Value};

use crate::models::candidate::CandidateRow;

/// Returns a normalized copy of `candidate`. Never mutates the input and never fails.
///
/// If a `candidate_profile` is present, its `cv` member is guaranteed to be an
/// object and `cv.score` a number, falling back to the top-level `ai_score` or 0.
pub fn normalize_candidate(candidate: Option<&CandidateRow>) -> Option<CandidateRow> {
    let candidate = candidate?;
    let mut normalized = candidate.clone();
    if let Some(profile) = normalized.candidate_profile.as_mut() {
        normalize_profile_value(profile, candidate.ai_score);
    }
    Some(normalized)
}

/// Normalizes every record of a multi-record read.
pub fn normalize_candidates(candidates: Vec<CandidateRow>) -> Vec<CandidateRow> {
    candidates
        .iter()
        .filter_map(|c| normalize_candidate(Some(c)))
        .collect()
}

fn normalize_profile_value(profile: &mut Value, ai_score: Option<f64>) {
    // A profile that is not even an object has nothing to attach `cv` to.
    let Some(sections) = profile.as_object_mut() else {
        return;
    };

    let cv = sections
        .entry("cv")
        .or_insert_with(|| Value::Object(Map::new()));
    if !cv.is_object() {
        *cv = Value::Object(Map::new());
    }

    if let Some(cv) = cv.as_object_mut() {
        let has_numeric_score = cv.get("score").is_some_and(Value::is_number);
        if !has_numeric_score {
            cv.insert("score".to_string(), fallback_score(ai_score));
        }
    }
}

fn fallback_score(ai_score: Option<f64>) -> Value {
    ai_score
        .filter(|s| s.is_finite())
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(0))
}
