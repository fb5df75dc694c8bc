//! Read-side projections of candidate profiles: dashboard aggregation,
//! assistant context text and table rows.
//!
//! Inputs are expected to have passed through `profile::normalize`.

pub mod chat_context;
pub mod dashboard;
pub mod table;

use crate::models::candidate::CandidateRow;
use crate::profile::types::CandidateProfile;

/// Typed view of a candidate's stored profile. `None` when the candidate has
/// no profile or it does not deserialize.
pub fn typed_profile(candidate: &CandidateRow) -> Option<CandidateProfile> {
    candidate
        .candidate_profile
        .as_ref()
        .and_then(|p| serde_json::from_value(p.clone()).ok())
}

/// The score consumers rank and display: `cv.score` when a profile exists,
/// otherwise the top-level `ai_score`.
pub fn candidate_score(candidate: &CandidateRow) -> Option<f64> {
    candidate
        .candidate_profile
        .as_ref()
        .and_then(|p| p.get("cv"))
        .and_then(|cv| cv.get("score"))
        .and_then(serde_json::Value::as_f64)
        .or(candidate.ai_score)
        .filter(|s| s.is_finite())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use serde_json::Value;
    use uuid::Uuid;

    use crate::models::candidate::{color_for, initials_for, CandidateRow};
    use crate::profile::normalize::normalize_candidate;

    pub(crate) fn candidate(name: &str, ai_score: Option<f64>, profile: Option<Value>) -> CandidateRow {
        let now = Utc::now();
        let row = CandidateRow {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            initials: initials_for(name),
            color: color_for(name),
            user_id: None,
            cv_file_id: None,
            position: Some("Backend Engineer".to_string()),
            ai_score,
            status: Some("new".to_string()),
            profile: None,
            candidate_profile: profile,
            created_at: now,
            updated_at: now,
        };
        normalize_candidate(Some(&row)).unwrap_or(row)
    }
}
