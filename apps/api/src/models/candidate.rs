use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A candidate record as stored. `candidate_profile` is kept as raw JSON so that
/// rows written before a profile field existed still load; readers go through
/// `profile::normalize` before handing it out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub initials: String,
    pub color: String,
    pub user_id: Option<Uuid>,
    pub cv_file_id: Option<Uuid>,
    pub position: Option<String>,
    pub ai_score: Option<f64>,
    pub status: Option<String>,
    /// Legacy flat summary text predating the structured profile.
    pub profile: Option<String>,
    pub candidate_profile: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when a candidate is created on application submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCandidate {
    pub name: String,
    pub email: String,
    pub position: Option<String>,
    pub user_id: Option<Uuid>,
    pub cv_file_id: Option<Uuid>,
    pub ai_score: Option<f64>,
    pub status: Option<String>,
    pub profile: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_title: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRequestRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub scheduled_for: Option<DateTime<Utc>>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// What a cascading candidate delete removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub applications: u64,
    pub interview_requests: u64,
}

const AVATAR_COLORS: &[&str] = &[
    "#4F46E5", "#0EA5E9", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6",
];

/// Up to two uppercase initials from a display name ("ada lovelace" → "AL").
pub fn initials_for(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if initials.is_empty() {
        "?".to_string()
    } else {
        initials
    }
}

/// Stable avatar colour for a name.
pub fn color_for(name: &str) -> String {
    let sum: usize = name.bytes().map(usize::from).sum();
    AVATAR_COLORS[sum % AVATAR_COLORS.len()].to_string()
}
