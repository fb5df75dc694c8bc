use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Placeholder written to `cv_summary` while the narrative summary is pending.
pub const SUMMARY_PLACEHOLDER: &str = "Generating AI summary...";

/// Metadata for an uploaded CV document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CvFileRow {
    pub id: Uuid,
    pub storage_key: String,
    pub filename: String,
    pub content_type: String,
    pub candidate_id: Option<Uuid>,
    pub analysis_id: Option<String>,
    /// NULL while pending; otherwise one of [`FileStatus`].
    pub status: Option<String>,
    pub cv_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CvFileRow {
    pub fn file_status(&self) -> Option<FileStatus> {
        self.status.as_deref().and_then(FileStatus::parse)
    }
}

#[derive(Debug, Clone)]
pub struct NewCvFile {
    pub storage_key: String,
    pub filename: String,
    pub content_type: String,
    pub candidate_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Analyzing,
    Analyzed,
    Error,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Analyzing => "analyzing",
            FileStatus::Analyzed => "analyzed",
            FileStatus::Error => "error",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "analyzing" => Some(FileStatus::Analyzing),
            "analyzed" => Some(FileStatus::Analyzed),
            "error" => Some(FileStatus::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PromptTemplateRow {
    pub name: String,
    pub content: String,
}
