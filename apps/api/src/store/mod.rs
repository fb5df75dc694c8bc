//! Document store — candidate, file, dependent-record and prompt-template persistence.
//!
//! `AppState` holds an `Arc<dyn DocumentStore>`. Production uses
//! [`postgres::PgDocumentStore`]; tests use the in-memory store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::token::AnalysisToken;
use crate::errors::AppError;
use crate::models::candidate::{
    ApplicationRow, CandidateRow, CascadeReport, InterviewRequestRow, NewCandidate,
};
use crate::models::file::{CvFileRow, FileStatus, NewCvFile};

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// Read-modify-write step applied to a candidate's profile inside one transaction.
/// Receives the current profile (if any) and returns the profile to store.
pub type ProfileUpdate<'a> =
    &'a (dyn Fn(Option<&Value>) -> Result<Value, AppError> + Send + Sync);

#[async_trait]
pub trait DocumentStore: Send + Sync {
    // ── candidates ─────────────────────────────────────────────────────────

    async fn insert_candidate(
        &self,
        candidate: &NewCandidate,
        candidate_profile: Option<&Value>,
    ) -> Result<CandidateRow, AppError>;

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError>;

    async fn list_candidates(&self) -> Result<Vec<CandidateRow>, AppError>;

    /// Deletes the candidate and every application / interview request that
    /// references it, in one transaction. `NotFound` if the id does not exist.
    async fn delete_candidate(&self, id: Uuid) -> Result<CascadeReport, AppError>;

    /// Transactional read-modify-write of `candidate_profile`.
    /// `NotFound` (nothing written) if the id does not exist.
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate<'_>)
        -> Result<Value, AppError>;

    /// Commits a finished analysis in one transaction: replaces
    /// `candidate_profile`, stamps `ai_score` and `cv_file_id` on the
    /// candidate, and marks the file `analyzed` with the summary placeholder.
    /// On any error nothing is written.
    async fn persist_analysis(
        &self,
        candidate_id: Uuid,
        candidate_profile: &Value,
        ai_score: f64,
        file_id: Uuid,
    ) -> Result<(), AppError>;

    // ── dependents ─────────────────────────────────────────────────────────

    async fn insert_application(
        &self,
        candidate_id: Uuid,
        job_title: &str,
    ) -> Result<ApplicationRow, AppError>;

    async fn insert_interview_request(
        &self,
        candidate_id: Uuid,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> Result<InterviewRequestRow, AppError>;

    async fn list_applications(&self, candidate_id: Uuid) -> Result<Vec<ApplicationRow>, AppError>;

    async fn list_interview_requests(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<InterviewRequestRow>, AppError>;

    // ── files ──────────────────────────────────────────────────────────────

    async fn insert_file(&self, file: &NewCvFile) -> Result<CvFileRow, AppError>;

    async fn get_file(&self, id: Uuid) -> Result<Option<CvFileRow>, AppError>;

    /// Associates an uploaded file with its owning candidate. May happen after
    /// the analysis for that file has already been started.
    async fn link_file(&self, file_id: Uuid, candidate_id: Uuid) -> Result<(), AppError>;

    /// Binds `token` to `file_id`. A token may only ever be bound to one file;
    /// binding it to a different file is a validation error.
    async fn reserve_analysis(&self, file_id: Uuid, token: &AnalysisToken) -> Result<(), AppError>;

    /// Resolves a token to the candidate that owns the file it is bound to.
    /// `None` while the file is not yet linked to an existing candidate.
    async fn resolve_analysis(&self, token: &AnalysisToken) -> Result<Option<Uuid>, AppError>;

    async fn set_file_status(&self, file_id: Uuid, status: FileStatus) -> Result<(), AppError>;

    async fn set_cv_summary(&self, file_id: Uuid, summary: &str) -> Result<(), AppError>;

    // ── prompt templates ───────────────────────────────────────────────────

    async fn get_prompt_template(&self, name: &str) -> Result<Option<String>, AppError>;
}
