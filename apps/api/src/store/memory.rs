//! In-memory document store for tests. A single mutex stands in for the
//! database's per-record transactions.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::analysis::token::AnalysisToken;
use crate::errors::AppError;
use crate::models::candidate::{
    color_for, initials_for, ApplicationRow, CandidateRow, CascadeReport, InterviewRequestRow,
    NewCandidate,
};
use crate::models::file::{CvFileRow, FileStatus, NewCvFile, SUMMARY_PLACEHOLDER};
use crate::store::{DocumentStore, ProfileUpdate};

#[derive(Default)]
struct Tables {
    candidates: HashMap<Uuid, CandidateRow>,
    applications: Vec<ApplicationRow>,
    interview_requests: Vec<InterviewRequestRow>,
    files: HashMap<Uuid, CvFileRow>,
    prompt_templates: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    /// Operations that currently fail with a connection error.
    failing: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    /// Makes `operation` fail until [`MemoryStore::recover`] is called.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    fn check(&self, operation: &'static str) -> Result<(), AppError> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(AppError::Internal(anyhow::anyhow!("connection reset")));
        }
        Ok(())
    }

    pub fn with_prompt_template(self, name: &str, content: &str) -> Self {
        self.tables
            .lock()
            .unwrap()
            .prompt_templates
            .insert(name.to_string(), content.to_string());
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_candidate(
        &self,
        candidate: &NewCandidate,
        candidate_profile: Option<&Value>,
    ) -> Result<CandidateRow, AppError> {
        let now = Utc::now();
        let row = CandidateRow {
            id: Uuid::new_v4(),
            name: candidate.name.clone(),
            email: candidate.email.clone(),
            initials: initials_for(&candidate.name),
            color: color_for(&candidate.name),
            user_id: candidate.user_id,
            cv_file_id: candidate.cv_file_id,
            position: candidate.position.clone(),
            ai_score: candidate.ai_score,
            status: candidate.status.clone(),
            profile: candidate.profile.clone(),
            candidate_profile: candidate_profile.cloned(),
            created_at: now,
            updated_at: now,
        };
        self.tables
            .lock()
            .unwrap()
            .candidates
            .insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(self.tables.lock().unwrap().candidates.get(&id).cloned())
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateRow>, AppError> {
        let mut rows: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .candidates
            .values()
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<CascadeReport, AppError> {
        let mut tables = self.tables.lock().unwrap();
        if tables.candidates.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Candidate {id} not found")));
        }
        let apps_before = tables.applications.len();
        tables.applications.retain(|a| a.candidate_id != id);
        let interviews_before = tables.interview_requests.len();
        tables.interview_requests.retain(|r| r.candidate_id != id);
        Ok(CascadeReport {
            applications: (apps_before - tables.applications.len()) as u64,
            interview_requests: (interviews_before - tables.interview_requests.len()) as u64,
        })
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate<'_>,
    ) -> Result<Value, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let candidate = tables
            .candidates
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
        let updated = update(candidate.candidate_profile.as_ref())?;
        candidate.candidate_profile = Some(updated.clone());
        candidate.updated_at = Utc::now();
        Ok(updated)
    }

    async fn persist_analysis(
        &self,
        candidate_id: Uuid,
        candidate_profile: &Value,
        ai_score: f64,
        file_id: Uuid,
    ) -> Result<(), AppError> {
        self.check("persist_analysis")?;
        let mut tables = self.tables.lock().unwrap();
        if !tables.files.contains_key(&file_id) {
            return Err(AppError::NotFound(format!("File {file_id} not found")));
        }
        let candidate = tables
            .candidates
            .get_mut(&candidate_id)
            .ok_or_else(|| AppError::NotFound(format!("Candidate {candidate_id} not found")))?;
        candidate.candidate_profile = Some(candidate_profile.clone());
        candidate.ai_score = Some(ai_score);
        candidate.cv_file_id = Some(file_id);
        candidate.updated_at = Utc::now();

        if let Some(file) = tables.files.get_mut(&file_id) {
            file.status = Some(FileStatus::Analyzed.as_str().to_string());
            file.cv_summary = Some(SUMMARY_PLACEHOLDER.to_string());
            file.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_application(
        &self,
        candidate_id: Uuid,
        job_title: &str,
    ) -> Result<ApplicationRow, AppError> {
        let row = ApplicationRow {
            id: Uuid::new_v4(),
            candidate_id,
            job_title: job_title.to_string(),
            status: "submitted".to_string(),
            created_at: Utc::now(),
        };
        self.tables.lock().unwrap().applications.push(row.clone());
        Ok(row)
    }

    async fn insert_interview_request(
        &self,
        candidate_id: Uuid,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> Result<InterviewRequestRow, AppError> {
        let row = InterviewRequestRow {
            id: Uuid::new_v4(),
            candidate_id,
            scheduled_for,
            status: "pending".to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .lock()
            .unwrap()
            .interview_requests
            .push(row.clone());
        Ok(row)
    }

    async fn list_applications(&self, candidate_id: Uuid) -> Result<Vec<ApplicationRow>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .applications
            .iter()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn list_interview_requests(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<InterviewRequestRow>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .interview_requests
            .iter()
            .filter(|r| r.candidate_id == candidate_id)
            .cloned()
            .collect())
    }

    async fn insert_file(&self, file: &NewCvFile) -> Result<CvFileRow, AppError> {
        let now = Utc::now();
        let row = CvFileRow {
            id: Uuid::new_v4(),
            storage_key: file.storage_key.clone(),
            filename: file.filename.clone(),
            content_type: file.content_type.clone(),
            candidate_id: file.candidate_id,
            analysis_id: None,
            status: None,
            cv_summary: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().files.insert(row.id, row.clone());
        Ok(row)
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<CvFileRow>, AppError> {
        Ok(self.tables.lock().unwrap().files.get(&id).cloned())
    }

    async fn link_file(&self, file_id: Uuid, candidate_id: Uuid) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        let file = tables
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;
        file.candidate_id = Some(candidate_id);
        Ok(())
    }

    async fn reserve_analysis(&self, file_id: Uuid, token: &AnalysisToken) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        let taken = tables
            .files
            .values()
            .any(|f| f.id != file_id && f.analysis_id.as_deref() == Some(token.as_str()));
        if taken {
            return Err(AppError::Validation(format!(
                "Analysis id '{token}' is already bound to another file"
            )));
        }
        let file = tables
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;
        file.analysis_id = Some(token.as_str().to_string());
        Ok(())
    }

    async fn resolve_analysis(&self, token: &AnalysisToken) -> Result<Option<Uuid>, AppError> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .files
            .values()
            .find(|f| f.analysis_id.as_deref() == Some(token.as_str()))
            .and_then(|f| f.candidate_id)
            .filter(|id| tables.candidates.contains_key(id)))
    }

    async fn set_file_status(&self, file_id: Uuid, status: FileStatus) -> Result<(), AppError> {
        let mut tables = self.tables.lock().unwrap();
        let file = tables
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;
        file.status = Some(status.as_str().to_string());
        Ok(())
    }

    async fn set_cv_summary(&self, file_id: Uuid, summary: &str) -> Result<(), AppError> {
        self.check("set_cv_summary")?;
        let mut tables = self.tables.lock().unwrap();
        let file = tables
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;
        file.cv_summary = Some(summary.to_string());
        Ok(())
    }

    async fn get_prompt_template(&self, name: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .prompt_templates
            .get(name)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_cascades_to_dependents() {
        let store = MemoryStore::default();
        let keep = store
            .insert_candidate(
                &NewCandidate {
                    name: "Keep".to_string(),
                    ..NewCandidate::default()
                },
                None,
            )
            .await
            .unwrap();
        let gone = store
            .insert_candidate(
                &NewCandidate {
                    name: "Gone".to_string(),
                    ..NewCandidate::default()
                },
                None,
            )
            .await
            .unwrap();
        store.insert_application(gone.id, "Engineer").await.unwrap();
        store.insert_application(gone.id, "Analyst").await.unwrap();
        store.insert_interview_request(gone.id, None).await.unwrap();
        store.insert_application(keep.id, "Engineer").await.unwrap();

        let report = store.delete_candidate(gone.id).await.unwrap();
        assert_eq!(report.applications, 2);
        assert_eq!(report.interview_requests, 1);

        assert!(store.get_candidate(gone.id).await.unwrap().is_none());
        assert!(store.list_applications(gone.id).await.unwrap().is_empty());
        assert!(store.list_interview_requests(gone.id).await.unwrap().is_empty());
        assert_eq!(store.list_applications(keep.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persist_analysis_for_missing_file_writes_nothing() {
        let store = MemoryStore::default();
        let previous = serde_json::json!({"cv": {"score": 40}});
        let candidate = store
            .insert_candidate(
                &NewCandidate {
                    name: "Ana".to_string(),
                    ..NewCandidate::default()
                },
                Some(&previous),
            )
            .await
            .unwrap();

        let err = store
            .persist_analysis(
                candidate.id,
                &serde_json::json!({"cv": {"score": 90}}),
                90.0,
                Uuid::new_v4(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let stored = store.get_candidate(candidate.id).await.unwrap().unwrap();
        assert_eq!(stored.candidate_profile, Some(previous));
        assert_eq!(stored.ai_score, None);
        assert_eq!(stored.cv_file_id, None);
    }

    #[tokio::test]
    async fn test_delete_unknown_candidate_is_not_found() {
        let store = MemoryStore::default();
        let err = store.delete_candidate(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
