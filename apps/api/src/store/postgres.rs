use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::token::AnalysisToken;
use crate::errors::AppError;
use crate::models::candidate::{
    color_for, initials_for, ApplicationRow, CandidateRow, CascadeReport, InterviewRequestRow,
    NewCandidate,
};
use crate::models::file::{
    CvFileRow, FileStatus, NewCvFile, PromptTemplateRow, SUMMARY_PLACEHOLDER,
};
use crate::store::{DocumentStore, ProfileUpdate};

/// PostgreSQL-backed document store.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn candidate_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Candidate {id} not found"))
}

fn file_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("File {id} not found"))
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert_candidate(
        &self,
        candidate: &NewCandidate,
        candidate_profile: Option<&Value>,
    ) -> Result<CandidateRow, AppError> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            INSERT INTO candidates
                (id, name, email, initials, color, user_id, cv_file_id, position,
                 ai_score, status, profile, candidate_profile)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&candidate.name)
        .bind(&candidate.email)
        .bind(initials_for(&candidate.name))
        .bind(color_for(&candidate.name))
        .bind(candidate.user_id)
        .bind(candidate.cv_file_id)
        .bind(&candidate.position)
        .bind(candidate.ai_score)
        .bind(&candidate.status)
        .bind(&candidate.profile)
        .bind(candidate_profile.cloned())
        .fetch_one(&self.pool)
        .await?;

        info!("Inserted candidate {}", row.id);
        Ok(row)
    }

    async fn get_candidate(&self, id: Uuid) -> Result<Option<CandidateRow>, AppError> {
        Ok(
            sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn list_candidates(&self) -> Result<Vec<CandidateRow>, AppError> {
        Ok(sqlx::query_as::<_, CandidateRow>(
            "SELECT * FROM candidates ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<CascadeReport, AppError> {
        let mut tx = self.pool.begin().await?;

        let applications = sqlx::query("DELETE FROM applications WHERE candidate_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let interview_requests =
            sqlx::query("DELETE FROM interview_requests WHERE candidate_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?
                .rows_affected();

        let deleted = sqlx::query("DELETE FROM candidates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Err(candidate_not_found(id));
        }

        tx.commit().await?;
        Ok(CascadeReport {
            applications,
            interview_requests,
        })
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate<'_>,
    ) -> Result<Value, AppError> {
        let mut tx = self.pool.begin().await?;

        // Row lock for the read-modify-write; released on commit/rollback.
        let current: Option<(Option<Value>,)> =
            sqlx::query_as("SELECT candidate_profile FROM candidates WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((current,)) = current else {
            tx.rollback().await?;
            return Err(candidate_not_found(id));
        };

        let updated = update(current.as_ref())?;

        sqlx::query(
            "UPDATE candidates SET candidate_profile = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(&updated)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn persist_analysis(
        &self,
        candidate_id: Uuid,
        candidate_profile: &Value,
        ai_score: f64,
        file_id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE candidates
            SET candidate_profile = $1, ai_score = $2, cv_file_id = $3, updated_at = NOW()
            WHERE id = $4
            "#,
        )
        .bind(candidate_profile)
        .bind(ai_score)
        .bind(file_id)
        .bind(candidate_id)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Err(candidate_not_found(candidate_id));
        }

        let marked = sqlx::query(
            "UPDATE cv_files SET status = $1, cv_summary = $2, updated_at = NOW() WHERE id = $3",
        )
        .bind(FileStatus::Analyzed.as_str())
        .bind(SUMMARY_PLACEHOLDER)
        .bind(file_id)
        .execute(&mut *tx)
        .await?;
        if marked.rows_affected() == 0 {
            return Err(file_not_found(file_id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn insert_application(
        &self,
        candidate_id: Uuid,
        job_title: &str,
    ) -> Result<ApplicationRow, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            r#"
            INSERT INTO applications (id, candidate_id, job_title)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(job_title)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn insert_interview_request(
        &self,
        candidate_id: Uuid,
        scheduled_for: Option<DateTime<Utc>>,
    ) -> Result<InterviewRequestRow, AppError> {
        Ok(sqlx::query_as::<_, InterviewRequestRow>(
            r#"
            INSERT INTO interview_requests (id, candidate_id, scheduled_for)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(candidate_id)
        .bind(scheduled_for)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn list_applications(&self, candidate_id: Uuid) -> Result<Vec<ApplicationRow>, AppError> {
        Ok(sqlx::query_as::<_, ApplicationRow>(
            "SELECT * FROM applications WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_interview_requests(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<InterviewRequestRow>, AppError> {
        Ok(sqlx::query_as::<_, InterviewRequestRow>(
            "SELECT * FROM interview_requests WHERE candidate_id = $1 ORDER BY created_at",
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn insert_file(&self, file: &NewCvFile) -> Result<CvFileRow, AppError> {
        Ok(sqlx::query_as::<_, CvFileRow>(
            r#"
            INSERT INTO cv_files (id, storage_key, filename, content_type, candidate_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&file.storage_key)
        .bind(&file.filename)
        .bind(&file.content_type)
        .bind(file.candidate_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn get_file(&self, id: Uuid) -> Result<Option<CvFileRow>, AppError> {
        Ok(
            sqlx::query_as::<_, CvFileRow>("SELECT * FROM cv_files WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn link_file(&self, file_id: Uuid, candidate_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE cv_files SET candidate_id = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(candidate_id)
        .bind(file_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(file_not_found(file_id));
        }
        Ok(())
    }

    async fn reserve_analysis(&self, file_id: Uuid, token: &AnalysisToken) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE cv_files SET analysis_id = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(token.as_str())
        .bind(file_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(file_not_found(file_id)),
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::Validation(format!(
                    "Analysis id '{token}' is already bound to another file"
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn resolve_analysis(&self, token: &AnalysisToken) -> Result<Option<Uuid>, AppError> {
        Ok(sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT c.id
            FROM cv_files f
            JOIN candidates c ON c.id = f.candidate_id
            WHERE f.analysis_id = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_file_status(&self, file_id: Uuid, status: FileStatus) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE cv_files SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status.as_str())
                .bind(file_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(file_not_found(file_id));
        }
        Ok(())
    }

    async fn set_cv_summary(&self, file_id: Uuid, summary: &str) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE cv_files SET cv_summary = $1, updated_at = NOW() WHERE id = $2")
                .bind(summary)
                .bind(file_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(file_not_found(file_id));
        }
        Ok(())
    }

    async fn get_prompt_template(&self, name: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query_as::<_, PromptTemplateRow>(
            "SELECT name, content FROM prompt_templates WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| r.content))
    }
}
