use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::consumers::chat_context::{render_candidate_context, render_roster_context};
use crate::consumers::dashboard::{build_dashboard, DashboardStats};
use crate::consumers::table::{project_rows, CandidateTableRow};
use crate::errors::AppError;
use crate::models::candidate::{
    ApplicationRow, CandidateRow, CascadeReport, InterviewRequestRow, NewCandidate,
};
use crate::profile::defaults::{build_default_profile, ProfileHints};
use crate::profile::normalize::{normalize_candidate, normalize_candidates};
use crate::profile::patch::{patch_profile_section, ProfileSection};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateRequest {
    #[serde(flatten)]
    pub candidate: NewCandidate,
    /// Seed the record with a synthesised profile instead of leaving it empty.
    #[serde(default)]
    pub with_default_profile: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub candidate_id: Uuid,
    /// True when no profile is stored and this one was derived from the
    /// candidate's scalar fields.
    pub synthesized: bool,
    pub candidate_profile: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContextResponse {
    pub candidate_id: Option<Uuid>,
    pub context: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub job_title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInterviewRequest {
    pub scheduled_for: Option<DateTime<Utc>>,
}

fn hints_for(candidate: &CandidateRow) -> ProfileHints {
    ProfileHints {
        position: candidate.position.clone(),
        ai_score: candidate.ai_score,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))
}

async fn load_candidate(state: &AppState, id: Uuid) -> Result<CandidateRow, AppError> {
    let candidate = state.store.get_candidate(id).await?;
    normalize_candidate(candidate.as_ref())
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

/// POST /api/v1/candidates
pub async fn handle_create_candidate(
    State(state): State<AppState>,
    Json(req): Json<CreateCandidateRequest>,
) -> Result<(StatusCode, Json<CandidateRow>), AppError> {
    let candidate = req.candidate;
    if candidate.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if !candidate.email.contains('@') {
        return Err(AppError::Validation(format!(
            "'{}' is not a valid email address",
            candidate.email
        )));
    }
    if let Some(file_id) = candidate.cv_file_id {
        state
            .store
            .get_file(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;
    }

    let seeded = if req.with_default_profile {
        let hints = ProfileHints {
            position: candidate.position.clone(),
            ai_score: candidate.ai_score,
        };
        Some(to_json(&build_default_profile(
            Some(&hints),
            &state.profile_defaults,
        ))?)
    } else {
        None
    };

    let row = state
        .store
        .insert_candidate(&candidate, seeded.as_ref())
        .await?;

    if let Some(file_id) = row.cv_file_id {
        state.store.link_file(file_id, row.id).await?;
    }

    info!("Created candidate {} ({})", row.id, row.name);
    let row = normalize_candidate(Some(&row)).unwrap_or(row);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateTableRow>>, AppError> {
    let candidates = normalize_candidates(state.store.list_candidates().await?);
    Ok(Json(project_rows(&candidates)))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    Ok(Json(load_candidate(&state, id).await?))
}

/// DELETE /api/v1/candidates/:id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CascadeReport>, AppError> {
    let report = state.store.delete_candidate(id).await?;
    info!(
        "Deleted candidate {id} with {} applications and {} interview requests",
        report.applications, report.interview_requests
    );
    Ok(Json(report))
}

/// GET /api/v1/candidates/:id/profile
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let candidate = load_candidate(&state, id).await?;
    let response = match candidate.candidate_profile {
        Some(profile) => ProfileResponse {
            candidate_id: id,
            synthesized: false,
            candidate_profile: profile,
        },
        None => {
            let hints = hints_for(&candidate);
            ProfileResponse {
                candidate_id: id,
                synthesized: true,
                candidate_profile: to_json(&build_default_profile(
                    Some(&hints),
                    &state.profile_defaults,
                ))?,
            }
        }
    };
    Ok(Json(response))
}

/// PATCH /api/v1/candidates/:id/profile/:section
pub async fn handle_patch_profile_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
    Json(value): Json<Value>,
) -> Result<Json<ProfileResponse>, AppError> {
    let section: ProfileSection = section.parse()?;
    let updated = patch_profile_section(state.store.as_ref(), id, section, value).await?;
    let candidate = load_candidate(&state, id).await?;
    Ok(Json(ProfileResponse {
        candidate_id: id,
        synthesized: false,
        candidate_profile: candidate.candidate_profile.unwrap_or(updated),
    }))
}

/// GET /api/v1/candidates/:id/chat-context
pub async fn handle_candidate_chat_context(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatContextResponse>, AppError> {
    let candidate = load_candidate(&state, id).await?;
    Ok(Json(ChatContextResponse {
        candidate_id: Some(id),
        context: render_candidate_context(&candidate),
    }))
}

/// GET /api/v1/chat-context
pub async fn handle_roster_chat_context(
    State(state): State<AppState>,
) -> Result<Json<ChatContextResponse>, AppError> {
    let candidates = normalize_candidates(state.store.list_candidates().await?);
    Ok(Json(ChatContextResponse {
        candidate_id: None,
        context: render_roster_context(&candidates),
    }))
}

/// POST /api/v1/candidates/:id/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationRow>), AppError> {
    if req.job_title.trim().is_empty() {
        return Err(AppError::Validation("jobTitle cannot be empty".to_string()));
    }
    load_candidate(&state, id).await?;
    let row = state
        .store
        .insert_application(id, req.job_title.trim())
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/candidates/:id/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationRow>>, AppError> {
    load_candidate(&state, id).await?;
    Ok(Json(state.store.list_applications(id).await?))
}

/// POST /api/v1/candidates/:id/interview-requests
pub async fn handle_create_interview_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewRequestRow>), AppError> {
    load_candidate(&state, id).await?;
    let row = state
        .store
        .insert_interview_request(id, req.scheduled_for)
        .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/candidates/:id/interview-requests
pub async fn handle_list_interview_requests(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InterviewRequestRow>>, AppError> {
    load_candidate(&state, id).await?;
    Ok(Json(state.store.list_interview_requests(id).await?))
}

/// GET /api/v1/dashboard
pub async fn handle_dashboard(
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let candidates = normalize_candidates(state.store.list_candidates().await?);
    Ok(Json(build_dashboard(&candidates)))
}
