use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::pipeline::{analyze_cv, AnalysisOutcome, AnalyzeRequest};
use crate::analysis::token::AnalysisToken;
use crate::blob::cv_storage_key;
use crate::errors::AppError;
use crate::models::file::{CvFileRow, NewCvFile};
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// POST /api/v1/files
///
/// Multipart form: `file` (required) and `candidateId` (optional).
pub async fn handle_upload_cv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CvFileRow>), AppError> {
    let mut upload: Option<(String, String, Bytes)> = None;
    let mut candidate_id: Option<Uuid> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| "cv.pdf".to_string());
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
                upload = Some((filename, content_type, data));
            }
            Some("candidateId") => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read candidateId: {e}")))?;
                let id = raw
                    .trim()
                    .parse::<Uuid>()
                    .map_err(|_| AppError::Validation(format!("Invalid candidateId '{raw}'")))?;
                candidate_id = Some(id);
            }
            _ => {}
        }
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    if let Some(id) = candidate_id {
        state
            .store
            .get_candidate(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    }

    let storage_key = cv_storage_key(Uuid::new_v4(), &filename);
    state
        .objects
        .put(&storage_key, data, &content_type)
        .await?;

    let file = state
        .store
        .insert_file(&NewCvFile {
            storage_key,
            filename,
            content_type,
            candidate_id,
        })
        .await?;

    info!("Stored CV upload {} ({})", file.id, file.filename);
    Ok((StatusCode::CREATED, Json(file)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    /// Caller-chosen correlation token; generated when omitted.
    pub analysis_id: Option<AnalysisToken>,
}

/// POST /api/v1/files/:id/analyze
pub async fn handle_analyze_cv(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<AnalysisOutcome>, AppError> {
    // An empty body is allowed and means "generate a token".
    let body: AnalyzeBody = if body.iter().all(u8::is_ascii_whitespace) {
        AnalyzeBody::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::Validation(format!("Invalid analyze request: {e}")))?
    };
    let request = AnalyzeRequest {
        file_id,
        analysis_id: body.analysis_id.unwrap_or_else(AnalysisToken::generate),
    };
    let outcome = analyze_cv(&state.analysis_deps(), request).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/files/:id
pub async fn handle_get_file(
    State(state): State<AppState>,
    Path(file_id): Path<Uuid>,
) -> Result<Json<CvFileRow>, AppError> {
    let file = state
        .store
        .get_file(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;
    Ok(Json(file))
}
