//! CV analysis pipeline: uploaded document → structured candidate profile.
//!
//! Flow: reserve token → fetch bytes → system instruction → one generation
//! call → extract → resolve candidate → persist → schedule summary.
//! Any failure marks the file `error` and leaves the candidate's previous
//! profile untouched.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::analysis::extract::extract_profile;
use crate::analysis::prompts::{
    default_cv_analysis_system, CV_ANALYSIS_PROMPT, CV_ANALYSIS_TEMPLATE_NAME,
};
use crate::analysis::queue::{SummaryQueue, SummaryTask};
use crate::analysis::token::AnalysisToken;
use crate::blob::ObjectStore;
use crate::config::AnalysisConfig;
use crate::errors::AppError;
use crate::llm_client::{DocumentPayload, GenerationRequest, TextGenerator};
use crate::models::file::FileStatus;
use crate::profile::types::CandidateProfile;
use crate::store::DocumentStore;

/// Everything the pipeline and the summary worker talk to.
#[derive(Clone)]
pub struct AnalysisDeps {
    pub store: Arc<dyn DocumentStore>,
    pub objects: Arc<dyn ObjectStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub queue: Arc<dyn SummaryQueue>,
    pub config: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub file_id: Uuid,
    pub analysis_id: AnalysisToken,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub file_id: Uuid,
    pub candidate_id: Uuid,
    pub analysis_id: AnalysisToken,
    pub ai_score: f64,
    pub candidate_profile: CandidateProfile,
    /// False when the summary task could not be queued; `cv_summary` then
    /// carries the error text instead of the placeholder.
    pub summary_scheduled: bool,
}

/// Runs one analysis. On failure the file is marked `error` and the error is
/// returned unchanged.
pub async fn analyze_cv(
    deps: &AnalysisDeps,
    request: AnalyzeRequest,
) -> Result<AnalysisOutcome, AppError> {
    let file_id = request.file_id;
    let file = deps
        .store
        .get_file(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {file_id} not found")))?;

    if file.file_status() == Some(FileStatus::Analyzing) {
        warn!("File {file_id} already has an analysis in progress; the last run to finish wins");
    }

    // A token bound to another file is rejected before the file is touched.
    deps.store
        .reserve_analysis(file_id, &request.analysis_id)
        .await?;

    match run_analysis(deps, &request, &file.storage_key, &file.content_type).await {
        Ok(outcome) => Ok(outcome),
        Err(e) => {
            warn!("CV analysis failed for file {file_id}: {e}");
            if let Err(status_err) = deps.store.set_file_status(file_id, FileStatus::Error).await {
                error!("Failed to mark file {file_id} as errored: {status_err}");
            }
            Err(e)
        }
    }
}

async fn run_analysis(
    deps: &AnalysisDeps,
    request: &AnalyzeRequest,
    storage_key: &str,
    content_type: &str,
) -> Result<AnalysisOutcome, AppError> {
    let file_id = request.file_id;
    deps.store
        .set_file_status(file_id, FileStatus::Analyzing)
        .await?;

    let bytes = deps
        .objects
        .fetch(storage_key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Stored CV for file {file_id} not found")))?;

    let document = DocumentPayload {
        media_type: content_type.to_string(),
        base64_data: STANDARD.encode(&bytes),
    };

    let system = load_system_instruction(deps.store.as_ref()).await?;

    info!(
        "Analyzing CV for file {file_id} ({} bytes, analysis {})",
        bytes.len(),
        request.analysis_id
    );

    let reply = deps
        .generator
        .generate(GenerationRequest {
            system: &system,
            prompt: CV_ANALYSIS_PROMPT,
            document: Some(&document),
            max_tokens: deps.config.max_tokens,
        })
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let profile = extract_profile(&reply)?;

    let candidate_id = deps
        .store
        .resolve_analysis(&request.analysis_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No candidate is linked to analysis {}",
                request.analysis_id
            ))
        })?;

    let profile_value = serde_json::to_value(&profile)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    let ai_score = profile.cv.score.unwrap_or(0.0).clamp(0.0, 100.0);

    // Profile, score, file link and file status land together or not at all.
    deps.store
        .persist_analysis(candidate_id, &profile_value, ai_score, file_id)
        .await?;

    let summary_scheduled = schedule_summary(deps, file_id, candidate_id).await;

    info!("CV analysis complete for file {file_id}: candidate {candidate_id}, score {ai_score}");

    Ok(AnalysisOutcome {
        file_id,
        candidate_id,
        analysis_id: request.analysis_id.clone(),
        ai_score,
        candidate_profile: profile,
        summary_scheduled,
    })
}

/// Stored `cv_analysis` template, or the built-in instruction when the
/// template is missing or blank.
async fn load_system_instruction(store: &dyn DocumentStore) -> Result<String, AppError> {
    let stored = store.get_prompt_template(CV_ANALYSIS_TEMPLATE_NAME).await?;
    Ok(stored
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(default_cv_analysis_system))
}

/// Queues the summary behind the placeholder written at persist time.
/// Never fails the caller.
async fn schedule_summary(deps: &AnalysisDeps, file_id: Uuid, candidate_id: Uuid) -> bool {
    let task = SummaryTask {
        file_id,
        candidate_id,
    };
    match deps.queue.enqueue(task).await {
        Ok(()) => true,
        Err(e) => {
            error!("Failed to schedule summary for file {file_id}: {e}");
            let message = format!("Error generating summary: {e}");
            if let Err(write_err) = deps.store.set_cv_summary(file_id, &message).await {
                error!("Failed to record summary error for file {file_id}: {write_err}");
            }
            false
        }
    }
}
