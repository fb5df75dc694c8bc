//! Narrative summary generation, run by the background worker.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::analysis::pipeline::AnalysisDeps;
use crate::analysis::prompts::{build_summary_prompt, SUMMARY_SYSTEM};
use crate::analysis::queue::{ClaimedTask, RedisSummaryQueue, SummaryTask, TaskLedger};
use crate::errors::AppError;
use crate::llm_client::GenerationRequest;
use crate::profile::normalize::normalize_candidate;
use crate::profile::types::CandidateProfile;

const WORKER_BACKOFF: Duration = Duration::from_secs(2);

/// Generates and stores the summary for one task.
///
/// Always overwrites the placeholder: with the summary text on success,
/// with "Error generating summary: ..." on any failure.
pub async fn process_summary_task(deps: &AnalysisDeps, task: &SummaryTask) -> Result<(), AppError> {
    let summary = match generate_summary(deps, task).await {
        Ok(text) => {
            info!("Generated summary for file {}", task.file_id);
            text
        }
        Err(e) => {
            warn!("Summary generation failed for file {}: {e}", task.file_id);
            format!("Error generating summary: {e}")
        }
    };

    deps.store.set_cv_summary(task.file_id, &summary).await
}

async fn generate_summary(deps: &AnalysisDeps, task: &SummaryTask) -> Result<String, AppError> {
    let candidate = deps
        .store
        .get_candidate(task.candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", task.candidate_id)))?;

    let profile_value = normalize_candidate(Some(&candidate))
        .and_then(|c| c.candidate_profile)
        .ok_or_else(|| {
            AppError::NotFound(format!("Candidate {} has no profile", task.candidate_id))
        })?;

    let profile: CandidateProfile = serde_json::from_value(profile_value)
        .map_err(|e| AppError::Validation(format!("Stored profile is malformed: {e}")))?;

    let prompt = build_summary_prompt(&profile);
    let text = deps
        .generator
        .generate(GenerationRequest {
            system: SUMMARY_SYSTEM,
            prompt: &prompt,
            document: None,
            max_tokens: deps.config.summary_max_tokens,
        })
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Upstream("Summary reply was empty".to_string()));
    }
    Ok(text.to_string())
}

/// What happened to a claimed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Result stored; task acknowledged.
    Completed,
    /// Task can never succeed (malformed payload, file gone); acknowledged.
    Dropped,
    /// Result could not be stored; task is back on the queue.
    Retry,
}

/// Runs a claimed task and settles it on `ledger`. Only a stored result or a
/// task that can never be stored is acknowledged.
pub async fn settle_task(
    ledger: &dyn TaskLedger,
    deps: &AnalysisDeps,
    claimed: &ClaimedTask,
) -> Result<Settlement, AppError> {
    let task = match &claimed.task {
        Ok(task) => task,
        Err(e) => {
            error!("Dropping malformed summary task '{}': {e}", claimed.raw);
            ledger.ack(claimed).await?;
            return Ok(Settlement::Dropped);
        }
    };

    match process_summary_task(deps, task).await {
        Ok(()) => {
            ledger.ack(claimed).await?;
            Ok(Settlement::Completed)
        }
        Err(AppError::NotFound(msg)) => {
            warn!("Dropping summary task for file {}: {msg}", task.file_id);
            ledger.ack(claimed).await?;
            Ok(Settlement::Dropped)
        }
        Err(e) => {
            error!("Failed to store summary for file {}, requeueing: {e}", task.file_id);
            ledger.requeue(claimed).await?;
            Ok(Settlement::Retry)
        }
    }
}

/// Consumes summary tasks until the process exits.
pub async fn run_summary_worker(queue: RedisSummaryQueue, deps: AnalysisDeps) {
    if let Err(e) = queue.requeue_in_flight().await {
        warn!("Could not requeue in-flight summary tasks: {e}");
    }

    info!("Summary worker listening on '{}'", queue.key());

    loop {
        let mut conn = match queue.worker_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                error!("Summary worker cannot reach Redis: {e}");
                tokio::time::sleep(WORKER_BACKOFF).await;
                continue;
            }
        };
        let ledger = queue.ledger(conn.clone());

        loop {
            let claimed = match queue.claim(&mut conn).await {
                Ok(Some(claimed)) => claimed,
                Ok(None) => continue,
                Err(e) => {
                    error!("Summary worker failed to claim a task: {e}");
                    tokio::time::sleep(WORKER_BACKOFF).await;
                    break;
                }
            };

            // An unsettled task stays on the processing list until the next startup.
            match settle_task(&ledger, &deps, &claimed).await {
                Ok(Settlement::Retry) => tokio::time::sleep(WORKER_BACKOFF).await,
                Ok(_) => {}
                Err(e) => {
                    error!("Failed to settle summary task: {e}");
                    tokio::time::sleep(WORKER_BACKOFF).await;
                    break;
                }
            }
        }
    }
}
