pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::analysis::handlers as files;
use crate::candidates::handlers as candidates;
use crate::state::AppState;

/// CV uploads are capped at 10 MiB.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidates
        .route(
            "/api/v1/candidates",
            get(candidates::handle_list_candidates).post(candidates::handle_create_candidate),
        )
        .route(
            "/api/v1/candidates/:id",
            get(candidates::handle_get_candidate).delete(candidates::handle_delete_candidate),
        )
        .route(
            "/api/v1/candidates/:id/profile",
            get(candidates::handle_get_profile),
        )
        .route(
            "/api/v1/candidates/:id/profile/:section",
            patch(candidates::handle_patch_profile_section),
        )
        .route(
            "/api/v1/candidates/:id/chat-context",
            get(candidates::handle_candidate_chat_context),
        )
        .route(
            "/api/v1/candidates/:id/applications",
            get(candidates::handle_list_applications).post(candidates::handle_create_application),
        )
        .route(
            "/api/v1/candidates/:id/interview-requests",
            get(candidates::handle_list_interview_requests)
                .post(candidates::handle_create_interview_request),
        )
        .route("/api/v1/chat-context", get(candidates::handle_roster_chat_context))
        .route("/api/v1/dashboard", get(candidates::handle_dashboard))
        // CV files and analysis
        .route(
            "/api/v1/files",
            post(files::handle_upload_cv).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/v1/files/:id", get(files::handle_get_file))
        .route("/api/v1/files/:id/analyze", post(files::handle_analyze_cv))
        .with_state(state)
}
