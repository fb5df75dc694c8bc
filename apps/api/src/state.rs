use std::sync::Arc;

use crate::analysis::pipeline::AnalysisDeps;
use crate::analysis::queue::SummaryQueue;
use crate::blob::ObjectStore;
use crate::config::AnalysisConfig;
use crate::llm_client::TextGenerator;
use crate::profile::defaults::ProfileDefaults;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    /// Uploaded CV documents (S3 / MinIO in production).
    pub objects: Arc<dyn ObjectStore>,
    /// Default: `LlmClient`. Tests swap in a scripted generator.
    pub generator: Arc<dyn TextGenerator>,
    pub summary_queue: Arc<dyn SummaryQueue>,
    pub analysis: AnalysisConfig,
    pub profile_defaults: ProfileDefaults,
}

impl AppState {
    /// The slice of state the analysis pipeline and summary worker need.
    pub fn analysis_deps(&self) -> AnalysisDeps {
        AnalysisDeps {
            store: self.store.clone(),
            objects: self.objects.clone(),
            generator: self.generator.clone(),
            queue: self.summary_queue.clone(),
            config: self.analysis.clone(),
        }
    }
}
