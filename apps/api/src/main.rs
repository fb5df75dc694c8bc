mod analysis;
mod blob;
mod candidates;
mod config;
mod consumers;
mod db;
mod errors;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::analysis::queue::RedisSummaryQueue;
use crate::analysis::summary::run_summary_worker;
use crate::blob::S3ObjectStore;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Recruiter API v{}", env!("CARGO_PKG_VERSION"));

    // PostgreSQL (migrations run on connect)
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgDocumentStore::new(db));

    // Redis summary queue
    let redis = redis::Client::open(config.redis_url.clone())?;
    let summary_queue = RedisSummaryQueue::new(redis, config.analysis.summary_queue_key.clone());
    info!("Summary queue initialized ({})", summary_queue.key());

    // S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let objects = Arc::new(S3ObjectStore::new(s3, config.s3_bucket.clone()));
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())
        .with_max_attempts(config.llm_max_attempts);
    info!(
        "LLM client initialized (model: {}, attempts: {})",
        llm_client::MODEL,
        config.llm_max_attempts
    );

    let state = AppState {
        store,
        objects,
        generator: Arc::new(llm),
        summary_queue: Arc::new(summary_queue.clone()),
        analysis: config.analysis.clone(),
        profile_defaults: config.profile_defaults.clone(),
    };

    tokio::spawn(run_summary_worker(summary_queue, state.analysis_deps()));

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the recruiter UI domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "recruiter-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO requires path-style addressing.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
