use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_MAX_ATTEMPTS;
use crate::profile::defaults::ProfileDefaults;

pub const DEFAULT_ANALYSIS_MAX_TOKENS: u32 = 4000;
pub const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_SUMMARY_QUEUE_KEY: &str = "recruiter:summary_tasks";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    /// Attempts per LLM call. 1 keeps analysis retry-free.
    pub llm_max_attempts: u32,
    pub port: u16,
    pub rust_log: String,
    pub analysis: AnalysisConfig,
    pub profile_defaults: ProfileDefaults,
}

/// Knobs for the CV analysis pipeline and its summary worker.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub max_tokens: u32,
    pub summary_max_tokens: u32,
    pub summary_queue_key: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_ANALYSIS_MAX_TOKENS,
            summary_max_tokens: DEFAULT_SUMMARY_MAX_TOKENS,
            summary_queue_key: DEFAULT_SUMMARY_QUEUE_KEY.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_max_attempts: optional_env("LLM_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?,
            port: optional_env("PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analysis: AnalysisConfig {
                max_tokens: optional_env("ANALYSIS_MAX_TOKENS", DEFAULT_ANALYSIS_MAX_TOKENS)?,
                summary_max_tokens: optional_env("SUMMARY_MAX_TOKENS", DEFAULT_SUMMARY_MAX_TOKENS)?,
                summary_queue_key: std::env::var("SUMMARY_QUEUE_KEY")
                    .unwrap_or_else(|_| DEFAULT_SUMMARY_QUEUE_KEY.to_string()),
            },
            profile_defaults: profile_defaults_from_env()?,
        })
    }
}

/// Weighting constants for synthesised profiles. Unset variables keep the
/// historical values.
fn profile_defaults_from_env() -> Result<ProfileDefaults> {
    let base = ProfileDefaults::default();
    Ok(ProfileDefaults {
        technical_weight: optional_env("PROFILE_WEIGHT_TECHNICAL", base.technical_weight)?,
        soft_weight: optional_env("PROFILE_WEIGHT_SOFT", base.soft_weight)?,
        culture_weight: optional_env("PROFILE_WEIGHT_CULTURE", base.culture_weight)?,
        strong_threshold: optional_env("PROFILE_THRESHOLD_STRONG", base.strong_threshold)?,
        recommend_threshold: optional_env("PROFILE_THRESHOLD_RECOMMEND", base.recommend_threshold)?,
        ..base
    })
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}
