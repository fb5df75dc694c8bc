//! Correlation token for CV analysis runs.
//!
//! The candidate that will own an analysis may not be linked to the uploaded
//! file when the run starts. The run therefore works in two phases:
//! `reserve_analysis` binds the token to exactly one file, and
//! `resolve_analysis` later turns the token into the owning candidate id via
//! that file. The store enforces that a token is bound to at most one file,
//! so at most one candidate ever resolves a given token.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

const MAX_TOKEN_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnalysisToken(String);

impl AnalysisToken {
    /// Validates a caller-chosen token: non-empty after trimming, at most 128
    /// characters, no whitespace or control characters inside.
    pub fn new(raw: impl Into<String>) -> Result<Self, AppError> {
        let raw = raw.into();
        let token = raw.trim();
        if token.is_empty() {
            return Err(AppError::Validation("analysisId cannot be empty".to_string()));
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(AppError::Validation(format!(
                "analysisId must be at most {MAX_TOKEN_LEN} characters"
            )));
        }
        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AppError::Validation(
                "analysisId cannot contain whitespace".to_string(),
            ));
        }
        Ok(Self(token.to_string()))
    }

    /// A fresh random token for server-initiated runs.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnalysisToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AnalysisToken {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AnalysisToken::new(value)
    }
}

impl From<AnalysisToken> for String {
    fn from(token: AnalysisToken) -> Self {
        token.0
    }
}
