//! Section patcher — replaces exactly one named section of a candidate profile.
//!
//! The merge is shallow at section granularity: the supplied value replaces the
//! whole section, the other sections are carried over verbatim. Candidates that
//! have never been analyzed get the blank default profile first.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::defaults::{build_default_profile, ProfileDefaults};
use crate::profile::types::{
    CareerSection, CvSection, InterviewSection, PersonalSection, SkillInsightsSection,
    SkillsSection,
};
use crate::store::DocumentStore;

/// The six fixed section keys of a candidate profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSection {
    Personal,
    Career,
    Interview,
    Skills,
    Cv,
    SkillInsights,
}

impl ProfileSection {
    pub const ALL: [ProfileSection; 6] = [
        ProfileSection::Personal,
        ProfileSection::Career,
        ProfileSection::Interview,
        ProfileSection::Skills,
        ProfileSection::Cv,
        ProfileSection::SkillInsights,
    ];

    /// Wire name of the section inside `candidateProfile`.
    pub fn key(self) -> &'static str {
        match self {
            ProfileSection::Personal => "personal",
            ProfileSection::Career => "career",
            ProfileSection::Interview => "interview",
            ProfileSection::Skills => "skills",
            ProfileSection::Cv => "cv",
            ProfileSection::SkillInsights => "skillInsights",
        }
    }

    /// Checks that `value` reads as this section. The value itself is not rewritten.
    fn validate(self, value: &Value) -> Result<(), AppError> {
        match self {
            ProfileSection::Personal => check_shape::<PersonalSection>(self, value),
            ProfileSection::Career => check_shape::<CareerSection>(self, value),
            ProfileSection::Interview => check_shape::<InterviewSection>(self, value),
            ProfileSection::Skills => check_shape::<SkillsSection>(self, value),
            ProfileSection::Cv => check_shape::<CvSection>(self, value),
            ProfileSection::SkillInsights => check_shape::<SkillInsightsSection>(self, value),
        }
    }
}

impl fmt::Display for ProfileSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProfileSection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileSection::ALL
            .into_iter()
            .find(|section| section.key() == s)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unknown profile section '{s}'. Expected one of: personal, career, interview, skills, cv, skillInsights"
                ))
            })
    }
}

fn check_shape<T>(section: ProfileSection, value: &Value) -> Result<(), AppError>
where
    T: DeserializeOwned,
{
    if !value.is_object() {
        return Err(AppError::Validation(format!(
            "Section '{section}' must be a JSON object"
        )));
    }
    serde_json::from_value::<T>(value.clone())
        .map(|_| ())
        .map_err(|e| AppError::Validation(format!("Invalid '{section}' section: {e}")))
}

/// Pure merge: returns the profile with `section` replaced by `value`, stored
/// exactly as supplied.
///
/// `existing` that is absent (or not an object) is replaced by the blank default
/// profile. Sections other than `section` are copied from `existing` unchanged;
/// any that are missing from an older row are filled from the blank default.
pub fn apply_section_patch(
    existing: Option<&Value>,
    section: ProfileSection,
    value: Value,
) -> Result<Value, AppError> {
    section.validate(&value)?;

    let blank = serde_json::to_value(build_default_profile(None, &ProfileDefaults::default()))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize profile: {e}")))?;
    let Value::Object(blank) = blank else {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Default profile did not serialize to an object"
        )));
    };

    let mut merged: Map<String, Value> = match existing {
        Some(Value::Object(current)) => current.clone(),
        _ => blank.clone(),
    };
    for (key, default_value) in blank {
        merged.entry(key).or_insert(default_value);
    }
    merged.insert(section.key().to_string(), value);

    Ok(Value::Object(merged))
}

/// Replaces one section of a stored candidate's profile in a single transaction.
///
/// Fails with `NotFound` (record unchanged) when the candidate does not exist.
/// Concurrent patches of the same candidate are last-write-wins per section.
pub async fn patch_profile_section(
    store: &dyn DocumentStore,
    candidate_id: Uuid,
    section: ProfileSection,
    value: Value,
) -> Result<Value, AppError> {
    let updated = store
        .update_profile(candidate_id, &|existing| {
            apply_section_patch(existing, section, value.clone())
        })
        .await?;

    info!("Patched profile section '{section}' for candidate {candidate_id}");
    Ok(updated)
}
