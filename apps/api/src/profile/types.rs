//! Structured candidate profile — the six-section analysis stored on a candidate.
//!
//! Every field carries a serde default so that partial LLM output and rows
//! written by older versions deserialize into a structurally complete profile:
//! missing strings become "", missing lists become empty, missing scores 0.

use serde::{Deserialize, Deserializer, Serialize};

/// The full analysis. Replaced wholesale by the CV pipeline or one section at a
/// time by the section patcher; never deep-merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CandidateProfile {
    pub personal: PersonalSection,
    pub career: CareerSection,
    pub interview: InterviewSection,
    pub skills: SkillsSection,
    pub cv: CvSection,
    pub skill_insights: SkillInsightsSection,
    pub recommendation: Recommendation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalSection {
    pub location: String,
    pub nationality: String,
    pub languages: String,
    pub visa_status: String,
    pub availability: String,
    pub notice_period: String,
    pub salary_expectation: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareerSection {
    pub current_role: String,
    pub current_company: String,
    pub years_experience: String,
    pub education: String,
    pub role_history: String,
    pub progression: String,
    pub industries: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewSection {
    pub duration: String,
    pub eligibility: Vec<EligibilityCheck>,
    pub highlights: Vec<InterviewHighlight>,
    pub feedback: Vec<InterviewFeedback>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EligibilityCheck {
    pub label: String,
    pub passed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewHighlight {
    pub title: String,
    pub content: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterviewFeedback {
    pub statement: String,
    pub praise: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillsSection {
    pub technical: SkillCategory,
    pub soft: SkillCategory,
    pub culture: SkillCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillCategory {
    #[serde(deserialize_with = "lenient_score")]
    pub overall_score: u32,
    pub skills: Vec<SkillScore>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillScore {
    pub name: String,
    #[serde(deserialize_with = "lenient_score")]
    pub score: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvSection {
    pub highlights: Vec<String>,
    pub key_insights: Vec<String>,
    /// Canonical per-candidate AI score, 0–100.
    #[serde(deserialize_with = "lenient_optional_score")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillInsightsSection {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub skill_gaps: Vec<SkillGap>,
    pub learning_paths: Vec<LearningPath>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillGap {
    pub name: String,
    #[serde(deserialize_with = "lenient_score")]
    pub percentage: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LearningPath {
    pub title: String,
    pub provider: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strongly Recommend")]
    StronglyRecommend,
    #[serde(rename = "Recommend")]
    Recommend,
    #[default]
    #[serde(rename = "Consider")]
    Consider,
}

impl Recommendation {
    pub fn label(self) -> &'static str {
        match self {
            Recommendation::StronglyRecommend => "Strongly Recommend",
            Recommendation::Recommend => "Recommend",
            Recommendation::Consider => "Consider",
        }
    }
}

/// Number or numeric string, clamped to the 0–100 scoring range.
fn score_from_value(value: Option<serde_json::Value>) -> Option<f64> {
    let n = match value? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    n.is_finite().then(|| n.clamp(0.0, 100.0))
}

/// Whole-number score; floats are rounded and anything unreadable is 0.
fn lenient_score<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(score_from_value(value).map_or(0, |n| n.round() as u32))
}

fn lenient_optional_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(score_from_value(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_yields_complete_profile() {
        let profile: CandidateProfile = serde_json::from_value(json!({})).unwrap();
        assert_eq!(profile, CandidateProfile::default());
        assert_eq!(profile.recommendation, Recommendation::Consider);
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let value = serde_json::to_value(CandidateProfile::default()).unwrap();
        for key in [
            "personal",
            "career",
            "interview",
            "skills",
            "cv",
            "skillInsights",
            "recommendation",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert!(value["skills"]["technical"].get("overallScore").is_some());
        assert!(value["cv"].get("keyInsights").is_some());
        assert!(value["skillInsights"].get("matchedSkills").is_some());
    }

    #[test]
    fn test_float_scores_are_rounded() {
        let category: SkillCategory = serde_json::from_value(json!({
            "overallScore": 84.6,
            "skills": [{"name": "Rust", "score": null}]
        }))
        .unwrap();
        assert_eq!(category.overall_score, 85);
        assert_eq!(category.skills[0].score, 0);
    }

    #[test]
    fn test_skill_scores_accept_numeric_strings_and_clamp() {
        let category: SkillCategory = serde_json::from_value(json!({
            "overallScore": "85",
            "skills": [{"name": "Go", "score": 130}, {"name": "SQL", "score": -4}]
        }))
        .unwrap();
        assert_eq!(category.overall_score, 85);
        assert_eq!(category.skills[0].score, 100);
        assert_eq!(category.skills[1].score, 0);
    }

    #[test]
    fn test_cv_score_is_clamped() {
        let cv: CvSection = serde_json::from_value(json!({"score": 140})).unwrap();
        assert_eq!(cv.score, Some(100.0));
        let cv: CvSection = serde_json::from_value(json!({"score": "-5"})).unwrap();
        assert_eq!(cv.score, Some(0.0));
    }

    #[test]
    fn test_cv_score_accepts_numeric_string() {
        let cv: CvSection = serde_json::from_value(json!({"score": "77"})).unwrap();
        assert_eq!(cv.score, Some(77.0));
        let cv: CvSection = serde_json::from_value(json!({"score": "n/a"})).unwrap();
        assert_eq!(cv.score, None);
    }

    #[test]
    fn test_recommendation_labels() {
        let r: Recommendation = serde_json::from_value(json!("Strongly Recommend")).unwrap();
        assert_eq!(r, Recommendation::StronglyRecommend);
        assert!(serde_json::from_value::<Recommendation>(json!("Maybe")).is_err());
    }
}
