//! Default profile synthesis.
//!
//! One builder produces both variants:
//! - `build_default_profile(None, ..)` — the blank shape used when a section
//!   patch lands on a candidate that has never been analyzed.
//! - `build_default_profile(Some(hints), ..)` — a plausible placeholder derived
//!   from the candidate's scalar fields, so every candidate has a browsable
//!   profile before real analysis runs (and seed data looks realistic).

use serde::{Deserialize, Serialize};

use crate::profile::types::{
    CandidateProfile, CareerSection, CvSection, EligibilityCheck, InterviewFeedback,
    InterviewHighlight, InterviewSection, LearningPath, PersonalSection, Recommendation,
    SkillCategory, SkillGap, SkillInsightsSection, SkillScore, SkillsSection,
};

/// Weighting constants for synthesised profiles.
///
/// The defaults reproduce the historical values: technical 0.8, soft 0.9,
/// culture 0.85; fallbacks 75/80/78 when no score exists; "Strongly Recommend"
/// above 85, "Recommend" above 70.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDefaults {
    pub technical_weight: f64,
    pub soft_weight: f64,
    pub culture_weight: f64,
    pub fallback_technical: u32,
    pub fallback_soft: u32,
    pub fallback_culture: u32,
    pub strong_threshold: f64,
    pub recommend_threshold: f64,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            technical_weight: 0.8,
            soft_weight: 0.9,
            culture_weight: 0.85,
            fallback_technical: 75,
            fallback_soft: 80,
            fallback_culture: 78,
            strong_threshold: 85.0,
            recommend_threshold: 70.0,
        }
    }
}

/// Scalar fields of a candidate used to seed a synthesised profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileHints {
    pub position: Option<String>,
    pub ai_score: Option<f64>,
}

const GENERIC_TECHNICAL: &[&str] = &["Problem Solving", "System Design", "Programming"];
const GENERIC_SOFT: &[&str] = &["Communication", "Teamwork", "Adaptability"];
const GENERIC_CULTURE: &[&str] = &["Ownership", "Collaboration", "Growth Mindset"];

const EXAMPLE_CV_HIGHLIGHTS: &[&str] = &[
    "Relevant experience for the applied position",
    "Consistent career progression",
    "Strong educational background",
];

const EXAMPLE_KEY_INSIGHTS: &[&str] = &[
    "Profile generated from application data; run CV analysis for a detailed assessment",
    "Skill scores are estimates derived from the overall AI score",
];

/// Builds a complete, structurally valid profile.
///
/// Pure: the same inputs always yield the same profile. It never reads or
/// preserves an existing profile; callers check for one first.
pub fn build_default_profile(
    hints: Option<&ProfileHints>,
    defaults: &ProfileDefaults,
) -> CandidateProfile {
    match hints {
        None => CandidateProfile::default(),
        Some(hints) => synthesize(hints, defaults),
    }
}

/// Picks the narrative label for a score. Thresholds are strict (`>`).
pub fn recommend(ai_score: Option<f64>, defaults: &ProfileDefaults) -> Recommendation {
    match ai_score {
        Some(score) if score > defaults.strong_threshold => Recommendation::StronglyRecommend,
        Some(score) if score > defaults.recommend_threshold => Recommendation::Recommend,
        _ => Recommendation::Consider,
    }
}

fn synthesize(hints: &ProfileHints, defaults: &ProfileDefaults) -> CandidateProfile {
    let position = hints
        .position
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or("Not specified");

    let (technical, soft, culture) = match hints.ai_score {
        Some(score) => (
            weighted(score, defaults.technical_weight),
            weighted(score, defaults.soft_weight),
            weighted(score, defaults.culture_weight),
        ),
        None => (
            defaults.fallback_technical,
            defaults.fallback_soft,
            defaults.fallback_culture,
        ),
    };

    CandidateProfile {
        personal: PersonalSection {
            location: "Not specified".to_string(),
            nationality: "Not specified".to_string(),
            languages: "English".to_string(),
            visa_status: "Not specified".to_string(),
            availability: "Available".to_string(),
            notice_period: "Not specified".to_string(),
            salary_expectation: "Not specified".to_string(),
            summary: format!("Applicant for the {position} position."),
        },
        career: CareerSection {
            current_role: position.to_string(),
            current_company: "Not specified".to_string(),
            years_experience: "Not specified".to_string(),
            education: "Not specified".to_string(),
            role_history: "Not specified".to_string(),
            progression: "Not specified".to_string(),
            industries: "Not specified".to_string(),
            summary: format!("Experience relevant to the {position} role."),
        },
        interview: InterviewSection {
            duration: "Not scheduled".to_string(),
            eligibility: vec![EligibilityCheck {
                label: "Right to work".to_string(),
                passed: true,
            }],
            highlights: vec![InterviewHighlight {
                title: "Introduction".to_string(),
                content: "Candidate introduced their background and motivation.".to_string(),
                timestamp: "00:00".to_string(),
                media_url: None,
            }],
            feedback: vec![InterviewFeedback {
                statement: "Clear and structured communication".to_string(),
                praise: true,
            }],
        },
        skills: SkillsSection {
            technical: category(technical, GENERIC_TECHNICAL),
            soft: category(soft, GENERIC_SOFT),
            culture: category(culture, GENERIC_CULTURE),
        },
        cv: CvSection {
            highlights: to_strings(EXAMPLE_CV_HIGHLIGHTS),
            key_insights: to_strings(EXAMPLE_KEY_INSIGHTS),
            score: hints.ai_score,
        },
        skill_insights: SkillInsightsSection {
            matched_skills: to_strings(GENERIC_TECHNICAL),
            missing_skills: Vec::new(),
            skill_gaps: vec![SkillGap {
                name: "Domain knowledge".to_string(),
                percentage: 20,
            }],
            learning_paths: vec![LearningPath {
                title: "Role onboarding programme".to_string(),
                provider: "Internal".to_string(),
            }],
        },
        recommendation: recommend(hints.ai_score, defaults),
    }
}

fn weighted(score: f64, weight: f64) -> u32 {
    (score * weight).round().clamp(0.0, 100.0) as u32
}

/// Every listed skill carries the category score.
fn category(overall: u32, names: &[&str]) -> SkillCategory {
    SkillCategory {
        overall_score: overall,
        skills: names
            .iter()
            .map(|name| SkillScore {
                name: (*name).to_string(),
                score: overall,
            })
            .collect(),
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(ai_score: Option<f64>) -> ProfileHints {
        ProfileHints {
            position: Some("Backend Engineer".to_string()),
            ai_score,
        }
    }

    #[test]
    fn test_score_derived_category_scores() {
        let p = build_default_profile(Some(&hints(Some(90.0))), &ProfileDefaults::default());
        assert_eq!(p.skills.technical.overall_score, 72);
        assert_eq!(p.skills.soft.overall_score, 81);
        assert_eq!(p.skills.culture.overall_score, 77);
    }

    #[test]
    fn test_fallback_scores_without_ai_score() {
        let p = build_default_profile(Some(&hints(None)), &ProfileDefaults::default());
        assert_eq!(p.skills.technical.overall_score, 75);
        assert_eq!(p.skills.soft.overall_score, 80);
        assert_eq!(p.skills.culture.overall_score, 78);
        assert_eq!(p.recommendation, Recommendation::Consider);
    }

    #[test]
    fn test_recommendation_thresholds() {
        let d = ProfileDefaults::default();
        assert_eq!(recommend(Some(86.0), &d), Recommendation::StronglyRecommend);
        assert_eq!(recommend(Some(85.0), &d), Recommendation::Recommend);
        assert_eq!(recommend(Some(75.0), &d), Recommendation::Recommend);
        assert_eq!(recommend(Some(70.0), &d), Recommendation::Consider);
        assert_eq!(recommend(Some(50.0), &d), Recommendation::Consider);
        assert_eq!(recommend(None, &d), Recommendation::Consider);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let d = ProfileDefaults::default();
        let h = hints(Some(77.0));
        assert_eq!(
            build_default_profile(Some(&h), &d),
            build_default_profile(Some(&h), &d)
        );
    }

    #[test]
    fn test_position_flows_into_career() {
        let p = build_default_profile(Some(&hints(Some(60.0))), &ProfileDefaults::default());
        assert_eq!(p.career.current_role, "Backend Engineer");
        assert_eq!(p.cv.score, Some(60.0));
    }

    #[test]
    fn test_missing_position_uses_placeholder() {
        let h = ProfileHints {
            position: Some("  ".to_string()),
            ai_score: None,
        };
        let p = build_default_profile(Some(&h), &ProfileDefaults::default());
        assert_eq!(p.career.current_role, "Not specified");
    }

    #[test]
    fn test_blank_variant_is_empty() {
        let p = build_default_profile(None, &ProfileDefaults::default());
        assert_eq!(p, CandidateProfile::default());
        assert!(p.cv.highlights.is_empty());
        assert_eq!(p.skills.technical.overall_score, 0);
    }

    #[test]
    fn test_overridden_weights_are_used() {
        let d = ProfileDefaults {
            technical_weight: 1.0,
            strong_threshold: 95.0,
            ..ProfileDefaults::default()
        };
        let p = build_default_profile(Some(&hints(Some(90.0))), &d);
        assert_eq!(p.skills.technical.overall_score, 90);
        assert_eq!(p.recommendation, Recommendation::Recommend);
    }
}
