// CV analysis LLM prompt templates.
// All prompts for the analysis module are defined here.

use crate::llm_client::prompts::{JSON_OBJECT_INSTRUCTION, RECRUITER_PERSONA};
use crate::profile::types::CandidateProfile;

/// Name under which a customised system instruction may be stored.
pub const CV_ANALYSIS_TEMPLATE_NAME: &str = "cv_analysis";

/// Exact reply shape requested from the model.
pub const CANDIDATE_PROFILE_SHAPE: &str = r#"{
  "candidateProfile": {
    "personal": {
      "location": "string", "nationality": "string", "languages": "string",
      "visaStatus": "string", "availability": "string", "noticePeriod": "string",
      "salaryExpectation": "string", "summary": "string"
    },
    "career": {
      "currentRole": "string", "currentCompany": "string", "yearsExperience": "string",
      "education": "string", "roleHistory": "string", "progression": "string",
      "industries": "string", "summary": "string"
    },
    "interview": {
      "duration": "string",
      "eligibility": [{"label": "string", "passed": true}],
      "highlights": [{"title": "string", "content": "string", "timestamp": "string"}],
      "feedback": [{"statement": "string", "praise": true}]
    },
    "skills": {
      "technical": {"overallScore": 0, "skills": [{"name": "string", "score": 0}]},
      "soft": {"overallScore": 0, "skills": [{"name": "string", "score": 0}]},
      "culture": {"overallScore": 0, "skills": [{"name": "string", "score": 0}]}
    },
    "cv": {
      "highlights": ["string"],
      "keyInsights": ["string"],
      "score": 0
    },
    "skillInsights": {
      "matchedSkills": ["string"],
      "missingSkills": ["string"],
      "skillGaps": [{"name": "string", "percentage": 0}],
      "learningPaths": [{"title": "string", "provider": "string"}]
    },
    "recommendation": "Strongly Recommend" | "Recommend" | "Consider"
  }
}"#;

/// User-turn instruction sent next to the attached document.
pub const CV_ANALYSIS_PROMPT: &str = "Analyze the attached CV and return the candidate \
    profile JSON object described in your instructions.";

/// System instruction for the narrative summary call.
pub const SUMMARY_SYSTEM: &str = "You are an experienced technical recruiter writing \
    concise candidate summaries for hiring managers. Write plain prose only: no headings, \
    no bullet points, no JSON.";

/// Built-in system instruction used when no `cv_analysis` template is stored.
pub fn default_cv_analysis_system() -> String {
    format!(
        "{RECRUITER_PERSONA}\n\n\
        Analyze the candidate's CV and produce a structured assessment.\n\n\
        RULES:\n\
        1. Scores are integers from 0 to 100. `cv.score` is the overall CV score.\n\
        2. Use an empty string for any text field the CV does not support.\n\
        3. `interview` describes interview logistics only; leave its lists empty when no interview took place.\n\
        4. `recommendation` must be exactly one of \"Strongly Recommend\", \"Recommend\", \"Consider\".\n\
        5. {JSON_OBJECT_INSTRUCTION}\n\n\
        OUTPUT SCHEMA (return exactly this structure):\n{CANDIDATE_PROFILE_SHAPE}"
    )
}

/// Builds the narrative-summary prompt from a persisted profile.
/// Deterministic: the same profile always yields the same prompt.
pub fn build_summary_prompt(profile: &CandidateProfile) -> String {
    let score = profile
        .cv
        .score
        .map(|s| format!("{s:.0}/100"))
        .unwrap_or_else(|| "not scored".to_string());

    format!(
        "Write a summary of approximately 10 sentences about this candidate for a hiring manager.\n\n\
        PERSONAL: {personal}\n\
        CAREER: {career}\n\
        CURRENT ROLE: {role}\n\
        YEARS OF EXPERIENCE: {years}\n\
        SKILLS: technical {technical}/100, soft {soft}/100, culture fit {culture}/100\n\
        CV HIGHLIGHTS: {highlights}\n\
        KEY INSIGHTS: {insights}\n\
        MATCHED SKILLS: {matched}\n\
        MISSING SKILLS: {missing}\n\
        RECOMMENDATION: {recommendation}\n\
        OVERALL SCORE: {score}",
        personal = or_unknown(&profile.personal.summary),
        career = or_unknown(&profile.career.summary),
        role = or_unknown(&profile.career.current_role),
        years = or_unknown(&profile.career.years_experience),
        technical = profile.skills.technical.overall_score,
        soft = profile.skills.soft.overall_score,
        culture = profile.skills.culture.overall_score,
        highlights = join_or_none(&profile.cv.highlights),
        insights = join_or_none(&profile.cv.key_insights),
        matched = join_or_none(&profile.skill_insights.matched_skills),
        missing = join_or_none(&profile.skill_insights.missing_skills),
        recommendation = profile.recommendation.label(),
    )
}

fn or_unknown(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        "unknown"
    } else {
        trimmed
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::types::Recommendation;

    #[test]
    fn test_default_system_contains_all_sections() {
        let system = default_cv_analysis_system();
        for key in [
            "\"candidateProfile\"",
            "\"personal\"",
            "\"career\"",
            "\"interview\"",
            "\"skills\"",
            "\"cv\"",
            "\"skillInsights\"",
        ] {
            assert!(system.contains(key), "missing {key}");
        }
    }

    #[test]
    fn test_summary_prompt_is_deterministic() {
        let mut profile = CandidateProfile::default();
        profile.cv.score = Some(82.0);
        profile.cv.highlights = vec!["Led a team of 6".to_string()];
        profile.recommendation = Recommendation::Recommend;

        let a = build_summary_prompt(&profile);
        let b = build_summary_prompt(&profile);
        assert_eq!(a, b);
        assert!(a.contains("OVERALL SCORE: 82/100"));
        assert!(a.contains("CV HIGHLIGHTS: Led a team of 6"));
        assert!(a.contains("RECOMMENDATION: Recommend"));
        assert!(a.contains("CAREER: unknown"));
        assert!(a.contains("approximately 10 sentences"));
    }
}
