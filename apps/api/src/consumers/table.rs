use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::consumers::{candidate_score, typed_profile};
use crate::models::candidate::CandidateRow;

const TOP_SKILLS: usize = 3;

/// Flat row for the candidate list view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateTableRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub initials: String,
    pub color: String,
    pub position: Option<String>,
    pub status: Option<String>,
    pub score: Option<f64>,
    pub years_experience: Option<u32>,
    pub current_role: Option<String>,
    pub location: Option<String>,
    pub top_skills: Vec<String>,
    pub recommendation: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub fn project_row(candidate: &CandidateRow) -> CandidateTableRow {
    let profile = typed_profile(candidate);

    let years_experience = profile
        .as_ref()
        .and_then(|p| parse_years(&p.career.years_experience));
    let current_role = profile
        .as_ref()
        .map(|p| p.career.current_role.trim().to_string())
        .filter(|r| !r.is_empty());
    let location = profile
        .as_ref()
        .map(|p| p.personal.location.trim().to_string())
        .filter(|l| !l.is_empty());

    let top_skills = profile
        .as_ref()
        .map(|p| {
            let mut skills = p.skills.technical.skills.clone();
            skills.sort_by(|a, b| b.score.cmp(&a.score));
            skills
                .into_iter()
                .filter(|s| !s.name.trim().is_empty())
                .take(TOP_SKILLS)
                .map(|s| s.name)
                .collect()
        })
        .unwrap_or_default();

    CandidateTableRow {
        id: candidate.id,
        name: candidate.name.clone(),
        email: candidate.email.clone(),
        initials: candidate.initials.clone(),
        color: candidate.color.clone(),
        position: candidate.position.clone(),
        status: candidate.status.clone(),
        score: candidate_score(candidate),
        years_experience,
        current_role,
        location,
        top_skills,
        recommendation: profile.map(|p| p.recommendation.label().to_string()),
        created_at: candidate.created_at,
    }
}

pub fn project_rows(candidates: &[CandidateRow]) -> Vec<CandidateTableRow> {
    candidates.iter().map(project_row).collect()
}

/// Leading whole number of a free-text duration: "7+ years" → 7, "5.5 yrs" → 5.
pub fn parse_years(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::fixtures::candidate;
    use serde_json::json;

    #[test]
    fn test_parse_years() {
        assert_eq!(parse_years("7 years"), Some(7));
        assert_eq!(parse_years(" 10+ years"), Some(10));
        assert_eq!(parse_years("5.5 yrs"), Some(5));
        assert_eq!(parse_years("about 3 years"), None);
        assert_eq!(parse_years(""), None);
    }

    #[test]
    fn test_projects_analyzed_candidate() {
        let c = candidate(
            "Ines",
            None,
            Some(json!({
                "personal": {"location": "Madrid"},
                "career": {"currentRole": "Data Engineer", "yearsExperience": "6 years"},
                "skills": {"technical": {"skills": [
                    {"name": "SQL", "score": 70},
                    {"name": "Python", "score": 92},
                    {"name": "Spark", "score": 85},
                    {"name": "Airflow", "score": 60}
                ]}},
                "cv": {"score": 83},
                "recommendation": "Recommend"
            })),
        );
        let row = project_row(&c);
        assert_eq!(row.years_experience, Some(6));
        assert_eq!(row.top_skills, vec!["Python", "Spark", "SQL"]);
        assert_eq!(row.score, Some(83.0));
        assert_eq!(row.recommendation.as_deref(), Some("Recommend"));
        assert_eq!(row.current_role.as_deref(), Some("Data Engineer"));
        assert_eq!(row.location.as_deref(), Some("Madrid"));
    }

    #[test]
    fn test_projects_candidate_without_profile() {
        let row = project_row(&candidate("Tom", Some(58.0), None));
        assert_eq!(row.score, Some(58.0));
        assert_eq!(row.years_experience, None);
        assert!(row.top_skills.is_empty());
        assert_eq!(row.recommendation, None);
    }
}
