//! Renders candidates into plain-text context for the recruiting assistant.

use std::fmt::Write;

use crate::consumers::{candidate_score, typed_profile};
use crate::models::candidate::CandidateRow;
use crate::profile::types::{CandidateProfile, SkillCategory};

/// Full context block for one candidate. Sections with no content are omitted.
pub fn render_candidate_context(candidate: &CandidateRow) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Candidate: {} <{}>", candidate.name, candidate.email);
    if let Some(position) = candidate.position.as_deref().filter(|p| !p.is_empty()) {
        let _ = writeln!(out, "Applied for: {position}");
    }
    if let Some(status) = candidate.status.as_deref().filter(|s| !s.is_empty()) {
        let _ = writeln!(out, "Pipeline status: {status}");
    }
    match candidate_score(candidate) {
        Some(score) => {
            let _ = writeln!(out, "AI score: {score:.0}/100");
        }
        None => {
            let _ = writeln!(out, "AI score: not yet analyzed");
        }
    }

    match typed_profile(candidate) {
        Some(profile) => render_profile(&mut out, &profile),
        None => {
            if let Some(legacy) = candidate.profile.as_deref().filter(|p| !p.trim().is_empty()) {
                let _ = writeln!(out, "Notes: {}", legacy.trim());
            }
            let _ = writeln!(out, "No structured profile is available yet.");
        }
    }

    out.trim_end().to_string()
}

/// One line per candidate, for questions spanning the whole pipeline.
pub fn render_roster_context(candidates: &[CandidateRow]) -> String {
    candidates
        .iter()
        .map(|c| {
            let score = candidate_score(c)
                .map(|s| format!("{s:.0}"))
                .unwrap_or_else(|| "n/a".to_string());
            let recommendation = typed_profile(c)
                .map(|p| p.recommendation.label().to_string())
                .unwrap_or_else(|| "not analyzed".to_string());
            format!(
                "- {} ({}): score {score}, {recommendation}",
                c.name,
                c.position.as_deref().unwrap_or("no position")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_profile(out: &mut String, profile: &CandidateProfile) {
    let _ = writeln!(out, "Recommendation: {}", profile.recommendation.label());

    let personal = &profile.personal;
    field(out, "Location", &personal.location);
    field(out, "Languages", &personal.languages);
    field(out, "Availability", &personal.availability);
    field(out, "Notice period", &personal.notice_period);
    field(out, "Salary expectation", &personal.salary_expectation);

    let career = &profile.career;
    match (career.current_role.trim(), career.current_company.trim()) {
        ("", _) => {}
        (role, "") => {
            let _ = writeln!(out, "Current role: {role}");
        }
        (role, company) => {
            let _ = writeln!(out, "Current role: {role} at {company}");
        }
    }
    field(out, "Experience", &career.years_experience);
    field(out, "Education", &career.education);
    field(out, "Career summary", &career.summary);

    skills(out, "Technical skills", &profile.skills.technical);
    skills(out, "Soft skills", &profile.skills.soft);
    skills(out, "Culture fit", &profile.skills.culture);

    list(out, "CV highlights", &profile.cv.highlights);
    list(out, "Key insights", &profile.cv.key_insights);
    if !profile.skill_insights.matched_skills.is_empty() {
        let _ = writeln!(
            out,
            "Matched skills: {}",
            profile.skill_insights.matched_skills.join(", ")
        );
    }
    if !profile.skill_insights.missing_skills.is_empty() {
        let _ = writeln!(
            out,
            "Missing skills: {}",
            profile.skill_insights.missing_skills.join(", ")
        );
    }

    let feedback = &profile.interview.feedback;
    if !feedback.is_empty() {
        let _ = writeln!(out, "Interview feedback:");
        for item in feedback {
            let tone = if item.praise { "+" } else { "-" };
            let _ = writeln!(out, "  {tone} {}", item.statement);
        }
    }
}

fn field(out: &mut String, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        let _ = writeln!(out, "{label}: {value}");
    }
}

fn skills(out: &mut String, label: &str, category: &SkillCategory) {
    if category.skills.is_empty() && category.overall_score == 0 {
        return;
    }
    let detail = category
        .skills
        .iter()
        .map(|s| format!("{} ({})", s.name, s.score))
        .collect::<Vec<_>>()
        .join(", ");
    if detail.is_empty() {
        let _ = writeln!(out, "{label}: {}/100", category.overall_score);
    } else {
        let _ = writeln!(out, "{label}: {}/100 [{detail}]", category.overall_score);
    }
}

fn list(out: &mut String, label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "{label}:");
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
}
