use std::cmp::Ordering;

use serde::Serialize;
use uuid::Uuid;

use crate::consumers::{candidate_score, typed_profile};
use crate::models::candidate::CandidateRow;
use crate::profile::types::Recommendation;

const TOP_CANDIDATES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    /// 85 and above.
    pub excellent: usize,
    /// 70 up to 85.
    pub good: usize,
    /// 50 up to 70.
    pub fair: usize,
    pub low: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationCounts {
    pub strongly_recommend: usize,
    pub recommend: usize,
    pub consider: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCandidate {
    pub id: Uuid,
    pub name: String,
    pub initials: String,
    pub color: String,
    pub position: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_candidates: usize,
    /// Candidates carrying a structured profile.
    pub analyzed_candidates: usize,
    /// Mean over scored candidates, one decimal place.
    pub average_score: Option<f64>,
    pub highest_score: Option<f64>,
    pub score_distribution: ScoreDistribution,
    pub recommendations: RecommendationCounts,
    pub top_candidates: Vec<RankedCandidate>,
}

pub fn build_dashboard(candidates: &[CandidateRow]) -> DashboardStats {
    let mut distribution = ScoreDistribution::default();
    let mut recommendations = RecommendationCounts::default();
    let mut ranked = Vec::new();

    for candidate in candidates {
        if let Some(profile) = typed_profile(candidate) {
            match profile.recommendation {
                Recommendation::StronglyRecommend => recommendations.strongly_recommend += 1,
                Recommendation::Recommend => recommendations.recommend += 1,
                Recommendation::Consider => recommendations.consider += 1,
            }
        }

        let Some(score) = candidate_score(candidate) else {
            continue;
        };
        match score {
            s if s >= 85.0 => distribution.excellent += 1,
            s if s >= 70.0 => distribution.good += 1,
            s if s >= 50.0 => distribution.fair += 1,
            _ => distribution.low += 1,
        }
        ranked.push(RankedCandidate {
            id: candidate.id,
            name: candidate.name.clone(),
            initials: candidate.initials.clone(),
            color: candidate.color.clone(),
            position: candidate.position.clone(),
            score,
        });
    }

    let average_score = if ranked.is_empty() {
        None
    } else {
        let sum: f64 = ranked.iter().map(|r| r.score).sum();
        Some((sum / ranked.len() as f64 * 10.0).round() / 10.0)
    };
    let highest_score = ranked.iter().map(|r| r.score).reduce(f64::max);

    // Highest first; ties broken by name so the ranking is stable.
    ranked.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(TOP_CANDIDATES);

    DashboardStats {
        total_candidates: candidates.len(),
        analyzed_candidates: candidates
            .iter()
            .filter(|c| c.candidate_profile.is_some())
            .count(),
        average_score,
        highest_score,
        score_distribution: distribution,
        recommendations,
        top_candidates: ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumers::fixtures::candidate;
    use serde_json::json;

    #[test]
    fn test_empty_dashboard() {
        let stats = build_dashboard(&[]);
        assert_eq!(stats.total_candidates, 0);
        assert_eq!(stats.average_score, None);
        assert_eq!(stats.highest_score, None);
        assert!(stats.top_candidates.is_empty());
    }

    #[test]
    fn test_ranks_by_profile_score_and_caps_at_five() {
        let candidates: Vec<_> = [91.0, 55.0, 78.0, 86.0, 40.0, 70.0, 99.0]
            .iter()
            .enumerate()
            .map(|(i, s)| {
                candidate(
                    &format!("Cand {i}"),
                    None,
                    Some(json!({"cv": {"score": s}, "recommendation": "Recommend"})),
                )
            })
            .collect();

        let stats = build_dashboard(&candidates);
        let scores: Vec<f64> = stats.top_candidates.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![99.0, 91.0, 86.0, 78.0, 70.0]);
        assert_eq!(stats.highest_score, Some(99.0));
        assert_eq!(stats.analyzed_candidates, 7);
        assert_eq!(stats.recommendations.recommend, 7);
        assert_eq!(
            stats.score_distribution,
            ScoreDistribution {
                excellent: 3,
                good: 2,
                fair: 1,
                low: 1
            }
        );
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let candidates = vec![
            candidate("A", Some(80.0), None),
            candidate("B", Some(75.0), None),
            candidate("C", Some(70.0), None),
        ];
        let stats = build_dashboard(&candidates);
        assert_eq!(stats.average_score, Some(75.0));

        let candidates = vec![candidate("A", Some(80.0), None), candidate("B", Some(71.0), None)];
        assert_eq!(build_dashboard(&candidates).average_score, Some(75.5));
    }

    #[test]
    fn test_unscored_candidates_are_counted_but_not_ranked() {
        let candidates = vec![candidate("A", None, None), candidate("B", Some(64.0), None)];
        let stats = build_dashboard(&candidates);
        assert_eq!(stats.total_candidates, 2);
        assert_eq!(stats.analyzed_candidates, 0);
        assert_eq!(stats.top_candidates.len(), 1);
    }

    #[test]
    fn test_ties_are_ordered_by_name() {
        let candidates = vec![candidate("Zoe", Some(80.0), None), candidate("Amy", Some(80.0), None)];
        let stats = build_dashboard(&candidates);
        assert_eq!(stats.top_candidates[0].name, "Amy");
    }
}
