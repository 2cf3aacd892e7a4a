//! Opportunity fit score and listing filters

use crate::models::Opportunity;
use air_backend_client::OpportunityType;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Score of an opportunity with no skill overlap
pub const BASE_SCORE: u8 = 40;
/// Added per overlapping tag
pub const SCORE_STEP: u8 = 20;
pub const MAX_SCORE: u8 = 100;

/// Pipeline value used when compensation text has no usable amount
pub const DEFAULT_TRACKED_VALUE: f64 = 1500.0;

/// Fit score in [40, 100]: baseline plus a fixed step per distinct tag that
/// appears (case-insensitively) among the member's skills.
pub fn fit_score(opportunity: &Opportunity, skills: &[String]) -> u8 {
    let skills: HashSet<String> = skills.iter().map(|s| s.to_lowercase()).collect();
    let tags: HashSet<String> = opportunity.tags.iter().map(|t| t.to_lowercase()).collect();
    let overlap = tags.intersection(&skills).count();

    let score = BASE_SCORE as usize + SCORE_STEP as usize * overlap;
    score.min(MAX_SCORE as usize) as u8
}

/// Listing filter chosen by the member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpportunityFilter {
    /// Only this type; `None` shows all
    pub kind: Option<OpportunityType>,
    /// Case-insensitive substring over title, org and tags
    pub query: String,
    /// Only saved opportunities
    pub saved_only: bool,
}

impl OpportunityFilter {
    pub fn matches(&self, opportunity: &Opportunity, saved_ids: &[String]) -> bool {
        if let Some(kind) = self.kind {
            if opportunity.kind != kind {
                return false;
            }
        }

        let needle = self.query.trim().to_lowercase();
        if !needle.is_empty() {
            let haystack = format!(
                "{} {} {}",
                opportunity.title,
                opportunity.org,
                opportunity.tags.join(" ")
            )
            .to_lowercase();
            if !haystack.contains(&needle) {
                return false;
            }
        }

        !self.saved_only || saved_ids.iter().any(|id| id == &opportunity.id)
    }
}

/// An opportunity annotated for display
#[derive(Debug, Clone, PartialEq)]
pub struct RankedOpportunity {
    pub opportunity: Opportunity,
    pub score: u8,
    pub saved: bool,
}

/// Filter, score and order opportunities, best fit first.
/// Ties keep their incoming (deadline) order.
pub fn rank(
    opportunities: &[Opportunity],
    skills: &[String],
    filter: &OpportunityFilter,
    saved_ids: &[String],
) -> Vec<RankedOpportunity> {
    let mut ranked: Vec<RankedOpportunity> = opportunities
        .iter()
        .filter(|o| filter.matches(o, saved_ids))
        .map(|o| RankedOpportunity {
            score: fit_score(o, skills),
            saved: saved_ids.iter().any(|id| id == &o.id),
            opportunity: o.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

fn amount_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d[\d,]*").ok()).as_ref()
}

/// Pipeline value guessed from free-text compensation: the first run of
/// digits (thousands separators allowed), else the default.
pub fn estimate_value(compensation: &str) -> f64 {
    amount_pattern()
        .and_then(|re| re.find(compensation))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|v| *v > 0.0)
        .unwrap_or(DEFAULT_TRACKED_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed_opportunities;

    fn skills(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn with_tags(tags: &[&str]) -> Opportunity {
        let mut o = seed_opportunities().remove(0);
        o.tags = skills(tags);
        o
    }

    #[test]
    fn test_single_overlap_scores_sixty() {
        let o = with_tags(&["Audio", "Editing"]);
        assert_eq!(fit_score(&o, &skills(&["audio"])), 60);
    }

    #[test]
    fn test_repeated_tag_counts_once() {
        let o = with_tags(&["Audio", "audio", "AUDIO"]);
        assert_eq!(fit_score(&o, &skills(&["audio", "Audio"])), 60);
    }

    #[test]
    fn test_no_skills_scores_baseline() {
        for o in seed_opportunities() {
            assert_eq!(fit_score(&o, &[]), BASE_SCORE);
        }
    }

    #[test]
    fn test_score_is_capped_and_monotone() {
        let o = with_tags(&["a", "b", "c", "d", "e"]);
        let all = ["A", "B", "C", "D", "E"];
        let mut previous = 0;
        for n in 0..=all.len() {
            let score = fit_score(&o, &skills(&all[..n]));
            assert!(score >= previous);
            assert!((BASE_SCORE..=MAX_SCORE).contains(&score));
            previous = score;
        }
        assert_eq!(previous, MAX_SCORE);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let ranked = rank(
            &seed_opportunities(),
            &skills(&["editing", "mentorship"]),
            &OpportunityFilter::default(),
            &[],
        );
        assert_eq!(ranked[0].opportunity.id, "opp-004");
        assert_eq!(ranked[0].score, 80);
        assert_eq!(ranked[1].opportunity.id, "opp-001");
        assert_eq!(ranked.len(), 4);
    }

    #[test]
    fn test_filter_by_type_query_and_saved() {
        let all = seed_opportunities();
        let saved = vec!["opp-002".to_string()];

        let grants = OpportunityFilter {
            kind: Some(OpportunityType::Grant),
            ..Default::default()
        };
        assert_eq!(rank(&all, &[], &grants, &saved).len(), 1);

        let by_tag = OpportunityFilter {
            query: "EDITING".into(),
            ..Default::default()
        };
        assert_eq!(rank(&all, &[], &by_tag, &saved).len(), 2);

        let saved_only = OpportunityFilter {
            saved_only: true,
            ..Default::default()
        };
        let ranked = rank(&all, &[], &saved_only, &saved);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].saved);
    }

    #[test]
    fn test_estimate_value() {
        assert_eq!(estimate_value("$2,200 per episode"), 2200.0);
        assert_eq!(estimate_value("$15,000 grant"), 15000.0);
        assert_eq!(estimate_value("Negotiable"), DEFAULT_TRACKED_VALUE);
        assert_eq!(estimate_value("$0 upfront"), DEFAULT_TRACKED_VALUE);
    }
}
