//! Recommendation Formatter: orders scored records for presentation.

use std::cmp::Ordering;

use crate::models::{EnhancedRecord, MatchResult, RankedMatch};

/// Ranks scored records.
///
/// Order: `compatibility_score` desc, then `skill_match_percentage` desc, then
/// provider order. The sort is stable and the input is left untouched.
/// `top_n` truncates after sorting; `None` keeps everything.
pub fn rank_matches(
    scored: &[(EnhancedRecord, MatchResult)],
    top_n: Option<usize>,
) -> Vec<RankedMatch> {
    let mut order: Vec<usize> = (0..scored.len()).collect();

    order.sort_by(|&a, &b| {
        let (ra, rb) = (&scored[a].1, &scored[b].1);
        rb.compatibility_score
            .partial_cmp(&ra.compatibility_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                rb.skill_match_percentage
                    .partial_cmp(&ra.skill_match_percentage)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.cmp(&b))
    });

    if let Some(n) = top_n {
        order.truncate(n);
    }

    order
        .into_iter()
        .enumerate()
        .map(|(i, idx)| RankedMatch {
            rank: i + 1,
            record: scored[idx].0.clone(),
            result: scored[idx].1.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ScoreSource;

    fn entry(title: &str, score: f64, pct: f64) -> (EnhancedRecord, MatchResult) {
        (
            EnhancedRecord {
                title: title.to_string(),
                ..Default::default()
            },
            MatchResult {
                compatibility_score: score,
                skill_match_percentage: pct,
                experience_fit: String::new(),
                salary_alignment: String::new(),
                growth_potential: String::new(),
                explanation: "x".to_string(),
                recommendations: vec![],
                source: ScoreSource::FallbackHeuristic,
            },
        )
    }

    fn titles(ranked: &[RankedMatch]) -> Vec<&str> {
        ranked.iter().map(|r| r.record.title.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let scored = vec![entry("a", 0.5, 50.0), entry("b", 0.9, 10.0), entry("c", 0.7, 90.0)];
        let ranked = rank_matches(&scored, None);
        assert_eq!(titles(&ranked), vec!["b", "c", "a"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_ties_broken_by_skill_percentage_then_provider_order() {
        let scored = vec![
            entry("first", 0.8, 60.0),
            entry("second", 0.8, 70.0),
            entry("third", 0.8, 60.0),
        ];
        let ranked = rank_matches(&scored, None);
        assert_eq!(titles(&ranked), vec!["second", "first", "third"]);
    }

    #[test]
    fn test_output_is_monotonic() {
        let scored: Vec<_> = (0..20)
            .map(|i| entry(&i.to_string(), ((i * 7) % 10) as f64 / 10.0, ((i * 3) % 5) as f64 * 20.0))
            .collect();
        let ranked = rank_matches(&scored, None);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0].result, &pair[1].result);
            assert!(a.compatibility_score >= b.compatibility_score);
            if a.compatibility_score == b.compatibility_score {
                assert!(a.skill_match_percentage >= b.skill_match_percentage);
            }
        }
    }

    #[test]
    fn test_top_n_truncates_after_sorting() {
        let scored = vec![entry("a", 0.1, 0.0), entry("b", 0.9, 0.0), entry("c", 0.5, 0.0)];
        let ranked = rank_matches(&scored, Some(2));
        assert_eq!(titles(&ranked), vec!["b", "c"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let scored = vec![entry("a", 0.1, 0.0), entry("b", 0.9, 0.0)];
        let before = scored.clone();
        let _ = rank_matches(&scored, Some(1));
        assert_eq!(scored, before);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_matches(&[], Some(5)).is_empty());
    }
}
