//! Suggestion filtering and ranking
//!
//! Candidates arrive in batches, one per suggestion source, each carrying
//! the match strategy of the argument it belongs to. The ranker drops what
//! does not match the partial token, collapses duplicate values and orders
//! the rest by priority, match quality and generation order.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::candidate::Candidate;
use crate::spec::FilterStrategy;

/// Candidates from one source, filtered with one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateBatch {
    pub strategy: FilterStrategy,
    pub candidates: Vec<Candidate>,
}

impl CandidateBatch {
    pub fn new(strategy: FilterStrategy, candidates: Vec<Candidate>) -> Self {
        Self {
            strategy,
            candidates,
        }
    }
}

/// How well a value matched; smaller is better
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchQuality {
    /// The partial token is a prefix of the value
    Prefix,
    /// Subsequence match; `distance` is the number of extra characters
    Fuzzy { distance: usize },
}

/// Match `value` against the partial token, or `None` to exclude it
pub fn match_candidate(value: &str, partial: &str, strategy: FilterStrategy) -> Option<MatchQuality> {
    match strategy {
        FilterStrategy::PrefixCaseSensitive => {
            value.starts_with(partial).then_some(MatchQuality::Prefix)
        }
        FilterStrategy::Prefix => {
            starts_with_ignore_case(value, partial).then_some(MatchQuality::Prefix)
        }
        FilterStrategy::Fuzzy => {
            if starts_with_ignore_case(value, partial) {
                return Some(MatchQuality::Prefix);
            }
            is_subsequence(value, partial).then(|| MatchQuality::Fuzzy {
                distance: value.chars().count().saturating_sub(partial.chars().count()),
            })
        }
    }
}

fn starts_with_ignore_case(value: &str, partial: &str) -> bool {
    let mut value = value.chars().flat_map(char::to_lowercase);
    partial
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| value.next() == Some(p))
}

fn is_subsequence(value: &str, partial: &str) -> bool {
    let mut value = value.chars().flat_map(char::to_lowercase);
    partial
        .chars()
        .flat_map(char::to_lowercase)
        .all(|p| value.any(|v| v == p))
}

struct Ranked {
    quality: MatchQuality,
    order: usize,
    candidate: Candidate,
}

/// Orders the merged candidate set
#[derive(Debug, Clone, Default)]
pub struct Ranker {
    /// Cap on emitted candidates; `None` keeps all
    max_results: Option<usize>,
}

impl Ranker {
    pub fn new(max_results: Option<usize>) -> Self {
        Self { max_results }
    }

    /// Filter, deduplicate and order `batches` against `partial`.
    ///
    /// Batches are taken in order; that order is the final tie-breaker.
    pub fn rank(&self, batches: Vec<CandidateBatch>, partial: &str) -> Vec<Candidate> {
        let mut ranked: Vec<Ranked> = Vec::new();
        let mut by_value: HashMap<String, usize> = HashMap::new();

        let matched = batches.into_iter().flat_map(|batch| {
            let strategy = batch.strategy;
            batch.candidates.into_iter().filter_map(move |candidate| {
                match_candidate(&candidate.value, partial, strategy)
                    .map(|quality| (quality, candidate))
            })
        });

        for (order, (quality, candidate)) in matched.enumerate() {
            match by_value.get(&candidate.value) {
                Some(&slot) => {
                    let existing = &mut ranked[slot];
                    existing.quality = existing.quality.min(quality);
                    if candidate.priority > existing.candidate.priority {
                        existing.candidate = candidate;
                    }
                }
                None => {
                    by_value.insert(candidate.value.clone(), ranked.len());
                    ranked.push(Ranked {
                        quality,
                        order,
                        candidate,
                    });
                }
            }
        }

        ranked.sort_by(compare);
        let limit = self.max_results.unwrap_or(usize::MAX);
        ranked
            .into_iter()
            .take(limit)
            .map(|entry| entry.candidate)
            .collect()
    }
}

fn compare(a: &Ranked, b: &Ranked) -> Ordering {
    b.candidate
        .priority
        .cmp(&a.candidate.priority)
        .then(a.quality.cmp(&b.quality))
        .then(a.order.cmp(&b.order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CandidateKind;

    fn arg(value: &str) -> Candidate {
        Candidate::new(value, CandidateKind::Argument)
    }

    fn values(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.value.as_str()).collect()
    }

    #[test]
    fn test_match_strategies() {
        assert_eq!(
            match_candidate("Global", "gl", FilterStrategy::Prefix),
            Some(MatchQuality::Prefix)
        );
        assert_eq!(
            match_candidate("Global", "gl", FilterStrategy::PrefixCaseSensitive),
            None
        );
        assert_eq!(
            match_candidate("javac", "jc", FilterStrategy::Fuzzy),
            Some(MatchQuality::Fuzzy { distance: 3 })
        );
        assert_eq!(match_candidate("jshell", "ja", FilterStrategy::Fuzzy), None);
        assert_eq!(
            match_candidate("anything", "", FilterStrategy::Fuzzy),
            Some(MatchQuality::Prefix)
        );
        assert_eq!(match_candidate("ab", "abc", FilterStrategy::Prefix), None);
    }

    #[test]
    fn test_priority_then_quality_then_order() {
        let batch = CandidateBatch::new(
            FilterStrategy::Fuzzy,
            vec![
                arg("xjava"),
                arg("jar"),
                arg("jabba"),
                arg("javac").with_priority(60),
            ],
        );
        let ranked = Ranker::default().rank(vec![batch], "ja");

        assert_eq!(values(&ranked), vec!["javac", "jar", "jabba", "xjava"]);
    }

    #[test]
    fn test_shorter_fuzzy_distance_first() {
        let batch = CandidateBatch::new(
            FilterStrategy::Fuzzy,
            vec![arg("j-long-a"), arg("j-a")],
        );
        let ranked = Ranker::default().rank(vec![batch], "ja");

        assert_eq!(values(&ranked), vec!["j-a", "j-long-a"]);
    }

    #[test]
    fn test_dedup_keeps_highest_priority_metadata() {
        let batches = vec![
            CandidateBatch::new(
                FilterStrategy::Prefix,
                vec![arg("17.0.1").with_description(Some("static".into()))],
            ),
            CandidateBatch::new(
                FilterStrategy::Prefix,
                vec![
                    arg("17.0.1")
                        .with_priority(51)
                        .with_description(Some("Java Version 17.0.1".into()))
                        .generated(),
                ],
            ),
        ];
        let ranked = Ranker::default().rank(batches, "17");

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].description.as_deref(), Some("Java Version 17.0.1"));
        assert_eq!(ranked[0].priority, 51);
    }

    #[test]
    fn test_mixed_strategies_per_batch() {
        let batches = vec![
            CandidateBatch::new(FilterStrategy::Prefix, vec![arg("--help")]),
            CandidateBatch::new(FilterStrategy::Fuzzy, vec![arg("java"), arg("hjava")]),
        ];
        let ranked = Ranker::default().rank(batches, "h");

        // "--help" is prefix-only, "java" has no 'h'
        assert_eq!(values(&ranked), vec!["hjava"]);
    }

    #[test]
    fn test_max_results() {
        let batch = CandidateBatch::new(
            FilterStrategy::Prefix,
            vec![arg("a1"), arg("a2"), arg("a3")],
        );
        let ranked = Ranker::new(Some(2)).rank(vec![batch], "a");

        assert_eq!(values(&ranked), vec!["a1", "a2"]);
    }

    #[test]
    fn test_fuzzy_results_contain_subsequence() {
        let pool = ["javadoc", "jar", "jshell", "jjs", "keytool", "ajava", "JAVA"];
        let batch = CandidateBatch::new(
            FilterStrategy::Fuzzy,
            pool.iter().map(|v| arg(v)).collect(),
        );

        for partial in ["ja", "jv", "k", "jsl", "aa"] {
            let ranked = Ranker::default().rank(vec![batch.clone()], partial);
            for candidate in &ranked {
                assert!(
                    is_subsequence(&candidate.value, partial),
                    "{} does not contain {}",
                    candidate.value,
                    partial
                );
            }
        }
    }

    #[test]
    fn test_ranking_is_idempotent() {
        let batches = vec![CandidateBatch::new(
            FilterStrategy::Fuzzy,
            vec![arg("b"), arg("ab"), arg("ba").with_priority(70), arg("ab")],
        )];

        let first = Ranker::default().rank(batches.clone(), "b");
        let second = Ranker::default().rank(batches, "b");
        assert_eq!(first, second);
    }
}
