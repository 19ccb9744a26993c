//! Candidate untranslated literals and their suppression

use crate::finding::{FindResult, SourcePosition};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

/// What happens when the same literal is matched more than once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativePolicy {
    /// Keep only the most recent match of a value
    #[default]
    LastWins,
    /// Keep every match of a value
    Aggregate,
}

/// Negative candidates keyed by captured value
#[derive(Debug, Clone, Default)]
pub struct NegativeCandidates {
    policy: NegativePolicy,
    by_value: HashMap<String, Vec<FindResult>>,
}

impl NegativeCandidates {
    pub fn new(policy: NegativePolicy) -> Self {
        Self {
            policy,
            by_value: HashMap::new(),
        }
    }

    pub fn add(&mut self, result: FindResult) {
        let entry = self.by_value.entry(result.key().to_string()).or_default();
        if self.policy == NegativePolicy::LastWins {
            entry.clear();
        }
        entry.push(result);
    }

    pub fn len(&self) -> usize {
        self.by_value.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop candidates nested in a positive match of the same file
    ///
    /// `positives` is sorted here by start offset; scanning a file's list stops
    /// at the first positive match starting after the candidate.
    pub fn suppress_nested(&mut self, positives: &mut BTreeMap<PathBuf, Vec<SourcePosition>>) {
        for list in positives.values_mut() {
            list.sort_by_key(|p| p.start);
        }
        debug_assert!(positives
            .values()
            .all(|list| list.windows(2).all(|w| w[0].start <= w[1].start)));

        for results in self.by_value.values_mut() {
            results.retain(|negative| {
                let Some(list) = positives.get(&negative.position.source) else {
                    return true;
                };
                !list
                    .iter()
                    .take_while(|p| p.start <= negative.position.start)
                    .any(|p| p.contains(&negative.position))
            });
        }
        self.by_value.retain(|_, results| !results.is_empty());
    }

    /// Drop candidates whose value is in `values`
    pub fn suppress_values(&mut self, values: &HashSet<&str>) {
        self.by_value.retain(|value, _| !values.contains(value.as_str()));
    }

    /// All remaining candidates ordered by source file, then line
    pub fn sorted(&self) -> Vec<FindResult> {
        let mut results: Vec<FindResult> = self.by_value.values().flatten().cloned().collect();
        results.sort_by(|a, b| {
            a.position
                .source
                .cmp(&b.position.source)
                .then(a.position.line.cmp(&b.position.line))
                .then(a.position.start.cmp(&b.position.start))
        });
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Finding;

    fn negative(source: &str, start: usize, end: usize, value: &str) -> FindResult {
        FindResult::new(
            SourcePosition::new(source, start, end, 1, start),
            Finding::new(value, None),
        )
    }

    fn positives(list: &[(&str, usize, usize)]) -> BTreeMap<PathBuf, Vec<SourcePosition>> {
        let mut map: BTreeMap<PathBuf, Vec<SourcePosition>> = BTreeMap::new();
        for &(source, start, end) in list {
            map.entry(PathBuf::from(source))
                .or_default()
                .push(SourcePosition::new(source, start, end, 1, start));
        }
        map
    }

    fn values(candidates: &NegativeCandidates) -> Vec<String> {
        candidates.sorted().iter().map(|r| r.key().to_string()).collect()
    }

    #[test]
    fn test_last_wins() {
        let mut candidates = NegativeCandidates::new(NegativePolicy::LastWins);
        candidates.add(negative("a.txt", 0, 5, "x"));
        candidates.add(negative("b.txt", 7, 9, "x"));

        let sorted = candidates.sorted();
        assert_eq!(sorted.len(), 1);
        assert_eq!(sorted[0].source(), PathBuf::from("b.txt"));
    }

    #[test]
    fn test_aggregate() {
        let mut candidates = NegativeCandidates::new(NegativePolicy::Aggregate);
        candidates.add(negative("b.txt", 7, 9, "x"));
        candidates.add(negative("a.txt", 0, 5, "x"));

        let sorted = candidates.sorted();
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].source(), PathBuf::from("a.txt"));
    }

    #[test]
    fn test_nested_candidate_is_suppressed() {
        let mut candidates = NegativeCandidates::default();
        candidates.add(negative("a.txt", 10, 20, "inside"));
        candidates.add(negative("a.txt", 40, 50, "outside"));

        candidates.suppress_nested(&mut positives(&[("a.txt", 5, 30)]));
        assert_eq!(values(&candidates), vec!["outside"]);
    }

    #[test]
    fn test_other_file_is_not_suppressed() {
        let mut candidates = NegativeCandidates::default();
        candidates.add(negative("b.txt", 10, 20, "inside"));

        candidates.suppress_nested(&mut positives(&[("a.txt", 5, 30)]));
        assert_eq!(values(&candidates), vec!["inside"]);
    }

    #[test]
    fn test_partial_overlap_is_not_suppressed() {
        let mut candidates = NegativeCandidates::default();
        candidates.add(negative("a.txt", 25, 35, "straddles"));

        candidates.suppress_nested(&mut positives(&[("a.txt", 5, 30)]));
        assert_eq!(values(&candidates), vec!["straddles"]);
    }

    #[test]
    fn test_unsorted_positives_are_sorted_first() {
        let mut candidates = NegativeCandidates::default();
        candidates.add(negative("a.txt", 12, 14, "late"));

        // Presented out of order: a scan that stopped at the first start > 12
        // would miss the enclosing match if the list were not sorted.
        candidates.suppress_nested(&mut positives(&[("a.txt", 50, 60), ("a.txt", 10, 20)]));
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_suppress_values() {
        let mut candidates = NegativeCandidates::default();
        candidates.add(negative("a.txt", 0, 3, "ok"));
        candidates.add(negative("a.txt", 5, 9, "ignored"));

        candidates.suppress_values(&HashSet::from(["ignored"]));
        assert_eq!(values(&candidates), vec!["ok"]);
    }
}
