//! Measurement-outcome counts

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// Counts of observed outcome bitstrings across shots.
///
/// Keys are unique bitstrings (position i is qubit i) and the counts sum to
/// the number of shots recorded. Merging is commutative and associative, so
/// shots can be counted in any order or in parallel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotDistribution {
    counts: HashMap<String, usize>,
}

impl ShotDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a distribution from explicit `(bitstring, count)` pairs
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut distribution = Self::new();
        for (outcome, count) in counts {
            distribution.record_many(outcome.into(), count);
        }
        distribution
    }

    /// Record one observation of `outcome`
    pub fn record(&mut self, outcome: String) {
        self.record_many(outcome, 1);
    }

    fn record_many(&mut self, outcome: String, count: usize) {
        if count > 0 {
            *self.counts.entry(outcome).or_insert(0) += count;
        }
    }

    /// Fold another distribution's counts into this one
    pub fn merge(mut self, other: ShotDistribution) -> ShotDistribution {
        for (outcome, count) in other.counts {
            self.record_many(outcome, count);
        }
        self
    }

    pub fn get(&self, outcome: &str) -> usize {
        self.counts.get(outcome).copied().unwrap_or(0)
    }

    pub fn contains(&self, outcome: &str) -> bool {
        self.counts.contains_key(outcome)
    }

    /// Number of distinct outcomes
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of shots recorded
    pub fn total_shots(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Outcomes by descending count, ties by ascending bitstring
    pub fn sorted_by_count(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }

    /// The `k` most frequent outcomes
    pub fn top(&self, k: usize) -> Vec<(&str, usize)> {
        let mut entries = self.sorted_by_count();
        entries.truncate(k);
        entries
    }

    /// The most frequent outcome, ties going to the smaller bitstring
    pub fn most_frequent(&self) -> Option<&str> {
        self.iter()
            .min_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
            .map(|(outcome, _)| outcome)
    }
}

impl fmt::Display for ShotDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (outcome, count)) in self.sorted_by_count().into_iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}: {}", outcome, count)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_adds_counts() {
        let a = ShotDistribution::from_counts([("01", 3), ("10", 1)]);
        let b = ShotDistribution::from_counts([("10", 2), ("11", 4)]);
        let merged = a.clone().merge(b.clone());
        assert_eq!(merged.get("01"), 3);
        assert_eq!(merged.get("10"), 3);
        assert_eq!(merged.get("11"), 4);
        assert_eq!(merged.total_shots(), 10);
        assert_eq!(merged, b.merge(a));
    }

    #[test]
    fn ordering_breaks_ties_by_bitstring() {
        let dist = ShotDistribution::from_counts([("11", 5), ("01", 5), ("00", 2)]);
        assert_eq!(dist.sorted_by_count(), vec![("01", 5), ("11", 5), ("00", 2)]);
        assert_eq!(dist.most_frequent(), Some("01"));
        assert_eq!(dist.top(1), vec![("01", 5)]);
    }

    #[test]
    fn zero_counts_are_not_keys() {
        let dist = ShotDistribution::from_counts([("0", 0), ("1", 2)]);
        assert_eq!(dist.len(), 1);
        assert!(!dist.contains("0"));
        assert_eq!(dist.to_string(), "{\"1\": 2}");
    }

    #[test]
    fn empty_has_no_mode() {
        assert_eq!(ShotDistribution::new().most_frequent(), None);
    }
}
