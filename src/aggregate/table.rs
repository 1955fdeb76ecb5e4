//! Per-prefix statistics

use std::collections::HashMap;

/// Statistics for one prefix group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixStat {
    /// Group identifier, always ending in the wildcard marker
    pub prefix: String,

    /// Keys observed with this prefix (duplicates included)
    pub key_count: u64,

    /// Sum of serialized sizes of the sampled keys
    pub sampled_bytes: u64,

    /// Keys whose size was sampled
    pub sample_count: u64,
}

impl PrefixStat {
    /// Create an empty entry for `prefix`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    /// Mean sampled size, 0 when nothing was sampled
    pub fn average_bytes_per_key(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }

        self.sampled_bytes as f64 / self.sample_count as f64
    }

    /// Average sampled size extrapolated over every key in the group
    pub fn estimated_total_bytes(&self) -> u64 {
        (self.average_bytes_per_key() * self.key_count as f64).floor() as u64
    }

    /// Whether any size sample was taken
    pub fn has_samples(&self) -> bool {
        self.sample_count > 0
    }
}

/// Prefix -> statistics for a single run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregateTable {
    entries: HashMap<String, PrefixStat>,
}

impl AggregateTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry for `prefix`, created empty on first use
    pub fn entry_mut(&mut self, prefix: String) -> &mut PrefixStat {
        self.entries
            .entry(prefix)
            .or_insert_with_key(|p| PrefixStat::new(p.as_str()))
    }

    /// Look up a prefix
    pub fn get(&self, prefix: &str) -> Option<&PrefixStat> {
        self.entries.get(prefix)
    }

    /// Number of distinct prefixes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no key has been recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in no particular order
    pub fn iter(&self) -> impl Iterator<Item = &PrefixStat> {
        self.entries.values()
    }

    /// Keys recorded across all prefixes
    pub fn total_keys(&self) -> u64 {
        self.entries.values().map(|s| s.key_count).sum()
    }

    /// Sampled bytes across all prefixes
    pub fn total_sampled_bytes(&self) -> u64 {
        self.entries.values().map(|s| s.sampled_bytes).sum()
    }
}
