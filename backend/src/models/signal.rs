//! Signals
//!
//! A signal is the transient output of the policies of one block during one
//! substep. Policy outputs are merged additively: a key written by several
//! policies resolves to the sum of their contributions, and a key nobody
//! wrote resolves to the default supplied by the reader.

use std::collections::BTreeMap;

/// Merged policy output for one substep.
///
/// # Example
///
/// ```rust
/// use tokenomics_simulator_core_rs::Signal;
///
/// let mut merged: Signal<&str> = Signal::new();
/// merged.merge(Signal::from_pairs([("block_reward", 3.0)]));
/// merged.merge(Signal::from_pairs([("block_reward", 4.5), ("fund_balance", -3.0)]));
///
/// assert_eq!(merged.get_or(&"block_reward", 0.0), 7.5);
/// assert_eq!(merged.get_or(&"burnt_balance", 0.0), 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signal<K: Ord> {
    values: BTreeMap<K, f64>,
}

impl<K: Ord> Default for Signal<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Ord> Signal<K> {
    /// Create an empty signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a signal from key/value pairs.
    ///
    /// Repeated keys are summed, the same as merging single-key signals.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        let mut signal = Self::new();
        for (key, value) in pairs {
            signal.add(key, value);
        }
        signal
    }

    /// Add `value` to the entry for `key`
    pub fn add(&mut self, key: K, value: f64) {
        *self.values.entry(key).or_insert(0.0) += value;
    }

    /// Builder form of [`Signal::add`]
    pub fn with(mut self, key: K, value: f64) -> Self {
        self.add(key, value);
        self
    }

    /// Fold another policy's output into this one by summation
    pub fn merge(&mut self, other: Signal<K>) {
        for (key, value) in other.values {
            self.add(key, value);
        }
    }

    /// Value for `key`, if any policy wrote it
    pub fn get(&self, key: &K) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Value for `key`, or `default` when no policy wrote it
    pub fn get_or(&self, key: &K, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    /// Whether any policy wrote `key`
    pub fn contains(&self, key: &K) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no policy produced output
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_disjoint_keys_is_union() {
        let mut merged: Signal<&str> = Signal::from_pairs([("a", 1.0)]);
        merged.merge(Signal::from_pairs([("b", 2.0)]));

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get(&"a"), Some(1.0));
        assert_eq!(merged.get(&"b"), Some(2.0));
    }

    #[test]
    fn test_cancelling_contributions_resolve_to_zero() {
        let mut merged: Signal<&str> = Signal::from_pairs([("a", 4.0)]);
        merged.merge(Signal::from_pairs([("a", -4.0)]));

        // Key is still present, it just nets to zero
        assert!(merged.contains(&"a"));
        assert_eq!(merged.get_or(&"a", 99.0), 0.0);
    }

    #[test]
    fn test_from_pairs_sums_repeated_keys() {
        let signal: Signal<&str> = Signal::from_pairs([("a", 1.0), ("a", 2.0)]);
        assert_eq!(signal.get(&"a"), Some(3.0));
    }
}
