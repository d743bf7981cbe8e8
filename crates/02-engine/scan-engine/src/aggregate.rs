//! Signed per-item-quality accumulation for one pass.

use scan_abi::{ItemKey, Quality, Signal};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Running totals in first-seen order.
///
/// The key index is rebuilt on demand, so only the ordered entries are
/// persisted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SignalAggregate {
    entries: Vec<Signal>,
    #[serde(skip)]
    index: HashMap<ItemKey, usize>,
}

impl PartialEq for SignalAggregate {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl SignalAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` to the (item, quality) total, negating it first when
    /// `invert` is set. A missing quality counts as the base tier.
    pub fn add(&mut self, item: &str, quantity: i64, quality: Option<&Quality>, invert: bool) {
        let key = ItemKey::new(item, Quality::or_base(quality));
        let slot = self.slot(key);
        let delta = if invert { -quantity } else { quantity };
        self.entries[slot].count += delta;
    }

    /// Total for `key`, if it was ever touched this pass.
    pub fn get(&self, key: &ItemKey) -> Option<i64> {
        self.entries
            .iter()
            .find(|entry| entry.item == key.item && entry.quality == key.quality)
            .map(|entry| entry.count)
    }

    pub fn entries(&self) -> &[Signal] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the aggregate, yielding the ordered entries.
    pub fn into_signals(self) -> Vec<Signal> {
        self.entries
    }

    fn slot(&mut self, key: ItemKey) -> usize {
        if self.index.len() != self.entries.len() {
            self.reindex();
        }
        if let Some(&slot) = self.index.get(&key) {
            return slot;
        }
        let slot = self.entries.len();
        self.entries.push(Signal::new(key.clone(), 0));
        self.index.insert(key, slot);
        slot
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.key(), slot))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gear() -> ItemKey {
        ItemKey::new("gear", Quality::base())
    }

    #[test]
    fn repeated_adds_update_in_place() {
        let mut agg = SignalAggregate::new();
        agg.add("gear", -2, None, false);
        agg.add("plate", 5, None, false);
        agg.add("gear", -3, Some(&Quality::base()), false);

        assert_eq!(agg.len(), 2);
        assert_eq!(agg.entries()[0].item, "gear");
        assert_eq!(agg.get(&gear()), Some(-5));
    }

    #[test]
    fn qualities_are_separate_entries() {
        let mut agg = SignalAggregate::new();
        agg.add("gear", 1, None, false);
        agg.add("gear", 1, Some(&Quality::new("rare")), false);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.get(&ItemKey::new("gear", Quality::new("rare"))), Some(1));
    }

    #[test]
    fn entries_survive_crossing_zero() {
        let mut agg = SignalAggregate::new();
        agg.add("gear", 2, None, false);
        agg.add("gear", -2, None, false);
        assert_eq!(agg.get(&gear()), Some(0));
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn inversion_negates_contribution() {
        let mut agg = SignalAggregate::new();
        agg.add("gear", -2, None, true);
        assert_eq!(agg.get(&gear()), Some(2));
    }

    #[test]
    fn index_is_rebuilt_after_deserialisation() {
        let mut agg = SignalAggregate::new();
        agg.add("gear", 1, None, false);
        agg.add("plate", 1, None, false);

        let json = serde_json::to_string(&agg).unwrap();
        let mut restored: SignalAggregate = serde_json::from_str(&json).unwrap();
        restored.add("plate", 4, None, false);

        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.get(&ItemKey::new("plate", Quality::base())),
            Some(5)
        );
    }
}
