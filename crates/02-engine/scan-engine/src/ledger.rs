//! Per-pass deduplication of intents.

use scan_abi::PositionKey;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Key under which an intent is deduplicated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntentIdentity {
    /// Stable unit number.
    Unit(u64),
    /// World position, for intents without a unit number.
    Position(PositionKey),
    /// Destruction-registration number.
    Registration(u64),
}

/// Intents already tallied during the current pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DedupLedger {
    seen: HashSet<IntentIdentity>,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `identity`; returns `false` if it was already counted.
    pub fn insert(&mut self, identity: IntentIdentity) -> bool {
        self.seen.insert(identity)
    }

    pub fn contains(&self, identity: &IntentIdentity) -> bool {
        self.seen.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
