//! Cross-tick engine state, keyed by scanner identity.
//!
//! Everything here is plain data so a host can persist it between sessions.
//! Entity handles are the only live references and must be re-validated after
//! loading (see [`crate::ScanEngine::restore`]).

use crate::aggregate::SignalAggregate;
use crate::error::EngineResult;
use crate::ledger::DedupLedger;
use scan_abi::{BoundingBox, CellId, EntityHandle, ForceId, ScannerId, SurfaceId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Registered scanner device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerRecord {
    pub id: ScannerId,
    pub entity: EntityHandle,
}

/// One unit of scan work.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubRegion {
    /// Coverage cell of a network; its geometry is looked up when drained.
    Cell(CellId),
    /// Fixed area, used for free-floating contexts.
    Area(BoundingBox),
}

/// In-progress pass of one scanner: remaining regions, dedup ledger, and
/// running aggregate. The three are created and dropped together.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanPass {
    pub scanner: ScannerId,
    pub surface: SurfaceId,
    pub force: ForceId,
    pub regions: VecDeque<SubRegion>,
    pub ledger: DedupLedger,
    pub aggregate: SignalAggregate,
}

impl ScanPass {
    pub fn new(
        scanner: ScannerId,
        surface: SurfaceId,
        force: ForceId,
        regions: impl IntoIterator<Item = SubRegion>,
    ) -> Self {
        Self {
            scanner,
            surface,
            force,
            regions: regions.into_iter().collect(),
            ledger: DedupLedger::new(),
            aggregate: SignalAggregate::new(),
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Persistent engine state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanStore {
    scanners: Vec<ScannerRecord>,
    /// Active passes, oldest admission first.
    passes: Vec<ScanPass>,
    cursor: usize,
    cooldown: bool,
    budget_used: u32,
}

impl ScanStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> EngineResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Registered scanners in registration order.
    pub fn scanners(&self) -> &[ScannerRecord] {
        &self.scanners
    }

    pub fn scanner(&self, id: ScannerId) -> Option<&ScannerRecord> {
        self.scanners.iter().find(|record| record.id == id)
    }

    /// Appends a scanner; returns `false` if the identity is already known.
    pub fn add_scanner(&mut self, record: ScannerRecord) -> bool {
        if self.scanner(record.id).is_some() {
            return false;
        }
        self.scanners.push(record);
        true
    }

    /// Unregisters a scanner and drops its pass. The cursor is left alone.
    pub fn remove_scanner(&mut self, id: ScannerId) -> Option<ScannerRecord> {
        self.discard_pass(id);
        let index = self.scanners.iter().position(|record| record.id == id)?;
        Some(self.scanners.remove(index))
    }

    pub fn passes(&self) -> &[ScanPass] {
        &self.passes
    }

    pub fn pass(&self, id: ScannerId) -> Option<&ScanPass> {
        self.passes.iter().find(|pass| pass.scanner == id)
    }

    pub fn pass_mut(&mut self, id: ScannerId) -> Option<&mut ScanPass> {
        self.passes.iter_mut().find(|pass| pass.scanner == id)
    }

    /// Installs a fresh pass, discarding any previous one for that scanner.
    pub fn install_pass(&mut self, pass: ScanPass) {
        self.discard_pass(pass.scanner);
        self.passes.push(pass);
    }

    /// Drops a scanner's pass with its ledger and aggregate.
    pub fn discard_pass(&mut self, id: ScannerId) -> Option<ScanPass> {
        let index = self.passes.iter().position(|pass| pass.scanner == id)?;
        Some(self.passes.remove(index))
    }

    pub fn clear_passes(&mut self) {
        self.passes.clear();
    }

    /// Identity of the oldest pass that still has regions queued.
    pub(crate) fn next_pending(&self) -> Option<ScannerId> {
        self.passes
            .iter()
            .find(|pass| !pass.is_exhausted())
            .map(|pass| pass.scanner)
    }

    /// Identity of the oldest pass with nothing left to drain.
    pub(crate) fn next_exhausted(&self) -> Option<ScannerId> {
        self.passes
            .iter()
            .find(|pass| pass.is_exhausted())
            .map(|pass| pass.scanner)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn in_cooldown(&self) -> bool {
        self.cooldown
    }

    pub(crate) fn release_cooldown(&mut self) {
        self.cooldown = false;
    }

    /// Picks the scanner the cursor points at and advances it. When the
    /// cursor has run past the end it wraps, the cooldown starts, and `None`
    /// is returned.
    pub(crate) fn advance_cursor(&mut self) -> Option<ScannerRecord> {
        if self.cursor >= self.scanners.len() {
            self.cursor = 0;
            self.cooldown = true;
            return None;
        }
        let record = self.scanners[self.cursor];
        self.cursor += 1;
        Some(record)
    }

    pub fn budget_used(&self) -> u32 {
        self.budget_used
    }

    pub(crate) fn reset_budget(&mut self) {
        self.budget_used = 0;
    }

    /// Takes one unit of the per-tick budget if any is left.
    pub(crate) fn try_consume_budget(&mut self, limit: u32) -> bool {
        if self.budget_used >= limit {
            return false;
        }
        self.budget_used += 1;
        true
    }
}
