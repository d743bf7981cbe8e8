//! Tick-driven scan scheduler.

use crate::config::{ScanSettings, SettingChange};
use crate::error::EngineResult;
use crate::items::ItemsToPlaceCache;
use crate::region::{self, Resolution};
use crate::report;
use crate::store::{ScanStore, ScannerRecord};
use crate::walker;
use log::{debug, trace, warn};
use scan_abi::{EntityHandle, Host, ScannerId, WorldQuery};
use serde::Serialize;
use smallvec::SmallVec;

/// Why a scanner's pass ended without a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbortReason {
    /// No coverage network and not free-floating.
    Unscannable,
    /// The device handle no longer resolves; the scanner was unregistered.
    Invalidated,
    /// The operator disabled the device's output.
    Disabled,
}

/// Where a scanner is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScannerPhase {
    /// Not registered.
    Unknown,
    /// Registered, waiting for admission.
    Idle,
    /// Pass in progress with `remaining` sub-regions queued.
    Scanning { remaining: usize },
}

/// What happened during one call to [`ScanEngine::tick`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    /// Scheduler work ran this tick.
    pub on_cadence: bool,
    /// Scanner whose pass started or was aborted at admission. A pick that
    /// still has a pass running is not reported.
    pub admitted: Option<ScannerId>,
    pub regions_drained: u32,
    /// Scanners whose report was published.
    pub completed: SmallVec<[ScannerId; 4]>,
    pub aborted: SmallVec<[(ScannerId, AbortReason); 4]>,
}

impl TickSummary {
    pub fn is_quiet(&self) -> bool {
        self.admitted.is_none()
            && self.regions_drained == 0
            && self.completed.is_empty()
            && self.aborted.is_empty()
    }
}

/// The scan engine: settings, persistent store, and item lookup cache.
#[derive(Debug)]
pub struct ScanEngine {
    settings: ScanSettings,
    store: ScanStore,
    items: ItemsToPlaceCache,
}

impl ScanEngine {
    pub fn new(settings: ScanSettings) -> EngineResult<Self> {
        Self::with_store(settings, ScanStore::new())
    }

    /// Builds an engine over existing state without checking handles.
    pub fn with_store(settings: ScanSettings, store: ScanStore) -> EngineResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            store,
            items: ItemsToPlaceCache::new(),
        })
    }

    /// Builds an engine over loaded state, dropping scanners whose device no
    /// longer exists.
    pub fn restore<W>(settings: ScanSettings, store: ScanStore, world: &W) -> EngineResult<Self>
    where
        W: WorldQuery + ?Sized,
    {
        let mut engine = Self::with_store(settings, store)?;
        let dead: Vec<ScannerId> = engine
            .store
            .scanners()
            .iter()
            .filter(|record| world.scanner(record.entity).is_none())
            .map(|record| record.id)
            .collect();
        for id in dead {
            warn!("scanner {id}: device gone after load, dropping");
            engine.store.remove_scanner(id);
        }
        Ok(engine)
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    pub fn store(&self) -> &ScanStore {
        &self.store
    }

    pub fn scanners(&self) -> &[ScannerRecord] {
        self.store.scanners()
    }

    pub fn phase(&self, id: ScannerId) -> ScannerPhase {
        if self.store.scanner(id).is_none() {
            return ScannerPhase::Unknown;
        }
        match self.store.pass(id) {
            Some(pass) => ScannerPhase::Scanning {
                remaining: pass.regions.len(),
            },
            None => ScannerPhase::Idle,
        }
    }

    /// Registers every scanner the host already knows about. Returns how many
    /// were new.
    pub fn adopt_existing<I>(&mut self, scanners: I) -> usize
    where
        I: IntoIterator<Item = (ScannerId, EntityHandle)>,
    {
        let adopted = scanners
            .into_iter()
            .filter(|&(id, entity)| self.on_scanner_added(id, entity))
            .count();
        debug!("adopted {adopted} existing scanner(s)");
        adopted
    }

    pub fn on_scanner_added(&mut self, id: ScannerId, entity: EntityHandle) -> bool {
        let added = self.store.add_scanner(ScannerRecord { id, entity });
        if added {
            debug!("scanner {id}: registered (entity {})", entity.0);
        }
        added
    }

    /// Unregisters a scanner, discarding any pass in progress without a
    /// report.
    pub fn on_scanner_removed(&mut self, id: ScannerId) -> bool {
        let removed = self.store.remove_scanner(id).is_some();
        if removed {
            debug!("scanner {id}: removed");
        }
        removed
    }

    /// Applies a live settings change. Flipping `show-hidden` drops the item
    /// cache.
    pub fn on_settings_changed(&mut self, change: &SettingChange) -> EngineResult<()> {
        let show_hidden = self.settings.show_hidden;
        self.settings.apply(change)?;
        debug!("setting {} = {}", change.name, change.value);
        if show_hidden != self.settings.show_hidden {
            self.items.clear();
        }
        Ok(())
    }

    /// Resets transient state after the host's content changed. Scanner
    /// membership, cursor, and cooldown survive.
    pub fn on_configuration_changed(&mut self) {
        debug!(
            "configuration changed: dropping {} pass(es)",
            self.store.passes().len()
        );
        self.store.clear_passes();
        self.items.clear();
    }

    /// Runs one simulation step.
    pub fn tick<H>(&mut self, tick: u64, host: &mut H) -> TickSummary
    where
        H: Host + ?Sized,
    {
        let mut summary = TickSummary {
            tick,
            ..TickSummary::default()
        };

        let release_every = u64::from(self.settings.update_interval) + 1;
        if tick % release_every == 0 && self.store.in_cooldown() {
            trace!("tick {tick}: cooldown released");
            self.store.release_cooldown();
        }

        let delay = u64::from(self.settings.scan_areas_delay.max(1));
        if tick % delay != 0 {
            return summary;
        }
        summary.on_cadence = true;
        self.store.reset_budget();

        if !self.store.in_cooldown() {
            self.admit(host, &mut summary);
        }
        self.drain(host, &mut summary);
        summary
    }

    fn admit<H>(&mut self, host: &mut H, summary: &mut TickSummary)
    where
        H: Host + ?Sized,
    {
        let Some(record) = self.store.advance_cursor() else {
            debug!("round-robin wrapped, cooling down");
            return;
        };
        let Some(entity) = host.scanner(record.entity) else {
            summary.admitted = Some(record.id);
            self.invalidate(record.id, summary);
            return;
        };
        if !host.output_enabled(record.entity) {
            debug!("scanner {}: output disabled, aborting", record.id);
            summary.admitted = Some(record.id);
            report::clear_output(host, record.entity);
            self.store.discard_pass(record.id);
            summary.aborted.push((record.id, AbortReason::Disabled));
            return;
        }
        if self.store.pass(record.id).is_some() {
            trace!("scanner {}: pass still running, skipped", record.id);
            return;
        }

        summary.admitted = Some(record.id);
        match region::resolve(&*host, record.id, &entity) {
            Resolution::Covered(pass) => {
                debug!(
                    "scanner {}: admitted with {} region(s)",
                    record.id,
                    pass.regions.len()
                );
                self.store.install_pass(pass);
            }
            Resolution::Unscannable => {
                report::clear_output(host, record.entity);
                self.store.discard_pass(record.id);
                summary.aborted.push((record.id, AbortReason::Unscannable));
            }
        }
    }

    /// Drains sub-regions across all running passes, oldest first, until the
    /// per-tick budget is spent.
    fn drain<H>(&mut self, host: &mut H, summary: &mut TickSummary)
    where
        H: Host + ?Sized,
    {
        while let Some(id) = self.store.next_exhausted() {
            self.complete(id, host, summary);
        }

        let limit = self.settings.areas_per_tick;
        while let Some(id) = self.store.next_pending() {
            if !self.store.try_consume_budget(limit) {
                trace!("budget of {limit} spent, deferring");
                break;
            }
            let Some(pass) = self.store.pass_mut(id) else {
                break;
            };
            let Some(region) = pass.regions.pop_front() else {
                continue;
            };
            let outcome = walker::scan_region(host, pass, region, &mut self.items, &self.settings);
            trace!(
                "scanner {id}: region {:?} counted {} duplicate {}",
                region,
                outcome.counted,
                outcome.duplicates
            );
            summary.regions_drained += 1;
            if pass.is_exhausted() {
                self.complete(id, host, summary);
            }
        }
    }

    fn complete<H>(&mut self, id: ScannerId, host: &mut H, summary: &mut TickSummary)
    where
        H: Host + ?Sized,
    {
        let Some(pass) = self.store.discard_pass(id) else {
            return;
        };
        let Some(record) = self.store.scanner(id).copied() else {
            return;
        };
        if host.scanner(record.entity).is_none() {
            self.invalidate(id, summary);
            return;
        }
        let signals = report::finalize(pass.aggregate, &*host, &self.settings);
        debug!(
            "scanner {id}: pass complete, {} signal(s), {} intent(s)",
            signals.len(),
            pass.ledger.len()
        );
        report::publish(host, record.entity, signals);
        summary.completed.push(id);
    }

    fn invalidate(&mut self, id: ScannerId, summary: &mut TickSummary) {
        warn!("scanner {id}: device no longer valid, unregistering");
        self.store.remove_scanner(id);
        summary.aborted.push((id, AbortReason::Invalidated));
    }
}
