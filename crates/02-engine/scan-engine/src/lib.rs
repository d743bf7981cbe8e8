//! Incremental scan-and-aggregate engine.
//!
//! Scanners are admitted one at a time on a fixed cadence. Each admitted
//! scanner gets a queue of sub-regions which are drained under a global
//! per-tick budget. Every sub-region is searched for outstanding intents
//! (hazard clearance, upgrades, ghosts, deliveries, ghost tiles) whose signed
//! material requirements accumulate in a per-pass aggregate. When the queue
//! empties the aggregate is rounded and published to the scanner's output.
//!
//! All cross-tick state lives in [`ScanStore`], which serialises to JSON.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod intent;
pub mod items;
pub mod ledger;
pub mod region;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod walker;

pub use crate::aggregate::SignalAggregate;
pub use crate::config::{ScanSettings, SettingChange, SettingName, SettingValue};
pub use crate::error::{EngineError, EngineResult};
pub use crate::intent::{Intent, IntentKind, Requirement};
pub use crate::ledger::{DedupLedger, IntentIdentity};
pub use crate::region::FREE_FLOATING_RADIUS;
pub use crate::scheduler::{AbortReason, ScanEngine, ScannerPhase, TickSummary};
pub use crate::store::{ScanPass, ScanStore, ScannerRecord, SubRegion};
pub use crate::walker::INNER_AREA_EPSILON;
