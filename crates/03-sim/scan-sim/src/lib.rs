//! Simulated host world for the scan engine.
//!
//! `SimWorld` keeps every object in plain vectors and answers spatial searches
//! by footprint overlap. It records each output write so tests and the CLI can
//! inspect what the engine published.

pub mod entity;
pub mod error;
pub mod scenario;
pub mod world;

pub use crate::entity::{
    Placement, SimCell, SimDelivery, SimGhost, SimHazard, SimNetwork, SimScanner, SimTileGhost,
    SimUpgrade, DEFAULT_FORCE, DEFAULT_HALF_SIZE, DEFAULT_SURFACE,
};
pub use crate::error::{SimError, SimResult};
pub use crate::scenario::{load_world, Scenario};
pub use crate::world::{OutputWrite, SimWorld};
