//! Traits the host world implements for the scan engine, plus the plain-data
//! views its queries return.
//!
//! Every method is synchronous and is only ever called from the engine's tick,
//! so implementations need no internal locking.

use crate::geometry::{BoundingBox, Position};
use crate::item::{ItemPrototype, ItemStack, Quality, Signal};
use serde::{Deserialize, Serialize};

/// Stable numeric identity of a registered scanner.
pub type ScannerId = u64;

/// Host handle to a live entity. Handles may outlive their entity; lookups
/// then return `None`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityHandle(pub u64);

/// Surface (world layer) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u32);

/// Faction identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ForceId(pub u32);

/// Coverage cell identifier inside a logistics network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellId(pub u64);

/// Live state of a scanner device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScannerEntity {
    pub surface: SurfaceId,
    pub position: Position,
    pub force: ForceId,
}

/// Network found at a position, with its cells in enumeration order.
#[derive(Clone, Debug, PartialEq)]
pub struct LogisticNetwork {
    pub network_id: u32,
    pub force: ForceId,
    pub cells: Vec<CellId>,
}

/// Geometry of a coverage cell at the time of the lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverageCell {
    pub surface: SurfaceId,
    pub center: Position,
    pub construction_radius: f64,
}

impl CoverageCell {
    /// Square area the cell covers.
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::square(self.center, self.construction_radius)
    }
}

/// Parameters shared by all spatial searches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AreaQuery {
    pub surface: SurfaceId,
    /// Entities whose footprint overlaps this area match.
    pub area: BoundingBox,
    /// Owning faction filter. Hazard searches ignore it for matching and use it
    /// to evaluate deconstruction marks instead.
    pub force: ForceId,
    /// Maximum number of results; `None` is unlimited.
    pub limit: Option<u32>,
}

/// Terrain hazard (cliff) found by a search.
#[derive(Clone, Debug, PartialEq)]
pub struct HazardView {
    pub unit_number: Option<u64>,
    pub position: Position,
    /// Marked for deconstruction by the querying force.
    pub marked_for_removal: bool,
    /// Item consumed to clear the hazard, when it can be cleared at all.
    pub clearing_item: Option<String>,
}

/// Entity with a pending upgrade.
#[derive(Clone, Debug, PartialEq)]
pub struct UpgradeView {
    pub unit_number: u64,
    pub position: Position,
    /// Target prototype name and quality, when an upgrade target is set.
    pub target: Option<(String, Quality)>,
}

/// Placeholder entity awaiting construction.
#[derive(Clone, Debug, PartialEq)]
pub struct GhostView {
    pub unit_number: u64,
    pub position: Position,
    pub ghost_name: String,
    pub quality: Quality,
    /// Extra deliveries attached to the ghost (module inserts and the like).
    pub item_requests: Vec<ItemStack>,
}

/// Stand-alone item delivery request.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryView {
    /// Handle used to obtain a destruction-registration number.
    pub entity: EntityHandle,
    pub position: Position,
    pub item_requests: Vec<ItemStack>,
}

/// Placeholder tile awaiting construction.
#[derive(Clone, Debug, PartialEq)]
pub struct TileGhostView {
    pub unit_number: u64,
    pub position: Position,
    pub ghost_name: String,
}

/// Which prototype table a name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrototypeKind {
    Entity,
    Tile,
}

/// Spatial and network queries against the world.
pub trait WorldQuery {
    /// Returns the scanner's live state, or `None` when the handle is dead.
    fn scanner(&self, device: EntityHandle) -> Option<ScannerEntity>;

    /// True for surfaces that are not backed by a coverage network
    /// (free-floating contexts).
    fn is_free_floating(&self, surface: SurfaceId) -> bool;

    /// Finds the network covering `position` for `force`.
    fn logistic_network_at(
        &self,
        surface: SurfaceId,
        position: Position,
        force: ForceId,
    ) -> Option<LogisticNetwork>;

    /// Current geometry of a cell, or `None` once the cell is gone.
    fn coverage_cell(&self, cell: CellId) -> Option<CoverageCell>;

    fn find_hazards(&self, query: &AreaQuery) -> Vec<HazardView>;

    fn find_upgrades(&self, query: &AreaQuery) -> Vec<UpgradeView>;

    fn find_entity_ghosts(&self, query: &AreaQuery) -> Vec<GhostView>;

    fn find_delivery_requests(&self, query: &AreaQuery) -> Vec<DeliveryView>;

    fn find_tile_ghosts(&self, query: &AreaQuery) -> Vec<TileGhostView>;

    /// Registers for the entity's destruction notification and returns the
    /// registration number. Repeated calls for one entity return the same
    /// number.
    fn register_on_destroyed(&mut self, entity: EntityHandle) -> u64;
}

/// Prototype lookups.
pub trait PrototypeCatalog {
    /// Items needed to place the named prototype, unfiltered.
    fn items_to_place(&self, kind: PrototypeKind, name: &str) -> Option<Vec<ItemStack>>;

    fn item(&self, name: &str) -> Option<ItemPrototype>;
}

/// Signal output of scanner devices, organised in sections.
pub trait ScannerOutput {
    /// Whether the operator left the device's output enabled.
    fn output_enabled(&self, device: EntityHandle) -> bool;

    fn section_count(&self, device: EntityHandle) -> usize;

    /// Removes the section at `index` (0-based); later sections shift down.
    fn remove_section(&mut self, device: EntityHandle, index: usize);

    /// Appends an empty section and returns its index.
    fn add_section(&mut self, device: EntityHandle) -> usize;

    /// Replaces the filters of section `index`.
    fn set_filters(&mut self, device: EntityHandle, index: usize, filters: Vec<Signal>);
}

/// Everything the engine needs from its host.
pub trait Host: WorldQuery + PrototypeCatalog + ScannerOutput {}

impl<T: WorldQuery + PrototypeCatalog + ScannerOutput> Host for T {}
