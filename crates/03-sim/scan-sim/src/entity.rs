//! Simulated world objects. Each one is plain serde data so scenarios can be
//! written as JSON.

use scan_abi::{
    BoundingBox, CellId, EntityHandle, ForceId, ItemStack, Position, Quality, ScannerId,
    SurfaceId,
};
use serde::{Deserialize, Serialize};

/// Surface used when a scenario does not name one.
pub const DEFAULT_SURFACE: SurfaceId = SurfaceId(1);
/// Force used when a scenario does not name one.
pub const DEFAULT_FORCE: ForceId = ForceId(1);
/// Half-width of an entity footprint when none is given.
pub const DEFAULT_HALF_SIZE: f64 = 0.5;

fn default_surface() -> SurfaceId {
    DEFAULT_SURFACE
}

fn default_force() -> ForceId {
    DEFAULT_FORCE
}

fn default_half_size() -> f64 {
    DEFAULT_HALF_SIZE
}

fn enabled() -> bool {
    true
}

/// Where an object sits and who owns it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Placement {
    #[serde(default = "default_surface")]
    pub surface: SurfaceId,
    #[serde(default = "default_force")]
    pub force: ForceId,
    pub position: Position,
    #[serde(default = "default_half_size")]
    pub half_size: f64,
}

impl Placement {
    pub fn at(position: Position) -> Self {
        Self {
            surface: DEFAULT_SURFACE,
            force: DEFAULT_FORCE,
            position,
            half_size: DEFAULT_HALF_SIZE,
        }
    }

    pub fn footprint(&self) -> BoundingBox {
        BoundingBox::square(self.position, self.half_size)
    }
}

/// Scanner device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimScanner {
    pub id: ScannerId,
    pub entity: EntityHandle,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl SimScanner {
    pub fn new(id: ScannerId, entity: EntityHandle, position: Position) -> Self {
        Self {
            id,
            entity,
            placement: Placement::at(position),
            enabled: true,
        }
    }

    pub fn on(mut self, surface: SurfaceId, force: ForceId) -> Self {
        self.placement.surface = surface;
        self.placement.force = force;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Coverage cell of a network.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimCell {
    pub id: CellId,
    pub center: Position,
    pub radius: f64,
}

impl SimCell {
    pub fn new(id: u64, center: Position, radius: f64) -> Self {
        Self {
            id: CellId(id),
            center,
            radius,
        }
    }
}

/// Logistics network with its cells in enumeration order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimNetwork {
    pub id: u32,
    #[serde(default = "default_surface")]
    pub surface: SurfaceId,
    #[serde(default = "default_force")]
    pub force: ForceId,
    pub cells: Vec<SimCell>,
}

impl SimNetwork {
    pub fn new(id: u32, cells: impl IntoIterator<Item = SimCell>) -> Self {
        Self {
            id,
            surface: DEFAULT_SURFACE,
            force: DEFAULT_FORCE,
            cells: cells.into_iter().collect(),
        }
    }

    pub fn on(mut self, surface: SurfaceId, force: ForceId) -> Self {
        self.surface = surface;
        self.force = force;
        self
    }
}

/// Terrain hazard, possibly marked for removal by some forces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimHazard {
    #[serde(default)]
    pub unit_number: Option<u64>,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub marked_by: Vec<ForceId>,
    #[serde(default)]
    pub clearing_item: Option<String>,
}

impl SimHazard {
    /// Hazard without a unit number, marked by the default force.
    pub fn new(position: Position, clearing_item: &str) -> Self {
        Self {
            unit_number: None,
            placement: Placement::at(position),
            marked_by: vec![DEFAULT_FORCE],
            clearing_item: Some(clearing_item.to_owned()),
        }
    }
}

/// Entity carrying an upgrade order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimUpgrade {
    pub unit_number: u64,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub target_quality: Quality,
}

impl SimUpgrade {
    pub fn new(unit_number: u64, position: Position, target: &str) -> Self {
        Self {
            unit_number,
            placement: Placement::at(position),
            target: Some(target.to_owned()),
            target_quality: Quality::base(),
        }
    }

    pub fn quality(mut self, quality: &str) -> Self {
        self.target_quality = Quality::new(quality);
        self
    }
}

/// Ghost entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimGhost {
    pub unit_number: u64,
    #[serde(flatten)]
    pub placement: Placement,
    pub name: String,
    #[serde(default)]
    pub quality: Quality,
    #[serde(default)]
    pub item_requests: Vec<ItemStack>,
}

impl SimGhost {
    pub fn new(unit_number: u64, position: Position, name: &str) -> Self {
        Self {
            unit_number,
            placement: Placement::at(position),
            name: name.to_owned(),
            quality: Quality::base(),
            item_requests: Vec::new(),
        }
    }

    pub fn quality(mut self, quality: &str) -> Self {
        self.quality = Quality::new(quality);
        self
    }

    pub fn request(mut self, stack: ItemStack) -> Self {
        self.item_requests.push(stack);
        self
    }

    pub fn half_size(mut self, half_size: f64) -> Self {
        self.placement.half_size = half_size;
        self
    }
}

/// Stand-alone item delivery request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimDelivery {
    pub entity: EntityHandle,
    #[serde(flatten)]
    pub placement: Placement,
    pub items: Vec<ItemStack>,
}

impl SimDelivery {
    pub fn new(entity: u64, position: Position, items: impl IntoIterator<Item = ItemStack>) -> Self {
        Self {
            entity: EntityHandle(entity),
            placement: Placement::at(position),
            items: items.into_iter().collect(),
        }
    }
}

/// Ghost tile.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SimTileGhost {
    pub unit_number: u64,
    #[serde(flatten)]
    pub placement: Placement,
    pub name: String,
}

impl SimTileGhost {
    pub fn new(unit_number: u64, position: Position, name: &str) -> Self {
        Self {
            unit_number,
            placement: Placement::at(position),
            name: name.to_owned(),
        }
    }
}
