//! Outstanding intents and the material requirements they carry.

use crate::items::ItemsToPlaceCache;
use crate::ledger::IntentIdentity;
use scan_abi::{
    DeliveryView, GhostView, HazardView, ItemStack, Position, PrototypeCatalog, PrototypeKind,
    Quality, TileGhostView, UpgradeView,
};
use smallvec::SmallVec;

/// Quantity contributed per cleared hazard.
pub const HAZARD_CLEARING_COST: i64 = 1;

/// Intent categories, in the order a region is searched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntentKind {
    HazardClearance,
    Upgrade,
    Construction,
    Delivery,
    TileConstruction,
}

impl IntentKind {
    pub const SCAN_ORDER: [IntentKind; 5] = [
        IntentKind::HazardClearance,
        IntentKind::Upgrade,
        IntentKind::Construction,
        IntentKind::Delivery,
        IntentKind::TileConstruction,
    ];

    /// Categories searched in the shrunk inner area. The others use the full
    /// area plus a containment check on each result's position.
    pub fn uses_inner_area(self) -> bool {
        matches!(
            self,
            IntentKind::HazardClearance | IntentKind::Delivery | IntentKind::TileConstruction
        )
    }
}

/// One signed (item, quality, quantity) contribution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Requirement {
    pub item: String,
    /// `None` means the base tier.
    pub quality: Option<Quality>,
    pub quantity: i64,
}

impl Requirement {
    fn new(item: &str, quality: Option<Quality>, quantity: i64) -> Self {
        Self {
            item: item.to_owned(),
            quality,
            quantity,
        }
    }
}

pub type Requirements = SmallVec<[Requirement; 8]>;

/// An unresolved construction, removal, or delivery action.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Hazard marked for removal that can be cleared with an item.
    HazardClearance {
        identity: IntentIdentity,
        clearing_item: String,
    },
    /// Entity waiting to be upgraded to `target`.
    Upgrade {
        identity: IntentIdentity,
        position: Position,
        target: String,
        quality: Quality,
    },
    /// Ghost entity, possibly with attached item requests.
    Construction {
        identity: IntentIdentity,
        position: Position,
        ghost: String,
        quality: Quality,
        requests: Vec<ItemStack>,
    },
    /// Stand-alone delivery request.
    Delivery {
        identity: IntentIdentity,
        requests: Vec<ItemStack>,
    },
    /// Ghost tile.
    TileConstruction {
        identity: IntentIdentity,
        tile: String,
    },
}

impl Intent {
    /// Returns a clearance intent when the hazard is marked and clearable.
    pub fn from_hazard(view: HazardView) -> Option<Self> {
        if !view.marked_for_removal {
            return None;
        }
        let clearing_item = view.clearing_item?;
        let identity = match view.unit_number {
            Some(unit) => IntentIdentity::Unit(unit),
            None => IntentIdentity::Position(view.position.key()),
        };
        Some(Intent::HazardClearance {
            identity,
            clearing_item,
        })
    }

    /// Returns an upgrade intent when the entity has an upgrade target.
    pub fn from_upgrade(view: UpgradeView) -> Option<Self> {
        let (target, quality) = view.target?;
        Some(Intent::Upgrade {
            identity: IntentIdentity::Unit(view.unit_number),
            position: view.position,
            target,
            quality,
        })
    }

    pub fn from_ghost(view: GhostView) -> Self {
        Intent::Construction {
            identity: IntentIdentity::Unit(view.unit_number),
            position: view.position,
            ghost: view.ghost_name,
            quality: view.quality,
            requests: view.item_requests,
        }
    }

    /// `registration` is the destruction-registration number of the request.
    pub fn from_delivery(view: DeliveryView, registration: u64) -> Self {
        Intent::Delivery {
            identity: IntentIdentity::Registration(registration),
            requests: view.item_requests,
        }
    }

    pub fn from_tile_ghost(view: TileGhostView) -> Self {
        Intent::TileConstruction {
            identity: IntentIdentity::Unit(view.unit_number),
            tile: view.ghost_name,
        }
    }

    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::HazardClearance { .. } => IntentKind::HazardClearance,
            Intent::Upgrade { .. } => IntentKind::Upgrade,
            Intent::Construction { .. } => IntentKind::Construction,
            Intent::Delivery { .. } => IntentKind::Delivery,
            Intent::TileConstruction { .. } => IntentKind::TileConstruction,
        }
    }

    pub fn identity(&self) -> IntentIdentity {
        match self {
            Intent::HazardClearance { identity, .. }
            | Intent::Upgrade { identity, .. }
            | Intent::Construction { identity, .. }
            | Intent::Delivery { identity, .. }
            | Intent::TileConstruction { identity, .. } => *identity,
        }
    }

    /// Position that must lie inside the nominal region, for the categories
    /// searched in the full area.
    pub fn anchor(&self) -> Option<Position> {
        match self {
            Intent::Upgrade { position, .. } | Intent::Construction { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }

    /// Signed contributions of this intent.
    ///
    /// Ghost entities, ghost tiles, and stand-alone deliveries count negative;
    /// hazard clearance, upgrades, and item requests attached to a ghost count
    /// positive.
    pub fn requirements<C>(
        &self,
        items: &mut ItemsToPlaceCache,
        catalog: &C,
        show_hidden: bool,
    ) -> Requirements
    where
        C: PrototypeCatalog + ?Sized,
    {
        let mut out = Requirements::new();
        match self {
            Intent::HazardClearance { clearing_item, .. } => {
                out.push(Requirement::new(
                    clearing_item,
                    Some(Quality::base()),
                    HAZARD_CLEARING_COST,
                ));
            }
            Intent::Upgrade {
                target, quality, ..
            } => {
                for stack in items.lookup(catalog, PrototypeKind::Entity, target, show_hidden) {
                    out.push(Requirement::new(
                        &stack.name,
                        Some(quality.clone()),
                        i64::from(stack.count),
                    ));
                }
            }
            Intent::Construction {
                ghost,
                quality,
                requests,
                ..
            } => {
                for stack in items.lookup(catalog, PrototypeKind::Entity, ghost, show_hidden) {
                    out.push(Requirement::new(
                        &stack.name,
                        Some(quality.clone()),
                        -i64::from(stack.count),
                    ));
                }
                for request in requests {
                    out.push(Requirement::new(
                        &request.name,
                        request.quality.clone(),
                        i64::from(request.count),
                    ));
                }
            }
            Intent::Delivery { requests, .. } => {
                for request in requests {
                    out.push(Requirement::new(
                        &request.name,
                        request.quality.clone(),
                        -i64::from(request.count),
                    ));
                }
            }
            Intent::TileConstruction { tile, .. } => {
                for stack in items.lookup(catalog, PrototypeKind::Tile, tile, show_hidden) {
                    out.push(Requirement::new(
                        &stack.name,
                        stack.quality.clone(),
                        -i64::from(stack.count),
                    ));
                }
            }
        }
        out
    }
}
