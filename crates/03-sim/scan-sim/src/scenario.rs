//! JSON scenario files describing a whole simulated world.

use crate::entity::{
    SimDelivery, SimGhost, SimHazard, SimNetwork, SimScanner, SimTileGhost, SimUpgrade,
};
use crate::error::SimResult;
use crate::world::SimWorld;
use scan_abi::{ItemPrototype, ItemStack, PrototypeKind, SurfaceId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Scenario {
    pub free_floating_surfaces: Vec<SurfaceId>,
    pub items: BTreeMap<String, ItemPrototype>,
    /// Items to place, per entity prototype.
    pub entity_items: BTreeMap<String, Vec<ItemStack>>,
    /// Items to place, per tile prototype.
    pub tile_items: BTreeMap<String, Vec<ItemStack>>,
    pub networks: Vec<SimNetwork>,
    pub scanners: Vec<SimScanner>,
    pub hazards: Vec<SimHazard>,
    pub upgrades: Vec<SimUpgrade>,
    pub ghosts: Vec<SimGhost>,
    pub deliveries: Vec<SimDelivery>,
    pub tile_ghosts: Vec<SimTileGhost>,
}

impl Scenario {
    pub fn from_json(json: &str) -> SimResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the world, rejecting duplicate scanners and cells.
    pub fn into_world(self) -> SimResult<SimWorld> {
        let mut world = SimWorld::new();
        for surface in self.free_floating_surfaces {
            world.set_free_floating(surface);
        }
        for (name, proto) in self.items {
            if proto.hidden {
                world.add_hidden_item(&name, proto.stack_size);
            } else {
                world.add_item(&name, proto.stack_size);
            }
        }
        for (name, items) in self.entity_items {
            world.set_items_to_place(PrototypeKind::Entity, &name, items);
        }
        for (name, items) in self.tile_items {
            world.set_items_to_place(PrototypeKind::Tile, &name, items);
        }
        for network in self.networks {
            world.add_network(network)?;
        }
        for scanner in self.scanners {
            world.add_scanner(scanner)?;
        }
        self.hazards.into_iter().for_each(|h| world.add_hazard(h));
        self.upgrades.into_iter().for_each(|u| world.add_upgrade(u));
        self.ghosts.into_iter().for_each(|g| world.add_ghost(g));
        self.deliveries.into_iter().for_each(|d| world.add_delivery(d));
        self.tile_ghosts
            .into_iter()
            .for_each(|t| world.add_tile_ghost(t));
        Ok(world)
    }
}

/// Parses a scenario and builds its world in one step.
pub fn load_world(json: &str) -> SimResult<SimWorld> {
    Scenario::from_json(json)?.into_world()
}
