//! In-memory world implementing every host trait.

use crate::entity::{
    Placement, SimDelivery, SimGhost, SimHazard, SimNetwork, SimScanner, SimTileGhost, SimUpgrade,
};
use crate::error::{SimError, SimResult};
use log::trace;
use scan_abi::{
    AreaQuery, CellId, CoverageCell, DeliveryView, EntityHandle, ForceId, GhostView, HazardView,
    ItemPrototype, ItemStack, LogisticNetwork, Position, PrototypeCatalog, PrototypeKind,
    ScannerEntity, ScannerId, ScannerOutput, Signal, SurfaceId, TileGhostView, UpgradeView,
    WorldQuery,
};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};

/// One `set_filters` call seen by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputWrite {
    pub device: EntityHandle,
    pub section: usize,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Default)]
pub struct SimWorld {
    free_floating: BTreeSet<SurfaceId>,
    items: BTreeMap<String, ItemPrototype>,
    places: BTreeMap<(PrototypeKind, String), Vec<ItemStack>>,
    networks: Vec<SimNetwork>,
    scanners: Vec<SimScanner>,
    outputs: BTreeMap<EntityHandle, Vec<Vec<Signal>>>,
    hazards: Vec<SimHazard>,
    upgrades: Vec<SimUpgrade>,
    ghosts: Vec<SimGhost>,
    deliveries: Vec<SimDelivery>,
    tile_ghosts: Vec<SimTileGhost>,
    registrations: BTreeMap<EntityHandle, u64>,
    writes: Vec<OutputWrite>,
    area_queries: Cell<u64>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_free_floating(&mut self, surface: SurfaceId) {
        self.free_floating.insert(surface);
    }

    pub fn add_item(&mut self, name: &str, stack_size: u32) {
        self.items.insert(
            name.to_owned(),
            ItemPrototype {
                stack_size,
                hidden: false,
            },
        );
    }

    pub fn add_hidden_item(&mut self, name: &str, stack_size: u32) {
        self.items.insert(
            name.to_owned(),
            ItemPrototype {
                stack_size,
                hidden: true,
            },
        );
    }

    /// Declares the items needed to place an entity or tile prototype.
    pub fn set_items_to_place(
        &mut self,
        kind: PrototypeKind,
        name: &str,
        items: impl IntoIterator<Item = ItemStack>,
    ) {
        self.places
            .insert((kind, name.to_owned()), items.into_iter().collect());
    }

    pub fn add_network(&mut self, network: SimNetwork) -> SimResult<()> {
        for cell in &network.cells {
            if self.find_cell(cell.id).is_some() {
                return Err(SimError::DuplicateCell(cell.id));
            }
        }
        self.networks.push(network);
        Ok(())
    }

    /// Places a scanner with a single empty output section.
    pub fn add_scanner(&mut self, scanner: SimScanner) -> SimResult<()> {
        if self.scanners.iter().any(|s| s.id == scanner.id) {
            return Err(SimError::DuplicateScanner(scanner.id));
        }
        if self.outputs.contains_key(&scanner.entity) {
            return Err(SimError::DuplicateEntity(scanner.entity));
        }
        self.outputs.insert(scanner.entity, vec![Vec::new()]);
        self.scanners.push(scanner);
        Ok(())
    }

    pub fn add_hazard(&mut self, hazard: SimHazard) {
        self.hazards.push(hazard);
    }

    pub fn add_upgrade(&mut self, upgrade: SimUpgrade) {
        self.upgrades.push(upgrade);
    }

    pub fn add_ghost(&mut self, ghost: SimGhost) {
        self.ghosts.push(ghost);
    }

    pub fn add_delivery(&mut self, delivery: SimDelivery) {
        self.deliveries.push(delivery);
    }

    pub fn add_tile_ghost(&mut self, tile: SimTileGhost) {
        self.tile_ghosts.push(tile);
    }

    /// Destroys a scanner device; its handle stops resolving.
    pub fn destroy_scanner(&mut self, entity: EntityHandle) -> Option<SimScanner> {
        let index = self.scanners.iter().position(|s| s.entity == entity)?;
        self.outputs.remove(&entity);
        Some(self.scanners.remove(index))
    }

    pub fn set_output_enabled(&mut self, entity: EntityHandle, enabled: bool) {
        if let Some(scanner) = self.scanners.iter_mut().find(|s| s.entity == entity) {
            scanner.enabled = enabled;
        }
    }

    /// Removes a ghost entity, as if it had been built.
    pub fn remove_ghost(&mut self, unit_number: u64) -> bool {
        let before = self.ghosts.len();
        self.ghosts.retain(|ghost| ghost.unit_number != unit_number);
        before != self.ghosts.len()
    }

    /// Removes a coverage cell from whichever network holds it.
    pub fn remove_cell(&mut self, cell: CellId) -> bool {
        for network in &mut self.networks {
            if let Some(index) = network.cells.iter().position(|c| c.id == cell) {
                network.cells.remove(index);
                return true;
            }
        }
        false
    }

    /// Appends a section to a device's output directly, as an operator would.
    pub fn push_manual_section(&mut self, entity: EntityHandle, signals: Vec<Signal>) {
        if let Some(sections) = self.outputs.get_mut(&entity) {
            sections.push(signals);
        }
    }

    /// Scanner identities and handles in placement order.
    pub fn scanner_records(&self) -> Vec<(ScannerId, EntityHandle)> {
        self.scanners.iter().map(|s| (s.id, s.entity)).collect()
    }

    /// All sections of a device's output, or `None` for unknown devices.
    pub fn sections(&self, entity: EntityHandle) -> Option<&[Vec<Signal>]> {
        self.outputs.get(&entity).map(Vec::as_slice)
    }

    /// Every signal currently on the device's output, sections concatenated.
    pub fn signals(&self, entity: EntityHandle) -> Vec<Signal> {
        self.outputs
            .get(&entity)
            .map(|sections| sections.iter().flatten().cloned().collect())
            .unwrap_or_default()
    }

    pub fn writes(&self) -> &[OutputWrite] {
        &self.writes
    }

    pub fn take_writes(&mut self) -> Vec<OutputWrite> {
        std::mem::take(&mut self.writes)
    }

    /// Number of spatial searches issued so far.
    pub fn area_queries(&self) -> u64 {
        self.area_queries.get()
    }

    fn find_cell(&self, cell: CellId) -> Option<(&SimNetwork, CoverageCell)> {
        self.networks.iter().find_map(|network| {
            network.cells.iter().find(|c| c.id == cell).map(|c| {
                (
                    network,
                    CoverageCell {
                        surface: network.surface,
                        center: c.center,
                        construction_radius: c.radius,
                    },
                )
            })
        })
    }

    fn live_scanner(&self, entity: EntityHandle) -> Option<&SimScanner> {
        self.scanners.iter().find(|s| s.entity == entity)
    }

    fn matches(&self, query: &AreaQuery, placement: &Placement, by_force: bool) -> bool {
        placement.surface == query.surface
            && (!by_force || placement.force == query.force)
            && placement.footprint().intersects(&query.area)
    }

    fn search<'a, T, V>(
        &self,
        query: &AreaQuery,
        candidates: &'a [T],
        by_force: bool,
        place: impl Fn(&T) -> &Placement,
        view: impl Fn(&'a T) -> V,
    ) -> Vec<V> {
        self.area_queries.set(self.area_queries.get() + 1);
        let limit = query.limit.map_or(usize::MAX, |limit| limit as usize);
        let found: Vec<V> = candidates
            .iter()
            .filter(|candidate| self.matches(query, place(*candidate), by_force))
            .take(limit)
            .map(view)
            .collect();
        trace!(
            "search surface {} force {}: {} hit(s), limit {:?}",
            query.surface.0,
            query.force.0,
            found.len(),
            query.limit
        );
        found
    }
}

impl WorldQuery for SimWorld {
    fn scanner(&self, device: EntityHandle) -> Option<ScannerEntity> {
        self.live_scanner(device).map(|s| ScannerEntity {
            surface: s.placement.surface,
            position: s.placement.position,
            force: s.placement.force,
        })
    }

    fn is_free_floating(&self, surface: SurfaceId) -> bool {
        self.free_floating.contains(&surface)
    }

    fn logistic_network_at(
        &self,
        surface: SurfaceId,
        position: Position,
        force: ForceId,
    ) -> Option<LogisticNetwork> {
        self.networks
            .iter()
            .filter(|network| network.surface == surface && network.force == force)
            .find(|network| {
                network.cells.iter().any(|cell| {
                    CoverageCell {
                        surface,
                        center: cell.center,
                        construction_radius: cell.radius,
                    }
                    .bounds()
                    .contains(position)
                })
            })
            .map(|network| LogisticNetwork {
                network_id: network.id,
                force: network.force,
                cells: network.cells.iter().map(|cell| cell.id).collect(),
            })
    }

    fn coverage_cell(&self, cell: CellId) -> Option<CoverageCell> {
        self.find_cell(cell).map(|(_, geometry)| geometry)
    }

    fn find_hazards(&self, query: &AreaQuery) -> Vec<HazardView> {
        self.search(
            query,
            &self.hazards,
            false,
            |h| &h.placement,
            |h| HazardView {
                unit_number: h.unit_number,
                position: h.placement.position,
                marked_for_removal: h.marked_by.contains(&query.force),
                clearing_item: h.clearing_item.clone(),
            },
        )
    }

    fn find_upgrades(&self, query: &AreaQuery) -> Vec<UpgradeView> {
        self.search(
            query,
            &self.upgrades,
            true,
            |u| &u.placement,
            |u| UpgradeView {
                unit_number: u.unit_number,
                position: u.placement.position,
                target: u
                    .target
                    .clone()
                    .map(|target| (target, u.target_quality.clone())),
            },
        )
    }

    fn find_entity_ghosts(&self, query: &AreaQuery) -> Vec<GhostView> {
        self.search(
            query,
            &self.ghosts,
            true,
            |g| &g.placement,
            |g| GhostView {
                unit_number: g.unit_number,
                position: g.placement.position,
                ghost_name: g.name.clone(),
                quality: g.quality.clone(),
                item_requests: g.item_requests.clone(),
            },
        )
    }

    fn find_delivery_requests(&self, query: &AreaQuery) -> Vec<DeliveryView> {
        self.search(
            query,
            &self.deliveries,
            true,
            |d| &d.placement,
            |d| DeliveryView {
                entity: d.entity,
                position: d.placement.position,
                item_requests: d.items.clone(),
            },
        )
    }

    fn find_tile_ghosts(&self, query: &AreaQuery) -> Vec<TileGhostView> {
        self.search(
            query,
            &self.tile_ghosts,
            true,
            |t| &t.placement,
            |t| TileGhostView {
                unit_number: t.unit_number,
                position: t.placement.position,
                ghost_name: t.name.clone(),
            },
        )
    }

    fn register_on_destroyed(&mut self, entity: EntityHandle) -> u64 {
        let next = self.registrations.len() as u64 + 1;
        *self.registrations.entry(entity).or_insert(next)
    }
}

impl PrototypeCatalog for SimWorld {
    fn items_to_place(&self, kind: PrototypeKind, name: &str) -> Option<Vec<ItemStack>> {
        self.places.get(&(kind, name.to_owned())).cloned()
    }

    fn item(&self, name: &str) -> Option<ItemPrototype> {
        self.items.get(name).copied()
    }
}

impl ScannerOutput for SimWorld {
    fn output_enabled(&self, device: EntityHandle) -> bool {
        self.live_scanner(device).is_some_and(|s| s.enabled)
    }

    fn section_count(&self, device: EntityHandle) -> usize {
        self.outputs.get(&device).map_or(0, Vec::len)
    }

    fn remove_section(&mut self, device: EntityHandle, index: usize) {
        if let Some(sections) = self.outputs.get_mut(&device) {
            if index < sections.len() {
                sections.remove(index);
            }
        }
    }

    fn add_section(&mut self, device: EntityHandle) -> usize {
        match self.outputs.get_mut(&device) {
            Some(sections) => {
                sections.push(Vec::new());
                sections.len() - 1
            }
            None => 0,
        }
    }

    fn set_filters(&mut self, device: EntityHandle, index: usize, filters: Vec<Signal>) {
        if let Some(section) = self
            .outputs
            .get_mut(&device)
            .and_then(|sections| sections.get_mut(index))
        {
            *section = filters.clone();
            self.writes.push(OutputWrite {
                device,
                section: index,
                signals: filters,
            });
        }
    }
}
