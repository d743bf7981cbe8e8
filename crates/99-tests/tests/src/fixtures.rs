//! Shared world builders and run helpers.

use scan_abi::{EntityHandle, ItemStack, Position, PrototypeKind, ScannerId, Signal};
use scan_engine::{ScanEngine, ScanSettings};
use scan_sim::{SimCell, SimGhost, SimNetwork, SimScanner, SimWorld};

/// Half-width of every grid cell.
pub const CELL_RADIUS: f64 = 8.0;
/// Device of the scanner placed by [`grid`].
pub const DEVICE: EntityHandle = EntityHandle(900);
pub const SCANNER: ScannerId = 1;

/// Prototypes available to generated ghosts: (entity, item, count).
pub const PROTOTYPES: [(&str, &str, u32); 4] = [
    ("gear-box", "gear", 2),
    ("assembler", "assembler", 1),
    ("wall", "stone-wall", 5),
    ("chest", "chest", 1),
];

/// Item stack sizes for every item in [`PROTOTYPES`] plus request items.
pub const STACK_SIZES: [(&str, u32); 5] = [
    ("gear", 100),
    ("assembler", 50),
    ("stone-wall", 100),
    ("chest", 50),
    ("module", 50),
];

pub fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A row of `cells` square cells sharing edges, with one scanner in the
/// first cell.
pub fn grid(cells: u64) -> SimWorld {
    let mut world = SimWorld::new();
    for (name, stack) in STACK_SIZES {
        world.add_item(name, stack);
    }
    for (entity, item, count) in PROTOTYPES {
        world.set_items_to_place(PrototypeKind::Entity, entity, [ItemStack::new(item, count)]);
    }
    world
        .add_network(SimNetwork::new(
            1,
            (0..cells).map(|i| {
                SimCell::new(
                    i + 1,
                    Position::new(i as f64 * 2.0 * CELL_RADIUS, 0.0),
                    CELL_RADIUS,
                )
            }),
        ))
        .expect("fresh network");
    world
        .add_scanner(SimScanner::new(SCANNER, DEVICE, Position::new(0.5, 0.5)))
        .expect("fresh scanner");
    world
}

/// Generated ghost: prototype index, position, quality index, request count.
#[derive(Clone, Debug)]
pub struct GhostSpec {
    pub prototype: usize,
    pub x: f64,
    pub y: f64,
    pub quality: usize,
    pub modules: u32,
}

const QUALITIES: [&str; 3] = ["normal", "uncommon", "rare"];

pub fn place_ghosts(world: &mut SimWorld, ghosts: &[GhostSpec]) {
    for (unit, spec) in ghosts.iter().enumerate() {
        let (entity, _, _) = PROTOTYPES[spec.prototype % PROTOTYPES.len()];
        let mut ghost = SimGhost::new(unit as u64 + 1, Position::new(spec.x, spec.y), entity)
            .quality(QUALITIES[spec.quality % QUALITIES.len()]);
        if spec.modules > 0 {
            ghost = ghost.request(ItemStack::new("module", spec.modules));
        }
        world.add_ghost(ghost);
    }
}

/// Engine settings that admit on every tick and never cool down in a test.
pub fn eager(areas_per_tick: u32) -> ScanSettings {
    ScanSettings {
        areas_per_tick,
        scan_areas_delay: 1,
        update_interval: 100_000,
        ..ScanSettings::default()
    }
}

/// Runs until the scanner's first pass completes and returns its output.
pub fn first_report(world: &mut SimWorld, settings: ScanSettings) -> Vec<Signal> {
    let mut engine = ScanEngine::new(settings).expect("valid settings");
    engine.adopt_existing(world.scanner_records());
    for tick in 1..=1_000 {
        if engine.tick(tick, world).completed.contains(&SCANNER) {
            return world.signals(DEVICE);
        }
    }
    panic!("pass did not complete");
}
