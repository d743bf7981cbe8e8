//! End-to-end scenarios over small hand-built worlds.

use crate::fixtures::{eager, first_report, grid, init_logs, DEVICE, SCANNER};
use pretty_assertions::assert_eq;
use scan_abi::{EntityHandle, ItemKey, ItemStack, Position, PrototypeKind, Quality, Signal, SurfaceId};
use scan_engine::{AbortReason, ScanEngine, ScanSettings, ScanStore, ScannerPhase};
use scan_sim::{SimGhost, SimScanner, SimTileGhost, SimWorld, DEFAULT_FORCE};

fn gear(count: i64) -> Signal {
    Signal::new(ItemKey::new("gear", Quality::base()), count)
}

#[test]
fn single_ghost_reports_negative_demand() {
    init_logs();
    let mut world = grid(1);
    world.add_ghost(SimGhost::new(1, Position::new(3.0, 3.0), "gear-box"));
    assert_eq!(first_report(&mut world, eager(5)), vec![gear(-2)]);
}

#[test]
fn single_ghost_with_inversion_reports_positive() {
    let mut world = grid(1);
    world.add_ghost(SimGhost::new(1, Position::new(3.0, 3.0), "gear-box"));
    let settings = ScanSettings {
        invert_sign: true,
        ..eager(5)
    };
    assert_eq!(first_report(&mut world, settings), vec![gear(2)]);
}

#[test]
fn result_cap_of_one_tallies_a_single_ghost() {
    let mut world = grid(1);
    world.set_items_to_place(PrototypeKind::Entity, "cog", [ItemStack::new("gear", 1)]);
    world.add_ghost(SimGhost::new(1, Position::new(1.0, 1.0), "cog"));
    world.add_ghost(SimGhost::new(2, Position::new(2.0, 2.0), "cog"));

    let settings = ScanSettings {
        max_results: 1,
        ..eager(5)
    };
    let mut engine = ScanEngine::new(settings).unwrap();
    engine.adopt_existing(world.scanner_records());
    let summary = engine.tick(1, &mut world);

    assert_eq!(summary.completed.as_slice(), &[SCANNER]);
    assert_eq!(world.signals(DEVICE), vec![gear(-1)]);
    assert_eq!(engine.phase(SCANNER), ScannerPhase::Idle);
}

#[test]
fn ghost_requests_offset_at_their_own_quality() {
    let mut world = grid(1);
    world.add_ghost(
        SimGhost::new(1, Position::new(3.0, 3.0), "assembler")
            .quality("rare")
            .request(ItemStack::with_quality("module", 2, Quality::new("uncommon"))),
    );
    assert_eq!(
        first_report(&mut world, eager(5)),
        vec![
            Signal::new(ItemKey::new("assembler", Quality::new("rare")), -1),
            Signal::new(ItemKey::new("module", Quality::new("uncommon")), 2),
        ]
    );
}

#[test]
fn free_floating_scanner_covers_fixed_square() {
    let platform = SurfaceId(7);
    let mut world = SimWorld::new();
    world.add_item("foundation", 10);
    world.set_items_to_place(
        PrototypeKind::Tile,
        "foundation",
        [ItemStack::new("foundation", 1)],
    );
    world.set_free_floating(platform);
    world
        .add_scanner(SimScanner::new(1, DEVICE, Position::new(0.5, 0.5)).on(platform, DEFAULT_FORCE))
        .unwrap();
    let mut inside = SimTileGhost::new(1, Position::new(99.5, 0.5), "foundation");
    inside.placement.surface = platform;
    let mut outside = SimTileGhost::new(2, Position::new(102.5, 0.5), "foundation");
    outside.placement.surface = platform;
    world.add_tile_ghost(inside);
    world.add_tile_ghost(outside);

    assert_eq!(
        first_report(&mut world, eager(5)),
        vec![Signal::new(ItemKey::new("foundation", Quality::base()), -1)]
    );
}

#[test]
fn unscannable_scanner_does_not_stall_others() {
    let mut world = grid(2);
    world.add_ghost(SimGhost::new(1, Position::new(3.0, 3.0), "gear-box"));
    let stray = EntityHandle(901);
    world
        .add_scanner(SimScanner::new(2, stray, Position::new(500.0, 500.0)))
        .unwrap();

    let mut engine = ScanEngine::new(eager(1)).unwrap();
    engine.adopt_existing(world.scanner_records());

    engine.tick(1, &mut world);
    let second = engine.tick(2, &mut world);
    assert_eq!(second.aborted.as_slice(), &[(2, AbortReason::Unscannable)]);
    assert_eq!(second.completed.as_slice(), &[SCANNER]);
    assert_eq!(world.signals(DEVICE), vec![gear(-2)]);
    assert!(world.signals(stray).is_empty());
}

#[test]
fn output_is_untouched_while_a_pass_runs() {
    let mut world = grid(3);
    world.add_ghost(SimGhost::new(1, Position::new(3.0, 3.0), "gear-box"));
    let mut engine = ScanEngine::new(eager(1)).unwrap();
    engine.adopt_existing(world.scanner_records());
    for tick in 1..=3 {
        engine.tick(tick, &mut world);
    }
    assert_eq!(world.signals(DEVICE), vec![gear(-2)]);

    // Second pass: the ghost gets built while the pass is still running.
    world.remove_ghost(1);
    world.take_writes();
    let mut engine = ScanEngine::with_store(
        ScanSettings {
            update_interval: 0,
            ..eager(1)
        },
        engine.store().clone(),
    )
    .unwrap();
    let mut tick = 4;
    while !engine.tick(tick, &mut world).completed.contains(&SCANNER) {
        assert_eq!(world.signals(DEVICE), vec![gear(-2)]);
        tick += 1;
        assert!(tick < 50);
    }
    assert!(world.signals(DEVICE).is_empty());
}

#[test]
fn state_survives_json_mid_pass() {
    let mut world = grid(3);
    world.add_ghost(SimGhost::new(1, Position::new(3.0, 3.0), "gear-box"));
    world.add_ghost(SimGhost::new(2, Position::new(32.0, 0.0), "gear-box"));
    let mut engine = ScanEngine::new(eager(1)).unwrap();
    engine.adopt_existing(world.scanner_records());
    engine.tick(1, &mut world);

    let json = engine.store().to_json().unwrap();
    let restored = ScanStore::from_json(&json).unwrap();
    assert_eq!(&restored, engine.store());

    let mut engine = ScanEngine::restore(eager(1), restored, &world).unwrap();
    assert_eq!(engine.phase(SCANNER), ScannerPhase::Scanning { remaining: 2 });
    engine.tick(2, &mut world);
    let last = engine.tick(3, &mut world);
    assert_eq!(last.completed.as_slice(), &[SCANNER]);
    assert_eq!(world.signals(DEVICE), vec![gear(-4)]);
}
