//! Properties that must hold for any world and any budget.

use crate::fixtures::{
    eager, first_report, grid, init_logs, place_ghosts, GhostSpec, CELL_RADIUS, DEVICE, SCANNER,
};
use proptest::prelude::*;
use scan_abi::{EntityHandle, Position};
use scan_engine::{ScanEngine, ScanSettings, ScannerPhase};
use scan_sim::SimScanner;

const CELLS: u64 = 4;

fn ghost_spec() -> impl Strategy<Value = GhostSpec> {
    let max_x = (CELLS as f64 * 2.0 - 1.0) * CELL_RADIUS;
    (
        0usize..4,
        -CELL_RADIUS..max_x,
        -CELL_RADIUS..CELL_RADIUS,
        0usize..3,
        0u32..3,
    )
        .prop_map(|(prototype, x, y, quality, modules)| GhostSpec {
            prototype,
            // Snap to the half-tile grid so some ghosts sit exactly on edges.
            x: (x * 2.0).round() / 2.0,
            y: (y * 2.0).round() / 2.0,
            quality,
            modules,
        })
}

fn ghosts() -> impl Strategy<Value = Vec<GhostSpec>> {
    prop::collection::vec(ghost_spec(), 0..12)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn report_is_independent_of_budget(ghosts in ghosts(), budget in 1u32..6) {
        init_logs();
        let mut slow = grid(CELLS);
        place_ghosts(&mut slow, &ghosts);
        let mut fast = grid(CELLS);
        place_ghosts(&mut fast, &ghosts);

        prop_assert_eq!(
            first_report(&mut slow, eager(budget)),
            first_report(&mut fast, eager(100))
        );
    }

    #[test]
    fn repeated_encounters_add_nothing(ghosts in ghosts()) {
        let mut once = grid(CELLS);
        place_ghosts(&mut once, &ghosts);
        let mut twice = grid(CELLS);
        place_ghosts(&mut twice, &ghosts);
        place_ghosts(&mut twice, &ghosts);

        prop_assert_eq!(
            first_report(&mut once, eager(2)),
            first_report(&mut twice, eager(2))
        );
    }

    #[test]
    fn inversion_negates_every_entry(ghosts in ghosts()) {
        let mut plain = grid(CELLS);
        place_ghosts(&mut plain, &ghosts);
        let mut inverted = grid(CELLS);
        place_ghosts(&mut inverted, &ghosts);

        let plain = first_report(&mut plain, eager(3));
        let inverted = first_report(&mut inverted, ScanSettings {
            invert_sign: true,
            ..eager(3)
        });
        prop_assert_eq!(plain.len(), inverted.len());
        for (a, b) in plain.iter().zip(&inverted) {
            prop_assert_eq!(a.key(), b.key());
            prop_assert_eq!(a.count, -b.count);
        }
    }

    #[test]
    fn rounding_moves_toward_more_demand(ghosts in ghosts(), invert in any::<bool>()) {
        let mut raw = grid(CELLS);
        place_ghosts(&mut raw, &ghosts);
        let mut rounded = grid(CELLS);
        place_ghosts(&mut rounded, &ghosts);

        let base = ScanSettings { invert_sign: invert, ..eager(3) };
        let raw = first_report(&mut raw, base.clone());
        let rounded = first_report(&mut rounded, ScanSettings { round_to_stack: true, ..base });
        prop_assert_eq!(raw.len(), rounded.len());
        for (before, after) in raw.iter().zip(&rounded) {
            let stack = crate::fixtures::STACK_SIZES
                .iter()
                .find(|(name, _)| *name == before.item)
                .map(|&(_, size)| i64::from(size))
                .unwrap();
            prop_assert_eq!(after.count % stack, 0);
            if invert {
                prop_assert!(after.count <= before.count);
            } else {
                prop_assert!(after.count >= before.count);
            }
            prop_assert!((after.count - before.count).abs() < stack);
        }
    }

    #[test]
    fn drained_regions_never_exceed_budget(
        budget in 1u32..4,
        delay in 1u32..5,
        ticks in 1u64..120,
        extra_scanners in 0u64..4,
    ) {
        let mut world = grid(CELLS);
        for i in 0..extra_scanners {
            world
                .add_scanner(SimScanner::new(
                    SCANNER + 1 + i,
                    EntityHandle(1_000 + i),
                    Position::new(2.0 * CELL_RADIUS * i as f64, 1.0),
                ))
                .unwrap();
        }
        let mut engine = ScanEngine::new(ScanSettings {
            areas_per_tick: budget,
            scan_areas_delay: delay,
            update_interval: 7,
            ..ScanSettings::default()
        })
        .unwrap();
        engine.adopt_existing(world.scanner_records());

        let mut drained = 0u64;
        let mut cadence_ticks = 0u64;
        for tick in 0..ticks {
            let summary = engine.tick(tick, &mut world);
            prop_assert!(summary.regions_drained <= budget);
            if summary.on_cadence {
                cadence_ticks += 1;
            } else {
                prop_assert_eq!(summary.regions_drained, 0);
            }
            drained += u64::from(summary.regions_drained);
        }
        prop_assert!(drained <= u64::from(budget) * cadence_ticks);
    }

    #[test]
    fn removal_mid_pass_leaves_nothing_behind(ghosts in ghosts(), after in 1u64..4) {
        let mut world = grid(CELLS);
        place_ghosts(&mut world, &ghosts);
        let mut engine = ScanEngine::new(eager(1)).unwrap();
        engine.adopt_existing(world.scanner_records());
        for tick in 1..=after {
            engine.tick(tick, &mut world);
        }
        let scanning = matches!(engine.phase(SCANNER), ScannerPhase::Scanning { .. });
        prop_assert!(scanning);

        world.take_writes();
        prop_assert!(engine.on_scanner_removed(SCANNER));
        prop_assert_eq!(engine.phase(SCANNER), ScannerPhase::Unknown);
        prop_assert!(engine.store().pass(SCANNER).is_none());
        prop_assert!(engine.store().passes().is_empty());

        for tick in after + 1..after + 10 {
            engine.tick(tick, &mut world);
        }
        prop_assert!(world.writes().iter().all(|w| w.device != DEVICE));
    }
}
