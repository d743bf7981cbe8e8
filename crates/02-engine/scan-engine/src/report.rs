//! Report writer: finalises a pass aggregate and publishes it.

use crate::aggregate::SignalAggregate;
use crate::config::ScanSettings;
use log::trace;
use scan_abi::{EntityHandle, PrototypeCatalog, ScannerOutput, Signal};

/// Rounds `count` to a whole number of stacks: up when `invert` is off,
/// down when it is on.
pub fn round_to_stack(count: i64, stack_size: u32, invert: bool) -> i64 {
    if stack_size == 0 {
        return count;
    }
    let size = i64::from(stack_size);
    let mut stacks = count.div_euclid(size);
    if !invert && count.rem_euclid(size) != 0 {
        stacks += 1;
    }
    stacks * size
}

/// Turns a completed aggregate into the output list, applying stack rounding
/// when enabled. Items without a known stack size are left as they are.
pub fn finalize<C>(aggregate: SignalAggregate, catalog: &C, settings: &ScanSettings) -> Vec<Signal>
where
    C: PrototypeCatalog + ?Sized,
{
    let mut signals = aggregate.into_signals();
    if settings.round_to_stack {
        for signal in &mut signals {
            if let Some(proto) = catalog.item(&signal.item) {
                signal.count = round_to_stack(signal.count, proto.stack_size, settings.invert_sign);
            }
        }
    }
    signals
}

/// Removes every output section and leaves a single empty one.
pub fn clear_output<O>(output: &mut O, device: EntityHandle) -> usize
where
    O: ScannerOutput + ?Sized,
{
    for index in (0..output.section_count(device)).rev() {
        output.remove_section(device, index);
    }
    output.add_section(device)
}

/// Replaces the device's output with `signals`.
pub fn publish<O>(output: &mut O, device: EntityHandle, signals: Vec<Signal>)
where
    O: ScannerOutput + ?Sized,
{
    let section = clear_output(output, device);
    trace!("device {}: publishing {} signal(s)", device.0, signals.len());
    if !signals.is_empty() {
        output.set_filters(device, section, signals);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use scan_abi::{ItemKey, Position, Quality};
    use scan_sim::{SimScanner, SimWorld};

    #[test]
    fn rounds_away_from_demand_direction() {
        assert_eq!(round_to_stack(1, 50, false), 50);
        assert_eq!(round_to_stack(50, 50, false), 50);
        assert_eq!(round_to_stack(-30, 50, false), 0);
        assert_eq!(round_to_stack(-70, 50, false), -50);
        assert_eq!(round_to_stack(70, 50, true), 50);
        assert_eq!(round_to_stack(-2, 50, true), -50);
        assert_eq!(round_to_stack(7, 0, false), 7);
    }

    proptest! {
        #[test]
        fn rounding_yields_bounded_multiples(count in -10_000i64..10_000, size in 1u32..500) {
            let up = round_to_stack(count, size, false);
            let down = round_to_stack(count, size, true);
            prop_assert_eq!(up % i64::from(size), 0);
            prop_assert_eq!(down % i64::from(size), 0);
            prop_assert!(up >= count && up - count < i64::from(size));
            prop_assert!(down <= count && count - down < i64::from(size));
        }
    }

    #[test]
    fn finalize_rounds_known_items_only() {
        let mut world = SimWorld::new();
        world.add_item("gear", 100);
        let mut agg = SignalAggregate::new();
        agg.add("gear", 3, None, false);
        agg.add("mystery", 3, None, false);

        let settings = ScanSettings {
            round_to_stack: true,
            ..ScanSettings::default()
        };
        let signals = finalize(agg, &world, &settings);
        let counts: Vec<_> = signals.iter().map(|s| (s.item.as_str(), s.count)).collect();
        assert_eq!(counts, vec![("gear", 100), ("mystery", 3)]);
    }

    #[test]
    fn publish_replaces_extra_sections() {
        let mut world = SimWorld::new();
        let device = EntityHandle(3);
        world
            .add_scanner(SimScanner::new(1, device, Position::default()))
            .unwrap();
        let stale = Signal::new(ItemKey::new("coal", Quality::base()), 9);
        world.push_manual_section(device, vec![stale.clone()]);
        world.push_manual_section(device, vec![stale]);

        let gear = Signal::new(ItemKey::new("gear", Quality::base()), -2);
        publish(&mut world, device, vec![gear.clone()]);
        assert_eq!(world.sections(device).unwrap(), &[vec![gear]]);

        publish(&mut world, device, Vec::new());
        assert_eq!(world.sections(device).unwrap(), &[Vec::<Signal>::new()]);
        assert_eq!(world.writes().len(), 1);
    }
}
