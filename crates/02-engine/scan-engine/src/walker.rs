//! Entity classifier and walker: searches one sub-region for every intent
//! category and feeds new intents into the pass aggregate.

use crate::config::ScanSettings;
use crate::intent::{Intent, IntentKind};
use crate::items::ItemsToPlaceCache;
use crate::store::{ScanPass, SubRegion};
use log::{trace, warn};
use scan_abi::{AreaQuery, BoundingBox, PrototypeCatalog, WorldQuery};

/// Amount a region is shrunk by for the categories that must not be counted
/// by two adjacent regions.
pub const INNER_AREA_EPSILON: f64 = 0.001;

/// What one sub-region contributed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionOutcome {
    /// Intents counted for the first time this pass.
    pub counted: usize,
    /// Intents already in the ledger.
    pub duplicates: usize,
    /// Categories skipped because the result cap was used up.
    pub capped: usize,
    /// The region no longer exists in the world.
    pub missing: bool,
}

/// Scans `region` on behalf of `pass`.
pub fn scan_region<H>(
    host: &mut H,
    pass: &mut ScanPass,
    region: SubRegion,
    items: &mut ItemsToPlaceCache,
    settings: &ScanSettings,
) -> RegionOutcome
where
    H: WorldQuery + PrototypeCatalog + ?Sized,
{
    let mut outcome = RegionOutcome::default();
    let (surface, bounds) = match region {
        SubRegion::Area(area) => (pass.surface, area),
        SubRegion::Cell(cell) => match host.coverage_cell(cell) {
            Some(geometry) => (geometry.surface, geometry.bounds()),
            None => {
                warn!("scanner {}: cell {} vanished, skipping", pass.scanner, cell.0);
                outcome.missing = true;
                return outcome;
            }
        },
    };
    let inner = bounds.shrink(INNER_AREA_EPSILON);
    let mut remaining = settings.result_cap().map(i64::from);

    for kind in IntentKind::SCAN_ORDER {
        if remaining.is_some_and(|left| left <= 0) {
            outcome.capped += 1;
            continue;
        }
        let query = AreaQuery {
            surface,
            area: if kind.uses_inner_area() { inner } else { bounds },
            force: pass.force,
            limit: remaining.map(|left| u32::try_from(left).unwrap_or(u32::MAX)),
        };

        let mut net = 0i64;
        for intent in classify(host, kind, &query) {
            if !within(&bounds, &intent) {
                continue;
            }
            if !pass.ledger.insert(intent.identity()) {
                trace!("scanner {}: {:?} already counted", pass.scanner, intent.identity());
                outcome.duplicates += 1;
                continue;
            }
            for req in intent.requirements(items, &*host, settings.show_hidden) {
                pass.aggregate.add(
                    &req.item,
                    req.quantity,
                    req.quality.as_ref(),
                    settings.invert_sign,
                );
                net += req.quantity;
            }
            outcome.counted += 1;
        }

        trace!("scanner {}: {:?} net {}", pass.scanner, kind, net);
        if let Some(left) = remaining.as_mut() {
            *left -= net;
        }
    }
    outcome
}

fn within(bounds: &BoundingBox, intent: &Intent) -> bool {
    intent.anchor().map_or(true, |pos| bounds.contains(pos))
}

/// Runs the search for one category and turns the hits into intents.
fn classify<H>(host: &mut H, kind: IntentKind, query: &AreaQuery) -> Vec<Intent>
where
    H: WorldQuery + ?Sized,
{
    match kind {
        IntentKind::HazardClearance => host
            .find_hazards(query)
            .into_iter()
            .filter_map(Intent::from_hazard)
            .collect(),
        IntentKind::Upgrade => host
            .find_upgrades(query)
            .into_iter()
            .filter_map(Intent::from_upgrade)
            .collect(),
        IntentKind::Construction => host
            .find_entity_ghosts(query)
            .into_iter()
            .map(Intent::from_ghost)
            .collect(),
        IntentKind::Delivery => host
            .find_delivery_requests(query)
            .into_iter()
            .map(|view| {
                let registration = host.register_on_destroyed(view.entity);
                Intent::from_delivery(view, registration)
            })
            .collect(),
        IntentKind::TileConstruction => host
            .find_tile_ghosts(query)
            .into_iter()
            .map(Intent::from_tile_ghost)
            .collect(),
    }
}
