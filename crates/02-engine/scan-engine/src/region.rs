//! Region resolution: what a newly admitted scanner must cover.

use crate::store::{ScanPass, SubRegion};
use log::debug;
use scan_abi::{BoundingBox, ScannerEntity, ScannerId, WorldQuery};

/// Half-width of the area scanned around a free-floating scanner.
pub const FREE_FLOATING_RADIUS: f64 = 100.0;

/// Outcome of resolving a scanner's coverage.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// Coverage found; the pass is ready to install.
    Covered(ScanPass),
    /// Neither a network nor a free-floating context.
    Unscannable,
}

/// Determines the regions a scanner covers this pass.
///
/// Free-floating surfaces always get a single square around the scanner, even
/// when a network exists. Elsewhere the network's cells are used, tagged with
/// the network's owning force.
pub fn resolve<W>(world: &W, id: ScannerId, scanner: &ScannerEntity) -> Resolution
where
    W: WorldQuery + ?Sized,
{
    if world.is_free_floating(scanner.surface) {
        debug!(
            "scanner {id}: free-floating scan @{}/{} force {}",
            scanner.position.x, scanner.position.y, scanner.force.0
        );
        let area = BoundingBox::square(scanner.position, FREE_FLOATING_RADIUS);
        return Resolution::Covered(ScanPass::new(
            id,
            scanner.surface,
            scanner.force,
            [SubRegion::Area(area)],
        ));
    }

    match world.logistic_network_at(scanner.surface, scanner.position, scanner.force) {
        Some(network) => {
            debug!(
                "scanner {id}: network {} with {} cells @{}/{} force {}",
                network.network_id,
                network.cells.len(),
                scanner.position.x,
                scanner.position.y,
                network.force.0
            );
            Resolution::Covered(ScanPass::new(
                id,
                scanner.surface,
                network.force,
                network.cells.into_iter().map(SubRegion::Cell),
            ))
        }
        None => {
            debug!(
                "scanner {id}: no network @{}/{} force {}",
                scanner.position.x, scanner.position.y, scanner.force.0
            );
            Resolution::Unscannable
        }
    }
}
