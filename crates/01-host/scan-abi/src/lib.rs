//! Host boundary types shared between the scan engine and the world it runs in.
//!
//! This crate defines the protocol between the engine (layer 02) and host
//! implementations such as the simulator (layer 03), with no engine logic.

/// World-space geometry.
pub mod geometry;
/// Host traits and query result views.
pub mod host;
/// Items, qualities, and output signals.
pub mod item;

pub use crate::geometry::{BoundingBox, Position, PositionKey, POSITION_RESOLUTION};
pub use crate::host::{
    AreaQuery, CellId, CoverageCell, DeliveryView, EntityHandle, ForceId, GhostView, HazardView,
    Host, LogisticNetwork, PrototypeCatalog, PrototypeKind, ScannerEntity, ScannerId,
    ScannerOutput, SurfaceId, TileGhostView, UpgradeView, WorldQuery,
};
pub use crate::item::{
    Comparator, ItemKey, ItemPrototype, ItemStack, Quality, Signal, BASE_QUALITY,
};
