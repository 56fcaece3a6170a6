//! Core-Domänentypen: Layer, Stackup, Items, Board, Größen, Spatial-Index.

pub mod board;
pub mod design_settings;
pub mod geometry;
/// Routbare Board-Elemente
///
/// Dieses Modul definiert die Item-Datenstrukturen:
/// - Item: Segment, Via oder Pad mit Netz, Layer-Bereich und Lock-Flag
/// - ItemDraft: Noch nicht committeter Entwurf ohne ID
/// - Footprint: Eltern-Objekt von Pads
pub mod item;
pub mod layer;
pub mod sizes;
pub mod spatial;

pub use board::{Board, BoardFile};
pub use design_settings::{DesignSettings, NetClass};
pub use item::{Footprint, Item, ItemDraft, ItemId, ItemKind, NetCode};
pub use layer::{LayerId, LayerPair, LayerRange, Stackup, MAX_COPPER_LAYERS};
pub use sizes::{SizeSource, SizesSettings, ViaType};
pub use spatial::{SpatialIndex, SpatialMatch};
