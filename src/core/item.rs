//! Routbare Board-Elemente: Tracks, Vias und Pads (Solids).

use super::geometry::Capsule;
use super::{LayerId, LayerPair, LayerRange, ViaType};
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Eindeutige Item-ID innerhalb eines Boards.
pub type ItemId = u64;

/// Netz-Code (0 = unverbunden).
pub type NetCode = u32;

/// Geometrie eines Items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ItemKind {
    /// Leiterbahn-Segment
    Segment { start: IVec2, end: IVec2, width: u32 },
    /// Via
    Via {
        position: IVec2,
        diameter: u32,
        drill: u32,
        via_type: ViaType,
    },
    /// Pad / Solid (kreisförmig angenähert)
    Solid { position: IVec2, size: u32 },
}

/// Entwurf eines neuen Items (noch ohne ID).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub kind: ItemKind,
    pub net: NetCode,
    pub layers: LayerRange,
}

impl ItemDraft {
    /// Track-Entwurf auf einem Layer.
    pub fn segment(start: IVec2, end: IVec2, width: u32, layer: LayerId, net: NetCode) -> Self {
        Self {
            kind: ItemKind::Segment { start, end, width },
            net,
            layers: LayerRange::single(layer),
        }
    }

    /// Via-Entwurf für ein Layer-Paar.
    pub fn via(
        position: IVec2,
        diameter: u32,
        drill: u32,
        via_type: ViaType,
        pair: LayerPair,
        net: NetCode,
    ) -> Self {
        Self {
            kind: ItemKind::Via {
                position,
                diameter,
                drill,
                via_type,
            },
            net,
            layers: pair.into(),
        }
    }

    /// Macht aus dem Entwurf ein Board-Item mit der vergebenen ID.
    pub fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            kind: self.kind,
            net: self.net,
            layers: self.layers,
            locked: false,
            parent: None,
        }
    }

    /// Hüllform des Entwurfs.
    pub fn outline(&self) -> Capsule {
        outline_of(&self.kind)
    }

    /// Leiterbahnlänge (0 für Vias/Pads).
    pub fn track_length(&self) -> f64 {
        match self.kind {
            ItemKind::Segment { start, end, .. } => super::geometry::segment_length(start, end),
            _ => 0.0,
        }
    }
}

/// Ein Board-Item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    pub net: NetCode,
    pub layers: LayerRange,
    /// Gesperrte Items dürfen nur nach Bestätigung verschoben werden
    #[serde(default)]
    pub locked: bool,
    /// Footprint, zu dem ein Pad gehört
    #[serde(default)]
    pub parent: Option<u64>,
}

impl Item {
    /// Ist das Item ein Track-Segment?
    pub fn is_segment(&self) -> bool {
        matches!(self.kind, ItemKind::Segment { .. })
    }

    /// Ist das Item eine Via?
    pub fn is_via(&self) -> bool {
        matches!(self.kind, ItemKind::Via { .. })
    }

    /// Referenzpunkte für den Spatial-Index (Segment: beide Enden).
    pub fn anchors(&self) -> Vec<IVec2> {
        match self.kind {
            ItemKind::Segment { start, end, .. } => vec![start, end],
            ItemKind::Via { position, .. } | ItemKind::Solid { position, .. } => vec![position],
        }
    }

    /// Hüllform des Items.
    pub fn outline(&self) -> Capsule {
        outline_of(&self.kind)
    }

    /// Verschiebt das Item um `delta`.
    pub fn translate(&mut self, delta: IVec2) {
        match &mut self.kind {
            ItemKind::Segment { start, end, .. } => {
                *start += delta;
                *end += delta;
            }
            ItemKind::Via { position, .. } | ItemKind::Solid { position, .. } => {
                *position += delta;
            }
        }
    }

    /// Liegt `point` auf einem Segment-Ende? Gibt das getroffene Ende zurück.
    pub fn endpoint_at(&self, point: IVec2) -> Option<IVec2> {
        match self.kind {
            ItemKind::Segment { start, end, .. } if start == point || end == point => Some(point),
            _ => None,
        }
    }
}

fn outline_of(kind: &ItemKind) -> Capsule {
    match *kind {
        ItemKind::Segment { start, end, width } => Capsule {
            a: start,
            b: end,
            radius: f64::from(width) / 2.0,
        },
        ItemKind::Via {
            position, diameter, ..
        } => Capsule::circle(position, f64::from(diameter) / 2.0),
        ItemKind::Solid { position, size } => Capsule::circle(position, f64::from(size) / 2.0),
    }
}

/// Footprint als Eltern-Objekt von Pads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub id: u64,
    pub reference: String,
    #[serde(default)]
    pub locked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_moves_both_segment_ends() {
        let mut item = ItemDraft::segment(IVec2::ZERO, IVec2::new(10, 0), 2, LayerId(0), 1)
            .into_item(7);
        item.translate(IVec2::new(1, 2));
        assert_eq!(item.anchors(), vec![IVec2::new(1, 2), IVec2::new(11, 2)]);
        assert_eq!(item.id, 7);
        assert!(!item.locked);
    }

    #[test]
    fn via_outline_is_circle() {
        let draft = ItemDraft::via(
            IVec2::new(5, 5),
            600,
            300,
            ViaType::Through,
            LayerPair::new(LayerId(0), LayerId(1)),
            3,
        );
        let outline = draft.outline();
        assert_eq!(outline.a, outline.b);
        assert_eq!(outline.radius, 300.0);
        assert_eq!(draft.layers, LayerRange::new(LayerId(0), LayerId(1)));
    }
}
