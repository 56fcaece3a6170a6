//! Kupfer-Layer, Layer-Bereiche, Layer-Paare und der Lagenaufbau (Stackup).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Obergrenze für Kupferlagen. IDs ab diesem Wert sind Nicht-Kupfer-Layer.
pub const MAX_COPPER_LAYERS: u8 = 32;

/// Layer-Kennung.
///
/// Kupferlagen sind nach ihrer Position im Lagenaufbau nummeriert
/// (0 = oberste Lage). Technische Layer (Silkscreen, Maske, …) liegen
/// oberhalb von [`MAX_COPPER_LAYERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u8);

impl LayerId {
    /// Oberste Kupferlage.
    pub const TOP: LayerId = LayerId(0);

    /// Erstellt die Kupferlage mit der gegebenen Stackup-Position.
    pub const fn copper(ordinal: u8) -> Self {
        LayerId(ordinal)
    }

    /// Erstellt einen technischen (Nicht-Kupfer-)Layer.
    pub const fn non_copper(index: u8) -> Self {
        LayerId(MAX_COPPER_LAYERS.saturating_add(index))
    }

    /// Ist dies eine Kupferlage?
    pub fn is_copper(self) -> bool {
        self.0 < MAX_COPPER_LAYERS
    }

    /// Position im Lagenaufbau (0 = oben).
    pub fn ordinal(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_copper() {
            write!(f, "Cu{}", self.0)
        } else {
            write!(f, "Tech{}", self.0 - MAX_COPPER_LAYERS)
        }
    }
}

/// Zusammenhängender Layer-Bereich eines Items (inklusive beider Enden).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerRange {
    start: LayerId,
    end: LayerId,
}

impl LayerRange {
    /// Erstellt einen Bereich; die Enden werden sortiert.
    pub fn new(a: LayerId, b: LayerId) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Bereich aus genau einem Layer.
    pub fn single(layer: LayerId) -> Self {
        Self {
            start: layer,
            end: layer,
        }
    }

    /// Erster (oberster) Layer.
    pub fn start(&self) -> LayerId {
        self.start
    }

    /// Letzter (unterster) Layer.
    pub fn end(&self) -> LayerId {
        self.end
    }

    /// Liegt `layer` im Bereich?
    pub fn overlaps(&self, layer: LayerId) -> bool {
        self.start <= layer && layer <= self.end
    }

    /// Überschneiden sich die beiden Bereiche?
    pub fn intersects(&self, other: &LayerRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Alle Layer des Bereichs.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> {
        (self.start.0..=self.end.0).map(LayerId)
    }
}

impl From<LayerPair> for LayerRange {
    fn from(pair: LayerPair) -> Self {
        LayerRange::new(pair.top, pair.bottom)
    }
}

/// Layer-Paar (top, bottom): Standard-Spanne einer Via.
///
/// Die Reihenfolge bleibt so erhalten wie angegeben; `top` muss nicht
/// oberhalb von `bottom` liegen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerPair {
    pub top: LayerId,
    pub bottom: LayerId,
}

impl LayerPair {
    /// Erstellt ein Layer-Paar.
    pub fn new(top: LayerId, bottom: LayerId) -> Self {
        Self { top, bottom }
    }

    /// Ist `layer` eines der beiden Enden?
    pub fn contains(&self, layer: LayerId) -> bool {
        self.top == layer || self.bottom == layer
    }

    /// Gibt das jeweils andere Ende zurück, falls `layer` ein Ende ist.
    pub fn paired(&self, layer: LayerId) -> Option<LayerId> {
        if layer == self.top {
            Some(self.bottom)
        } else if layer == self.bottom {
            Some(self.top)
        } else {
            None
        }
    }

    /// Vergleicht die Enden unabhängig von der Reihenfolge.
    pub fn same_span(&self, a: LayerId, b: LayerId) -> bool {
        (self.top == a && self.bottom == b) || (self.top == b && self.bottom == a)
    }

    /// Sind beide Enden identisch?
    pub fn is_degenerate(&self) -> bool {
        self.top == self.bottom
    }
}

impl fmt::Display for LayerPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.top, self.bottom)
    }
}

/// Lagenaufbau der Platine: Anzahl der Kupferlagen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stackup {
    copper_count: u8,
}

impl Stackup {
    /// Erstellt einen Stackup; die Lagenanzahl wird auf 1..=32 begrenzt.
    pub fn new(copper_count: u8) -> Self {
        Self {
            copper_count: copper_count.clamp(1, MAX_COPPER_LAYERS),
        }
    }

    /// Anzahl der Kupferlagen.
    pub fn copper_count(&self) -> u8 {
        self.copper_count
    }

    /// Oberste Außenlage.
    pub fn top(&self) -> LayerId {
        LayerId::TOP
    }

    /// Unterste Außenlage.
    pub fn bottom(&self) -> LayerId {
        LayerId(self.copper_count - 1)
    }

    /// Zweite Lage von oben (bei 1-lagigen Boards die Außenlage selbst).
    pub fn second_from_top(&self) -> LayerId {
        LayerId(1.min(self.copper_count - 1))
    }

    /// Zweite Lage von unten.
    pub fn second_from_bottom(&self) -> LayerId {
        LayerId(self.copper_count.saturating_sub(2))
    }

    /// Gehört `layer` als Kupferlage zu diesem Stackup?
    pub fn contains(&self, layer: LayerId) -> bool {
        layer.is_copper() && layer.0 < self.copper_count
    }

    /// Ist `layer` eine Außenlage?
    pub fn is_outer(&self, layer: LayerId) -> bool {
        layer == self.top() || layer == self.bottom()
    }

    /// Liegt `layer` direkt unter/über einer Außenlage?
    pub fn is_adjacent_to_outer(&self, layer: LayerId) -> bool {
        self.contains(layer)
            && (layer == self.second_from_top() || layer == self.second_from_bottom())
    }

    /// Würde das Paar den kompletten Lagenaufbau durchdringen?
    pub fn is_full_span(&self, pair: &LayerPair) -> bool {
        pair.same_span(self.top(), self.bottom())
    }

    /// Alle Kupferlagen von oben nach unten.
    pub fn copper_layers(&self) -> impl Iterator<Item = LayerId> {
        (0..self.copper_count).map(LayerId)
    }

    /// Standard-Layer-Paar (Außenlagen).
    pub fn outer_pair(&self) -> LayerPair {
        LayerPair::new(self.top(), self.bottom())
    }
}

impl Default for Stackup {
    fn default() -> Self {
        Self::new(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_layer_stackup_adjacency() {
        let stackup = Stackup::new(4);
        assert!(stackup.is_outer(LayerId(0)));
        assert!(stackup.is_outer(LayerId(3)));
        assert!(stackup.is_adjacent_to_outer(LayerId(1)));
        assert!(stackup.is_adjacent_to_outer(LayerId(2)));
        assert!(!stackup.contains(LayerId(4)));
    }

    #[test]
    fn six_layer_stackup_has_deep_inner_layers() {
        let stackup = Stackup::new(6);
        assert!(!stackup.is_outer(LayerId(3)));
        assert!(!stackup.is_adjacent_to_outer(LayerId(3)));
        assert_eq!(stackup.second_from_bottom(), LayerId(4));
    }

    #[test]
    fn pair_paired_and_span() {
        let pair = LayerPair::new(LayerId(0), LayerId(3));
        assert_eq!(pair.paired(LayerId(0)), Some(LayerId(3)));
        assert_eq!(pair.paired(LayerId(3)), Some(LayerId(0)));
        assert_eq!(pair.paired(LayerId(1)), None);
        assert!(Stackup::new(4).is_full_span(&LayerPair::new(LayerId(3), LayerId(0))));
    }

    #[test]
    fn non_copper_layers_are_not_copper() {
        assert!(!LayerId::non_copper(0).is_copper());
        assert!(!Stackup::new(4).contains(LayerId::non_copper(2)));
    }
}
