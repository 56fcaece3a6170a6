//! Via-Typen und die interaktiven Größen-Einstellungen einer Routing-Session.

use super::{LayerId, LayerPair};
use serde::{Deserialize, Serialize};

/// Bauform einer Via.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ViaType {
    /// Durchgehende Via (ganzer Lagenaufbau)
    #[default]
    Through,
    /// Blind- oder Buried-Via (Teilspanne)
    BlindBuried,
    /// Microvia zwischen Außenlage und direkt benachbarter Innenlage
    Microvia,
}

/// Herkunft eines Größenwertes.
///
/// Jede Dimension trägt genau eine Quelle; eine Dimension wird nie aus
/// zwei Quellen gemischt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizeSource {
    /// Board-weiter Minimalwert (kein Constraint gefunden)
    #[default]
    BoardMinimum,
    /// Netzklassen-Vorgabe
    NetClass,
    /// Vom User gewählter Custom-Wert
    Custom,
    /// Von der Regel-Engine geliefertes Constraint
    Rules,
}

/// Größen-Einstellungen für eine Route (alle Maße in Nanometer).
///
/// `u32` erzwingt nicht-negative Werte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizesSettings {
    pub track_width: u32,
    pub track_width_source: SizeSource,
    pub via_diameter: u32,
    pub via_diameter_source: SizeSource,
    pub via_drill: u32,
    pub via_drill_source: SizeSource,
    pub diff_pair_width: u32,
    pub diff_pair_gap: u32,
    pub diff_pair_via_gap: u32,
    pub diff_pair_source: SizeSource,
    pub via_type: ViaType,
    layer_pairs: Vec<LayerPair>,
}

impl Default for SizesSettings {
    fn default() -> Self {
        Self {
            track_width: 250_000,
            track_width_source: SizeSource::BoardMinimum,
            via_diameter: 600_000,
            via_diameter_source: SizeSource::BoardMinimum,
            via_drill: 300_000,
            via_drill_source: SizeSource::BoardMinimum,
            diff_pair_width: 200_000,
            diff_pair_gap: 250_000,
            diff_pair_via_gap: 250_000,
            diff_pair_source: SizeSource::BoardMinimum,
            via_type: ViaType::Through,
            layer_pairs: Vec::new(),
        }
    }
}

impl SizesSettings {
    /// Entfernt alle Layer-Paare.
    pub fn clear_layer_pairs(&mut self) {
        self.layer_pairs.clear();
    }

    /// Fügt ein Layer-Paar hinzu (das erste Paar ist das Standard-Paar).
    pub fn add_layer_pair(&mut self, pair: LayerPair) {
        if !self.layer_pairs.contains(&pair) {
            self.layer_pairs.push(pair);
        }
    }

    /// Alle Layer-Paare in Einfügereihenfolge.
    pub fn layer_pairs(&self) -> &[LayerPair] {
        &self.layer_pairs
    }

    /// Sucht das Gegenstück zu `layer` im ersten passenden Layer-Paar.
    pub fn paired_layer(&self, layer: LayerId) -> Option<LayerId> {
        self.layer_pairs.iter().find_map(|pair| pair.paired(layer))
    }

    /// Oberer Layer des Standard-Paars.
    pub fn layer_top(&self) -> Option<LayerId> {
        self.layer_pairs.first().map(|pair| pair.top)
    }

    /// Setzt Durchmesser und Bohrung einer Via mit ihren Quellen.
    pub fn set_via_sizes(
        &mut self,
        diameter: (u32, SizeSource),
        drill: (u32, SizeSource),
    ) {
        self.via_diameter = diameter.0;
        self.via_diameter_source = diameter.1;
        self.via_drill = drill.0;
        self.via_drill_source = drill.1;
    }
}
