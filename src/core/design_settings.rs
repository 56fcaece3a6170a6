//! Board-Design-Einstellungen: Netzklassen, Custom-Größen, Via-Freigaben.

use super::{LayerPair, NetCode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Name der Fallback-Netzklasse.
pub const DEFAULT_NET_CLASS: &str = "Default";

/// Geometrische Vorgaben einer Netzklasse (Nanometer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetClass {
    pub track_width: u32,
    pub via_diameter: u32,
    pub via_drill: u32,
    pub diff_pair_width: u32,
    pub diff_pair_gap: u32,
    pub diff_pair_via_gap: u32,
    /// Zugeordnete Netze
    #[serde(default)]
    pub nets: Vec<NetCode>,
}

impl Default for NetClass {
    fn default() -> Self {
        Self {
            track_width: 250_000,
            via_diameter: 800_000,
            via_drill: 400_000,
            diff_pair_width: 200_000,
            diff_pair_gap: 250_000,
            diff_pair_via_gap: 250_000,
            nets: Vec::new(),
        }
    }
}

/// Design-Einstellungen eines Boards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// Board-weiter minimaler Via-Durchmesser
    pub min_via_diameter: u32,
    /// Board-weite minimale Bohrung
    pub min_through_drill: u32,
    /// Minimaler Abstand zwischen Kupfer unterschiedlicher Netze
    pub min_clearance: u32,
    /// Blind/Buried-Vias erlaubt
    pub blind_buried_allowed: bool,
    /// Microvias erlaubt
    pub microvias_allowed: bool,
    /// Custom-Track/Via-Größen statt Netzklasse verwenden
    pub use_custom_track_via_size: bool,
    /// Custom-Trackbreite
    pub custom_track_width: u32,
    /// Zuletzt vom User gewählte Via-Größe (unabhängig von der Netzklasse)
    pub current_via_size: u32,
    /// Zuletzt vom User gewählte Via-Bohrung
    pub current_via_drill: u32,
    pub custom_diff_pair_width: u32,
    pub custom_diff_pair_gap: u32,
    pub custom_diff_pair_via_gap: u32,
    /// Netzklassen nach Name
    pub net_classes: IndexMap<String, NetClass>,
    /// Standard-Layer-Paar für Vias (None = Außenlagen)
    pub route_layer_pair: Option<LayerPair>,
}

impl Default for DesignSettings {
    fn default() -> Self {
        let mut net_classes = IndexMap::new();
        net_classes.insert(DEFAULT_NET_CLASS.to_string(), NetClass::default());
        Self {
            min_via_diameter: 500_000,
            min_through_drill: 300_000,
            min_clearance: 200_000,
            blind_buried_allowed: false,
            microvias_allowed: false,
            use_custom_track_via_size: false,
            custom_track_width: 250_000,
            current_via_size: 600_000,
            current_via_drill: 300_000,
            custom_diff_pair_width: 200_000,
            custom_diff_pair_gap: 250_000,
            custom_diff_pair_via_gap: 250_000,
            net_classes,
            route_layer_pair: None,
        }
    }
}

impl DesignSettings {
    /// Netzklasse eines Netzes (Fallback: `Default`, sonst Standardwerte).
    ///
    /// Die Zuordnung erfolgt über `NetClass::nets`.
    pub fn net_class_for(&self, net: NetCode) -> NetClass {
        self.net_classes
            .values()
            .find(|class| class.nets.contains(&net))
            .or_else(|| self.net_classes.get(DEFAULT_NET_CLASS))
            .cloned()
            .unwrap_or_default()
    }

    /// Netzklassen-Vias werden verwendet (keine Custom-Größe aktiv).
    pub fn use_net_class_via(&self) -> bool {
        !self.use_custom_track_via_size
    }
}
