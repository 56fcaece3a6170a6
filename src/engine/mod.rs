//! Kollaborateur-Schnittstellen der Routing-Session: Pfad-Engine und Regel-Engine.
//!
//! Die Session konsumiert Geometrie und Constraints nur über diese Traits.
//! `DirectRouter` und `RuleSet` sind die Referenz-Implementierungen für
//! Replay-Binary und Tests.

pub mod direct;
pub mod rules;

use crate::core::{Board, Item, ItemDraft, ItemId, LayerId, LayerPair, NetCode, SizesSettings, ViaType};
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use direct::DirectRouter;
pub use rules::{Rule, RuleCondition, RuleSet};

/// Kollisions-Strategie der Pfad-Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RouterMode {
    /// Hindernisse verdrängen
    Shove,
    /// Um Hindernisse herum routen
    #[default]
    Walkaround,
    /// Konflikte nur markieren
    MarkObstacles,
}

/// Form des Zwei-Segment-Kopfes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Posture {
    /// 45°-Diagonale am Start, Gerade zum Ziel
    #[default]
    DiagonalFirst,
    /// Gerade am Start, Diagonale zum Ziel
    StraightFirst,
}

impl Posture {
    /// Gibt die jeweils andere Haltung zurück.
    pub fn flipped(self) -> Self {
        match self {
            Posture::DiagonalFirst => Posture::StraightFirst,
            Posture::StraightFirst => Posture::DiagonalFirst,
        }
    }
}

/// Via, die am Ende des Kopfes mitgeführt wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadVia {
    pub via_type: ViaType,
    /// Physische Spanne der Via
    pub span: LayerPair,
    pub diameter: u32,
    pub drill: u32,
}

/// Anfrage für die Neuberechnung des Routing-Kopfes.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub start: IVec2,
    pub start_item: Option<ItemId>,
    pub layer: LayerId,
    pub end: IVec2,
    pub end_item: Option<ItemId>,
    pub net: NetCode,
    pub track_width: u32,
    pub via: Option<HeadVia>,
    pub mode: RouterMode,
    pub posture: Posture,
    pub ortho: bool,
    pub rounded: bool,
}

/// Vorläufige Geometrie eines Routing-Kopfes.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteGeometry {
    /// Segmente (und ggf. die mitgeführte Via) in Zugreihenfolge
    pub items: Vec<ItemDraft>,
    /// Tatsächlich erreichter Endpunkt (nach Snap)
    pub end: IVec2,
    /// Layer, auf dem der Kopf endet
    pub end_layer: LayerId,
    /// Der Kopf endet auf einem Item des eigenen Netzes
    pub reached_target: bool,
    /// Leiterbahnlänge des Kopfes
    pub length: f64,
    /// Markierte Konflikte (nur im Modus `MarkObstacles`)
    pub collisions: Vec<ItemId>,
}

/// Anfrage für die Neuberechnung eines Drags.
#[derive(Debug, Clone, PartialEq)]
pub struct DragRequest<'a> {
    /// Gezogene Items im Ausgangszustand
    pub originals: &'a [Item],
    /// Dieselben Items nach der winkelbeschränkten Verschiebung
    pub moved: &'a [Item],
    pub mode: RouterMode,
}

/// Ergebnis eines Drags: alle geänderten Board-Items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DragGeometry {
    pub modified: Vec<Item>,
    pub collisions: Vec<ItemId>,
}

/// Antwort der Pfad-Engine auf einen Layer-Wechsel während des Routings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSwitch {
    /// Der Kopf kann ohne Via auf dem Ziel-Layer weiterlaufen
    Direct,
    /// Der Wechsel braucht eine Via
    ViaRequired,
    /// Wechsel abgelehnt (Grund wörtlich)
    Refused(String),
}

/// Fehlschlag einer Geometrie-Berechnung.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineFailure {
    #[error("Pfad-Engine hat keine Board-Welt geladen")]
    NoWorld,
    #[error("keine geometrische Lösung (Konflikt mit Item {0})")]
    NoSolution(ItemId),
}

/// Pfad-Engine: Geometrie-Berechnung für Routing und Drag.
///
/// Alle Berechnungen sind zustandslos bezüglich der Anfrage: gleiche Anfrage,
/// gleiche Welt → gleiche Geometrie.
pub trait PathEngine {
    /// Übernimmt die aktuelle Board-Welt.
    fn sync_world(&mut self, board: Arc<Board>);
    /// Verwirft die Board-Welt (vor Undo/Redo).
    fn clear_world(&mut self);
    /// Prüft, ob an `start` ein Routing beginnen kann. Fehlergrund wird wörtlich angezeigt.
    fn check_start(
        &self,
        start: IVec2,
        start_item: Option<ItemId>,
        layer: LayerId,
        sizes: &SizesSettings,
    ) -> Result<(), String>;
    /// Berechnet den Kopf von `start` nach `end`.
    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, EngineFailure>;
    /// Berechnet die Board-Änderungen eines Drags.
    fn drag(&self, request: &DragRequest<'_>) -> Result<DragGeometry, EngineFailure>;
    /// Prüft, ob der Kopf direkt auf `target` weiterlaufen kann.
    fn switch_layer(&self, request: &RouteRequest, target: LayerId) -> LayerSwitch;
}

/// Art eines Constraints der Regel-Engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintKind {
    ViaDiameter,
    HoleSize,
}

/// Regel-Engine: liefert optionale Constraint-Werte für ein Kandidaten-Item.
pub trait RuleEngine {
    /// `None` bedeutet: kein Constraint, Standardwert verwenden.
    fn eval_constraint(&self, kind: ConstraintKind, candidate: &Item, layer: LayerId)
        -> Option<u32>;
}
