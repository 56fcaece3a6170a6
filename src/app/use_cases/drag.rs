//! Use-Case: Drag-Neuberechnung für Free-Angle- und 45°-Moves bestehender Items.
//!
//! Jede Bewegung wird aus den Original-Items neu berechnet; es gibt keine
//! inkrementelle Verschiebung und damit keinen Drift.

use super::commit::Changeset;
use crate::app::RouterError;
use crate::core::{geometry, Item, ItemId, ItemKind};
use crate::engine::{DragGeometry, DragRequest, PathEngine, RouterMode};
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Drag-Modus als Bitmaske.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DragMode(pub u8);

impl DragMode {
    /// Jede Item-Art darf gezogen werden
    pub const ANY: DragMode = DragMode(1);
    /// Beliebige Winkel
    pub const FREE_ANGLE: DragMode = DragMode(2);
    /// Segmente behalten ihren (45°-)Winkel
    pub const FORTY_FIVE_DEGREE: DragMode = DragMode(4);

    /// Sind alle Bits von `other` gesetzt?
    pub fn contains(self, other: DragMode) -> bool {
        self.0 & other.0 == other.0
    }

    /// Freie Winkel? FREE_ANGLE gewinnt, sonst gilt die 45°-Beschränkung.
    pub fn is_free_angle(self) -> bool {
        self.contains(Self::FREE_ANGLE)
    }
}

impl std::ops::BitOr for DragMode {
    type Output = DragMode;

    fn bitor(self, rhs: DragMode) -> DragMode {
        DragMode(self.0 | rhs.0)
    }
}

impl Default for DragMode {
    fn default() -> Self {
        DragMode::ANY | DragMode::FORTY_FIVE_DEGREE
    }
}

/// Reduziert eine triviale Ecken-Auswahl auf ein Referenz-Item.
///
/// Trivial: höchstens zwei Segmente und eine Via eines Netzes, die sich
/// einen gemeinsamen Punkt teilen. Die Via hat Vorrang.
pub fn filter_neighbouring_segments(items: Vec<Item>) -> Vec<Item> {
    if items.len() < 2 || items.len() > 3 {
        return items;
    }
    let net = items[0].net;
    let segments = items.iter().filter(|i| i.is_segment()).count();
    let vias = items.iter().filter(|i| i.is_via()).count();
    if segments > 2 || vias > 1 || segments + vias != items.len() {
        return items;
    }
    if items.iter().any(|i| i.net != net) {
        return items;
    }

    let shared = items[0].anchors().into_iter().find(|p| {
        items
            .iter()
            .all(|item| item.anchors().contains(p))
    });
    if shared.is_none() {
        return items;
    }

    let keep = items
        .iter()
        .position(|i| i.is_via())
        .unwrap_or(0);
    log::debug!("Nachbar-Segment-Filter: Auswahl auf Item {} reduziert", items[keep].id);
    vec![items[keep].clone()]
}

/// Laufender Drag mit Rollback-Zustand.
#[derive(Debug, Clone)]
pub struct DragEngine {
    originals: Vec<Item>,
    anchor: IVec2,
    mode: DragMode,
    router_mode: RouterMode,
    /// Zuletzt erfolgreich berechnete Geometrie (angezeigt)
    displayed: DragGeometry,
    last_target: Option<IVec2>,
}

impl DragEngine {
    /// Beginnt einen Drag der gegebenen Items am Greifpunkt `anchor`.
    pub fn start(originals: Vec<Item>, anchor: IVec2, mode: DragMode, router_mode: RouterMode) -> Self {
        let displayed = DragGeometry {
            modified: originals.clone(),
            collisions: Vec::new(),
        };
        Self {
            originals,
            anchor,
            mode,
            router_mode,
            displayed,
            last_target: None,
        }
    }

    /// Gezogene Items im Ausgangszustand.
    pub fn originals(&self) -> &[Item] {
        &self.originals
    }

    /// IDs der gezogenen Items.
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.originals.iter().map(|item| item.id).collect()
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    /// Aktuell angezeigte Geometrie.
    pub fn displayed(&self) -> &DragGeometry {
        &self.displayed
    }

    /// Wendet die Winkelbeschränkung des Modus auf ein Item an.
    fn constrained(&self, item: &Item, delta: IVec2) -> Item {
        let mut moved = item.clone();
        let shift = if self.mode.is_free_angle() {
            delta
        } else {
            match item.kind {
                ItemKind::Segment { start, end, .. } => geometry::project_on_normal(delta, start, end),
                ItemKind::Via { .. } | ItemKind::Solid { .. } => geometry::snap_to_octant(delta),
            }
        };
        moved.translate(shift);
        moved
    }

    /// Bewegt die Auswahl nach `target`.
    ///
    /// Ohne legale Lösung bleibt die angezeigte Geometrie unverändert und
    /// `NoGeometricSolution` wird gemeldet. Wiederholte Aufrufe mit gleichem
    /// Ziel liefern dieselbe Geometrie.
    pub fn move_to(
        &mut self,
        engine: &dyn PathEngine,
        target: IVec2,
    ) -> Result<&DragGeometry, RouterError> {
        if self.last_target == Some(target) {
            return Ok(&self.displayed);
        }

        let delta = target - self.anchor;
        let moved: Vec<Item> = self
            .originals
            .iter()
            .map(|item| self.constrained(item, delta))
            .collect();

        let request = DragRequest {
            originals: &self.originals,
            moved: &moved,
            mode: self.router_mode,
        };
        match engine.drag(&request) {
            Ok(geometry) => {
                self.displayed = geometry;
                self.last_target = Some(target);
                Ok(&self.displayed)
            }
            Err(failure) => {
                log::debug!("Drag nach {:?} ohne Lösung: {}", target, failure);
                Err(RouterError::NoGeometricSolution)
            }
        }
    }

    /// Changeset der aktuell angezeigten Geometrie.
    pub fn changeset(&self, allow_locked: bool) -> Changeset {
        let modified = self
            .displayed
            .modified
            .iter()
            .filter(|item| !self.originals.contains(item))
            .cloned()
            .collect();
        Changeset {
            modified,
            allow_locked,
            ..Changeset::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Board, DesignSettings, ItemDraft, LayerId, Stackup};
    use crate::engine::DirectRouter;
    use std::sync::Arc;

    fn board() -> Arc<Board> {
        let mut board = Board::new(Stackup::new(2), DesignSettings::default());
        // 1: gezogenes Segment, 2: angeschlossenes Segment, 3: fremdes Netz
        board.add_item(ItemDraft::segment(
            IVec2::new(0, 0),
            IVec2::new(1_000_000, 0),
            200_000,
            LayerId(0),
            1,
        ));
        board.add_item(ItemDraft::segment(
            IVec2::new(1_000_000, 0),
            IVec2::new(1_000_000, -1_000_000),
            200_000,
            LayerId(0),
            1,
        ));
        board.add_item(ItemDraft::segment(
            IVec2::new(0, 2_000_000),
            IVec2::new(1_000_000, 2_000_000),
            200_000,
            LayerId(0),
            2,
        ));
        Arc::new(board)
    }

    fn drag(board: &Board, mode: DragMode) -> DragEngine {
        let item = board.item(1).cloned().expect("Item erwartet");
        DragEngine::start(vec![item], IVec2::new(500_000, 0), mode, RouterMode::Walkaround)
    }

    #[test]
    fn forty_five_mode_preserves_segment_angle() {
        let board = board();
        let router = DirectRouter::with_world(board.clone());
        let mut engine = drag(&board, DragMode::default());

        let geometry = engine
            .move_to(&router, IVec2::new(800_000, 500_000))
            .expect("Lösung erwartet");
        let moved = &geometry.modified[0];
        assert_eq!(
            moved.kind,
            ItemKind::Segment {
                start: IVec2::new(0, 500_000),
                end: IVec2::new(1_000_000, 500_000),
                width: 200_000,
            }
        );
        // Angeschlossenes Segment wird mitgezogen
        assert_eq!(geometry.modified.len(), 2);
    }

    #[test]
    fn free_angle_mode_follows_cursor() {
        let board = board();
        let router = DirectRouter::with_world(board.clone());
        let mut engine = drag(&board, DragMode::ANY | DragMode::FREE_ANGLE);
        let geometry = engine
            .move_to(&router, IVec2::new(800_000, 500_000))
            .expect("Lösung erwartet");
        assert_eq!(geometry.modified[0].anchors()[0], IVec2::new(300_000, 500_000));
    }

    #[test]
    fn repeated_target_is_idempotent() {
        let board = board();
        let router = DirectRouter::with_world(board.clone());
        let mut engine = drag(&board, DragMode::default());
        let first = engine
            .move_to(&router, IVec2::new(500_000, 300_000))
            .expect("Lösung erwartet")
            .clone();
        let second = engine
            .move_to(&router, IVec2::new(500_000, 300_000))
            .expect("Lösung erwartet")
            .clone();
        assert_eq!(first, second);
    }

    #[test]
    fn blocked_move_keeps_previous_geometry() {
        let board = board();
        let router = DirectRouter::with_world(board.clone());
        let mut engine = drag(&board, DragMode::default());
        let good = engine
            .move_to(&router, IVec2::new(500_000, 300_000))
            .expect("Lösung erwartet")
            .clone();

        let result = engine.move_to(&router, IVec2::new(500_000, 2_000_000));
        assert_eq!(result.err(), Some(RouterError::NoGeometricSolution));
        assert_eq!(engine.displayed(), &good);
    }

    #[test]
    fn corner_selection_is_reduced_to_one_item() {
        let board = board();
        let selection = vec![
            board.item(1).cloned().expect("Item erwartet"),
            board.item(2).cloned().expect("Item erwartet"),
        ];
        let filtered = filter_neighbouring_segments(selection);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, 1);
    }

    #[test]
    fn unrelated_selection_is_kept() {
        let board = board();
        let selection = vec![
            board.item(1).cloned().expect("Item erwartet"),
            board.item(3).cloned().expect("Item erwartet"),
        ];
        assert_eq!(filter_neighbouring_segments(selection).len(), 2);
    }

    #[test]
    fn free_angle_wins_over_forty_five() {
        let mode = DragMode::FREE_ANGLE | DragMode::FORTY_FIVE_DEGREE;
        assert!(mode.is_free_angle());
        assert!(!DragMode::ANY.is_free_angle());
    }
}
