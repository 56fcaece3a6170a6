//! Referenz-Pfad-Engine: Zwei-Segment-Kopf mit 45°-Haltung und Abstandsprüfung.
//!
//! Kein echter Shove-/Walkaround-Algorithmus: Konflikte werden im Modus
//! `MarkObstacles` gemeldet, in den anderen Modi ist die Lösung verworfen.

use super::{
    DragGeometry, DragRequest, EngineFailure, LayerSwitch, PathEngine, Posture, RouteGeometry,
    RouteRequest, RouterMode,
};
use crate::core::geometry::{self, Capsule};
use crate::core::{Board, Item, ItemDraft, ItemId, ItemKind, LayerId, LayerRange, NetCode, SizesSettings};
use glam::IVec2;
use std::collections::HashSet;
use std::sync::Arc;

/// Referenz-Implementierung von [`PathEngine`].
#[derive(Debug, Default)]
pub struct DirectRouter {
    world: Option<Arc<Board>>,
}

impl DirectRouter {
    /// Erstellt einen Router ohne Board-Welt.
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt einen Router mit geladener Board-Welt.
    pub fn with_world(board: Arc<Board>) -> Self {
        Self { world: Some(board) }
    }

    fn world(&self) -> Result<&Board, EngineFailure> {
        self.world.as_deref().ok_or(EngineFailure::NoWorld)
    }

    /// Snap-Punkt auf einem Ziel-Item.
    fn snap_to(item: &Item, point: IVec2) -> IVec2 {
        match item.kind {
            ItemKind::Segment { start, end, .. } => {
                if point.as_dvec2().distance(start.as_dvec2())
                    <= point.as_dvec2().distance(end.as_dvec2())
                {
                    start
                } else {
                    end
                }
            }
            ItemKind::Via { position, .. } | ItemKind::Solid { position, .. } => position,
        }
    }

    /// Stützpunkte des Kopfes (Start, Knick(e), Ende).
    fn head_points(request: &RouteRequest, end: IVec2) -> Vec<IVec2> {
        let start = request.start;
        let corner = if request.ortho {
            geometry::ortho_corner(start, end, request.posture == Posture::DiagonalFirst)
        } else {
            geometry::posture_corner(start, end, request.posture == Posture::DiagonalFirst)
        };

        let mut points = vec![start];
        if request.rounded && corner != start && corner != end {
            // Knick durch eine kurze Fase ersetzen
            let before = geometry::segment_length(start, corner);
            let after = geometry::segment_length(corner, end);
            let cut = f64::from(request.track_width).min(before / 2.0).min(after / 2.0);
            points.push(Self::towards(corner, start, cut));
            points.push(Self::towards(corner, end, cut));
        } else {
            points.push(corner);
        }
        points.push(end);
        points.dedup();
        points
    }

    fn towards(from: IVec2, to: IVec2, distance: f64) -> IVec2 {
        let dir = (to - from).as_dvec2();
        let len = dir.length();
        if len == 0.0 {
            return from;
        }
        (from.as_dvec2() + dir / len * distance).round().as_ivec2()
    }

    /// Erster Konflikt eines Entwurfs mit fremden Items (außer `ignore`).
    fn collisions(
        board: &Board,
        outline: &Capsule,
        layers: &LayerRange,
        net: NetCode,
        ignore: &HashSet<ItemId>,
    ) -> Vec<ItemId> {
        let clearance = f64::from(board.design.min_clearance);
        board
            .items()
            .filter(|item| !ignore.contains(&item.id))
            .filter(|item| net == 0 || item.net != net)
            .filter(|item| item.layers.intersects(layers))
            .filter(|item| outline.gap(&item.outline()) < clearance)
            .map(|item| item.id)
            .collect()
    }

    fn resolve_conflicts(
        mode: RouterMode,
        collisions: Vec<ItemId>,
    ) -> Result<Vec<ItemId>, EngineFailure> {
        match (mode, collisions.first()) {
            (RouterMode::MarkObstacles, _) | (_, None) => Ok(collisions),
            (_, Some(&first)) => Err(EngineFailure::NoSolution(first)),
        }
    }
}

impl PathEngine for DirectRouter {
    fn sync_world(&mut self, board: Arc<Board>) {
        log::debug!("Pfad-Engine: Welt synchronisiert ({} Items)", board.item_count());
        self.world = Some(board);
    }

    fn clear_world(&mut self) {
        log::debug!("Pfad-Engine: Welt verworfen");
        self.world = None;
    }

    fn check_start(
        &self,
        start: IVec2,
        start_item: Option<ItemId>,
        layer: LayerId,
        sizes: &SizesSettings,
    ) -> Result<(), String> {
        let board = self.world().map_err(|e| e.to_string())?;

        let Some(id) = start_item else {
            let probe = Capsule::circle(start, f64::from(sizes.track_width) / 2.0);
            let hits = Self::collisions(
                board,
                &probe,
                &LayerRange::single(layer),
                0,
                &HashSet::new(),
            );
            return match hits.first() {
                Some(hit) => Err(format!(
                    "Der Routing-Start verletzt den Mindestabstand zu Item {hit}."
                )),
                None => Ok(()),
            };
        };

        let item = board
            .item(id)
            .ok_or_else(|| format!("Start-Item {id} existiert nicht."))?;
        if !item.layers.overlaps(layer) {
            return Err(format!("Start-Item {id} liegt nicht auf Layer {layer}."));
        }
        Ok(())
    }

    fn route(&self, request: &RouteRequest) -> Result<RouteGeometry, EngineFailure> {
        let board = self.world()?;

        let target = request
            .end_item
            .and_then(|id| board.item(id))
            .filter(|item| item.net == request.net && item.layers.overlaps(request.layer));
        let end = target.map_or(request.end, |item| Self::snap_to(item, request.end));

        let points = Self::head_points(request, end);
        let mut items: Vec<ItemDraft> = points
            .windows(2)
            .map(|pair| {
                ItemDraft::segment(pair[0], pair[1], request.track_width, request.layer, request.net)
            })
            .collect();

        let mut end_layer = request.layer;
        if let Some(via) = request.via {
            items.push(ItemDraft::via(
                end,
                via.diameter,
                via.drill,
                via.via_type,
                via.span,
                request.net,
            ));
            end_layer = via.span.paired(request.layer).unwrap_or(request.layer);
        }

        let mut ignore: HashSet<ItemId> = HashSet::new();
        ignore.extend(request.start_item);
        ignore.extend(target.map(|item| item.id));

        let mut collisions: Vec<ItemId> = Vec::new();
        for draft in &items {
            for hit in Self::collisions(board, &draft.outline(), &draft.layers, request.net, &ignore)
            {
                if !collisions.contains(&hit) {
                    collisions.push(hit);
                }
            }
        }
        let collisions = Self::resolve_conflicts(request.mode, collisions)?;

        let length: f64 = items.iter().map(ItemDraft::track_length).sum();
        Ok(RouteGeometry {
            items,
            end,
            end_layer,
            reached_target: target.is_some(),
            length,
            collisions,
        })
    }

    fn drag(&self, request: &DragRequest<'_>) -> Result<DragGeometry, EngineFailure> {
        let board = self.world()?;
        let dragged: HashSet<ItemId> = request.originals.iter().map(|item| item.id).collect();

        // Verschiebung je Ankerpunkt (alte Position → neue Position)
        let mut moved_points: Vec<(IVec2, IVec2, NetCode)> = Vec::new();
        for (before, after) in request.originals.iter().zip(request.moved) {
            for (old, new) in before.anchors().into_iter().zip(after.anchors()) {
                if old != new {
                    moved_points.push((old, new, before.net));
                }
            }
        }

        let mut modified: Vec<Item> = request.moved.to_vec();

        // Angeschlossene Segmente desselben Netzes mitziehen
        for item in board.items().filter(|item| !dragged.contains(&item.id)) {
            let ItemKind::Segment { start, end, width } = item.kind else {
                continue;
            };
            let relocate = |p: IVec2| {
                moved_points
                    .iter()
                    .find(|(old, _, net)| *old == p && *net == item.net)
                    .map_or(p, |(_, new, _)| *new)
            };
            let (new_start, new_end) = (relocate(start), relocate(end));
            if (new_start, new_end) != (start, end) {
                let mut stretched = item.clone();
                stretched.kind = ItemKind::Segment {
                    start: new_start,
                    end: new_end,
                    width,
                };
                modified.push(stretched);
            }
        }

        let ignore: HashSet<ItemId> = modified.iter().map(|item| item.id).collect();
        let mut collisions: Vec<ItemId> = Vec::new();
        for item in &modified {
            for hit in Self::collisions(board, &item.outline(), &item.layers, item.net, &ignore) {
                if !collisions.contains(&hit) {
                    collisions.push(hit);
                }
            }
        }
        let collisions = Self::resolve_conflicts(request.mode, collisions)?;

        Ok(DragGeometry {
            modified,
            collisions,
        })
    }

    fn switch_layer(&self, request: &RouteRequest, target: LayerId) -> LayerSwitch {
        let Ok(board) = self.world() else {
            return LayerSwitch::Refused(EngineFailure::NoWorld.to_string());
        };
        if !board.stackup.contains(target) {
            return LayerSwitch::Refused(format!("Layer {target} ist keine Kupferlage des Boards."));
        }

        // Auf Vias/THT-Pads kann der Kopf direkt auf dem neuen Layer starten
        let spans_target = request
            .start_item
            .and_then(|id| board.item(id))
            .is_some_and(|item| !item.is_segment() && item.layers.overlaps(target));

        if spans_target {
            LayerSwitch::Direct
        } else {
            LayerSwitch::ViaRequired
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DesignSettings, LayerPair, Stackup, ViaType};
    use crate::engine::HeadVia;
    use approx::assert_relative_eq;

    fn request(start: IVec2, end: IVec2) -> RouteRequest {
        RouteRequest {
            start,
            start_item: None,
            layer: LayerId(0),
            end,
            end_item: None,
            net: 1,
            track_width: 200_000,
            via: None,
            mode: RouterMode::Walkaround,
            posture: Posture::DiagonalFirst,
            ortho: false,
            rounded: false,
        }
    }

    fn board_with_obstacle() -> Arc<Board> {
        let mut board = Board::new(Stackup::new(4), DesignSettings::default());
        board.add_item(ItemDraft::segment(
            IVec2::new(0, 5_000_000),
            IVec2::new(10_000_000, 5_000_000),
            200_000,
            LayerId(0),
            2,
        ));
        Arc::new(board)
    }

    #[test]
    fn route_without_world_fails() {
        let router = DirectRouter::new();
        let result = router.route(&request(IVec2::ZERO, IVec2::new(1_000_000, 0)));
        assert_eq!(result, Err(EngineFailure::NoWorld));
    }

    #[test]
    fn straight_route_has_one_segment() {
        let router = DirectRouter::with_world(board_with_obstacle());
        let geometry = router
            .route(&request(IVec2::ZERO, IVec2::new(1_000_000, 0)))
            .expect("Route erwartet");
        assert_eq!(geometry.items.len(), 1);
        assert_relative_eq!(geometry.length, 1_000_000.0);
        assert!(!geometry.reached_target);
    }

    #[test]
    fn diagonal_route_has_two_segments() {
        let router = DirectRouter::with_world(board_with_obstacle());
        let geometry = router
            .route(&request(IVec2::ZERO, IVec2::new(2_000_000, 1_000_000)))
            .expect("Route erwartet");
        assert_eq!(geometry.items.len(), 2);
        assert_eq!(geometry.end, IVec2::new(2_000_000, 1_000_000));
    }

    #[test]
    fn crossing_foreign_net_is_rejected_in_walkaround() {
        let router = DirectRouter::with_world(board_with_obstacle());
        let result = router.route(&request(
            IVec2::new(1_000_000, 0),
            IVec2::new(1_000_000, 8_000_000),
        ));
        assert_eq!(result, Err(EngineFailure::NoSolution(1)));
    }

    #[test]
    fn crossing_foreign_net_is_marked_in_highlight_mode() {
        let router = DirectRouter::with_world(board_with_obstacle());
        let mut req = request(IVec2::new(1_000_000, 0), IVec2::new(1_000_000, 8_000_000));
        req.mode = RouterMode::MarkObstacles;
        let geometry = router.route(&req).expect("Route erwartet");
        assert_eq!(geometry.collisions, vec![1]);
    }

    #[test]
    fn head_via_switches_end_layer() {
        let router = DirectRouter::with_world(board_with_obstacle());
        let mut req = request(IVec2::ZERO, IVec2::new(1_000_000, 0));
        req.via = Some(HeadVia {
            via_type: ViaType::Through,
            span: LayerPair::new(LayerId(0), LayerId(3)),
            diameter: 600_000,
            drill: 300_000,
        });
        let geometry = router.route(&req).expect("Route erwartet");
        assert_eq!(geometry.end_layer, LayerId(3));
        assert!(geometry.items.last().is_some_and(|d| matches!(d.kind, ItemKind::Via { .. })));
    }

    #[test]
    fn start_on_foreign_copper_is_refused() {
        let router = DirectRouter::with_world(board_with_obstacle());
        let reason = router
            .check_start(
                IVec2::new(3_000_000, 5_000_000),
                None,
                LayerId(0),
                &SizesSettings::default(),
            )
            .expect_err("Ablehnung erwartet");
        assert!(reason.contains("Mindestabstand"));
    }
}
