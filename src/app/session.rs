//! Routing-Session: Zustandsautomat mit höchstens einer aktiven Operation.
//!
//! Die laufende Operation besitzt ihren `InteractionGuard`. Jeder Übergang
//! nach `Idle` verwirft die Operation und gibt damit Edit-Block, Auto-Pan,
//! Cursor-Capture und Highlight frei.

use super::host::InteractionGuard;
use super::use_cases::commit::Changeset;
use super::use_cases::drag::DragEngine;
use crate::core::{ItemDraft, ItemId, LayerId, NetCode, SizesSettings, ViaType};
use crate::engine::{HeadVia, Posture, RouteGeometry, RouteRequest, RouterMode};
use crate::shared::{RouterOptions, TRANSITION_TRAIL_LEN};
use glam::IVec2;
use serde::Serialize;
use std::collections::VecDeque;

/// Zustände der Session. `Cancelled` ist transient und endet immer in `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Preparing,
    Routing,
    Dragging,
    Fixing,
    Cancelled,
}

/// Erlaubte Übergänge (von, nach).
const TRANSITIONS: &[(SessionState, SessionState)] = {
    use SessionState::*;
    &[
        (Idle, Preparing),
        (Preparing, Routing),
        (Preparing, Idle),
        (Routing, Fixing),
        (Fixing, Routing),
        (Fixing, Idle),
        (Routing, Cancelled),
        (Idle, Dragging),
        (Dragging, Fixing),
        (Fixing, Dragging),
        (Dragging, Cancelled),
        (Cancelled, Idle),
    ]
};

/// Via, die am Kopf hängt und beim nächsten Fix gesetzt wird.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVia {
    pub via: HeadVia,
    /// Layer, auf dem der Kopf zur Via läuft
    pub from_layer: LayerId,
    /// Layer, auf dem nach dem Fix weitergeroutet wird
    pub to_layer: LayerId,
    /// Größen vor dem Setzen (für das Zurücknehmen)
    pub sizes_before: SizesSettings,
}

/// Fixierter Routing-Schritt. Wird beim Beenden der Route übernommen,
/// auch wenn sie abgebrochen wird.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteStep {
    pub items: Vec<ItemDraft>,
    pub length: f64,
    // Zustand vor dem Fix
    start: IVec2,
    start_item: Option<ItemId>,
    layer: LayerId,
    via: Option<PendingVia>,
}

/// Laufende Routing-Operation.
#[derive(Debug)]
pub struct RouteOp {
    pub net: NetCode,
    /// Startpunkt des aktuellen Kopfes
    pub start: IVec2,
    pub start_item: Option<ItemId>,
    /// Layer des aktuellen Kopfes
    pub layer: LayerId,
    pub sizes: SizesSettings,
    pub via: Option<PendingVia>,
    /// Zuletzt angefragter Endpunkt
    pub end: IVec2,
    pub end_item: Option<ItemId>,
    pub ortho: bool,
    /// Zuletzt berechnete vorläufige Geometrie
    pub head: Option<RouteGeometry>,
    steps: Vec<RouteStep>,
    _guard: InteractionGuard,
}

impl RouteOp {
    /// Neue Operation ab `start` auf `layer`.
    pub fn new(
        guard: InteractionGuard,
        net: NetCode,
        start: IVec2,
        start_item: Option<ItemId>,
        layer: LayerId,
        sizes: SizesSettings,
    ) -> Self {
        Self {
            net,
            start,
            start_item,
            layer,
            sizes,
            via: None,
            end: start,
            end_item: None,
            ortho: false,
            head: None,
            steps: Vec::new(),
            _guard: guard,
        }
    }

    /// Anfrage an die Pfad-Engine für den aktuellen Kopf.
    pub fn request(&self, mode: RouterMode, posture: Posture, rounded: bool) -> RouteRequest {
        RouteRequest {
            start: self.start,
            start_item: self.start_item,
            layer: self.layer,
            end: self.end,
            end_item: self.end_item,
            net: self.net,
            track_width: self.sizes.track_width,
            via: self.via.as_ref().map(|pending| pending.via),
            mode,
            posture,
            ortho: self.ortho,
            rounded,
        }
    }

    /// Fixierte Schritte.
    pub fn steps(&self) -> &[RouteStep] {
        &self.steps
    }

    /// Gesamtlänge aus fixierten Schritten und Kopf.
    pub fn total_length(&self) -> f64 {
        let staged: f64 = self.steps.iter().map(|step| step.length).sum();
        staged + self.head.as_ref().map_or(0.0, |head| head.length)
    }

    /// Fixiert `geometry` als Schritt; der Kopf läuft ab deren Ende weiter.
    pub fn push_step(&mut self, geometry: RouteGeometry) {
        let next_layer = self
            .via
            .as_ref()
            .map_or(geometry.end_layer, |pending| pending.to_layer);
        self.steps.push(RouteStep {
            items: geometry.items,
            length: geometry.length,
            start: self.start,
            start_item: self.start_item,
            layer: self.layer,
            via: self.via.take(),
        });
        self.start = geometry.end;
        self.start_item = self.end_item;
        self.layer = next_layer;
        self.head = None;
    }

    /// Verwirft den letzten fixierten Schritt. `false`, wenn keiner existiert.
    pub fn undo_step(&mut self) -> bool {
        let Some(step) = self.steps.pop() else {
            return false;
        };
        self.start = step.start;
        self.start_item = step.start_item;
        self.layer = step.layer;
        self.via = step.via;
        self.head = None;
        true
    }

    /// Changeset aus allen fixierten Schritten plus `head`.
    pub fn changeset(&self, head: Option<&RouteGeometry>) -> Changeset {
        let added = self
            .steps
            .iter()
            .flat_map(|step| step.items.iter().cloned())
            .chain(head.into_iter().flat_map(|g| g.items.iter().cloned()))
            .collect();
        Changeset {
            added,
            ..Changeset::default()
        }
    }
}

/// Laufende Drag-Operation.
#[derive(Debug)]
pub struct DragOp {
    pub engine: DragEngine,
    /// Gesperrte Items wurden freigegeben
    pub allow_locked: bool,
    /// Letzte Bewegung ohne Lösung (Meldung nur beim Wechsel)
    pub blocked: bool,
    _guard: InteractionGuard,
}

impl DragOp {
    pub fn new(guard: InteractionGuard, engine: DragEngine, allow_locked: bool) -> Self {
        Self {
            engine,
            allow_locked,
            blocked: false,
            _guard: guard,
        }
    }
}

#[derive(Debug)]
enum Operation {
    None,
    Routing(Box<RouteOp>),
    Dragging(Box<DragOp>),
}

/// Zustand der interaktiven Routing-Session.
#[derive(Debug)]
pub struct RoutingSession {
    state: SessionState,
    /// Zustand vor `Fixing` (Rückkehr bei fehlgeschlagenem Commit)
    fix_origin: SessionState,
    operation: Operation,
    active_layer: LayerId,
    pub router_mode: RouterMode,
    pub posture: Posture,
    pub rounded: bool,
    /// Letzte Cursor-Position (für tastengesteuerte Befehle)
    pub cursor: IVec2,
    saved_sizes: Option<SizesSettings>,
    pending_via_target: Option<ViaType>,
    cancelled: bool,
    committed: usize,
    trail: VecDeque<(SessionState, SessionState)>,
}

impl Default for RoutingSession {
    fn default() -> Self {
        Self::new(&RouterOptions::default())
    }
}

impl RoutingSession {
    /// Erstellt eine Session im Zustand `Idle`.
    pub fn new(options: &RouterOptions) -> Self {
        Self {
            state: SessionState::Idle,
            fix_origin: SessionState::Idle,
            operation: Operation::None,
            active_layer: LayerId::TOP,
            router_mode: options.router_mode,
            posture: Posture::default(),
            rounded: false,
            cursor: IVec2::ZERO,
            saved_sizes: None,
            pending_via_target: None,
            cancelled: false,
            committed: 0,
            trail: VecDeque::with_capacity(TRANSITION_TRAIL_LEN),
        }
    }

    fn enter(&mut self, next: SessionState) {
        let from = self.state;
        if !TRANSITIONS.contains(&(from, next)) {
            log::error!("Unzulässiger Session-Übergang {:?} -> {:?}", from, next);
        }
        if self.trail.len() >= TRANSITION_TRAIL_LEN {
            self.trail.pop_front();
        }
        self.trail.push_back((from, next));
        self.state = next;
        log::debug!("Session: {:?} -> {:?}", from, next);
    }

    // ── Abfragen ────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    /// Läuft eine Routing-Operation?
    pub fn is_routing(&self) -> bool {
        matches!(self.operation, Operation::Routing(_))
    }

    /// Läuft eine Drag-Operation?
    pub fn is_dragging(&self) -> bool {
        matches!(self.operation, Operation::Dragging(_))
    }

    pub fn route(&self) -> Option<&RouteOp> {
        match &self.operation {
            Operation::Routing(op) => Some(op),
            _ => None,
        }
    }

    pub fn route_mut(&mut self) -> Option<&mut RouteOp> {
        match &mut self.operation {
            Operation::Routing(op) => Some(op),
            _ => None,
        }
    }

    pub fn drag(&self) -> Option<&DragOp> {
        match &self.operation {
            Operation::Dragging(op) => Some(op),
            _ => None,
        }
    }

    pub fn drag_mut(&mut self) -> Option<&mut DragOp> {
        match &mut self.operation {
            Operation::Dragging(op) => Some(op),
            _ => None,
        }
    }

    /// Aktiver Kupfer-Layer für den nächsten Start bzw. den laufenden Kopf.
    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, layer: LayerId) {
        if layer != self.active_layer {
            log::debug!("Aktiver Layer: {} -> {}", self.active_layer, layer);
            self.active_layer = layer;
        }
    }

    /// Wurde die letzte Operation ohne Commit abgebrochen?
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    /// Anzahl erfolgreicher Commits seit der Aktivierung.
    pub fn committed_count(&self) -> usize {
        self.committed
    }

    /// Größen der zuletzt beendeten Route.
    pub fn saved_sizes(&self) -> Option<&SizesSettings> {
        self.saved_sizes.as_ref()
    }

    /// Letzte Zustandswechsel, älteste zuerst.
    pub fn trail(&self) -> impl Iterator<Item = &(SessionState, SessionState)> {
        self.trail.iter()
    }

    /// Via-Typ, für den ein Ziel-Layer angefragt wurde.
    pub fn pending_via_target(&self) -> Option<ViaType> {
        self.pending_via_target
    }

    pub fn set_pending_via_target(&mut self, via_type: Option<ViaType>) {
        self.pending_via_target = via_type;
    }

    // ── Lebenszyklus ────────────────────────────────────────────

    /// Setzt Abbruch-Flag und Commit-Zähler für eine neue Aktivierung zurück.
    pub fn reset_for_activation(&mut self) {
        self.cancelled = false;
        self.committed = 0;
        self.pending_via_target = None;
    }

    /// Idle → Preparing.
    pub fn begin_prepare(&mut self) {
        self.enter(SessionState::Preparing);
    }

    /// Preparing → Idle (Start abgelehnt).
    pub fn abort_prepare(&mut self) {
        self.enter(SessionState::Idle);
    }

    /// Preparing → Routing.
    pub fn start_routing(&mut self, op: RouteOp) {
        self.active_layer = op.layer;
        self.operation = Operation::Routing(Box::new(op));
        self.enter(SessionState::Routing);
        log::info!("Routing gestartet auf Layer {}", self.active_layer);
    }

    /// Idle → Dragging.
    pub fn start_drag(&mut self, op: DragOp) {
        log::info!("Drag gestartet ({} Items)", op.engine.originals().len());
        self.operation = Operation::Dragging(Box::new(op));
        self.enter(SessionState::Dragging);
    }

    /// Routing/Dragging → Fixing.
    pub fn begin_fix(&mut self) {
        self.fix_origin = self.state;
        self.enter(SessionState::Fixing);
    }

    /// Fixing → vorheriger Zustand (Commit fehlgeschlagen oder Route läuft weiter).
    pub fn resume(&mut self) {
        let origin = self.fix_origin;
        self.enter(origin);
    }

    /// Fixing → Idle. Gibt die Operation frei und merkt sich die Routing-Größen.
    pub fn finish(&mut self, committed: bool) {
        if let Operation::Routing(op) = &self.operation {
            self.saved_sizes = Some(op.sizes.clone());
            self.active_layer = op.layer;
        }
        self.operation = Operation::None;
        if committed {
            self.committed += 1;
            self.cancelled = false;
        }
        self.enter(SessionState::Idle);
        log::info!("Operation abgeschlossen (Commit: {})", committed);
    }

    /// Zählt einen Commit, der außerhalb von `finish` übernommen wurde
    /// (fixierte Schritte einer abgebrochenen Route).
    pub fn record_commit(&mut self) {
        self.committed += 1;
        self.cancelled = false;
    }

    /// Bricht die laufende Operation ab (→ Cancelled → Idle).
    ///
    /// Gibt `false` zurück, wenn keine Operation lief. Das Abbruch-Flag wird
    /// gesetzt, wenn seit der Aktivierung nichts übernommen wurde.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.operation, Operation::None) {
            return false;
        }
        if let Operation::Routing(op) = &self.operation {
            self.saved_sizes = Some(op.sizes.clone());
            if let Some(pending) = &op.via {
                self.active_layer = pending.from_layer;
            }
        }
        self.operation = Operation::None;
        self.enter(SessionState::Cancelled);
        if self.committed == 0 {
            self.cancelled = true;
        }
        self.enter(SessionState::Idle);
        log::info!("Operation abgebrochen");
        true
    }

    /// Werkzeug wird ohne laufende Operation verlassen.
    pub fn mark_exit(&mut self) {
        self.cancelled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::host::{InteractionGuard, RecordingHost};
    use crate::app::use_cases::drag::DragMode;
    use crate::core::ItemKind;
    use std::rc::Rc;

    fn route_op(host: &Rc<RecordingHost>) -> RouteOp {
        let guard = InteractionGuard::acquire(host.clone(), Some(1));
        RouteOp::new(guard, 1, IVec2::ZERO, None, LayerId(0), SizesSettings::default())
    }

    fn geometry(end: IVec2) -> RouteGeometry {
        RouteGeometry {
            items: vec![ItemDraft::segment(IVec2::ZERO, end, 200_000, LayerId(0), 1)],
            end,
            end_layer: LayerId(0),
            reached_target: false,
            length: f64::from(end.x),
            collisions: Vec::new(),
        }
    }

    #[test]
    fn cancel_without_commit_sets_flag_and_releases_block() {
        let host = Rc::new(RecordingHost::new(true));
        let mut session = RoutingSession::default();
        session.begin_prepare();
        session.start_routing(route_op(&host));
        assert!(host.edit_block_held());

        assert!(session.cancel());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.cancelled());
        assert!(!host.edit_block_held());

        let trail: Vec<_> = session.trail().copied().collect();
        assert_eq!(
            trail[trail.len() - 2..],
            [
                (SessionState::Routing, SessionState::Cancelled),
                (SessionState::Cancelled, SessionState::Idle)
            ]
        );
    }

    #[test]
    fn cancel_after_commit_keeps_flag_clear() {
        let host = Rc::new(RecordingHost::new(true));
        let mut session = RoutingSession::default();
        session.begin_prepare();
        session.start_routing(route_op(&host));
        session.begin_fix();
        session.finish(true);

        session.begin_prepare();
        session.start_routing(route_op(&host));
        session.cancel();
        assert!(!session.cancelled());
        assert_eq!(session.committed_count(), 1);
        assert!(session.saved_sizes().is_some());
    }

    #[test]
    fn recorded_commit_keeps_cancel_flag_clear() {
        let host = Rc::new(RecordingHost::new(true));
        let mut session = RoutingSession::default();
        session.begin_prepare();
        session.start_routing(route_op(&host));

        session.record_commit();
        assert!(session.cancel());
        assert!(!session.cancelled());
        assert_eq!(session.committed_count(), 1);
        assert!(!host.edit_block_held());
    }

    #[test]
    fn undo_step_restores_previous_head_start() {
        let host = Rc::new(RecordingHost::new(true));
        let mut op = route_op(&host);
        op.push_step(geometry(IVec2::new(1_000, 0)));
        assert_eq!(op.start, IVec2::new(1_000, 0));
        assert_eq!(op.steps().len(), 1);

        assert!(op.undo_step());
        assert_eq!(op.start, IVec2::ZERO);
        assert!(!op.undo_step());
    }

    #[test]
    fn changeset_contains_steps_and_head() {
        let host = Rc::new(RecordingHost::new(true));
        let mut op = route_op(&host);
        op.push_step(geometry(IVec2::new(1_000, 0)));
        let head = geometry(IVec2::new(2_000, 0));
        let changeset = op.changeset(Some(&head));
        assert_eq!(changeset.added.len(), 2);
        assert!(matches!(changeset.added[0].kind, ItemKind::Segment { .. }));
        approx::assert_relative_eq!(op.total_length(), 1_000.0);
    }

    #[test]
    fn drag_cancel_returns_to_idle() {
        let host = Rc::new(RecordingHost::new(true));
        let mut session = RoutingSession::default();
        let guard = InteractionGuard::acquire(host.clone(), None);
        let engine = DragEngine::start(Vec::new(), IVec2::ZERO, DragMode::default(), RouterMode::Shove);
        session.start_drag(DragOp::new(guard, engine, false));
        assert!(session.is_dragging());

        session.cancel();
        assert!(session.is_idle());
        assert!(!host.edit_block_held());
    }

    #[test]
    fn trail_is_bounded() {
        let host = Rc::new(RecordingHost::new(true));
        let mut session = RoutingSession::default();
        for _ in 0..TRANSITION_TRAIL_LEN {
            session.begin_prepare();
            session.start_routing(route_op(&host));
            session.cancel();
        }
        assert_eq!(session.trail().count(), TRANSITION_TRAIL_LEN);
    }
}
