//! Handler für Routing-Operationen: Start, Kopf-Bewegung, Fix, Abbruch.

use super::world;
use crate::app::host::InteractionGuard;
use crate::app::session::RouteOp;
use crate::app::use_cases::sizing::{self, SizingKey, SizingRequest};
use crate::app::{RouterError, RouterServices, RouterState};
use crate::core::{geometry, Board, Item, ItemId, ItemKind, LayerPair, ViaType};
use crate::engine::RouterMode;
use glam::IVec2;
use std::rc::Rc;
use std::sync::Arc;

/// Standard-Layer-Paar: gewähltes Routing-Paar oder die Außenlagen.
pub(crate) fn default_pair(board: &Board) -> LayerPair {
    board
        .design
        .route_layer_pair
        .unwrap_or_else(|| board.stackup.outer_pair())
}

/// Startpunkt auf dem Start-Item: Pad-/Via-Mitte, Segment-Ende im
/// Snap-Radius oder Lotpunkt auf dem Segment.
fn snap_start(item: &Item, position: IVec2, tolerance: f64) -> IVec2 {
    match item.kind {
        ItemKind::Via { position: center, .. } | ItemKind::Solid { position: center, .. } => center,
        ItemKind::Segment { start, end, .. } => [start, end]
            .into_iter()
            .find(|p| geometry::segment_length(*p, position) <= tolerance)
            .unwrap_or_else(|| geometry::project_on_segment(position, start, end)),
    }
}

/// Startet eine Route an `position`.
///
/// Läuft bereits eine Operation, wird sie zuerst abgebrochen.
pub fn start(
    state: &mut RouterState,
    services: &mut RouterServices,
    position: IVec2,
    item: Option<ItemId>,
) {
    if !state.session.is_idle() {
        log::info!("Neue Route: laufende Operation wird beendet");
        stop_operation(state, services);
    }
    state.session.cursor = position;
    state.session.begin_prepare();

    let board = Arc::clone(&state.board);
    let start_item = item.and_then(|id| board.item(id));
    let active = state.session.active_layer();
    let layer = match start_item {
        Some(it) if it.layers.overlaps(active) => active,
        Some(it) => it.layers.start(),
        None => active,
    };
    if !layer.is_copper() || !board.stackup.contains(layer) {
        state.session.abort_prepare();
        services.report(RouterError::InputRejected(format!(
            "Leiterbahnen nur auf Kupfer-Layern ({layer})"
        )));
        return;
    }

    let net = start_item.map_or(0, |it| it.net);
    let key = start_item.map_or(SizingKey::Net(net), SizingKey::StartItem);
    let pair = default_pair(&board);
    let seed = state.session.saved_sizes().cloned().unwrap_or_default();
    let request = SizingRequest::for_board(&board, key, ViaType::Through, pair, layer);
    let mut sizes = sizing::resolve(
        &board,
        &request,
        &seed,
        services.rules.as_ref(),
        services.import.as_ref(),
    );
    sizes.add_layer_pair(pair);

    let guard = InteractionGuard::acquire(Rc::clone(&services.host), (net != 0).then_some(net));
    let start_point = start_item.map_or(position, |it| {
        snap_start(it, position, state.options.snap_radius())
    });
    if let Err(reason) = services.engine.check_start(start_point, item, layer, &sizes) {
        // Guard zuerst freigeben: Highlight und Auto-Pan zurücknehmen
        drop(guard);
        state.session.abort_prepare();
        services.report(RouterError::RouterStartFailure(reason));
        return;
    }

    let op = RouteOp::new(guard, net, start_point, item, layer, sizes);
    state.session.start_routing(op);
}

/// Berechnet den Kopf für den aktuellen Endpunkt neu. Ohne Lösung bleibt
/// der bisherige Kopf stehen.
pub fn refresh_head(state: &mut RouterState, services: &RouterServices) {
    let session = &mut state.session;
    let (mode, posture, rounded) = (session.router_mode, session.posture, session.rounded);
    let Some(op) = session.route_mut() else {
        return;
    };
    match services.engine.route(&op.request(mode, posture, rounded)) {
        Ok(geometry) => op.head = Some(geometry),
        Err(failure) => log::debug!("Kopf ohne Lösung: {}", failure),
    }
}

/// Zeigerbewegung während des Routings (billig, idempotent, kein Commit).
pub fn move_head(
    state: &mut RouterState,
    services: &RouterServices,
    position: IVec2,
    item: Option<ItemId>,
    ortho: bool,
) {
    state.session.cursor = position;
    let Some(op) = state.session.route_mut() else {
        return;
    };
    op.end = position;
    op.end_item = item.filter(|id| Some(*id) != op.start_item);
    op.ortho = ortho;
    refresh_head(state, services);
}

/// Fixiert die Route bis `position`.
///
/// Mit `force_finish` oder erreichtem Ziel wird alles atomar übernommen und
/// die Session endet; sonst läuft das Routing ab dem Fixpunkt weiter.
pub fn fix(
    state: &mut RouterState,
    services: &mut RouterServices,
    position: IVec2,
    item: Option<ItemId>,
    force_finish: bool,
) {
    let ortho = state.session.route().is_some_and(|op| op.ortho);
    move_head(state, services, position, item, ortho);

    let session = &state.session;
    let (mode, posture, rounded) = (session.router_mode, session.posture, session.rounded);
    let Some(op) = session.route() else {
        return;
    };
    let geometry = match services.engine.route(&op.request(mode, posture, rounded)) {
        Ok(geometry) => geometry,
        Err(failure) => {
            log::debug!("Fix ohne Lösung: {}", failure);
            services.report(RouterError::NoGeometricSolution);
            return;
        }
    };

    let finishing = force_finish || geometry.reached_target;
    if !finishing && geometry.items.is_empty() {
        log::debug!("Fix ohne neue Geometrie ignoriert");
        return;
    }

    state.session.begin_fix();
    if finishing {
        let changeset = match state.session.route() {
            Some(op) => op.changeset(Some(&geometry)),
            None => return,
        };
        match world::commit(state, services, changeset) {
            Ok(report) => state.session.finish(!report.added.is_empty()),
            Err(error) => {
                services.report(error);
                state.session.resume();
            }
        }
        return;
    }

    let mut next_layer = None;
    if let Some(op) = state.session.route_mut() {
        op.push_step(geometry);
        next_layer = Some(op.layer);
    }
    state.session.resume();
    if let Some(layer) = next_layer {
        state.session.set_active_layer(layer);
    }
}

/// Verwirft den zuletzt fixierten Schritt.
pub fn undo_last_segment(state: &mut RouterState, services: &RouterServices) {
    let Some(op) = state.session.route_mut() else {
        return;
    };
    if !op.undo_step() {
        log::debug!("Kein fixierter Schritt zum Zurücknehmen");
        return;
    }
    let layer = op.via.as_ref().map_or(op.layer, |pending| pending.to_layer);
    state.session.set_active_layer(layer);
    refresh_head(state, services);
}

/// Beendet die laufende Operation. Fixierte Routing-Schritte werden übernommen,
/// verworfen wird nur der Kopf. `false`, wenn keine Operation lief.
pub(crate) fn stop_operation(state: &mut RouterState, services: &mut RouterServices) -> bool {
    let staged = state
        .session
        .route()
        .map(|op| op.changeset(None))
        .filter(|changeset| !changeset.is_empty());
    if let Some(changeset) = staged {
        match world::commit(state, services, changeset) {
            Ok(report) => {
                log::info!("Abbruch: {} fixierte Items übernommen", report.added.len());
                state.session.record_commit();
            }
            Err(error) => services.report(error),
        }
    }
    state.session.cancel()
}

/// Bricht die laufende Operation ab; ohne Operation wird das Werkzeug verlassen.
pub fn cancel(state: &mut RouterState, services: &mut RouterServices) {
    state.session.set_pending_via_target(None);
    if !stop_operation(state, services) {
        log::info!("Routing-Werkzeug verlassen");
        state.session.mark_exit();
    }
}

pub fn flip_posture(state: &mut RouterState, services: &RouterServices) {
    state.session.posture = state.session.posture.flipped();
    log::debug!("Kopf-Haltung: {:?}", state.session.posture);
    refresh_head(state, services);
}

pub fn toggle_rounding(state: &mut RouterState, services: &RouterServices) {
    state.session.rounded = !state.session.rounded;
    refresh_head(state, services);
}

/// Wechselt die Kollisions-Strategie (nicht während eines Drags).
pub fn set_router_mode(state: &mut RouterState, services: &RouterServices, mode: RouterMode) {
    if state.session.is_dragging() {
        log::warn!("Router-Modus kann während eines Drags nicht gewechselt werden");
        return;
    }
    log::info!("Router-Modus: {:?}", mode);
    state.session.router_mode = mode;
    refresh_head(state, services);
}

/// Merkt sich die Zeigerposition ohne laufende Operation.
pub fn track_cursor(state: &mut RouterState, position: IVec2) {
    state.session.cursor = position;
}
