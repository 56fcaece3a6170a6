//! Handler für Drag-Operationen: Auswahl, Footprint, Bewegung, Fix.

use super::world;
use crate::app::host::InteractionGuard;
use crate::app::session::DragOp;
use crate::app::use_cases::drag::{filter_neighbouring_segments, DragEngine, DragMode};
use crate::app::{RouterError, RouterServices, RouterState};
use crate::core::{Item, ItemId};
use glam::IVec2;
use std::rc::Rc;

/// Beginnt den Drag nach Sperr-Prüfung. Lehnt der User ab, bleibt die Session in `Idle`.
fn begin(
    state: &mut RouterState,
    services: &RouterServices,
    originals: Vec<Item>,
    anchor: IVec2,
    mode: DragMode,
    locked: bool,
) {
    let allow_locked = if locked {
        let confirmed = state.options.auto_confirm_locked
            || services
                .host
                .confirm_override("Die Auswahl enthält gesperrte Items. Trotzdem ziehen?");
        if !confirmed {
            log::info!("Drag gesperrter Items abgelehnt");
            return;
        }
        true
    } else {
        false
    };

    let first_net = originals.first().map(|item| item.net);
    let net = first_net.filter(|net| *net != 0 && originals.iter().all(|item| item.net == *net));
    let guard = InteractionGuard::acquire(Rc::clone(&services.host), net);
    let engine = DragEngine::start(originals, anchor, mode, state.session.router_mode);
    state.session.cursor = anchor;
    state.session.start_drag(DragOp::new(guard, engine, allow_locked));
}

fn ensure_idle(state: &mut RouterState, services: &mut RouterServices) {
    if !state.session.is_idle() {
        log::info!("Neuer Drag: laufende Operation wird beendet");
        super::routing::stop_operation(state, services);
    }
}

/// Zieht die gegebenen Items ab `anchor`.
pub fn start(
    state: &mut RouterState,
    services: &mut RouterServices,
    items: &[ItemId],
    anchor: IVec2,
    mode: DragMode,
) {
    ensure_idle(state, services);
    let originals: Vec<Item> = items
        .iter()
        .filter_map(|id| state.board.item(*id))
        .cloned()
        .collect();
    if originals.is_empty() {
        services.report(RouterError::InputRejected(
            "Keine Items zum Ziehen ausgewählt".into(),
        ));
        return;
    }

    let originals = filter_neighbouring_segments(originals);
    let locked = originals.iter().any(|item| item.locked);
    begin(state, services, originals, anchor, mode, locked);
}

/// Zieht einen Footprint samt aller Pads ab `anchor`.
pub fn start_footprint(
    state: &mut RouterState,
    services: &mut RouterServices,
    footprint: u64,
    anchor: IVec2,
    mode: DragMode,
) {
    ensure_idle(state, services);
    let Some(fp) = state.board.footprint(footprint) else {
        services.report(RouterError::InputRejected(format!(
            "Footprint {footprint} existiert nicht"
        )));
        return;
    };
    let originals: Vec<Item> = state
        .board
        .find_items_by_parent(footprint)
        .into_iter()
        .cloned()
        .collect();
    if originals.is_empty() {
        services.report(RouterError::InputRejected(format!(
            "Footprint {} hat keine Pads",
            fp.reference
        )));
        return;
    }
    let locked = fp.locked || originals.iter().any(|item| item.locked);
    // Footprints bewegen sich frei, nur die Pads werden verschoben
    begin(state, services, originals, anchor, mode | DragMode::FREE_ANGLE, locked);
}

/// Bewegt den laufenden Drag nach `position`.
///
/// Ohne Lösung bleibt die Anzeige stehen; gemeldet wird nur der Wechsel
/// in den blockierten Zustand.
pub fn move_to(state: &mut RouterState, services: &RouterServices, position: IVec2) {
    state.session.cursor = position;
    let Some(op) = state.session.drag_mut() else {
        return;
    };
    match op.engine.move_to(services.engine.as_ref(), position) {
        Ok(_) => op.blocked = false,
        Err(error) => {
            if !op.blocked {
                op.blocked = true;
                services.report(error);
            }
        }
    }
}

/// Übernimmt die angezeigte Drag-Geometrie.
pub fn fix(state: &mut RouterState, services: &mut RouterServices) {
    let Some(op) = state.session.drag() else {
        return;
    };
    let changeset = op.engine.changeset(op.allow_locked);

    state.session.begin_fix();
    if changeset.is_empty() {
        state.session.finish(false);
        return;
    }
    match world::commit(state, services, changeset) {
        Ok(_) => state.session.finish(true),
        Err(error) => {
            services.report(error);
            state.session.resume();
        }
    }
}
