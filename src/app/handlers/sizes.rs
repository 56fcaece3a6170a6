//! Handler für Custom-Größen, Diff-Pair-Dimensionen und Netzklassen-Größen.

use super::routing::{self, default_pair};
use super::world;
use crate::app::host::Notification;
use crate::app::use_cases::sizing::{self, SizingKey, SizingRequest};
use crate::app::{RouterError, RouterServices, RouterState};
use crate::core::{Board, DesignSettings, LayerId, SizesSettings};
use std::sync::Arc;

/// Löst `current` für die neuen Design-Einstellungen neu auf; Layer-Paare bleiben erhalten.
fn reresolve(
    board: &Board,
    services: &RouterServices,
    key: SizingKey<'_>,
    layer: LayerId,
    current: &SizesSettings,
) -> SizesSettings {
    let pairs = current.layer_pairs().to_vec();
    let via_pair = pairs.first().copied().unwrap_or_else(|| default_pair(board));
    let request = SizingRequest::for_board(board, key, current.via_type, via_pair, layer);
    let mut sizes = sizing::resolve(
        board,
        &request,
        current,
        services.rules.as_ref(),
        services.import.as_ref(),
    );
    for pair in pairs {
        sizes.add_layer_pair(pair);
    }
    sizes
}

/// Wendet eine Änderung der Design-Einstellungen an und löst die Größen
/// der laufenden Route neu auf. Meldet `SizesChanged` genau einmal.
///
/// Die Größen vor einer hängenden Via werden mit aufgelöst, damit das
/// Zurücknehmen der Via keine veralteten Werte zurückbringt.
fn apply_design_change(
    state: &mut RouterState,
    services: &mut RouterServices,
    change: impl FnOnce(&mut DesignSettings),
) {
    change(&mut Arc::make_mut(&mut state.board).design);
    world::sync_world(state, services);

    let board = Arc::clone(&state.board);
    if let Some(op) = state.session.route_mut() {
        let key = op
            .start_item
            .and_then(|id| board.item(id))
            .map_or(SizingKey::Net(op.net), SizingKey::StartItem);
        let sizes = reresolve(&board, services, key, op.layer, &op.sizes);
        if let Some(pending) = op.via.as_mut() {
            pending.via.diameter = sizes.via_diameter;
            pending.via.drill = sizes.via_drill;
            pending.sizes_before =
                reresolve(&board, services, key, pending.from_layer, &pending.sizes_before);
        }
        op.sizes = sizes;
    }

    services.host.notify(Notification::SizesChanged);
    routing::refresh_head(state, services);
}

/// Setzt eine eigene Leiterbahnbreite und aktiviert die Custom-Größen.
pub fn set_custom_track_width(state: &mut RouterState, services: &mut RouterServices, width: u32) {
    if width == 0 {
        services.report(RouterError::InputRejected(
            "Leiterbahnbreite muss größer als 0 sein".into(),
        ));
        return;
    }
    log::info!("Custom-Leiterbahnbreite: {}", width);
    apply_design_change(state, services, |design| {
        design.custom_track_width = width;
        design.use_custom_track_via_size = true;
    });
}

/// Setzt eigene Via-Größen und aktiviert die Custom-Größen.
pub fn set_custom_via_size(
    state: &mut RouterState,
    services: &mut RouterServices,
    diameter: u32,
    drill: u32,
) {
    if drill == 0 || drill >= diameter {
        services.report(RouterError::InputRejected(format!(
            "Via-Bohrung {drill} passt nicht zu Durchmesser {diameter}"
        )));
        return;
    }
    log::info!("Custom-Via: {}/{}", diameter, drill);
    apply_design_change(state, services, |design| {
        design.current_via_size = diameter;
        design.current_via_drill = drill;
        design.use_custom_track_via_size = true;
    });
}

/// Setzt eigene Diff-Pair-Dimensionen.
pub fn set_diff_pair_dimensions(
    state: &mut RouterState,
    services: &mut RouterServices,
    width: u32,
    gap: u32,
    via_gap: u32,
) {
    if width == 0 || gap == 0 {
        services.report(RouterError::InputRejected(
            "Diff-Pair-Breite und -Abstand müssen größer als 0 sein".into(),
        ));
        return;
    }
    log::info!("Custom-Diff-Pair: {}/{}/{}", width, gap, via_gap);
    apply_design_change(state, services, |design| {
        design.custom_diff_pair_width = width;
        design.custom_diff_pair_gap = gap;
        design.custom_diff_pair_via_gap = via_gap;
        design.use_custom_track_via_size = true;
    });
}

/// Kehrt zu den Netzklassen-Größen zurück.
pub fn use_net_class_sizes(state: &mut RouterState, services: &mut RouterServices) {
    log::info!("Netzklassen-Größen aktiv");
    apply_design_change(state, services, |design| {
        design.use_custom_track_via_size = false;
    });
}
