//! Handler für Vias, Layer-Wechsel und Layer-Paar-Auswahl.

use super::routing::{self, default_pair};
use crate::app::host::Notification;
use crate::app::session::PendingVia;
use crate::app::use_cases::layer_nav::{self, LayerCommand};
use crate::app::use_cases::sizing::{self, SizingKey, SizingRequest};
use crate::app::use_cases::via_policy::{self, ViaEnvironment, ViaRequest};
use crate::app::{RouterError, RouterServices, RouterState};
use crate::core::{LayerId, LayerPair, ViaType};
use crate::engine::{HeadVia, LayerSwitch};
use std::sync::Arc;

/// Nimmt eine am Kopf hängende Via zurück. `true`, wenn eine existierte.
fn withdraw_pending_via(state: &mut RouterState) -> bool {
    let Some(op) = state.session.route_mut() else {
        return false;
    };
    let Some(pending) = op.via.take() else {
        return false;
    };
    op.sizes = pending.sizes_before;
    op.layer = pending.from_layer;
    state.session.set_active_layer(pending.from_layer);
    log::debug!("Via am Kopf zurückgenommen");
    true
}

/// Setzt eine Via am Kopf der laufenden Route.
///
/// Eine bereits hängende Via wird stattdessen zurückgenommen.
pub fn place_via(
    state: &mut RouterState,
    services: &RouterServices,
    via_type: ViaType,
    target: Option<LayerId>,
) {
    state.session.set_pending_via_target(None);
    if !state.session.is_routing() {
        services
            .host
            .notify(Notification::Info("Vias können nur beim Routen gesetzt werden".into()));
        return;
    }
    if withdraw_pending_via(state) {
        routing::refresh_head(state, services);
        return;
    }

    let board = Arc::clone(&state.board);
    let Some(op) = state.session.route_mut() else {
        return;
    };
    let env = ViaEnvironment {
        stackup: board.stackup,
        blind_buried_allowed: board.design.blind_buried_allowed,
        microvias_allowed: board.design.microvias_allowed,
        default_pair: default_pair(&board),
    };
    let request = ViaRequest {
        current: op.layer,
        explicit_target: target,
        requested: via_type,
    };
    let resolved = match via_policy::resolve(&request, &env) {
        Ok(resolved) => resolved,
        Err(rejection) => {
            services.report(rejection.into());
            return;
        }
    };

    let sizes_before = op.sizes.clone();
    let span = resolved.span(&board.stackup);
    let key = op
        .start_item
        .and_then(|id| board.item(id))
        .map_or(SizingKey::Net(op.net), SizingKey::StartItem);
    let sizing_request = SizingRequest::for_board(&board, key, resolved.via_type, span, op.layer);
    sizing::resolve_via_sizes(&board, &sizing_request, services.rules.as_ref(), &mut op.sizes);
    resolved.apply_to(&mut op.sizes);

    let from_layer = op.layer;
    let to_layer = op
        .sizes
        .paired_layer(from_layer)
        .or_else(|| op.sizes.layer_top())
        .unwrap_or(from_layer);
    op.via = Some(PendingVia {
        via: HeadVia {
            via_type: resolved.via_type,
            span,
            diameter: op.sizes.via_diameter,
            drill: op.sizes.via_drill,
        },
        from_layer,
        to_layer,
        sizes_before,
    });
    log::info!(
        "Via {:?} am Kopf: {} -> {}",
        resolved.via_type,
        from_layer,
        to_layer
    );

    state.session.set_active_layer(to_layer);
    routing::refresh_head(state, services);
}

/// Merkt sich den Via-Typ, bis der Host einen Ziel-Layer liefert.
pub fn request_via_target(state: &mut RouterState, services: &RouterServices, via_type: ViaType) {
    state.session.set_pending_via_target(Some(via_type));
    services
        .host
        .notify(Notification::Info("Ziel-Layer für die Via wählen".into()));
}

/// Wechselt den aktiven Layer (ohne Route) bzw. den Kopf-Layer (beim Routen).
pub fn switch_layer(state: &mut RouterState, services: &RouterServices, command: LayerCommand) {
    if state.session.is_routing() {
        withdraw_pending_via(state);
    }
    let current = state
        .session
        .route()
        .map_or(state.session.active_layer(), |op| op.layer);
    let Some(target) = layer_nav::resolve(command, current, state.board.enabled_copper_layers())
    else {
        log::debug!("Layer-Befehl {:?} ohne Ziel", command);
        return;
    };

    if !state.session.is_routing() {
        state.session.set_active_layer(target);
        return;
    }
    let session = &mut state.session;
    let (mode, posture, rounded) = (session.router_mode, session.posture, session.rounded);
    let Some(op) = session.route_mut() else {
        return;
    };

    match services
        .engine
        .switch_layer(&op.request(mode, posture, rounded), target)
    {
        LayerSwitch::Direct => {
            op.layer = target;
            state.session.set_active_layer(target);
            routing::refresh_head(state, services);
        }
        LayerSwitch::ViaRequired => place_via(state, services, ViaType::Through, Some(target)),
        LayerSwitch::Refused(reason) => services.report(RouterError::InputRejected(reason)),
    }
}

/// Wählt das Layer-Paar für Vias.
pub fn select_layer_pair(state: &mut RouterState, services: &mut RouterServices, pair: LayerPair) {
    let stackup = state.board.stackup;
    let valid = pair.top.is_copper()
        && pair.bottom.is_copper()
        && stackup.contains(pair.top)
        && stackup.contains(pair.bottom)
        && !pair.is_degenerate();
    if !valid {
        services.report(RouterError::InputRejected(format!(
            "Layer-Paar {pair} ist im Lagenaufbau nicht zulässig"
        )));
        return;
    }

    Arc::make_mut(&mut state.board).design.route_layer_pair = Some(pair);
    if let Some(op) = state.session.route_mut() {
        if op.via.is_none() {
            op.sizes.clear_layer_pairs();
            op.sizes.add_layer_pair(pair);
        }
    }
    log::info!("Layer-Paar {} gewählt", pair);
    super::world::sync_world(state, services);
}
