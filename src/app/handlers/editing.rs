//! Handler für Board-Edits außerhalb einer Routing-Operation.

use super::world;
use crate::app::use_cases::break_track;
use crate::app::{RouterError, RouterServices, RouterState};
use glam::IVec2;

/// Trennt das Segment unter `position` am nächstgelegenen Punkt auf.
pub fn break_track(state: &mut RouterState, services: &mut RouterServices, position: IVec2) {
    if !state.session.is_idle() {
        log::debug!("Track auftrennen nur ohne laufende Operation");
        return;
    }
    let tolerance = state.options.snap_radius();
    let Some(segment) = state
        .board
        .item_at(position, Some(state.session.active_layer()), tolerance)
        .or_else(|| state.board.item_at(position, None, tolerance))
        .filter(|item| item.is_segment())
    else {
        services.report(RouterError::InputRejected(
            "Kein Segment unter dem Zeiger".into(),
        ));
        return;
    };
    let (id, locked) = (segment.id, segment.locked);

    let allow_locked = locked
        && (state.options.auto_confirm_locked
            || services
                .host
                .confirm_override("Das Segment ist gesperrt. Trotzdem auftrennen?"));
    if locked && !allow_locked {
        log::info!("Auftrennen des gesperrten Segments {} abgelehnt", id);
        return;
    }

    let Some(changeset) = break_track::split_segment(&state.board, id, position, allow_locked)
    else {
        log::debug!("Trennpunkt liegt auf einem Segment-Ende");
        return;
    };
    if let Err(error) = world::commit(state, services, changeset) {
        services.report(error);
    }
}
