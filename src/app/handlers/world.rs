//! Handler für Board-Welt, Commit und Undo/Redo.

use crate::app::history::Snapshot;
use crate::app::host::Notification;
use crate::app::use_cases::commit::{self, Changeset, CommitReport};
use crate::app::{RouterError, RouterServices, RouterState};
use std::sync::Arc;

/// Übernimmt einen Changeset atomar ins Board.
///
/// Bei Erfolg wird ein Undo-Snapshot des vorherigen Boards abgelegt und die
/// Pfad-Engine neu synchronisiert. Bei Fehler bleibt alles unverändert.
pub fn commit(
    state: &mut RouterState,
    services: &mut RouterServices,
    changeset: Changeset,
) -> Result<CommitReport, RouterError> {
    let before = Arc::clone(&state.board);
    let report = commit::commit(&mut state.board, changeset)?;

    if !Arc::ptr_eq(&before, &state.board) {
        state.history.record_snapshot(Snapshot { board: before });
        services.engine.sync_world(Arc::clone(&state.board));
    }
    services.host.notify(Notification::Committed {
        added: report.added.len(),
        modified: report.modified,
        removed: report.removed,
    });
    Ok(report)
}

/// Verwirft die Welt der Pfad-Engine.
pub fn clear_world(services: &mut RouterServices) {
    services.engine.clear_world();
}

/// Lädt das aktuelle Board in die Pfad-Engine.
pub fn sync_world(state: &RouterState, services: &mut RouterServices) {
    services.engine.sync_world(Arc::clone(&state.board));
}

/// Macht den letzten Commit rückgängig.
pub fn undo(state: &mut RouterState) -> anyhow::Result<()> {
    anyhow::ensure!(
        state.session.is_idle(),
        "Undo während einer laufenden Operation"
    );
    let current = Snapshot::from_state(state);
    match state.history.pop_undo_with_current(current) {
        Some(previous) => {
            previous.apply_to(state);
            log::info!("Undo: Board mit {} Items", state.item_count());
        }
        None => log::debug!("Undo: nichts zu tun"),
    }
    Ok(())
}

/// Stellt den zuletzt rückgängig gemachten Commit wieder her.
pub fn redo(state: &mut RouterState) -> anyhow::Result<()> {
    anyhow::ensure!(
        state.session.is_idle(),
        "Redo während einer laufenden Operation"
    );
    let current = Snapshot::from_state(state);
    match state.history.pop_redo_with_current(current) {
        Some(next) => {
            next.apply_to(state);
            log::info!("Redo: Board mit {} Items", state.item_count());
        }
        None => log::debug!("Redo: nichts zu tun"),
    }
    Ok(())
}

/// Neue Aktivierung des Werkzeugs.
pub fn reset_session(state: &mut RouterState) {
    state.session.reset_for_activation();
    log::info!("Routing-Werkzeug aktiviert");
}
