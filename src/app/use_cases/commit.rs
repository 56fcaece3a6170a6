//! Use-Case: Atomares Übernehmen fertiger Geometrie ins Board.
//!
//! Erst wird der komplette Changeset validiert, dann angewendet. Schlägt die
//! Validierung fehl, bleibt das Board unverändert (gleicher `Arc`).

use crate::app::RouterError;
use crate::core::{Board, Item, ItemDraft, ItemId, ItemKind};
use std::sync::Arc;

/// Geplante Board-Änderungen einer Operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    pub added: Vec<ItemDraft>,
    pub modified: Vec<Item>,
    pub removed: Vec<ItemId>,
    /// Änderungen an gesperrten Items wurden bestätigt
    pub allow_locked: bool,
}

impl Changeset {
    /// Enthält der Changeset keine Änderung?
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

/// Ergebnis eines erfolgreichen Commits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    pub added: Vec<ItemId>,
    pub modified: usize,
    pub removed: usize,
}

fn validate_draft(board: &Board, draft: &ItemDraft) -> Result<(), String> {
    for layer in [draft.layers.start(), draft.layers.end()] {
        if !board.stackup.contains(layer) {
            return Err(format!("Layer {layer} liegt außerhalb des Lagenaufbaus"));
        }
    }
    match draft.kind {
        ItemKind::Segment { width: 0, .. } => Err("Segment ohne Breite".to_string()),
        ItemKind::Segment { start, end, .. } if start == end => {
            Err("Segment ohne Länge".to_string())
        }
        ItemKind::Via {
            diameter, drill, ..
        } if drill == 0 || drill >= diameter => {
            Err(format!("Via-Bohrung {drill} passt nicht zu Durchmesser {diameter}"))
        }
        _ => Ok(()),
    }
}

fn validate(board: &Board, changeset: &Changeset) -> Result<(), String> {
    for draft in &changeset.added {
        validate_draft(board, draft)?;
    }

    for item in &changeset.modified {
        let existing = board
            .item(item.id)
            .ok_or_else(|| format!("Item {} existiert nicht", item.id))?;
        if existing.locked && !changeset.allow_locked {
            return Err(format!("Item {} ist gesperrt", item.id));
        }
        if changeset.removed.contains(&item.id) {
            return Err(format!("Item {} wird gleichzeitig geändert und entfernt", item.id));
        }
    }

    for id in &changeset.removed {
        let existing = board
            .item(*id)
            .ok_or_else(|| format!("Item {id} existiert nicht"))?;
        if existing.locked && !changeset.allow_locked {
            return Err(format!("Item {id} ist gesperrt"));
        }
    }
    Ok(())
}

/// Übernimmt den Changeset atomar. Bei Fehler ist das Board unverändert.
pub fn commit(board: &mut Arc<Board>, changeset: Changeset) -> Result<CommitReport, RouterError> {
    validate(board, &changeset).map_err(|reason| {
        log::warn!("Commit verworfen: {}", reason);
        RouterError::CommitFailed(reason)
    })?;

    if changeset.is_empty() {
        return Ok(CommitReport::default());
    }

    let board_mut = Arc::make_mut(board);
    let mut report = CommitReport::default();

    for id in &changeset.removed {
        if board_mut.remove_item(*id).is_some() {
            report.removed += 1;
        }
    }
    for item in changeset.modified {
        if board_mut.replace_item(item) {
            report.modified += 1;
        }
    }
    for draft in changeset.added {
        report.added.push(board_mut.add_item(draft));
    }

    log::info!(
        "Commit: {} neu, {} geändert, {} entfernt",
        report.added.len(),
        report.modified,
        report.removed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DesignSettings, LayerId, Stackup};
    use glam::IVec2;

    fn board() -> Arc<Board> {
        let mut board = Board::new(Stackup::new(2), DesignSettings::default());
        board.add_item(ItemDraft::segment(IVec2::ZERO, IVec2::new(100, 0), 10, LayerId(0), 1));
        Arc::new(board)
    }

    #[test]
    fn valid_changeset_is_applied() {
        let mut board = board();
        let changeset = Changeset {
            added: vec![ItemDraft::segment(
                IVec2::new(100, 0),
                IVec2::new(200, 0),
                10,
                LayerId(0),
                1,
            )],
            ..Changeset::default()
        };
        let report = commit(&mut board, changeset).expect("Commit erwartet");
        assert_eq!(report.added.len(), 1);
        assert_eq!(board.item_count(), 2);
    }

    #[test]
    fn invalid_changeset_leaves_board_untouched() {
        let mut board = board();
        let before = Arc::clone(&board);
        let items_before: Vec<Item> = board.items().cloned().collect();

        let changeset = Changeset {
            added: vec![
                ItemDraft::segment(IVec2::new(100, 0), IVec2::new(200, 0), 10, LayerId(0), 1),
                ItemDraft::segment(IVec2::new(200, 0), IVec2::new(300, 0), 10, LayerId(7), 1),
            ],
            ..Changeset::default()
        };
        let result = commit(&mut board, changeset);

        assert!(matches!(result, Err(RouterError::CommitFailed(_))));
        assert!(Arc::ptr_eq(&before, &board));
        let items_after: Vec<Item> = board.items().cloned().collect();
        assert_eq!(items_before, items_after);
    }

    #[test]
    fn locked_items_need_confirmation() {
        let mut inner = (*board()).clone();
        let mut item = inner.item(1).cloned().expect("Item erwartet");
        item.locked = true;
        inner.replace_item(item.clone());
        let mut board = Arc::new(inner);

        item.translate(IVec2::new(0, 50));
        let mut changeset = Changeset {
            modified: vec![item],
            ..Changeset::default()
        };
        assert!(commit(&mut board, changeset.clone()).is_err());

        changeset.allow_locked = true;
        let report = commit(&mut board, changeset).expect("Commit erwartet");
        assert_eq!(report.modified, 1);
    }
}
