//! Use-Case: Track an einem Punkt auftrennen.

use super::commit::Changeset;
use crate::core::{geometry, Board, Item, ItemDraft, ItemId, ItemKind};
use glam::IVec2;

/// Changeset, der Segment `id` am nächsten Punkt zu `point` in zwei Segmente teilt.
///
/// `None`, wenn das Item kein Segment ist oder der Trennpunkt auf einem Ende liegt.
pub fn split_segment(board: &Board, id: ItemId, point: IVec2, allow_locked: bool) -> Option<Changeset> {
    let item = board.item(id)?;
    let ItemKind::Segment { start, end, width } = item.kind else {
        return None;
    };

    let at = geometry::project_on_segment(point, start, end);
    if at == start || at == end {
        return None;
    }

    let first = Item {
        kind: ItemKind::Segment {
            start,
            end: at,
            width,
        },
        ..item.clone()
    };
    let second = ItemDraft {
        kind: ItemKind::Segment {
            start: at,
            end,
            width,
        },
        net: item.net,
        layers: item.layers,
    };

    log::debug!("Segment {} wird bei {:?} aufgetrennt", id, at);
    Some(Changeset {
        added: vec![second],
        modified: vec![first],
        removed: Vec::new(),
        allow_locked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DesignSettings, LayerId, Stackup};

    fn board() -> Board {
        let mut board = Board::new(Stackup::new(2), DesignSettings::default());
        board.add_item(ItemDraft::segment(
            IVec2::ZERO,
            IVec2::new(1_000_000, 0),
            200_000,
            LayerId(0),
            1,
        ));
        board
    }

    #[test]
    fn split_in_the_middle_gives_two_segments() {
        let board = board();
        let changeset =
            split_segment(&board, 1, IVec2::new(400_000, 30_000), false).expect("Changeset erwartet");
        assert_eq!(changeset.added.len(), 1);
        assert_eq!(
            changeset.modified[0].kind,
            ItemKind::Segment {
                start: IVec2::ZERO,
                end: IVec2::new(400_000, 0),
                width: 200_000,
            }
        );
    }

    #[test]
    fn split_on_endpoint_is_ignored() {
        let board = board();
        assert!(split_segment(&board, 1, IVec2::new(-50, 0), false).is_none());
        assert!(split_segment(&board, 99, IVec2::ZERO, false).is_none());
    }
}
