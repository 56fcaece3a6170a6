mod common;

use common::harness;
use glam::IVec2;
use pcb_interactive_router::app::HostEvent;
use pcb_interactive_router::core::{Footprint, LayerRange};
use pcb_interactive_router::{
    Board, BoardFile, DesignSettings, Item, ItemDraft, ItemKind, LayerId, RouterError,
    RouterIntent, SessionState, Stackup,
};

fn drag_board(locked: bool) -> Board {
    let mut board = Board::new(Stackup::new(2), DesignSettings::default());
    let id = board.add_item(ItemDraft::segment(
        IVec2::new(0, 0),
        IVec2::new(1_000_000, 0),
        200_000,
        LayerId(0),
        1,
    ));
    // Fremdes Netz oberhalb als Hindernis
    board.add_item(ItemDraft::segment(
        IVec2::new(0, 1_000_000),
        IVec2::new(1_000_000, 1_000_000),
        200_000,
        LayerId(0),
        2,
    ));
    if locked {
        let mut item = board.item(id).cloned().expect("Item erwartet");
        item.locked = true;
        board.replace_item(item);
    }
    board
}

fn drag_segment(h: &mut common::Harness) {
    h.send(RouterIntent::DragSelectionRequested {
        items: vec![1],
        anchor: IVec2::new(500_000, 0),
        free_angle: false,
    });
}

fn segment_of(board: &Board, id: u64) -> (IVec2, IVec2) {
    match board.item(id).map(|item| &item.kind) {
        Some(ItemKind::Segment { start, end, .. }) => (*start, *end),
        other => panic!("Segment erwartet, erhalten: {other:?}"),
    }
}

#[test]
fn test_forty_five_drag_moves_segment_along_its_normal() {
    let mut h = harness(drag_board(false));
    drag_segment(&mut h);
    assert_eq!(h.state.session.state(), SessionState::Dragging);

    // Der Anteil entlang des Segments wird verworfen
    h.motion(800_000, 300_000);
    h.click(800_000, 300_000);

    assert!(h.state.session.is_idle());
    assert_eq!(
        segment_of(&h.state.board, 1),
        (IVec2::new(0, 300_000), IVec2::new(1_000_000, 300_000))
    );
    assert_eq!(h.state.session.committed_count(), 1);
    assert!(!h.host.edit_block_held());
}

#[test]
fn test_blocked_drag_is_reported_once_and_keeps_last_solution() {
    let mut h = harness(drag_board(false));
    drag_segment(&mut h);

    h.motion(500_000, 300_000);
    h.motion(500_000, 900_000);
    h.motion(500_000, 950_000);

    assert_eq!(h.errors(), vec![RouterError::NoGeometricSolution]);
    let op = h.state.session.drag().expect("Drag erwartet");
    assert!(op.blocked);
    let shown = &op.engine.displayed().modified[0];
    assert!(matches!(
        shown.kind,
        ItemKind::Segment { start, .. } if start == IVec2::new(0, 300_000)
    ));

    h.motion(500_000, 200_000);
    assert!(!h.state.session.drag().expect("Drag erwartet").blocked);
    assert_eq!(h.errors().len(), 1);
}

#[test]
fn test_locked_item_drag_needs_confirmation() {
    let mut h = harness(drag_board(true));

    drag_segment(&mut h);
    assert!(h.state.session.is_idle());
    assert!(!h.host.edit_block_held());
    assert!(h
        .host
        .events()
        .iter()
        .any(|event| matches!(event, HostEvent::Confirm(reason) if reason.contains("gesperrt"))));

    h.host.set_confirm_answer(true);
    drag_segment(&mut h);
    assert_eq!(h.state.session.state(), SessionState::Dragging);

    h.motion(500_000, 300_000);
    h.click(500_000, 300_000);
    assert_eq!(
        segment_of(&h.state.board, 1),
        (IVec2::new(0, 300_000), IVec2::new(1_000_000, 300_000))
    );
}

#[test]
fn test_cancelled_drag_leaves_board_untouched() {
    let mut h = harness(drag_board(false));
    drag_segment(&mut h);
    h.motion(500_000, 300_000);

    h.send(RouterIntent::Cancel);

    assert!(h.state.session.is_idle());
    assert_eq!(
        segment_of(&h.state.board, 1),
        (IVec2::new(0, 0), IVec2::new(1_000_000, 0))
    );
    assert!(!h.host.edit_block_held());
}

#[test]
fn test_footprint_drag_moves_pads_and_stretches_attached_track() {
    let pad = Item {
        id: 1,
        kind: ItemKind::Solid {
            position: IVec2::ZERO,
            size: 600_000,
        },
        net: 1,
        layers: LayerRange::new(LayerId(0), LayerId(1)),
        locked: false,
        parent: Some(100),
    };
    let track = Item {
        id: 2,
        kind: ItemKind::Segment {
            start: IVec2::ZERO,
            end: IVec2::new(2_000_000, 0),
            width: 200_000,
        },
        net: 1,
        layers: LayerRange::single(LayerId(0)),
        locked: false,
        parent: None,
    };
    let board = Board::from_file(BoardFile {
        stackup: Stackup::new(2),
        footprints: vec![Footprint {
            id: 100,
            reference: "U1".into(),
            locked: false,
        }],
        items: vec![pad, track],
        ..BoardFile::default()
    });
    let mut h = harness(board);

    h.send(RouterIntent::DragFootprintRequested {
        footprint: 100,
        anchor: IVec2::ZERO,
    });
    h.motion(200_000, 100_000);
    h.click(200_000, 100_000);

    assert!(h.state.session.is_idle());
    assert!(matches!(
        h.state.board.item(1).map(|item| &item.kind),
        Some(ItemKind::Solid { position, .. }) if *position == IVec2::new(200_000, 100_000)
    ));
    assert_eq!(
        segment_of(&h.state.board, 2),
        (IVec2::new(200_000, 100_000), IVec2::new(2_000_000, 0))
    );
}

#[test]
fn test_unknown_footprint_is_rejected() {
    let mut h = harness(drag_board(false));

    h.send(RouterIntent::DragFootprintRequested {
        footprint: 7,
        anchor: IVec2::ZERO,
    });

    assert!(matches!(
        h.errors().as_slice(),
        [RouterError::InputRejected(_)]
    ));
    assert!(h.state.session.is_idle());
}

#[test]
fn test_break_track_splits_segment_under_cursor() {
    let mut h = harness(drag_board(false));

    h.send(RouterIntent::BreakTrackRequested {
        position: IVec2::new(400_000, 20_000),
    });

    assert_eq!(h.state.item_count(), 3);
    assert_eq!(
        segment_of(&h.state.board, 1),
        (IVec2::new(0, 0), IVec2::new(400_000, 0))
    );
    assert_eq!(
        segment_of(&h.state.board, 3),
        (IVec2::new(400_000, 0), IVec2::new(1_000_000, 0))
    );

    h.send(RouterIntent::UndoRequested);
    assert_eq!(h.state.item_count(), 2);
}
