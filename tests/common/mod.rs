//! Gemeinsamer Aufbau für die Controller-Flow-Tests.
#![allow(dead_code)]

use glam::IVec2;
use pcb_interactive_router::app::use_cases::sizing::NetclassImport;
use pcb_interactive_router::engine::Rule;
use pcb_interactive_router::{
    Board, DesignSettings, DirectRouter, ItemDraft, LayerId, RecordingHost, RouterController,
    RouterError, RouterIntent, RouterOptions, RouterServices, RouterState, RuleSet, Stackup,
};
use std::rc::Rc;
use std::sync::Arc;

pub struct Harness {
    pub state: RouterState,
    pub controller: RouterController,
    pub host: Rc<RecordingHost>,
}

impl Harness {
    pub fn send(&mut self, intent: RouterIntent) {
        self.controller
            .handle_intent(&mut self.state, intent)
            .expect("Intent sollte ohne Fehler durchlaufen");
    }

    pub fn click(&mut self, x: i32, y: i32) {
        self.send(RouterIntent::Click {
            position: IVec2::new(x, y),
            shift: false,
            ctrl: false,
        });
    }

    pub fn motion(&mut self, x: i32, y: i32) {
        self.send(RouterIntent::Motion {
            position: IVec2::new(x, y),
            ctrl: false,
        });
    }

    pub fn key(&mut self, chord: &str) {
        self.send(RouterIntent::KeyPress {
            chord: chord.to_string(),
        });
    }

    pub fn errors(&self) -> Vec<RouterError> {
        self.host.errors()
    }
}

pub fn harness_with_rules(board: Board, extra_rules: Vec<Rule>) -> Harness {
    let host = Rc::new(RecordingHost::new(false));
    let rules = RuleSet::from_design(&board.design, extra_rules);
    let state = RouterState::with_board(board, RouterOptions::default());
    let services = RouterServices::new(
        Box::new(DirectRouter::with_world(Arc::clone(&state.board))),
        Box::new(rules),
        Box::new(NetclassImport),
        host.clone(),
    );
    let mut harness = Harness {
        state,
        controller: RouterController::new(services),
        host,
    };
    harness.send(RouterIntent::Activate);
    harness
}

pub fn harness(board: Board) -> Harness {
    harness_with_rules(board, Vec::new())
}

/// 4-lagiges Board: Netz 1 mit Start-Segment (Item 1) und Ziel-Segment (Item 2) auf Cu0.
pub fn two_segment_board(layers: u8, design: DesignSettings) -> Board {
    let mut board = Board::new(Stackup::new(layers), design);
    board.add_item(ItemDraft::segment(
        IVec2::new(0, 0),
        IVec2::new(1_000_000, 0),
        250_000,
        LayerId(0),
        1,
    ));
    board.add_item(ItemDraft::segment(
        IVec2::new(5_000_000, 0),
        IVec2::new(6_000_000, 0),
        250_000,
        LayerId(0),
        1,
    ));
    board
}

pub fn routing_board() -> Board {
    two_segment_board(4, DesignSettings::default())
}
