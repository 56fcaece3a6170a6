//! PCB Route Replay.
//!
//! Spielt ein Szenario (Board, Regeln, Intent-Folge) gegen die Routing-Session
//! ab und gibt das Ergebnis als JSON aus.
//!
//! Aufruf: `pcb-route-replay <szenario.toml> [optionen.toml]`

use anyhow::Context;
use pcb_interactive_router::app::use_cases::sizing::NetclassImport;
use pcb_interactive_router::engine::Rule;
use pcb_interactive_router::{
    Board, BoardFile, DirectRouter, RecordingHost, RouterController, RouterIntent, RouterOptions,
    RouterServices, RouterState, RuleSet, SessionState,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

/// Abspielbares Szenario.
#[derive(Debug, Deserialize)]
struct Scenario {
    board: BoardFile,
    /// Zusätzliche Constraint-Regeln nach den Netzklassen-Regeln
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    intents: Vec<RouterIntent>,
}

/// Ergebnis eines Replays.
#[derive(Debug, Serialize)]
struct ReplaySummary {
    state: SessionState,
    committed: usize,
    cancelled: bool,
    commands: usize,
    errors: Vec<String>,
    board: BoardFile,
}

fn main() -> anyhow::Result<()> {
    // Logger initialisieren
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("PCB Route Replay v{} startet...", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let scenario_path = args
        .next()
        .context("Aufruf: pcb-route-replay <szenario.toml> [optionen.toml]")?;
    let options = match args.next() {
        Some(path) => RouterOptions::load_from_file(Path::new(&path)),
        None => RouterOptions::load_from_file(&RouterOptions::config_path()),
    };

    let content = std::fs::read_to_string(&scenario_path)
        .with_context(|| format!("Szenario nicht lesbar: {scenario_path}"))?;
    let scenario: Scenario = toml::from_str(&content)
        .with_context(|| format!("Szenario fehlerhaft: {scenario_path}"))?;

    let board = Board::from_file(scenario.board);
    let rules = RuleSet::from_design(&board.design, scenario.rules);
    let host = Rc::new(RecordingHost::new(options.auto_confirm_locked));
    let mut state = RouterState::with_board(board, options);

    let services = RouterServices::new(
        Box::new(DirectRouter::with_world(Arc::clone(&state.board))),
        Box::new(rules),
        Box::new(NetclassImport),
        host.clone(),
    );
    let mut controller = RouterController::new(services);

    controller.handle_intent(&mut state, RouterIntent::Activate)?;
    for intent in scenario.intents {
        log::debug!("Intent: {:?}", intent);
        if let Err(e) = controller.handle_intent(&mut state, intent) {
            log::error!("Intent fehlgeschlagen: {:#}", e);
        }
    }

    let summary = ReplaySummary {
        state: state.session.state(),
        committed: state.session.committed_count(),
        cancelled: state.session.cancelled(),
        commands: state.command_log.len(),
        errors: host.errors().iter().map(ToString::to_string).collect(),
        board: state.board.to_file(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
