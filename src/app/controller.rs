//! Application Controller für zentrale Event-Verarbeitung.

use super::host::{Notification, RouterHost};
use super::use_cases::sizing::SizingImport;
use super::{RouterCommand, RouterError, RouterIntent, RouterState};
use crate::engine::{PathEngine, RuleEngine};
use std::rc::Rc;

/// Kollaborateure der Routing-Session.
pub struct RouterServices {
    /// Geometrie-Berechnung für Routing und Drag
    pub engine: Box<dyn PathEngine>,
    /// Constraint-Abfragen für die Größen-Auflösung
    pub rules: Box<dyn RuleEngine>,
    /// Import von Track- und Diff-Pair-Größen
    pub import: Box<dyn SizingImport>,
    /// Host-Editor (geteilt mit den Interaktions-Guards)
    pub host: Rc<dyn RouterHost>,
}

impl RouterServices {
    pub fn new(
        engine: Box<dyn PathEngine>,
        rules: Box<dyn RuleEngine>,
        import: Box<dyn SizingImport>,
        host: Rc<dyn RouterHost>,
    ) -> Self {
        Self {
            engine,
            rules,
            import,
            host,
        }
    }

    /// Meldet einen Fehler an den Host. Die Session läuft weiter.
    pub fn report(&self, error: RouterError) {
        log::warn!("Router: {}", error);
        self.host.notify(Notification::Error(error));
    }
}

/// Orchestriert Host-Events und Use-Cases auf den RouterState.
pub struct RouterController {
    services: RouterServices,
}

impl RouterController {
    /// Erstellt einen neuen Controller.
    pub fn new(services: RouterServices) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &RouterServices {
        &self.services
    }

    /// Verarbeitet einen Intent über Intent->Command Mapping.
    ///
    /// Eine angeforderte Abbruch-Anfrage wird vor dem Intent ausgeführt.
    pub fn handle_intent(
        &mut self,
        state: &mut RouterState,
        intent: RouterIntent,
    ) -> anyhow::Result<()> {
        if state.take_cancel_request() && !state.session.is_idle() {
            self.handle_command(state, RouterCommand::CancelOperation)?;
        }

        let commands = self.map_intent_to_commands(state, intent);
        for command in commands {
            self.handle_command(state, command)?;
        }

        Ok(())
    }

    fn map_intent_to_commands(&self, state: &RouterState, intent: RouterIntent) -> Vec<RouterCommand> {
        super::intent_mapping::map_intent_to_commands(state, intent)
    }

    /// Führt mutierende Commands auf dem RouterState aus.
    /// Dispatcht an Feature-Handler in `handlers/`.
    pub fn handle_command(
        &mut self,
        state: &mut RouterState,
        command: RouterCommand,
    ) -> anyhow::Result<()> {
        state.command_log.record(&command);
        use super::handlers;
        let services = &mut self.services;

        match command {
            // === Routing ===
            RouterCommand::StartRouting { position, item } => {
                handlers::routing::start(state, services, position, item)
            }
            RouterCommand::MoveHead {
                position,
                item,
                ortho,
            } => handlers::routing::move_head(state, services, position, item, ortho),
            RouterCommand::FixRoute {
                position,
                item,
                force_finish,
            } => handlers::routing::fix(state, services, position, item, force_finish),
            RouterCommand::UndoLastSegment => handlers::routing::undo_last_segment(state, services),
            RouterCommand::FlipPosture => handlers::routing::flip_posture(state, services),
            RouterCommand::ToggleRounding => handlers::routing::toggle_rounding(state, services),
            RouterCommand::SetRouterMode { mode } => {
                handlers::routing::set_router_mode(state, services, mode)
            }

            // === Vias & Layer ===
            RouterCommand::PlaceVia { via_type, target } => {
                handlers::layers::place_via(state, services, via_type, target)
            }
            RouterCommand::RequestViaTarget { via_type } => {
                handlers::layers::request_via_target(state, services, via_type)
            }
            RouterCommand::SwitchLayer { command } => {
                handlers::layers::switch_layer(state, services, command)
            }
            RouterCommand::SelectLayerPair { pair } => {
                handlers::layers::select_layer_pair(state, services, pair)
            }

            // === Größen ===
            RouterCommand::SetCustomTrackWidth { width } => {
                handlers::sizes::set_custom_track_width(state, services, width)
            }
            RouterCommand::SetCustomViaSize { diameter, drill } => {
                handlers::sizes::set_custom_via_size(state, services, diameter, drill)
            }
            RouterCommand::SetDiffPairDimensions {
                width,
                gap,
                via_gap,
            } => handlers::sizes::set_diff_pair_dimensions(state, services, width, gap, via_gap),
            RouterCommand::UseNetClassSizes => handlers::sizes::use_net_class_sizes(state, services),

            // === Drag & Edit ===
            RouterCommand::StartDrag {
                items,
                anchor,
                mode,
            } => handlers::dragging::start(state, services, &items, anchor, mode),
            RouterCommand::StartFootprintDrag {
                footprint,
                anchor,
                mode,
            } => handlers::dragging::start_footprint(state, services, footprint, anchor, mode),
            RouterCommand::MoveDrag { position } => {
                handlers::dragging::move_to(state, services, position)
            }
            RouterCommand::FixDrag => handlers::dragging::fix(state, services),
            RouterCommand::BreakTrack { position } => {
                handlers::editing::break_track(state, services, position)
            }

            // === Session ===
            RouterCommand::TrackCursor { position } => {
                handlers::routing::track_cursor(state, position)
            }
            RouterCommand::CancelOperation => handlers::routing::cancel(state, services),
            RouterCommand::ResetSession => handlers::world::reset_session(state),

            // === Welt & History ===
            RouterCommand::ClearWorld => handlers::world::clear_world(services),
            RouterCommand::SyncWorld => handlers::world::sync_world(state, services),
            RouterCommand::Undo => handlers::world::undo(state)?,
            RouterCommand::Redo => handlers::world::redo(state)?,
        }

        Ok(())
    }
}
