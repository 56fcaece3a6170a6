//! Mapping von Router-Intents auf mutierende Router-Commands.

use super::bindings::RouterAction;
use super::use_cases::drag::DragMode;
use super::use_cases::layer_nav::LayerCommand;
use super::{RouterCommand, RouterIntent, RouterState};
use crate::core::{ItemId, LayerId, LayerPair, ViaType};
use glam::IVec2;

/// Item unter dem Zeiger, bevorzugt auf `layer`.
fn pick_item(state: &RouterState, position: IVec2, layer: Option<LayerId>) -> Option<ItemId> {
    let tolerance = state.options.snap_radius();
    let board = &state.board;
    layer
        .and_then(|l| board.item_at(position, Some(l), tolerance))
        .or_else(|| board.item_at(position, None, tolerance))
        .map(|item| item.id)
}

/// Drag-Auswahl am Zeiger: alle Items mit Ankerpunkt im Snap-Radius,
/// sonst das Item unter dem Zeiger.
fn pick_drag_items(state: &RouterState, position: IVec2) -> Vec<ItemId> {
    let near: Vec<ItemId> = state
        .board
        .items_near(position, state.options.snap_radius())
        .into_iter()
        .map(|m| m.item_id)
        .collect();
    if !near.is_empty() {
        return near;
    }
    pick_item(state, position, None).into_iter().collect()
}

fn default_drag_mode(state: &RouterState) -> DragMode {
    DragMode(state.options.drag_mode_bits)
}

/// Layer, auf dem ein Klick ein Ziel-Item sucht.
fn head_layer(state: &RouterState) -> LayerId {
    state
        .session
        .route()
        .map_or(state.session.active_layer(), |op| op.layer)
}

fn drag_at_cursor(state: &RouterState, mode: DragMode) -> Vec<RouterCommand> {
    if !state.session.is_idle() {
        return vec![];
    }
    let anchor = state.session.cursor;
    vec![RouterCommand::StartDrag {
        items: pick_drag_items(state, anchor),
        anchor,
        mode,
    }]
}

fn map_action(state: &RouterState, action: RouterAction) -> Vec<RouterCommand> {
    let routing = state.session.is_routing();
    match action {
        RouterAction::PlaceThroughVia => vec![RouterCommand::PlaceVia {
            via_type: ViaType::Through,
            target: None,
        }],
        RouterAction::PlaceBlindVia => vec![RouterCommand::PlaceVia {
            via_type: ViaType::BlindBuried,
            target: None,
        }],
        RouterAction::PlaceMicrovia => vec![RouterCommand::PlaceVia {
            via_type: ViaType::Microvia,
            target: None,
        }],
        RouterAction::SelectLayerAndPlaceThroughVia => vec![RouterCommand::RequestViaTarget {
            via_type: ViaType::Through,
        }],
        RouterAction::SelectLayerAndPlaceBlindVia => vec![RouterCommand::RequestViaTarget {
            via_type: ViaType::BlindBuried,
        }],
        RouterAction::LayerNext => vec![RouterCommand::SwitchLayer {
            command: LayerCommand::Next,
        }],
        RouterAction::LayerPrev => vec![RouterCommand::SwitchLayer {
            command: LayerCommand::Prev,
        }],
        RouterAction::LayerTop => vec![RouterCommand::SwitchLayer {
            command: LayerCommand::Top,
        }],
        RouterAction::LayerBottom => vec![RouterCommand::SwitchLayer {
            command: LayerCommand::Bottom,
        }],
        RouterAction::UndoLastSegment if routing => vec![RouterCommand::UndoLastSegment],
        RouterAction::EndTrack if routing => {
            let position = state.session.cursor;
            vec![RouterCommand::FixRoute {
                position,
                item: pick_item(state, position, Some(head_layer(state))),
                force_finish: true,
            }]
        }
        RouterAction::UndoLastSegment | RouterAction::EndTrack => vec![],
        RouterAction::SwitchPosture => vec![RouterCommand::FlipPosture],
        RouterAction::SwitchRounding => vec![RouterCommand::ToggleRounding],
        RouterAction::DragFortyFive => {
            drag_at_cursor(state, DragMode::ANY | DragMode::FORTY_FIVE_DEGREE)
        }
        RouterAction::DragFreeAngle => drag_at_cursor(state, DragMode::ANY | DragMode::FREE_ANGLE),
        RouterAction::BreakTrack => vec![RouterCommand::BreakTrack {
            position: state.session.cursor,
        }],
        RouterAction::Cancel => vec![RouterCommand::CancelOperation],
    }
}

/// Undo/Redo oder externe Modell-Änderung: laufende Operation beenden,
/// Welt verwerfen, Board umstellen und neu synchronisieren.
fn world_change(active: bool, step: Option<RouterCommand>) -> Vec<RouterCommand> {
    let mut commands = Vec::new();
    if active {
        commands.push(RouterCommand::CancelOperation);
    }
    if let Some(step) = step {
        commands.push(RouterCommand::ClearWorld);
        commands.push(step);
    }
    commands.push(RouterCommand::SyncWorld);
    commands
}

/// Übersetzt einen `RouterIntent` in eine Sequenz ausführbarer `RouterCommand`s.
pub fn map_intent_to_commands(state: &RouterState, intent: RouterIntent) -> Vec<RouterCommand> {
    let session = &state.session;
    let active = !session.is_idle();

    match intent {
        RouterIntent::Motion { position, ctrl } => {
            if session.is_routing() {
                vec![RouterCommand::MoveHead {
                    position,
                    item: pick_item(state, position, Some(head_layer(state))),
                    ortho: ctrl,
                }]
            } else if session.is_dragging() {
                vec![RouterCommand::MoveDrag { position }]
            } else {
                vec![RouterCommand::TrackCursor { position }]
            }
        }
        RouterIntent::Click {
            position,
            shift,
            ctrl,
        } => {
            if session.is_routing() {
                vec![RouterCommand::FixRoute {
                    position,
                    item: pick_item(state, position, Some(head_layer(state))),
                    force_finish: shift,
                }]
            } else if session.is_dragging() {
                vec![RouterCommand::FixDrag]
            } else if ctrl {
                vec![RouterCommand::StartDrag {
                    items: pick_item(state, position, None).into_iter().collect(),
                    anchor: position,
                    mode: default_drag_mode(state),
                }]
            } else {
                vec![RouterCommand::StartRouting {
                    position,
                    item: pick_item(state, position, Some(session.active_layer())),
                }]
            }
        }
        RouterIntent::DoubleClick { position } => {
            if session.is_routing() {
                vec![RouterCommand::FixRoute {
                    position,
                    item: pick_item(state, position, Some(head_layer(state))),
                    force_finish: true,
                }]
            } else {
                vec![]
            }
        }
        RouterIntent::KeyPress { chord } => match state.bindings.resolve(&chord) {
            Some(action) => map_action(state, action),
            None => {
                log::debug!("Keine Aktion für Taste '{}'", chord);
                vec![]
            }
        },
        RouterIntent::Cancel => vec![RouterCommand::CancelOperation],
        RouterIntent::Activate => {
            let mut commands = Vec::new();
            if active {
                commands.push(RouterCommand::CancelOperation);
            }
            commands.push(RouterCommand::ResetSession);
            commands.push(RouterCommand::SyncWorld);
            commands
        }
        RouterIntent::Deactivate => {
            if active {
                vec![RouterCommand::CancelOperation]
            } else {
                vec![]
            }
        }

        RouterIntent::PlaceViaRequested { via_type, target } => {
            vec![RouterCommand::PlaceVia { via_type, target }]
        }
        RouterIntent::ViaTargetLayerSelected { layer } => match session.pending_via_target() {
            Some(via_type) => vec![RouterCommand::PlaceVia {
                via_type,
                target: Some(layer),
            }],
            None => vec![],
        },
        RouterIntent::LayerSwitchRequested { command } => {
            vec![RouterCommand::SwitchLayer { command }]
        }
        RouterIntent::LayerPairSelected { top, bottom } => vec![RouterCommand::SelectLayerPair {
            pair: LayerPair::new(top, bottom),
        }],
        RouterIntent::RouterModeChanged { mode } => vec![RouterCommand::SetRouterMode { mode }],

        RouterIntent::CustomTrackWidthChanged { width } => {
            vec![RouterCommand::SetCustomTrackWidth { width }]
        }
        RouterIntent::CustomViaSizeChanged { diameter, drill } => {
            vec![RouterCommand::SetCustomViaSize { diameter, drill }]
        }
        RouterIntent::DiffPairDimensionsChanged {
            width,
            gap,
            via_gap,
        } => vec![RouterCommand::SetDiffPairDimensions {
            width,
            gap,
            via_gap,
        }],
        RouterIntent::NetClassSizesRequested => vec![RouterCommand::UseNetClassSizes],

        RouterIntent::DragSelectionRequested {
            items,
            anchor,
            free_angle,
        } => {
            let mode = if free_angle {
                DragMode::ANY | DragMode::FREE_ANGLE
            } else {
                default_drag_mode(state)
            };
            vec![RouterCommand::StartDrag {
                items,
                anchor,
                mode,
            }]
        }
        RouterIntent::DragFootprintRequested { footprint, anchor } => {
            vec![RouterCommand::StartFootprintDrag {
                footprint,
                anchor,
                mode: default_drag_mode(state),
            }]
        }
        RouterIntent::BreakTrackRequested { position } => {
            vec![RouterCommand::BreakTrack { position }]
        }

        RouterIntent::UndoRequested => world_change(active, Some(RouterCommand::Undo)),
        RouterIntent::RedoRequested => world_change(active, Some(RouterCommand::Redo)),
        RouterIntent::ModelChanged => world_change(active, None),
    }
}
