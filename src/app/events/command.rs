use crate::app::use_cases::drag::DragMode;
use crate::app::use_cases::layer_nav::LayerCommand;
use crate::core::{ItemId, LayerId, LayerPair, ViaType};
use crate::engine::RouterMode;
use glam::IVec2;

/// Commands sind mutierende Schritte, die zentral ausgeführt werden.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterCommand {
    // ── Routing ─────────────────────────────────────────────────
    /// Routing an `position` beginnen (optional auf einem Start-Item)
    StartRouting {
        position: IVec2,
        item: Option<ItemId>,
    },
    /// Kopf zur Zeigerposition neu berechnen
    MoveHead {
        position: IVec2,
        item: Option<ItemId>,
        ortho: bool,
    },
    /// Route bis `position` fixieren
    FixRoute {
        position: IVec2,
        item: Option<ItemId>,
        force_finish: bool,
    },
    /// Letzten fixierten Schritt verwerfen
    UndoLastSegment,
    /// Via am Kopf setzen bzw. wieder entfernen
    PlaceVia {
        via_type: ViaType,
        target: Option<LayerId>,
    },
    /// Ziel-Layer für eine Via beim Host anfragen
    RequestViaTarget { via_type: ViaType },
    /// Layer wechseln (Idle: nächster Start, Routing: Kopf)
    SwitchLayer { command: LayerCommand },
    /// Kopf-Haltung umschalten
    FlipPosture,
    /// Eckenrundung umschalten
    ToggleRounding,
    SetRouterMode { mode: RouterMode },

    // ── Größen ────────────────────────────────────────────────
    SetCustomTrackWidth { width: u32 },
    SetCustomViaSize { diameter: u32, drill: u32 },
    SetDiffPairDimensions { width: u32, gap: u32, via_gap: u32 },
    UseNetClassSizes,
    SelectLayerPair { pair: LayerPair },

    // ── Drag & Edit ─────────────────────────────────────────────
    StartDrag {
        items: Vec<ItemId>,
        anchor: IVec2,
        mode: DragMode,
    },
    StartFootprintDrag {
        footprint: u64,
        anchor: IVec2,
        mode: DragMode,
    },
    MoveDrag { position: IVec2 },
    FixDrag,
    BreakTrack { position: IVec2 },

    // ── Session ─────────────────────────────────────────────────
    /// Zeigerposition ohne laufende Operation merken
    TrackCursor { position: IVec2 },
    /// Laufende Operation abbrechen (ohne Operation: Werkzeug verlassen)
    CancelOperation,
    /// Abbruch-Flag und Zähler für eine neue Aktivierung zurücksetzen
    ResetSession,

    // ── Welt ────────────────────────────────────────────────────
    ClearWorld,
    SyncWorld,
    Undo,
    Redo,
}
