use crate::app::use_cases::layer_nav::LayerCommand;
use crate::core::{ItemId, LayerId, ViaType};
use crate::engine::RouterMode;
use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Router-Intents: abstrakte Eingaben aus Host/UI ohne direkte Mutationslogik.
///
/// Die ersten Varianten bilden den Eingabestrom des Werkzeugs (Bewegung,
/// Klick, Taste, Abbruch, Aktivierung); die übrigen sind Menü- und
/// Dialog-Ergebnisse des Hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RouterIntent {
    /// Zeigerbewegung (Ctrl = Ortho-Modus)
    Motion {
        position: IVec2,
        #[serde(default)]
        ctrl: bool,
    },
    /// Linksklick (Shift = Route beenden, Ctrl = Item ziehen)
    Click {
        position: IVec2,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        ctrl: bool,
    },
    /// Doppelklick beendet die laufende Route
    DoubleClick { position: IVec2 },
    /// Tastendruck als Akkord-Text (z. B. `"Ctrl+Shift+V"`)
    KeyPress { chord: String },
    /// Abbruch (Escape, Rechtsklick-Menü)
    Cancel,
    /// Werkzeug wurde aktiviert
    Activate,
    /// Werkzeug wird verlassen (anderes Werkzeug aktiviert)
    Deactivate,

    /// Via setzen (optional mit explizitem Ziel-Layer)
    PlaceViaRequested {
        via_type: ViaType,
        #[serde(default)]
        target: Option<LayerId>,
    },
    /// Ziel-Layer aus dem Auswahl-Dialog
    ViaTargetLayerSelected { layer: LayerId },
    /// Layer-Befehl aus dem Menü
    LayerSwitchRequested { command: LayerCommand },
    /// Standard-Layer-Paar für Vias wählen
    LayerPairSelected { top: LayerId, bottom: LayerId },
    /// Kollisions-Strategie wechseln
    RouterModeChanged { mode: RouterMode },

    /// Custom-Leiterbahnbreite (nm) setzen
    CustomTrackWidthChanged { width: u32 },
    /// Custom-Via-Größe (nm) setzen
    CustomViaSizeChanged { diameter: u32, drill: u32 },
    /// Diff-Pair-Dimensionen (nm) setzen
    DiffPairDimensionsChanged { width: u32, gap: u32, via_gap: u32 },
    /// Zurück auf Netzklassen-Größen
    NetClassSizesRequested,

    /// Selektion aus dem Host ziehen
    DragSelectionRequested {
        items: Vec<ItemId>,
        anchor: IVec2,
        #[serde(default)]
        free_angle: bool,
    },
    /// Footprint mit allen Pads ziehen
    DragFootprintRequested { footprint: u64, anchor: IVec2 },
    /// Track am Punkt auftrennen
    BreakTrackRequested { position: IVec2 },

    /// Undo im Host
    UndoRequested,
    /// Redo im Host
    RedoRequested,
    /// Board-Modell wurde extern geändert
    ModelChanged,
}
