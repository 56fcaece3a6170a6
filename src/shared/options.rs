//! Zentrale Konfiguration für den interaktiven Router.
//!
//! `RouterOptions` enthält alle zur Laufzeit änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use crate::engine::RouterMode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ── Pick & Snap ─────────────────────────────────────────────────────

/// Snap-Radius (nm): Klick innerhalb dieses Radius rastet auf ein Item ein.
pub const SNAP_RADIUS_NM: u32 = 250_000;

// ── Drag ────────────────────────────────────────────────────────────

/// Standard-Drag-Modus als Bitmaske (ANY | FORTY_FIVE_DEGREE).
pub const DEFAULT_DRAG_MODE_BITS: u8 = 0b101;

// ── Verlauf ─────────────────────────────────────────────────────────

/// Anzahl der gespeicherten Session-Zustandswechsel.
pub const TRANSITION_TRAIL_LEN: usize = 64;

/// Standard-Tastenbelegung (Akkord → Aktion), angelehnt an gängige PCB-Editoren.
pub fn default_key_bindings() -> IndexMap<String, String> {
    [
        ("V", "PlaceThroughVia"),
        ("Ctrl+V", "PlaceBlindVia"),
        ("Ctrl+Shift+V", "PlaceMicrovia"),
        ("Alt+<", "SelectLayerAndPlaceThroughVia"),
        ("Alt+V", "SelectLayerAndPlaceBlindVia"),
        ("+", "LayerNext"),
        ("-", "LayerPrev"),
        ("PgUp", "LayerTop"),
        ("PgDn", "LayerBottom"),
        ("Backspace", "UndoLastSegment"),
        ("End", "EndTrack"),
        ("/", "SwitchPosture"),
        ("Ctrl+/", "SwitchRounding"),
        ("D", "DragFortyFive"),
        ("G", "DragFreeAngle"),
        ("Shift+B", "BreakTrack"),
        ("Escape", "Cancel"),
    ]
    .into_iter()
    .map(|(chord, action)| (chord.to_string(), action.to_string()))
    .collect()
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle zur Laufzeit änderbaren Router-Optionen.
/// Wird als `pcb_interactive_router.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterOptions {
    // ── Router ──────────────────────────────────────────────────
    /// Kollisions-Strategie beim Start
    pub router_mode: RouterMode,
    /// Drag-Modus als Bitmaske (1 = ANY, 2 = FREE_ANGLE, 4 = FORTY_FIVE_DEGREE)
    #[serde(default = "default_drag_mode_bits")]
    pub drag_mode_bits: u8,
    /// Gesperrte Items beim Drag ohne Rückfrage freigeben (unbeaufsichtigtes Replay)
    #[serde(default)]
    pub auto_confirm_locked: bool,

    // ── Pick & Snap ─────────────────────────────────────────────
    /// Snap-Radius in Nanometer
    pub snap_radius_nm: u32,

    // ── Tastatur ────────────────────────────────────────────────
    /// Tastenbelegung: Akkord → Aktionsname
    #[serde(default = "default_key_bindings")]
    pub key_bindings: IndexMap<String, String>,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            router_mode: RouterMode::default(),
            drag_mode_bits: DEFAULT_DRAG_MODE_BITS,
            auto_confirm_locked: false,
            snap_radius_nm: SNAP_RADIUS_NM,
            key_bindings: default_key_bindings(),
        }
    }
}

/// Serde-Default für `drag_mode_bits` (Abwärtskompatibilität bestehender TOML-Dateien).
fn default_drag_mode_bits() -> u8 {
    DEFAULT_DRAG_MODE_BITS
}

impl RouterOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("pcb-route-replay"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("pcb_interactive_router.toml")
    }

    /// Snap-Radius als Distanz für Item-Abfragen.
    pub fn snap_radius(&self) -> f64 {
        f64::from(self.snap_radius_nm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let opts = RouterOptions::load_from_file(std::path::Path::new(
            "/nonexistent/pcb_interactive_router.toml",
        ));
        assert_eq!(opts, RouterOptions::default());
    }

    #[test]
    fn partial_toml_keeps_default_bindings() {
        let opts: RouterOptions = toml::from_str(
            "router_mode = \"Shove\"\nsnap_radius_nm = 100000\n",
        )
        .expect("TOML sollte parsen");
        assert_eq!(opts.router_mode, RouterMode::Shove);
        assert_eq!(opts.drag_mode_bits, DEFAULT_DRAG_MODE_BITS);
        assert_eq!(opts.key_bindings.get("V").map(String::as_str), Some("PlaceThroughVia"));
    }

    #[test]
    fn options_roundtrip_through_toml() {
        let opts = RouterOptions {
            auto_confirm_locked: true,
            ..RouterOptions::default()
        };
        let text = toml::to_string_pretty(&opts).expect("Serialisierung erwartet");
        let back: RouterOptions = toml::from_str(&text).expect("TOML sollte parsen");
        assert_eq!(back, opts);
    }
}
