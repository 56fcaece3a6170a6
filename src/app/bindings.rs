//! Tastenbelegung: Akkorde, Aktionen und die injizierte Aktions-Registry.

use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Fehler beim Einlesen einer Tastenbelegung.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("leerer Tasten-Akkord")]
    EmptyChord,
    #[error("unbekannter Modifier '{0}'")]
    UnknownModifier(String),
    #[error("unbekannte Aktion '{0}'")]
    UnknownAction(String),
}

/// Tastenkombination aus Modifiern und einer Taste.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    /// Tastenname; einzelne Buchstaben werden groß geschrieben
    pub key: String,
}

impl FromStr for KeyChord {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(BindingError::EmptyChord);
        }

        // Die Taste "+" selbst: "+" oder "Ctrl++"
        let (modifiers, key) = if s == "+" {
            ("", "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            s.rsplit_once('+').unwrap_or(("", s))
        };
        if key.is_empty() {
            return Err(BindingError::EmptyChord);
        }

        let mut chord = KeyChord {
            ctrl: false,
            shift: false,
            alt: false,
            key: if key.chars().count() == 1 {
                key.to_uppercase()
            } else {
                key.to_string()
            },
        };
        for modifier in modifiers.split('+').filter(|m| !m.is_empty()) {
            match modifier.to_ascii_lowercase().as_str() {
                "ctrl" | "strg" => chord.ctrl = true,
                "shift" => chord.shift = true,
                "alt" => chord.alt = true,
                other => return Err(BindingError::UnknownModifier(other.to_string())),
            }
        }
        Ok(chord)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("Ctrl+")?;
        }
        if self.shift {
            f.write_str("Shift+")?;
        }
        if self.alt {
            f.write_str("Alt+")?;
        }
        f.write_str(&self.key)
    }
}

/// Aktionen des Routing-Werkzeugs, die per Taste ausgelöst werden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterAction {
    PlaceThroughVia,
    PlaceBlindVia,
    PlaceMicrovia,
    SelectLayerAndPlaceThroughVia,
    SelectLayerAndPlaceBlindVia,
    LayerNext,
    LayerPrev,
    LayerTop,
    LayerBottom,
    UndoLastSegment,
    EndTrack,
    SwitchPosture,
    SwitchRounding,
    DragFortyFive,
    DragFreeAngle,
    BreakTrack,
    Cancel,
}

impl FromStr for RouterAction {
    type Err = BindingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let action = match s {
            "PlaceThroughVia" => Self::PlaceThroughVia,
            "PlaceBlindVia" => Self::PlaceBlindVia,
            "PlaceMicrovia" => Self::PlaceMicrovia,
            "SelectLayerAndPlaceThroughVia" => Self::SelectLayerAndPlaceThroughVia,
            "SelectLayerAndPlaceBlindVia" => Self::SelectLayerAndPlaceBlindVia,
            "LayerNext" => Self::LayerNext,
            "LayerPrev" => Self::LayerPrev,
            "LayerTop" => Self::LayerTop,
            "LayerBottom" => Self::LayerBottom,
            "UndoLastSegment" => Self::UndoLastSegment,
            "EndTrack" => Self::EndTrack,
            "SwitchPosture" => Self::SwitchPosture,
            "SwitchRounding" => Self::SwitchRounding,
            "DragFortyFive" => Self::DragFortyFive,
            "DragFreeAngle" => Self::DragFreeAngle,
            "BreakTrack" => Self::BreakTrack,
            "Cancel" => Self::Cancel,
            other => return Err(BindingError::UnknownAction(other.to_string())),
        };
        Ok(action)
    }
}

/// Registry Akkord → Aktion, aus den Optionen aufgebaut.
#[derive(Debug, Clone, Default)]
pub struct ActionRegistry {
    bindings: HashMap<KeyChord, RouterAction>,
}

impl ActionRegistry {
    /// Baut die Registry aus einer Belegungstabelle. Ungültige Einträge
    /// werden mit Warnung übersprungen.
    pub fn from_bindings(table: &IndexMap<String, String>) -> Self {
        let mut bindings = HashMap::with_capacity(table.len());
        for (chord, action) in table {
            match (chord.parse::<KeyChord>(), action.parse::<RouterAction>()) {
                (Ok(chord), Ok(action)) => {
                    if let Some(previous) = bindings.insert(chord.clone(), action) {
                        log::warn!(
                            "Tastenbelegung {} doppelt: {:?} ersetzt durch {:?}",
                            chord,
                            previous,
                            action
                        );
                    }
                }
                (Err(e), _) | (_, Err(e)) => {
                    log::warn!("Tastenbelegung '{}' -> '{}' ignoriert: {}", chord, action, e);
                }
            }
        }
        Self { bindings }
    }

    /// Registriert oder ersetzt eine Belegung.
    pub fn bind(&mut self, chord: KeyChord, action: RouterAction) {
        self.bindings.insert(chord, action);
    }

    /// Aktion für einen Akkord.
    pub fn action_for(&self, chord: &KeyChord) -> Option<RouterAction> {
        self.bindings.get(chord).copied()
    }

    /// Aktion für einen Akkord-Text; ungültiger Text ergibt `None`.
    pub fn resolve(&self, chord: &str) -> Option<RouterAction> {
        chord.parse::<KeyChord>().ok().and_then(|c| self.action_for(&c))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::options::default_key_bindings;

    #[test]
    fn chord_parsing_handles_modifiers_and_plus_key() {
        let chord: KeyChord = "Ctrl+Shift+v".parse().expect("Akkord erwartet");
        assert!(chord.ctrl && chord.shift && !chord.alt);
        assert_eq!(chord.key, "V");

        let plus: KeyChord = "+".parse().expect("Akkord erwartet");
        assert_eq!(plus.key, "+");
        let ctrl_plus: KeyChord = "Ctrl++".parse().expect("Akkord erwartet");
        assert!(ctrl_plus.ctrl);
        assert_eq!(ctrl_plus.key, "+");

        assert_eq!(
            "Hyper+V".parse::<KeyChord>(),
            Err(BindingError::UnknownModifier("hyper".into()))
        );
    }

    #[test]
    fn default_bindings_are_all_valid() {
        let table = default_key_bindings();
        let registry = ActionRegistry::from_bindings(&table);
        assert_eq!(registry.len(), table.len());
        assert_eq!(registry.resolve("V"), Some(RouterAction::PlaceThroughVia));
        assert_eq!(registry.resolve("ctrl+shift+V"), Some(RouterAction::PlaceMicrovia));
        assert_eq!(registry.resolve("Alt+<"), Some(RouterAction::SelectLayerAndPlaceThroughVia));
        assert_eq!(registry.resolve("-"), Some(RouterAction::LayerPrev));
    }

    #[test]
    fn invalid_entries_are_skipped() {
        let mut table = IndexMap::new();
        table.insert("X".to_string(), "Fly".to_string());
        table.insert("V".to_string(), "PlaceMicrovia".to_string());
        let registry = ActionRegistry::from_bindings(&table);
        assert_eq!(registry.len(), 1);
    }
}
