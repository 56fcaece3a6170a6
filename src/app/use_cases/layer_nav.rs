//! Use-Case: Zyklisches Layer-Stepping und direkte Layer-Befehle.

use crate::core::LayerId;
use serde::{Deserialize, Serialize};

/// Layer-Befehl aus Tastatur oder Menü.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerCommand {
    Next,
    Prev,
    Top,
    Bottom,
    /// Innenlage n (1 = erste Innenlage)
    Inner(u8),
}

/// Position von `current` in `enabled`; ein unbekannter Layer zählt als Index 0.
fn index_of(current: LayerId, enabled: &[LayerId]) -> usize {
    enabled.iter().position(|l| *l == current).unwrap_or(0)
}

/// Zyklischer Nachfolger innerhalb der aktivierten Kupferlagen.
pub fn next(current: LayerId, enabled: &[LayerId]) -> Option<LayerId> {
    if enabled.is_empty() {
        return None;
    }
    let idx = (index_of(current, enabled) + 1) % enabled.len();
    Some(enabled[idx])
}

/// Zyklischer Vorgänger innerhalb der aktivierten Kupferlagen.
pub fn prev(current: LayerId, enabled: &[LayerId]) -> Option<LayerId> {
    if enabled.is_empty() {
        return None;
    }
    let idx = match index_of(current, enabled) {
        0 => enabled.len() - 1,
        i => i - 1,
    };
    Some(enabled[idx])
}

/// Ziel-Layer eines Befehls. `None`, wenn das Ziel nicht aktiviert ist
/// oder dem aktuellen Layer entspricht.
pub fn resolve(command: LayerCommand, current: LayerId, enabled: &[LayerId]) -> Option<LayerId> {
    let target = match command {
        LayerCommand::Next => next(current, enabled)?,
        LayerCommand::Prev => prev(current, enabled)?,
        LayerCommand::Top => *enabled.first()?,
        LayerCommand::Bottom => *enabled.last()?,
        LayerCommand::Inner(n) => {
            let layer = LayerId::copper(n);
            if n == 0 || Some(&layer) == enabled.last() {
                return None;
            }
            layer
        }
    };

    if target == current || !enabled.contains(&target) {
        return None;
    }
    Some(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layers(n: u8) -> Vec<LayerId> {
        (0..n).map(LayerId).collect()
    }

    #[test]
    fn next_wraps_around() {
        let enabled = layers(4);
        assert_eq!(next(LayerId(3), &enabled), Some(LayerId(0)));
        assert_eq!(prev(LayerId(0), &enabled), Some(LayerId(3)));
    }

    #[test]
    fn stepping_n_times_returns_to_start() {
        let enabled = vec![LayerId(0), LayerId(2), LayerId(5)];
        for start in &enabled {
            let mut layer = *start;
            for _ in 0..enabled.len() {
                layer = next(layer, &enabled).expect("Layer erwartet");
            }
            assert_eq!(layer, *start);

            for _ in 0..enabled.len() {
                layer = prev(layer, &enabled).expect("Layer erwartet");
            }
            assert_eq!(layer, *start);
        }
    }

    #[test]
    fn unknown_current_counts_as_first() {
        let enabled = vec![LayerId(0), LayerId(2), LayerId(5)];
        assert_eq!(next(LayerId(1), &enabled), Some(LayerId(2)));
        assert_eq!(prev(LayerId(1), &enabled), Some(LayerId(5)));
    }

    #[test]
    fn empty_layer_set_has_no_neighbours() {
        assert_eq!(next(LayerId(0), &[]), None);
        assert_eq!(prev(LayerId(0), &[]), None);
    }

    #[test]
    fn direct_commands() {
        let enabled = layers(4);
        assert_eq!(resolve(LayerCommand::Bottom, LayerId(0), &enabled), Some(LayerId(3)));
        assert_eq!(resolve(LayerCommand::Inner(2), LayerId(0), &enabled), Some(LayerId(2)));
        assert_eq!(resolve(LayerCommand::Inner(3), LayerId(0), &enabled), None);
        assert_eq!(resolve(LayerCommand::Top, LayerId(0), &enabled), None);
    }
}
