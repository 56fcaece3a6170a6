//! Use-Case: Via-Legalität, resultierender Via-Typ und Layer-Paar.
//!
//! Die Ablehnungsregeln stehen in einer geordneten Tabelle. Spätere Schritte
//! verlassen sich darauf, dass frühere Regeln ungültige Kombinationen bereits
//! ausgeschlossen haben; die Reihenfolge darf nicht verändert werden.

use crate::app::RouterError;
use crate::core::{LayerId, LayerPair, SizesSettings, Stackup, ViaType};

/// Eingaben für eine Via-Anfrage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViaRequest {
    /// Aktiver Layer
    pub current: LayerId,
    /// Explizit gewählter Ziel-Layer ("Layer wählen und Via setzen")
    pub explicit_target: Option<LayerId>,
    pub requested: ViaType,
}

/// Board-Seite der Via-Anfrage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViaEnvironment {
    pub stackup: Stackup,
    pub blind_buried_allowed: bool,
    pub microvias_allowed: bool,
    /// Standard-Layer-Paar der Session
    pub default_pair: LayerPair,
}

/// Legal aufgelöste Via.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVia {
    pub via_type: ViaType,
    /// Layer-Paar der Via, immer normalisiert auf (oberer, unterer) Layer.
    ///
    /// Die Microvia auf der Unterseite ist damit `(second_from_bottom, bottom)`.
    /// Welches Ende das Ziel ist, liefert `pair.paired(current)`.
    pub pair: LayerPair,
}

impl ResolvedVia {
    /// Physische Spanne: Durchgangs-Vias durchdringen immer den ganzen Aufbau.
    pub fn span(&self, stackup: &Stackup) -> LayerPair {
        match self.via_type {
            ViaType::Through => stackup.outer_pair(),
            ViaType::BlindBuried | ViaType::Microvia => self.pair,
        }
    }

    /// Übernimmt Typ und Paar in die Größen-Einstellungen (ersetzt alle Paare).
    pub fn apply_to(&self, sizes: &mut SizesSettings) {
        sizes.via_type = self.via_type;
        sizes.clear_layer_pairs();
        sizes.add_layer_pair(self.pair);
    }
}

/// Grund einer Ablehnung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViaRejection {
    ViaTypeDisabled(ViaType),
    StackupIncompatible(&'static str),
}

impl From<ViaRejection> for RouterError {
    fn from(rejection: ViaRejection) -> Self {
        match rejection {
            ViaRejection::ViaTypeDisabled(via_type) => RouterError::ViaTypeDisabled(via_type),
            ViaRejection::StackupIncompatible(reason) => {
                RouterError::StackupIncompatible(reason.to_string())
            }
        }
    }
}

/// Eine Ablehnungsregel der Tabelle.
struct ViaRule {
    name: &'static str,
    rejects: fn(&ViaRequest, &ViaEnvironment) -> bool,
    rejection: fn(&ViaRequest) -> ViaRejection,
}

const NOT_ON_TWO_LAYERS: &str = "Auf 2-lagigen Boards sind nur Durchgangs-Vias erlaubt.";
const MICROVIA_NOT_OUTER: &str =
    "Microvias sind nur zwischen Außenlagen und den direkt benachbarten Lagen möglich.";
const ILLEGAL_PAIR: &str = "Das Via-Layer-Paar ist im aktuellen Lagenaufbau nicht zulässig.";

/// Ablehnungsregeln in Auswertungsreihenfolge.
const REJECTION_RULES: [ViaRule; 4] = [
    ViaRule {
        name: "blind/buried deaktiviert",
        rejects: |req, env| req.requested == ViaType::BlindBuried && !env.blind_buried_allowed,
        rejection: |req| ViaRejection::ViaTypeDisabled(req.requested),
    },
    ViaRule {
        name: "microvia deaktiviert",
        rejects: |req, env| req.requested == ViaType::Microvia && !env.microvias_allowed,
        rejection: |req| ViaRejection::ViaTypeDisabled(req.requested),
    },
    ViaRule {
        name: "nur Durchgang bei <= 2 Lagen",
        rejects: |req, env| req.requested != ViaType::Through && env.stackup.copper_count() <= 2,
        rejection: |_| ViaRejection::StackupIncompatible(NOT_ON_TWO_LAYERS),
    },
    ViaRule {
        name: "microvia nur außen/benachbart",
        rejects: |req, env| {
            req.requested == ViaType::Microvia
                && !env.stackup.is_outer(req.current)
                && !env.stackup.is_adjacent_to_outer(req.current)
        },
        rejection: |_| ViaRejection::StackupIncompatible(MICROVIA_NOT_OUTER),
    },
];

/// Sortiert zwei Layer zu (oberer, unterer).
fn ordered(a: LayerId, b: LayerId) -> LayerPair {
    LayerPair::new(a.min(b), a.max(b))
}

/// Löst eine Via-Anfrage auf.
pub fn resolve(request: &ViaRequest, env: &ViaEnvironment) -> Result<ResolvedVia, ViaRejection> {
    for rule in &REJECTION_RULES {
        if (rule.rejects)(request, env) {
            log::debug!("Via abgelehnt durch Regel '{}'", rule.name);
            return Err((rule.rejection)(request));
        }
    }

    let stackup = &env.stackup;
    let current = request.current;
    let mut via_type = request.requested;

    // Microvia-Ebenen sind implizit
    let explicit_target = match via_type {
        ViaType::Microvia => None,
        _ => request.explicit_target,
    };

    // Blind/Buried über den kompletten Aufbau ist eine Durchgangs-Via
    if via_type == ViaType::BlindBuried {
        if let Some(target) = explicit_target {
            if stackup.is_full_span(&LayerPair::new(current, target)) {
                via_type = ViaType::Through;
            }
        }
    }

    let default_pair = env.default_pair;
    let pair = match via_type {
        ViaType::Through => match explicit_target {
            Some(target) => ordered(current, target),
            None => {
                let target = default_pair.paired(current).unwrap_or(default_pair.top);
                ordered(current, target)
            }
        },
        ViaType::Microvia => {
            if current == stackup.top() || current == stackup.second_from_top() {
                LayerPair::new(stackup.top(), stackup.second_from_top())
            } else {
                LayerPair::new(stackup.second_from_bottom(), stackup.bottom())
            }
        }
        ViaType::BlindBuried => {
            let target = explicit_target.unwrap_or_else(|| {
                // Außerhalb des Standard-Paars fällt das Ziel immer auf dessen oberen Layer
                default_pair.paired(current).unwrap_or(default_pair.top)
            });
            ordered(current, target)
        }
    };

    if via_type == ViaType::BlindBuried && stackup.is_full_span(&pair) {
        via_type = ViaType::Through;
    }

    if pair.is_degenerate() || !stackup.contains(pair.top) || !stackup.contains(pair.bottom) {
        return Err(ViaRejection::StackupIncompatible(ILLEGAL_PAIR));
    }

    log::debug!("Via aufgelöst: {:?} {}", via_type, pair);
    Ok(ResolvedVia { via_type, pair })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(layers: u8, default_pair: LayerPair) -> ViaEnvironment {
        ViaEnvironment {
            stackup: Stackup::new(layers),
            blind_buried_allowed: true,
            microvias_allowed: true,
            default_pair,
        }
    }

    fn request(current: u8, target: Option<u8>, requested: ViaType) -> ViaRequest {
        ViaRequest {
            current: LayerId(current),
            explicit_target: target.map(LayerId),
            requested,
        }
    }

    fn outer(layers: u8) -> LayerPair {
        Stackup::new(layers).outer_pair()
    }

    #[test]
    fn two_layer_board_rejects_blind_via() {
        let result = resolve(&request(0, None, ViaType::BlindBuried), &env(2, outer(2)));
        assert_eq!(
            result,
            Err(ViaRejection::StackupIncompatible(NOT_ON_TWO_LAYERS))
        );
    }

    #[test]
    fn disabled_type_is_checked_before_stackup() {
        let mut environment = env(2, outer(2));
        environment.microvias_allowed = false;
        let result = resolve(&request(0, None, ViaType::Microvia), &environment);
        assert_eq!(result, Err(ViaRejection::ViaTypeDisabled(ViaType::Microvia)));
    }

    #[test]
    fn microvia_from_top_pairs_with_second_layer() {
        let resolved = resolve(&request(0, None, ViaType::Microvia), &env(6, outer(6)))
            .expect("Microvia erwartet");
        assert_eq!(resolved.via_type, ViaType::Microvia);
        assert_eq!(resolved.pair, LayerPair::new(LayerId(0), LayerId(1)));
    }

    #[test]
    fn microvia_from_bottom_side() {
        let resolved = resolve(&request(4, None, ViaType::Microvia), &env(6, outer(6)))
            .expect("Microvia erwartet");
        assert_eq!(resolved.pair, LayerPair::new(LayerId(4), LayerId(5)));

        // Paar ist normalisiert, das Ziel ergibt sich aus dem aktiven Layer
        let from_bottom = resolve(&request(5, None, ViaType::Microvia), &env(6, outer(6)))
            .expect("Microvia erwartet");
        assert_eq!(from_bottom.pair, LayerPair::new(LayerId(4), LayerId(5)));
        assert_eq!(from_bottom.pair.paired(LayerId(5)), Some(LayerId(4)));
    }

    #[test]
    fn microvia_never_resolves_on_deep_inner_layers() {
        for layers in 3..=8u8 {
            let environment = env(layers, outer(layers));
            for current in 0..layers {
                let result = resolve(&request(current, None, ViaType::Microvia), &environment);
                let stackup = Stackup::new(layers);
                let layer = LayerId(current);
                if stackup.is_outer(layer) || stackup.is_adjacent_to_outer(layer) {
                    assert!(result.is_ok(), "{layers} Lagen, Layer {current}");
                } else {
                    assert_eq!(
                        result,
                        Err(ViaRejection::StackupIncompatible(MICROVIA_NOT_OUTER))
                    );
                }
            }
        }
    }

    #[test]
    fn microvia_ignores_explicit_target() {
        let resolved = resolve(&request(0, Some(3), ViaType::Microvia), &env(6, outer(6)))
            .expect("Microvia erwartet");
        assert_eq!(resolved.pair, LayerPair::new(LayerId(0), LayerId(1)));
    }

    #[test]
    fn blind_via_from_pair_end_swaps_sides() {
        let pair = LayerPair::new(LayerId(1), LayerId(4));
        let resolved = resolve(&request(4, None, ViaType::BlindBuried), &env(6, pair))
            .expect("Blind-Via erwartet");
        assert_eq!(resolved.via_type, ViaType::BlindBuried);
        assert_eq!(resolved.pair, LayerPair::new(LayerId(1), LayerId(4)));
    }

    #[test]
    fn blind_via_outside_pair_falls_back_to_pair_top() {
        let pair = LayerPair::new(LayerId(1), LayerId(4));
        let resolved = resolve(&request(3, None, ViaType::BlindBuried), &env(6, pair))
            .expect("Blind-Via erwartet");
        assert_eq!(resolved.pair, LayerPair::new(LayerId(1), LayerId(3)));
    }

    #[test]
    fn blind_via_over_full_stack_becomes_through() {
        let resolved = resolve(&request(0, Some(5), ViaType::BlindBuried), &env(6, outer(6)))
            .expect("Via erwartet");
        assert_eq!(resolved.via_type, ViaType::Through);

        let resolved = resolve(&request(5, None, ViaType::BlindBuried), &env(6, outer(6)))
            .expect("Via erwartet");
        assert_eq!(resolved.via_type, ViaType::Through);
        assert_eq!(resolved.pair, outer(6));
    }

    #[test]
    fn blind_via_never_spans_full_stack() {
        let stackup = Stackup::new(6);
        for current in 0..6u8 {
            for target in (0..6u8).map(Some).chain([None]) {
                let pair = LayerPair::new(LayerId(0), LayerId(3));
                let result = resolve(&request(current, target, ViaType::BlindBuried), &env(6, pair));
                if let Ok(resolved) = result {
                    if resolved.via_type == ViaType::BlindBuried {
                        assert!(!stackup.is_full_span(&resolved.pair));
                    }
                }
            }
        }
    }

    #[test]
    fn through_via_uses_default_pair() {
        let resolved = resolve(&request(0, None, ViaType::Through), &env(4, outer(4)))
            .expect("Via erwartet");
        assert_eq!(resolved.pair, outer(4));
        assert_eq!(resolved.span(&Stackup::new(4)), outer(4));
    }

    #[test]
    fn via_to_current_layer_is_rejected() {
        let result = resolve(&request(1, Some(1), ViaType::Through), &env(4, outer(4)));
        assert_eq!(result, Err(ViaRejection::StackupIncompatible(ILLEGAL_PAIR)));
    }

    #[test]
    fn applying_resolution_replaces_layer_pairs() {
        let mut sizes = SizesSettings::default();
        sizes.add_layer_pair(LayerPair::new(LayerId(1), LayerId(2)));
        let resolved = ResolvedVia {
            via_type: ViaType::Microvia,
            pair: LayerPair::new(LayerId(0), LayerId(1)),
        };
        resolved.apply_to(&mut sizes);
        assert_eq!(sizes.layer_pairs(), &[LayerPair::new(LayerId(0), LayerId(1))]);
        assert_eq!(sizes.paired_layer(LayerId(0)), Some(LayerId(1)));
    }
}
