//! Einfache Regel-Engine: geordnete Regelliste, die letzte passende Regel gewinnt.

use super::{ConstraintKind, RuleEngine};
use crate::core::{DesignSettings, Item, ItemKind, LayerId, NetCode, ViaType};
use serde::{Deserialize, Serialize};

/// Bedingung einer Regel. Nicht gesetzte Felder passen immer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleCondition {
    pub nets: Option<Vec<NetCode>>,
    pub via_type: Option<ViaType>,
    pub layer: Option<LayerId>,
}

impl RuleCondition {
    fn matches(&self, candidate: &Item, layer: LayerId) -> bool {
        if let Some(nets) = &self.nets {
            if !nets.contains(&candidate.net) {
                return false;
            }
        }
        if let Some(wanted) = self.via_type {
            match candidate.kind {
                ItemKind::Via { via_type, .. } if via_type == wanted => {}
                _ => return false,
            }
        }
        self.layer.is_none_or(|l| l == layer)
    }
}

/// Eine Constraint-Regel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub kind: ConstraintKind,
    pub value: u32,
    #[serde(default)]
    pub condition: RuleCondition,
}

/// Geordnete Regelliste.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Erstellt eine leere Regelliste (liefert nie ein Constraint).
    pub fn new() -> Self {
        Self::default()
    }

    /// Leitet Via-Regeln aus den Netzklassen ab; `extra` wird danach angehängt.
    ///
    /// Die Default-Klasse gilt ohne Netz-Bedingung und steht vorne, damit
    /// spezifischere Klassen sie überschreiben.
    pub fn from_design(design: &DesignSettings, extra: Vec<Rule>) -> Self {
        let mut rules = Vec::new();
        let mut classes: Vec<_> = design.net_classes.iter().collect();
        classes.sort_by_key(|(_, class)| !class.nets.is_empty());

        for (name, class) in classes {
            let nets = (!class.nets.is_empty()).then(|| class.nets.clone());
            rules.push(Rule {
                name: format!("netclass {name}: via diameter"),
                kind: ConstraintKind::ViaDiameter,
                value: class.via_diameter,
                condition: RuleCondition {
                    nets: nets.clone(),
                    ..RuleCondition::default()
                },
            });
            rules.push(Rule {
                name: format!("netclass {name}: hole size"),
                kind: ConstraintKind::HoleSize,
                value: class.via_drill,
                condition: RuleCondition {
                    nets,
                    ..RuleCondition::default()
                },
            });
        }
        rules.extend(extra);
        Self { rules }
    }

    /// Fügt eine Regel am Ende an (höchste Priorität).
    pub fn push(&mut self, rule: Rule) {
        self.rules.push(rule);
    }
}

impl RuleEngine for RuleSet {
    fn eval_constraint(
        &self,
        kind: ConstraintKind,
        candidate: &Item,
        layer: LayerId,
    ) -> Option<u32> {
        let hit = self
            .rules
            .iter()
            .rev()
            .find(|rule| rule.kind == kind && rule.condition.matches(candidate, layer))?;
        log::debug!("Constraint {:?} aus Regel '{}': {}", kind, hit.name, hit.value);
        Some(hit.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ItemDraft, LayerPair, NetClass};
    use glam::IVec2;

    fn via(net: NetCode, via_type: ViaType) -> Item {
        ItemDraft::via(
            IVec2::ZERO,
            0,
            0,
            via_type,
            LayerPair::new(LayerId(0), LayerId(1)),
            net,
        )
        .into_item(0)
    }

    #[test]
    fn empty_rule_set_has_no_constraints() {
        let rules = RuleSet::new();
        assert_eq!(
            rules.eval_constraint(ConstraintKind::ViaDiameter, &via(1, ViaType::Through), LayerId(0)),
            None
        );
    }

    #[test]
    fn last_matching_rule_wins() {
        let mut rules = RuleSet::new();
        rules.push(Rule {
            name: "alle".into(),
            kind: ConstraintKind::ViaDiameter,
            value: 500,
            condition: RuleCondition::default(),
        });
        rules.push(Rule {
            name: "microvia".into(),
            kind: ConstraintKind::ViaDiameter,
            value: 300,
            condition: RuleCondition {
                via_type: Some(ViaType::Microvia),
                ..RuleCondition::default()
            },
        });

        let layer = LayerId(0);
        assert_eq!(
            rules.eval_constraint(ConstraintKind::ViaDiameter, &via(1, ViaType::Microvia), layer),
            Some(300)
        );
        assert_eq!(
            rules.eval_constraint(ConstraintKind::ViaDiameter, &via(1, ViaType::Through), layer),
            Some(500)
        );
        assert_eq!(
            rules.eval_constraint(ConstraintKind::HoleSize, &via(1, ViaType::Through), layer),
            None
        );
    }

    #[test]
    fn net_class_rules_override_default_class() {
        let mut design = DesignSettings::default();
        design.net_classes.insert(
            "Power".into(),
            NetClass {
                via_diameter: 1_200_000,
                nets: vec![7],
                ..NetClass::default()
            },
        );
        let rules = RuleSet::from_design(&design, Vec::new());
        let layer = LayerId(0);

        assert_eq!(
            rules.eval_constraint(ConstraintKind::ViaDiameter, &via(7, ViaType::Through), layer),
            Some(1_200_000)
        );
        assert_eq!(
            rules.eval_constraint(ConstraintKind::ViaDiameter, &via(3, ViaType::Through), layer),
            Some(NetClass::default().via_diameter)
        );
    }
}
