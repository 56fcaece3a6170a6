//! Use-Case: Effektive Track-, Via- und Diff-Pair-Größen aus konkurrierenden Quellen.
//!
//! Quellen: Board-Minimum, Netzklasse (über die Regel-Engine), Custom-Wert.
//! Jede Dimension wird genau einer Quelle entnommen.

use crate::core::{
    Board, Item, ItemDraft, LayerId, LayerPair, NetCode, SizeSource, SizesSettings, ViaType,
};
use crate::engine::{ConstraintKind, RuleEngine};
use glam::IVec2;

/// Schlüssel für den Größen-Import: Start-Item oder explizites Netz.
#[derive(Debug, Clone, Copy)]
pub enum SizingKey<'a> {
    StartItem(&'a Item),
    Net(NetCode),
}

impl SizingKey<'_> {
    /// Netz des Schlüssels.
    pub fn net(&self) -> NetCode {
        match self {
            SizingKey::StartItem(item) => item.net,
            SizingKey::Net(net) => *net,
        }
    }
}

/// Importiert Track- und Diff-Pair-Größen in ein `SizesSettings`.
pub trait SizingImport {
    /// `custom` wählt die Custom-Werte statt der Netzklasse.
    fn import_sizes(
        &self,
        board: &Board,
        key: SizingKey<'_>,
        custom: bool,
        sizes: &mut SizesSettings,
    );
}

/// Standard-Import: Netzklasse oder Custom-Werte der Design-Einstellungen.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetclassImport;

impl SizingImport for NetclassImport {
    fn import_sizes(
        &self,
        board: &Board,
        key: SizingKey<'_>,
        custom: bool,
        sizes: &mut SizesSettings,
    ) {
        let design = &board.design;
        let class = design.net_class_for(key.net());

        if custom {
            sizes.track_width = design.custom_track_width;
            sizes.track_width_source = SizeSource::Custom;
            sizes.diff_pair_width = design.custom_diff_pair_width;
            sizes.diff_pair_gap = design.custom_diff_pair_gap;
            sizes.diff_pair_via_gap = design.custom_diff_pair_via_gap;
            sizes.diff_pair_source = SizeSource::Custom;
        } else {
            sizes.track_width = class.track_width;
            sizes.track_width_source = SizeSource::NetClass;
            sizes.diff_pair_width = class.diff_pair_width;
            sizes.diff_pair_gap = class.diff_pair_gap;
            sizes.diff_pair_via_gap = class.diff_pair_via_gap;
            sizes.diff_pair_source = SizeSource::NetClass;
        }
    }
}

/// Eingaben für eine Größen-Auflösung.
#[derive(Debug, Clone, Copy)]
pub struct SizingRequest<'a> {
    pub key: SizingKey<'a>,
    pub via_type: ViaType,
    /// Layer-Paar der Kandidaten-Via
    pub via_pair: LayerPair,
    /// Layer, auf dem die Constraints ausgewertet werden
    pub layer: LayerId,
    pub use_net_class_sizes: bool,
    pub custom_sizes_active: bool,
}

impl<'a> SizingRequest<'a> {
    /// Anfrage mit den Flags aus den Design-Einstellungen des Boards.
    pub fn for_board(
        board: &Board,
        key: SizingKey<'a>,
        via_type: ViaType,
        via_pair: LayerPair,
        layer: LayerId,
    ) -> Self {
        Self {
            key,
            via_type,
            via_pair,
            layer,
            use_net_class_sizes: board.design.use_net_class_via(),
            custom_sizes_active: board.design.use_custom_track_via_size,
        }
    }
}

/// Löst Via-Durchmesser und -Bohrung auf.
///
/// Startwert ist das Board-Minimum. Bei Netzklassen-Größen oder Microvias
/// wird eine Kandidaten-Via gegen die Regel-Engine geprüft; ohne Constraint
/// bleibt das Minimum. Sonst gelten die zuletzt gewählten Custom-Werte.
pub fn resolve_via_sizes(
    board: &Board,
    request: &SizingRequest<'_>,
    rules: &dyn RuleEngine,
    sizes: &mut SizesSettings,
) {
    let design = &board.design;
    let mut diameter = (design.min_via_diameter, SizeSource::BoardMinimum);
    let mut drill = (design.min_through_drill, SizeSource::BoardMinimum);

    if request.use_net_class_sizes || request.via_type == ViaType::Microvia {
        let candidate = ItemDraft::via(
            IVec2::ZERO,
            diameter.0,
            drill.0,
            request.via_type,
            request.via_pair,
            request.key.net(),
        )
        .into_item(0);

        let layer = request.layer;
        if let Some(value) = rules.eval_constraint(ConstraintKind::ViaDiameter, &candidate, layer) {
            diameter = (value, SizeSource::Rules);
        }
        if let Some(value) = rules.eval_constraint(ConstraintKind::HoleSize, &candidate, layer) {
            drill = (value, SizeSource::Rules);
        }
    } else {
        diameter = (design.current_via_size, SizeSource::Custom);
        drill = (design.current_via_drill, SizeSource::Custom);
    }

    sizes.set_via_sizes(diameter, drill);
    sizes.via_type = request.via_type;
}

/// Vollständige Auflösung: Via-Größen plus importierte Track-/Diff-Pair-Werte.
///
/// `seed` liefert die Ausgangswerte (z. B. gespeicherte Größen der letzten Route);
/// Layer-Paare werden nicht übernommen.
pub fn resolve(
    board: &Board,
    request: &SizingRequest<'_>,
    seed: &SizesSettings,
    rules: &dyn RuleEngine,
    import: &dyn SizingImport,
) -> SizesSettings {
    let mut sizes = seed.clone();
    sizes.clear_layer_pairs();

    resolve_via_sizes(board, request, rules, &mut sizes);
    import.import_sizes(board, request.key, request.custom_sizes_active, &mut sizes);

    log::debug!(
        "Größen aufgelöst: Track {} ({:?}), Via {}/{} ({:?}/{:?})",
        sizes.track_width,
        sizes.track_width_source,
        sizes.via_diameter,
        sizes.via_drill,
        sizes.via_diameter_source,
        sizes.via_drill_source
    );
    sizes
}
