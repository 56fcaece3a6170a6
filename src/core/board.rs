//! Das Board-Modell: Items, Footprints, Lagenaufbau und Design-Einstellungen.

use super::{
    DesignSettings, Footprint, Item, ItemDraft, ItemId, LayerId, SpatialIndex,
    SpatialMatch, Stackup,
};
use glam::IVec2;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Serialisierbare Form eines Boards (Fixture-/Replay-Dateien).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardFile {
    pub stackup: Stackup,
    /// Aktivierte Kupferlagen (None = alle)
    pub enabled_layers: Option<Vec<LayerId>>,
    pub design: DesignSettings,
    pub footprints: Vec<Footprint>,
    pub items: Vec<Item>,
}

/// Vollständiges Board mit persistentem Spatial-Index.
#[derive(Debug, Clone)]
pub struct Board {
    items: IndexMap<ItemId, Item>,
    footprints: IndexMap<u64, Footprint>,
    /// Lagenaufbau
    pub stackup: Stackup,
    enabled_layers: Vec<LayerId>,
    /// Design-Einstellungen (Netzklassen, Custom-Größen, Via-Freigaben)
    pub design: DesignSettings,
    spatial_index: SpatialIndex,
    next_id: ItemId,
}

impl Board {
    /// Erstellt ein leeres Board.
    pub fn new(stackup: Stackup, design: DesignSettings) -> Self {
        Self {
            items: IndexMap::new(),
            footprints: IndexMap::new(),
            stackup,
            enabled_layers: stackup.copper_layers().collect(),
            design,
            spatial_index: SpatialIndex::empty(),
            next_id: 1,
        }
    }

    /// Baut ein Board aus seiner Dateiform.
    pub fn from_file(file: BoardFile) -> Self {
        let mut board = Self::new(file.stackup, file.design);
        if let Some(layers) = file.enabled_layers {
            board.set_enabled_layers(layers);
        }
        for footprint in file.footprints {
            board.footprints.insert(footprint.id, footprint);
        }
        for item in file.items {
            board.next_id = board.next_id.max(item.id + 1);
            board.items.insert(item.id, item);
        }
        board.rebuild_spatial_index();
        board
    }

    /// Liest ein Board aus TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let file: BoardFile = toml::from_str(content)?;
        Ok(Self::from_file(file))
    }

    /// Gibt die Dateiform des Boards zurück.
    pub fn to_file(&self) -> BoardFile {
        BoardFile {
            stackup: self.stackup,
            enabled_layers: Some(self.enabled_layers.clone()),
            design: self.design.clone(),
            footprints: self.footprints.values().cloned().collect(),
            items: self.items.values().cloned().collect(),
        }
    }

    // ── Items ───────────────────────────────────────────────────────

    /// Gibt ein Item per ID zurück.
    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    /// Alle Items in Einfügereihenfolge.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// Gibt die Anzahl der Items zurück.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Nächste freie Item-ID.
    pub fn next_item_id(&self) -> ItemId {
        self.next_id
    }

    /// Fügt einen Entwurf als neues Item hinzu und gibt dessen ID zurück.
    pub fn add_item(&mut self, draft: ItemDraft) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(id, draft.into_item(id));
        self.rebuild_spatial_index();
        id
    }

    /// Ersetzt ein bestehendes Item (gleiche ID). `false`, wenn die ID unbekannt ist.
    pub fn replace_item(&mut self, item: Item) -> bool {
        let Some(slot) = self.items.get_mut(&item.id) else {
            return false;
        };
        *slot = item;
        self.rebuild_spatial_index();
        true
    }

    /// Entfernt ein Item.
    pub fn remove_item(&mut self, id: ItemId) -> Option<Item> {
        let removed = self.items.shift_remove(&id);
        if removed.is_some() {
            self.rebuild_spatial_index();
        }
        removed
    }

    /// Alle Pads eines Footprints.
    pub fn find_items_by_parent(&self, footprint_id: u64) -> Vec<&Item> {
        self.items
            .values()
            .filter(|item| item.parent == Some(footprint_id))
            .collect()
    }

    // ── Footprints ──────────────────────────────────────────────────

    /// Gibt einen Footprint per ID zurück.
    pub fn footprint(&self, id: u64) -> Option<&Footprint> {
        self.footprints.get(&id)
    }

    /// Fügt einen Footprint hinzu oder ersetzt ihn.
    pub fn add_footprint(&mut self, footprint: Footprint) {
        self.footprints.insert(footprint.id, footprint);
    }

    // ── Layer ───────────────────────────────────────────────────────

    /// Aktivierte Kupferlagen von oben nach unten.
    pub fn enabled_copper_layers(&self) -> &[LayerId] {
        &self.enabled_layers
    }

    /// Setzt die aktivierten Layer; Nicht-Kupfer und Lagen außerhalb des Stackups werden verworfen.
    pub fn set_enabled_layers(&mut self, layers: Vec<LayerId>) {
        let mut layers: Vec<LayerId> = layers
            .into_iter()
            .filter(|layer| self.stackup.contains(*layer))
            .collect();
        layers.sort();
        layers.dedup();
        self.enabled_layers = layers;
    }

    // ── Abfragen ────────────────────────────────────────────────────

    /// Items mit einem Ankerpunkt innerhalb des Radius.
    pub fn items_near(&self, point: IVec2, radius: f64) -> Vec<SpatialMatch> {
        self.spatial_index.within_radius(point, radius)
    }

    /// Findet das Item unter `point` (Hüllform plus Toleranz), optional auf einem Layer.
    ///
    /// Vias und Pads haben Vorrang vor Segmenten.
    pub fn item_at(&self, point: IVec2, layer: Option<LayerId>, tolerance: f64) -> Option<&Item> {
        let probe = super::geometry::Capsule::circle(point, 0.0);
        self.items
            .values()
            .filter(|item| layer.is_none_or(|l| item.layers.overlaps(l)))
            .filter_map(|item| {
                let gap = item.outline().gap(&probe);
                (gap <= tolerance).then_some((item, gap))
            })
            .min_by(|(a, gap_a), (b, gap_b)| {
                a.is_segment()
                    .cmp(&b.is_segment())
                    .then(gap_a.total_cmp(gap_b))
            })
            .map(|(item, _)| item)
    }

    /// Baut den Spatial-Index aus dem aktuellen Item-Bestand neu auf.
    pub fn rebuild_spatial_index(&mut self) {
        self.spatial_index = SpatialIndex::from_items(&self.items);
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Stackup::default(), DesignSettings::default())
    }
}
