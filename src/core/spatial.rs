//! Spatial-Index (KD-Tree) für schnelle Item-Abfragen beim Hover/Pick.

use glam::IVec2;
use indexmap::IndexMap;
use kiddo::{KdTree, SquaredEuclidean};

use crate::core::{Item, ItemId};

/// Ergebnis einer Distanzabfrage gegen den Spatial-Index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    /// ID des gefundenen Items
    pub item_id: ItemId,
    /// Euklidische Distanz des nächsten Ankerpunkts zum Suchpunkt
    pub distance: f64,
}

/// Read-only Spatial-Index über den Ankerpunkten aller Board-Items.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    tree: KdTree<f64, 2>,
    /// Ein Eintrag pro Ankerpunkt (Segmente haben zwei)
    anchor_owners: Vec<ItemId>,
}

impl SpatialIndex {
    /// Erstellt einen leeren Spatial-Index.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            anchor_owners: Vec::new(),
        }
    }

    /// Baut einen neuen Index aus den übergebenen Items.
    pub fn from_items(items: &IndexMap<ItemId, Item>) -> Self {
        let mut anchor_owners = Vec::new();
        let mut entries: Vec<[f64; 2]> = Vec::new();

        for item in items.values() {
            for anchor in item.anchors() {
                entries.push([f64::from(anchor.x), f64::from(anchor.y)]);
                anchor_owners.push(item.id);
            }
        }

        let tree: KdTree<f64, 2> = (&entries).into();
        Self {
            tree,
            anchor_owners,
        }
    }

    /// Gibt die Anzahl indexierter Ankerpunkte zurück.
    pub fn len(&self) -> usize {
        self.anchor_owners.len()
    }

    /// Gibt `true` zurück, wenn keine Items im Index liegen.
    pub fn is_empty(&self) -> bool {
        self.anchor_owners.is_empty()
    }

    /// Findet das Item mit dem nächsten Ankerpunkt.
    pub fn nearest(&self, query: IVec2) -> Option<SpatialMatch> {
        if self.is_empty() {
            return None;
        }

        let result = self
            .tree
            .nearest_one::<SquaredEuclidean>(&[f64::from(query.x), f64::from(query.y)]);
        let item_id = *self.anchor_owners.get(result.item as usize)?;

        Some(SpatialMatch {
            item_id,
            distance: result.distance.sqrt(),
        })
    }

    /// Findet alle Items mit einem Ankerpunkt innerhalb des Radius (je Item einmal, nach Distanz sortiert).
    pub fn within_radius(&self, query: IVec2, radius: f64) -> Vec<SpatialMatch> {
        if self.is_empty() || radius.is_sign_negative() {
            return Vec::new();
        }

        let mut results: Vec<SpatialMatch> = Vec::new();
        for entry in self
            .tree
            .within::<SquaredEuclidean>(&[f64::from(query.x), f64::from(query.y)], radius * radius)
        {
            let Some(&item_id) = self.anchor_owners.get(entry.item as usize) else {
                continue;
            };
            let distance = entry.distance.sqrt();
            match results.iter_mut().find(|m| m.item_id == item_id) {
                Some(existing) if existing.distance > distance => existing.distance = distance,
                Some(_) => {}
                None => results.push(SpatialMatch { item_id, distance }),
            }
        }

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results
    }
}
