//! Spatial index over target positions.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use sw_core::{Position, TargetId};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
struct TargetEntry {
    point: [f64; 2],
    id:    TargetId,
}

impl RTreeObject for TargetEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for TargetEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── TargetIndex ───────────────────────────────────────────────────────────────

/// R-tree of target positions, kept in sync by [`World`][crate::World] on
/// every target move.
#[derive(Default)]
pub struct TargetIndex {
    tree: RTree<TargetEntry>,
}

impl TargetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TargetId, pos: Position) {
        self.tree.insert(TargetEntry { point: pos.to_array(), id });
    }

    /// Move `id` from `old` to `new`.
    pub fn relocate(&mut self, id: TargetId, old: Position, new: Position) {
        self.tree.remove(&TargetEntry { point: old.to_array(), id });
        self.insert(id, new);
    }

    /// Targets within `range` of `center` (inclusive), in ascending id.
    pub fn within(&self, center: Position, range: f64) -> Vec<TargetId> {
        let mut hits: Vec<TargetId> = self
            .tree
            .locate_within_distance(center.to_array(), range * range)
            .map(|e| e.id)
            .collect();
        hits.sort_unstable();
        hits
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
