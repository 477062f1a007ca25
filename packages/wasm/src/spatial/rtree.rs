//! R-tree based spatial index using the rstar crate.
//!
//! Provides O(log n) spatial queries over a snapshot of point positions:
//! - Nearest neighbor (optionally bounded by a radius)
//! - Point-in-radius
//! - Rectangle intersection

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::graph::NodeId;
use crate::vector::Vector2;

/// A point in the spatial index with associated node ID.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    /// The node identifier.
    pub id: NodeId,
    /// Position at the time the index was built.
    pub position: Vector2,
}

impl NodePoint {
    /// Create a new NodePoint.
    pub fn new(id: NodeId, position: Vector2) -> Self {
        Self { id, position }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position.into())
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let delta = self.position - Vector2::new(point[0], point[1]);
        delta.inner(delta)
    }
}

/// Spatial index for node positions.
///
/// The index is a snapshot: it does not follow the simulation, so rebuild it
/// (or take a fresh one from the layout) after positions change.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk-load an index from `(id, position)` pairs.
    pub fn from_points(points: impl IntoIterator<Item = (NodeId, Vector2)>) -> Self {
        let mut index = Self::new();
        index.rebuild(points);
        index
    }

    /// Find the nearest node to a position.
    pub fn nearest(&self, position: Vector2) -> Option<NodeId> {
        self.tree
            .nearest_neighbor(&position.into())
            .map(|point| point.id)
    }

    /// Find the nearest node within a maximum distance.
    pub fn nearest_within(&self, position: Vector2, max_distance: f64) -> Option<NodeId> {
        let query: [f64; 2] = position.into();
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&query)
            .filter(|point| point.distance_2(&query) <= max_distance_sq)
            .map(|point| point.id)
    }

    /// Find all nodes inside the rectangle spanned by two corners.
    pub fn in_rect(&self, corner_a: Vector2, corner_b: Vector2) -> Vec<NodeId> {
        let envelope: AABB<[f64; 2]> = AABB::from_corners(corner_a.into(), corner_b.into());
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    /// Find all nodes within a radius of a position.
    pub fn in_radius(&self, position: Vector2, radius: f64) -> Vec<NodeId> {
        self.tree
            .locate_within_distance(position.into(), radius * radius)
            .map(|point| point.id)
            .collect()
    }

    /// Replace the contents of the index with a bulk load.
    pub fn rebuild(&mut self, points: impl IntoIterator<Item = (NodeId, Vector2)>) {
        let node_points: Vec<_> = points
            .into_iter()
            .map(|(id, position)| NodePoint::new(id, position))
            .collect();

        self.tree = RTree::bulk_load(node_points);
    }

    /// Get the number of nodes in the index.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
