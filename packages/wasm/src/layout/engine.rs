//! Layout - the force simulation over a graph.
//!
//! Simulation state is derived from the graph on demand: a [`Point`] is
//! created the first time a node is touched and a [`Spring`] the first time
//! an edge is. Both are cached by id for the lifetime of the layout. Nodes
//! and edges added through [`Layout::graph_mut`] after construction are
//! picked up the same way, at the latest on the next tick.

use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::point::{Point, Spring};
use super::{DEFAULT_MASS, DEFAULT_REST_LENGTH, DRAG_MASS, LayoutConfig, check_damping};
use crate::error::{Error, Result};
use crate::graph::{Edge, EdgeId, EdgeWeight, Graph, Node, NodeId, NodeWeight};
use crate::spatial::SpatialIndex;
use crate::vector::Vector2;

/// Result of [`Layout::nearest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// `None` only when the layout has no points.
    pub node: Option<NodeId>,
    /// Snapshot of the matched point.
    pub point: Option<Point>,
    /// `f64::INFINITY` when nothing matched.
    pub distance: f64,
}

impl Nearest {
    fn none() -> Self {
        Self {
            node: None,
            point: None,
            distance: f64::INFINITY,
        }
    }
}

/// Axis-aligned box in simulation coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top_left: Vector2,
    pub bottom_right: Vector2,
}

impl BoundingBox {
    pub fn size(&self) -> Vector2 {
        self.bottom_right - self.top_left
    }

    pub fn center(&self) -> Vector2 {
        (self.top_left + self.bottom_right) / 2.0
    }

    pub fn contains(&self, position: Vector2) -> bool {
        position.x >= self.top_left.x
            && position.y >= self.top_left.y
            && position.x <= self.bottom_right.x
            && position.y <= self.bottom_right.y
    }
}

/// Force-directed layout over an owned [`Graph`].
///
/// Call [`Layout::tick`] once per frame until [`Layout::is_settled`]. To drag
/// a node, either spike its point's mass and overwrite its position each
/// frame, or use [`Layout::begin_drag`] / [`Layout::drag_to`] /
/// [`Layout::end_drag`], which pin the point outright.
#[derive(Debug)]
pub struct Layout<N, E> {
    graph: Graph<N, E>,
    config: LayoutConfig,

    /// Point storage; slots are assigned in creation order
    points: Vec<Point>,

    /// Map from NodeId to its slot in `points`
    point_slots: HashMap<NodeId, usize>,

    springs: HashMap<EdgeId, Spring>,

    /// Initial placement
    rng: SmallRng,

    /// Whether the last tick ended below the energy threshold
    settled: bool,
}

impl<N: NodeWeight, E: EdgeWeight> Layout<N, E> {
    /// Wrap `graph` in a layout. Fails only on an invalid config.
    pub fn new(graph: Graph<N, E>, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            stiffness = config.stiffness,
            repulsion = config.repulsion,
            damping = config.damping,
            "created layout"
        );

        Ok(Self {
            rng: SmallRng::seed_from_u64(config.seed),
            graph,
            config,
            points: Vec::new(),
            point_slots: HashMap::new(),
            springs: HashMap::new(),
            settled: false,
        })
    }

    pub fn graph(&self) -> &Graph<N, E> {
        &self.graph
    }

    /// Mutable access to the topology. Additions are picked up lazily.
    pub fn graph_mut(&mut self) -> &mut Graph<N, E> {
        &mut self.graph
    }

    pub fn into_graph(self) -> Graph<N, E> {
        self.graph
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Change the damping factor. Zero freezes the simulation.
    pub fn set_damping(&mut self, damping: f64) -> Result<()> {
        check_damping(damping)?;
        self.config.damping = damping;
        Ok(())
    }

    // =========================================================================
    // Simulation State Access
    // =========================================================================

    /// The point for `id`, created on first access.
    pub fn point(&mut self, id: NodeId) -> Option<&Point> {
        self.point_slot(id).and_then(|slot| self.points.get(slot))
    }

    /// Mutable point for `id`, created on first access. Overwriting `mass`
    /// and `position` here is the low-level drag hook.
    pub fn point_mut(&mut self, id: NodeId) -> Option<&mut Point> {
        self.point_slot(id).and_then(|slot| self.points.get_mut(slot))
    }

    /// The point for `id` if it already exists.
    pub fn cached_point(&self, id: NodeId) -> Option<&Point> {
        self.point_slots
            .get(&id)
            .and_then(|&slot| self.points.get(slot))
    }

    /// The spring for `id`, created (with its endpoint points) on first access.
    pub fn spring(&mut self, id: EdgeId) -> Option<&Spring> {
        self.ensure_spring(id)?;
        self.springs.get(&id)
    }

    pub fn spring_mut(&mut self, id: EdgeId) -> Option<&mut Spring> {
        self.ensure_spring(id)?;
        self.springs.get_mut(&id)
    }

    /// Create simulation state for every node and edge that lacks it.
    pub fn sync(&mut self) {
        let missing_nodes: Vec<NodeId> = self
            .graph
            .nodes()
            .map(|node| node.id)
            .filter(|id| !self.point_slots.contains_key(id))
            .collect();
        for id in missing_nodes {
            self.point_slot(id);
        }

        let missing_edges: Vec<EdgeId> = self
            .graph
            .edges()
            .map(|edge| edge.id)
            .filter(|id| !self.springs.contains_key(id))
            .collect();
        for id in missing_edges {
            self.ensure_spring(id);
        }
    }

    fn point_slot(&mut self, id: NodeId) -> Option<usize> {
        if let Some(&slot) = self.point_slots.get(&id) {
            return Some(slot);
        }

        let mass = hint_or(self.graph.node(id)?.data.mass(), DEFAULT_MASS);
        let position = Vector2::random(&mut self.rng) * self.config.domain_size;

        let slot = self.points.len();
        self.points.push(Point::new(position, mass));
        self.point_slots.insert(id, slot);
        trace!(node = %id, x = position.x, y = position.y, mass, "created point");
        Some(slot)
    }

    fn ensure_spring(&mut self, id: EdgeId) -> Option<()> {
        if self.springs.contains_key(&id) {
            return Some(());
        }

        let rest_length = hint_or(self.graph.edge(id)?.data.length(), DEFAULT_REST_LENGTH);
        self.point_slot(id.source)?;
        self.point_slot(id.target)?;

        let spring = Spring::new(id.source, id.target, rest_length, self.config.stiffness);
        self.springs.insert(id, spring);
        trace!(edge = %id, rest_length, "created spring");
        Some(())
    }

    /// Point slots in graph node order.
    fn ordered_slots(&self) -> Vec<usize> {
        self.graph
            .nodes()
            .filter_map(|node| self.point_slots.get(&node.id).copied())
            .collect()
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation by `dt`, which must be positive.
    ///
    /// Forces are accumulated first (repulsion, springs, centering) and
    /// integrated afterwards, so the order of nodes does not affect the step.
    pub fn tick(&mut self, dt: f64) {
        self.sync();
        let order = self.ordered_slots();

        self.apply_repulsion(&order);
        self.apply_springs();
        self.apply_centering(&order);
        self.integrate(&order, dt);

        let energy = self.total_energy();
        trace!(dt, energy, "tick");

        let settled = energy < self.config.energy_threshold;
        if settled && !self.settled {
            debug!(energy, "layout settled");
        }
        self.settled = settled;
    }

    /// [`Layout::tick`] with the step validated first.
    pub fn try_tick(&mut self, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(Error::InvalidStep(dt));
        }
        self.tick(dt);
        Ok(())
    }

    /// Coulomb repulsion over every unordered pair of points.
    fn apply_repulsion(&mut self, order: &[usize]) {
        let repulsion = self.config.repulsion;
        let constants = self.config.forces;

        for (i, &a) in order.iter().enumerate() {
            for &b in &order[i + 1..] {
                let (p1, p2) = pair_mut(&mut self.points, a, b);
                let delta = p1.position - p2.position;
                let distance = delta.magnitude();

                // Coincident points have no direction to push along.
                if distance == 0.0 || !distance.is_finite() {
                    trace!(distance, "skipped degenerate repulsion pair");
                    continue;
                }

                let force = delta / distance * (repulsion / (distance * distance / 2.0));
                p1.apply_force(force, &constants);
                p2.apply_force(-force, &constants);
            }
        }
    }

    /// Hooke attraction along every edge.
    fn apply_springs(&mut self) {
        let constants = self.config.forces;

        for edge in self.graph.edges() {
            let Some(spring) = self.springs.get(&edge.id) else {
                continue;
            };
            let (Some(&a), Some(&b)) = (
                self.point_slots.get(&spring.source),
                self.point_slots.get(&spring.target),
            ) else {
                continue;
            };

            let (p1, p2) = pair_mut(&mut self.points, a, b);
            let force = spring.force(p1.position, p2.position);
            p1.apply_force(force, &constants);
            p2.apply_force(-force, &constants);
        }
    }

    fn apply_centering(&mut self, order: &[usize]) {
        let constants = self.config.forces;
        let pull = self.config.repulsion * constants.centering_factor;

        for &slot in order {
            let point = &mut self.points[slot];
            let force = -point.position * pull;
            point.apply_force(force, &constants);
        }
    }

    fn integrate(&mut self, order: &[usize], dt: f64) {
        let damping = self.config.damping;
        let max_speed = self.config.speed_limit();
        let activation_energy = self.config.forces.activation_energy;

        for &slot in order {
            self.points[slot].integrate(dt, damping, max_speed, activation_energy);
        }
    }

    /// Sum of kinetic energy over all points. Never negative.
    ///
    /// Points not created yet are at rest and contribute nothing.
    pub fn total_energy(&self) -> f64 {
        self.graph
            .nodes()
            .filter_map(|node| self.cached_point(node.id))
            .map(Point::energy)
            .sum()
    }

    /// Whether total energy is below the configured threshold.
    pub fn is_settled(&self) -> bool {
        self.total_energy() < self.config.energy_threshold
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Apply `f` to every node and its point, in graph node order.
    pub fn map_points<T>(&mut self, mut f: impl FnMut(&Node<N>, &Point) -> T) -> Vec<T> {
        self.sync();
        self.graph
            .nodes()
            .filter_map(|node| {
                let point = self.cached_point(node.id)?;
                Some(f(node, point))
            })
            .collect()
    }

    /// Apply `f` to every edge with its spring and endpoint points, in graph
    /// edge order.
    pub fn map_springs<T>(
        &mut self,
        mut f: impl FnMut(&Edge<E>, &Spring, &Point, &Point) -> T,
    ) -> Vec<T> {
        self.sync();
        self.graph
            .edges()
            .filter_map(|edge| {
                let spring = self.springs.get(&edge.id)?;
                let source = self.cached_point(spring.source)?;
                let target = self.cached_point(spring.target)?;
                Some(f(edge, spring, source, target))
            })
            .collect()
    }

    /// Current position of every node, in graph node order.
    pub fn positions(&mut self) -> Vec<(NodeId, Vector2)> {
        self.map_points(|node, point| (node.id, point.position))
    }

    /// The point closest to `position`. Ties go to the earlier node.
    pub fn nearest(&mut self, position: Vector2) -> Nearest {
        self.sync();

        let mut best = Nearest::none();
        for node in self.graph.nodes() {
            let Some(point) = self.cached_point(node.id) else {
                continue;
            };
            let distance = (point.position - position).magnitude();
            if distance < best.distance {
                best = Nearest {
                    node: Some(node.id),
                    point: Some(*point),
                    distance,
                };
            }
        }
        best
    }

    /// Box covering the default domain and every point, padded on all sides
    /// by `domain_padding` of its extent. Recomputed on every call.
    pub fn bounding_box(&mut self) -> BoundingBox {
        self.sync();

        let extent = Vector2::unit() * self.config.domain_size;
        let (top_left, bottom_right) = self
            .graph
            .nodes()
            .filter_map(|node| self.cached_point(node.id))
            .fold((-extent, extent), |(top_left, bottom_right), point| {
                (top_left.min(point.position), bottom_right.max(point.position))
            });

        let padding = (bottom_right - top_left) * self.config.domain_padding;
        BoundingBox {
            top_left: top_left - padding,
            bottom_right: bottom_right + padding,
        }
    }

    /// Perpendicular distance from `position` to the line through the
    /// endpoints of edge `id`. A zero-length spring measures to its endpoint.
    pub fn spring_distance_to(&mut self, id: EdgeId, position: Vector2) -> Result<f64> {
        let spring = *self.spring(id).ok_or(Error::UnknownEdge(id))?;
        let source = self.point(spring.source).ok_or(Error::UnknownNode(spring.source))?.position;
        let target = self.point(spring.target).ok_or(Error::UnknownNode(spring.target))?.position;

        let along = target - source;
        if along.magnitude() == 0.0 {
            return Ok((position - source).magnitude());
        }
        Ok((position - source).inner(along.normalize().normal()).abs())
    }

    /// R-tree snapshot of the current positions.
    pub fn spatial_index(&mut self) -> SpatialIndex {
        SpatialIndex::from_points(self.positions())
    }

    // =========================================================================
    // Dragging
    // =========================================================================

    /// Pin `id` in place and give it drag mass.
    pub fn begin_drag(&mut self, id: NodeId) -> Result<()> {
        let point = self.point_mut(id).ok_or(Error::UnknownNode(id))?;
        point.pinned = true;
        point.mass = DRAG_MASS;
        point.velocity = Vector2::zero();
        point.acceleration = Vector2::zero();
        debug!(node = %id, "drag started");
        Ok(())
    }

    /// Move a node directly, bypassing the simulation.
    pub fn drag_to(&mut self, id: NodeId, position: Vector2) -> Result<()> {
        self.point_mut(id).ok_or(Error::UnknownNode(id))?.position = position;
        Ok(())
    }

    /// Release a dragged node back into the simulation with its resting mass.
    pub fn end_drag(&mut self, id: NodeId) -> Result<()> {
        let mass = self.resting_mass(id)?;
        let point = self.point_mut(id).ok_or(Error::UnknownNode(id))?;
        point.pinned = false;
        point.mass = mass;
        debug!(node = %id, "drag ended");
        Ok(())
    }

    pub fn set_pinned(&mut self, id: NodeId, pinned: bool) -> Result<()> {
        self.point_mut(id).ok_or(Error::UnknownNode(id))?.pinned = pinned;
        Ok(())
    }

    fn resting_mass(&self, id: NodeId) -> Result<f64> {
        self.graph
            .node(id)
            .map(|node| hint_or(node.data.mass(), DEFAULT_MASS))
            .ok_or(Error::UnknownNode(id))
    }
}

/// Positive finite hint, or the fallback.
fn hint_or(hint: Option<f64>, fallback: f64) -> f64 {
    hint.filter(|value| value.is_finite() && *value > 0.0)
        .unwrap_or(fallback)
}

/// Two distinct elements of `points`, mutably.
fn pair_mut(points: &mut [Point], a: usize, b: usize) -> (&mut Point, &mut Point) {
    debug_assert_ne!(a, b);
    if a < b {
        let (head, tail) = points.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = points.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}
