//! Graph - the layout's topology input.
//!
//! Stores nodes and edges in petgraph's undirected `StableGraph` and keeps
//! id→index maps so callers only ever handle stable `NodeId`/`EdgeId`
//! values. The graph knows nothing about any layout built on top of it.

use std::collections::HashMap;

use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;

use super::edge::{Edge, EdgeId};
use super::node::{Node, NodeId};

/// Undirected simple graph with insertion-ordered nodes and edges.
///
/// Invariants:
/// - no self-loops and at most one edge per unordered node pair
/// - every edge endpoint is a node of this graph
/// - node ids are never reused, even across [`Graph::masked`] copies
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    /// Node weights carry their own ids so petgraph indices stay private.
    graph: StableGraph<Node<N>, Edge<E>, Undirected>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,
}

impl<N, E> Graph<N, E> {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node carrying `data`. Never fails.
    pub fn add_node(&mut self, data: N) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(Node { id, data });
        self.node_id_to_index.insert(id, index);
        id
    }

    /// Look up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node<N>> {
        self.node_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.node_weight(index))
    }

    /// Mutable access to a node's payload.
    pub fn node_data_mut(&mut self, id: NodeId) -> Option<&mut N> {
        let index = *self.node_id_to_index.get(&id)?;
        self.graph.node_weight_mut(index).map(|node| &mut node.data)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> + '_ {
        self.graph
            .node_indices()
            .filter_map(move |index| self.graph.node_weight(index))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The id the next [`Graph::add_node`] call will assign.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.next_node_id)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Connect `a` and `b`.
    ///
    /// Returns `None` without touching the graph when `a == b`, when the two
    /// nodes are already adjacent, or when either id is not in this graph.
    pub fn connect(&mut self, a: NodeId, b: NodeId, data: E) -> Option<EdgeId> {
        if a == b {
            return None;
        }
        let source_index = *self.node_id_to_index.get(&a)?;
        let target_index = *self.node_id_to_index.get(&b)?;
        if self.graph.find_edge(source_index, target_index).is_some() {
            return None;
        }

        let id = EdgeId::new(a, b);
        let index = self
            .graph
            .add_edge(source_index, target_index, Edge { id, data });
        self.edge_id_to_index.insert(id, index);
        Some(id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.edge_id_to_index
            .get(&id)
            .and_then(|&index| self.graph.edge_weight(index))
    }

    /// The edge joining `a` and `b`, in either direction.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge<E>> {
        let source_index = *self.node_id_to_index.get(&a)?;
        let target_index = *self.node_id_to_index.get(&b)?;
        self.graph
            .find_edge(source_index, target_index)
            .and_then(|index| self.graph.edge_weight(index))
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<E>> + '_ {
        self.graph
            .edge_indices()
            .filter_map(move |index| self.graph.edge_weight(index))
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Ids of the nodes adjacent to `id`, in the order the edges were added.
    pub fn neighbor_ids(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };

        let mut incident: Vec<_> = self.graph.edges(index).collect();
        incident.sort_by_key(|edge| edge.id());
        incident
            .into_iter()
            .filter_map(|edge| edge.weight().other(id))
            .collect()
    }

    /// Nodes adjacent to `id`.
    pub fn neighbors(&self, id: NodeId) -> Vec<&Node<N>> {
        self.neighbor_ids(id)
            .into_iter()
            .filter_map(|neighbor| self.node(neighbor))
            .collect()
    }

    // =========================================================================
    // Derived Graphs
    // =========================================================================

    /// Induced subgraph of the nodes passing `keep_node`, restricted to the
    /// edges whose endpoints both survive and which pass `keep_edge`.
    ///
    /// The id counter carries over, so nodes added to the result never
    /// collide with ids of this graph.
    pub fn masked<P, Q>(&self, mut keep_node: P, mut keep_edge: Q) -> Self
    where
        N: Clone,
        E: Clone,
        P: FnMut(&Node<N>) -> bool,
        Q: FnMut(&Edge<E>) -> bool,
    {
        let graph = self.graph.filter_map(
            |_, node| keep_node(node).then(|| node.clone()),
            |_, edge| keep_edge(edge).then(|| edge.clone()),
        );

        let node_id_to_index = graph
            .node_indices()
            .filter_map(|index| graph.node_weight(index).map(|node| (node.id, index)))
            .collect();
        let edge_id_to_index = graph
            .edge_indices()
            .filter_map(|index| graph.edge_weight(index).map(|edge| (edge.id, index)))
            .collect();

        Self {
            graph,
            node_id_to_index,
            edge_id_to_index,
            next_node_id: self.next_node_id,
        }
    }

    /// Subgraph induced by `keep_node`, keeping every surviving edge.
    pub fn induced<P>(&self, keep_node: P) -> Self
    where
        N: Clone,
        E: Clone,
        P: FnMut(&Node<N>) -> bool,
    {
        self.masked(keep_node, |_| true)
    }
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}
