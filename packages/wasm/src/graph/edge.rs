//! Edge type and related structures.
//!
//! Edges are undirected connections between two distinct nodes. Each edge has:
//! - An identifier derived from its (source, target) endpoint pair
//! - An opaque payload, optionally carrying a rest-length hint for the layout

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Edge identifier.
///
/// Deterministic: the same ordered endpoint pair always yields the same id.
/// Since a graph holds at most one edge per unordered pair, it is unique
/// within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    pub source: NodeId,
    pub target: NodeId,
}

impl EdgeId {
    #[inline]
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({} - {})", self.source.0, self.target.0)
    }
}

/// A graph edge: id, endpoints and the caller's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<E> {
    pub id: EdgeId,
    pub data: E,
}

impl<E> Edge<E> {
    #[inline]
    pub fn source(&self) -> NodeId {
        self.id.source
    }

    #[inline]
    pub fn target(&self) -> NodeId {
        self.id.target
    }

    /// The endpoint opposite `node`, if `node` is one of the endpoints.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.id.source {
            Some(self.id.target)
        } else if node == self.id.target {
            Some(self.id.source)
        } else {
            None
        }
    }
}

/// Hints an edge payload can offer to the layout.
pub trait EdgeWeight {
    /// Spring rest length. Missing, zero, negative or non-finite hints fall
    /// back to 1.0.
    fn length(&self) -> Option<f64> {
        None
    }
}

impl EdgeWeight for () {}

impl EdgeWeight for f64 {
    fn length(&self) -> Option<f64> {
        Some(*self)
    }
}

/// Stock edge payload used by the JS surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Application weight; carried through, never read by the layout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl EdgeAttrs {
    pub fn with_length(length: f64) -> Self {
        Self {
            length: Some(length),
            ..Self::default()
        }
    }
}

impl EdgeWeight for EdgeAttrs {
    fn length(&self) -> Option<f64> {
        self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_id() {
        let id = EdgeId::new(NodeId(3), NodeId(7));
        assert_eq!(format!("{}", id), "Edge(3 - 7)");
        assert_eq!(id, EdgeId::new(NodeId(3), NodeId(7)));
        assert_ne!(id, EdgeId::new(NodeId(7), NodeId(3)));
    }

    #[test]
    fn test_other_endpoint() {
        let edge = Edge {
            id: EdgeId::new(NodeId(0), NodeId(1)),
            data: (),
        };
        assert_eq!(edge.other(NodeId(0)), Some(NodeId(1)));
        assert_eq!(edge.other(NodeId(1)), Some(NodeId(0)));
        assert_eq!(edge.other(NodeId(2)), None);
    }

    #[test]
    fn test_length_hints() {
        assert_eq!(().length(), None);
        assert_eq!(EdgeAttrs::with_length(50.0).length(), Some(50.0));
        assert_eq!(EdgeAttrs::default().length(), None);
    }
}
