//! Node type and related structures.
//!
//! Nodes are the vertices in the graph. Each node has:
//! - A stable unique identifier, drawn from a per-graph counter and never reused
//! - An opaque application payload that the layout only inspects for a mass hint

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Assigned in strictly increasing order by [`Graph::add_node`](super::Graph::add_node).
/// It wraps a u32 for efficient storage and WebAssembly interop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// A graph vertex: its id plus the caller's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<N> {
    pub id: NodeId,
    pub data: N,
}

/// Hints a node payload can offer to the layout.
///
/// Everything else in the payload is passed through untouched.
pub trait NodeWeight {
    /// Initial simulation mass. Missing, zero, negative or non-finite hints
    /// fall back to a mass of 1.0.
    fn mass(&self) -> Option<f64> {
        None
    }
}

impl NodeWeight for () {}

impl NodeWeight for f64 {
    fn mass(&self) -> Option<f64> {
        Some(*self)
    }
}

/// Stock node payload used by the JS surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeAttrs {
    /// Human-readable label for display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// CSS color string for the renderer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
}

impl NodeAttrs {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

impl NodeWeight for NodeAttrs {
    fn mass(&self) -> Option<f64> {
        self.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.0, 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_node_id_ordering() {
        assert!(NodeId(1) < NodeId(2));
    }

    #[test]
    fn test_mass_hints() {
        assert_eq!(().mass(), None);
        assert_eq!(2.5_f64.mass(), Some(2.5));
        assert_eq!(NodeAttrs::labelled("a").mass(), None);

        let heavy = NodeAttrs {
            mass: Some(3.0),
            ..NodeAttrs::default()
        };
        assert_eq!(heavy.mass(), Some(3.0));
    }
}
