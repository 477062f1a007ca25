//! Graph data structures and operations.
//!
//! This module provides the topology the layout consumes: an undirected
//! simple graph built on petgraph's StableGraph, addressed through stable
//! node and edge ids. Simulation state never lives here; layouts derive it.

mod edge;
mod node;
mod topology;

pub use edge::{Edge, EdgeAttrs, EdgeId, EdgeWeight};
pub use node::{Node, NodeAttrs, NodeId, NodeWeight};
pub use topology::Graph;
