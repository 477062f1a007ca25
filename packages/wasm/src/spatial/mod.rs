//! Spatial indexing for O(log n) hit testing.
//!
//! This module provides an R-tree based spatial index for efficient
//! nearest-neighbor and range queries over layout positions.

mod rtree;

pub use rtree::{NodePoint, SpatialIndex};
