use crate::graph::{EdgeId, NodeId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid layout config: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),
    #[error("unknown edge: {0}")]
    UnknownEdge(EdgeId),
    #[error("time step must be positive and finite, got {0}")]
    InvalidStep(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
