use crate::{EnumConversionError, NodeId};
use thiserror::Error;

/// Failures raised by graph operations. Every operation validates before it
/// mutates, so returning one of these leaves the graph untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Unknown node id {0}")]
    UnknownNode(NodeId),
    #[error("Node id {id} out of range for a graph of {len} nodes")]
    IdOutOfRange { id: NodeId, len: usize },
    #[error("Curve anchors must be two different nodes (got {0} twice)")]
    DegenerateCurve(NodeId),
    #[error("Interpolation point count {0} is outside the configured range")]
    InvalidInterpolationPoints(usize),
    #[error("Node {0} is in use by an active curve")]
    ProtectedNode(NodeId),
    #[error("Node {0} has no marker")]
    NoMarker(NodeId),
    #[error("Node {0} already has a marker")]
    DuplicateMarker(NodeId),
    #[error("Marker name must not be empty")]
    EmptyMarkerName,
    #[error("Invalid graph data: {0}")]
    InvalidGraphData(String),
    #[error("Invalid enum value: {0}")]
    EnumConversion(#[from] EnumConversionError),
}
