//! Road network graph engine: node arena, connection state machine, Bezier
//! curve engines, undo/redo history and the editor session tying them
//! together.

pub mod changes;
pub mod connection;
pub mod curves;
pub mod history;
pub mod interchange;
pub mod node;
pub mod road_map;
pub mod scan;
pub mod session;
pub mod snap;

pub use changes::{Axis, Change, NodeDelta};
pub use connection::{EdgeKind, PairLinks, classify, connect_path, is_dual, is_reverse, toggle_connection};
pub use curves::{
    Cubic, CubicCurve, Curve, CurveShape, FlatHeightMap, HeightMap, PreviewPoint, QuadCurve,
    Quadratic,
};
pub use history::{ChangeManager, HistoryError};
pub use interchange::{DelimitedGraph, GraphArrays, MarkerRecord, load_graph, serialize_graph};
pub use node::MapNode;
pub use road_map::{MapMarker, RemovedNode, RemovedNodes, RoadMap};
pub use scan::scan_overlaps;
pub use session::EditorSession;
