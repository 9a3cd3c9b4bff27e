//! Synthetic fixtures shared by the benchmarks.

use roadnet_core::{ConnectionType, EditorConfig, NodeFlag, NodeId, Vec3};
use roadnet_events::EventBus;
use roadnet_graph::{EditorSession, GraphArrays, RoadMap, serialize_graph, toggle_connection};

/// Spacing between neighbouring grid nodes, in world units.
pub const GRID_SPACING: f64 = 8.0;

/// A `side x side` lattice centered on the origin. Rows link left to right
/// (every fourth row both ways) and the first column chains downward with
/// reverse links.
pub fn grid_map(side: usize) -> anyhow::Result<RoadMap> {
    let mut map = RoadMap::new();
    let offset = side as f64 * GRID_SPACING / 2.0;
    for row in 0..side {
        for col in 0..side {
            let flag = if row % 3 == 0 {
                NodeFlag::SubPriority
            } else {
                NodeFlag::Standard
            };
            map.add_node(
                Vec3::new(
                    col as f64 * GRID_SPACING - offset,
                    0.0,
                    row as f64 * GRID_SPACING - offset,
                ),
                flag,
            );
        }
    }
    for row in 0..side {
        let kind = if row % 4 == 0 {
            ConnectionType::Dual
        } else {
            ConnectionType::Standard
        };
        for col in 0..side.saturating_sub(1) {
            let from = NodeId::from_index(row * side + col);
            toggle_connection(&mut map, from, NodeId(from.0 + 1), kind)?;
        }
        if row + 1 < side {
            let from = NodeId::from_index(row * side);
            toggle_connection(&mut map, from, NodeId(from.0 + side as u32), ConnectionType::Reverse)?;
        }
    }
    Ok(map)
}

pub fn grid_arrays(side: usize) -> anyhow::Result<GraphArrays> {
    Ok(serialize_graph(&grid_map(side)?))
}

/// A session holding [`grid_map`], with the grid overlay switched on.
pub fn grid_session(side: usize) -> anyhow::Result<EditorSession> {
    let mut config = EditorConfig::default();
    config.grid.show = true;
    config.grid.spacing_x = GRID_SPACING;
    config.grid.spacing_z = GRID_SPACING;
    let mut session = EditorSession::new(config, EventBus::new());
    session.load_graph(&grid_arrays(side)?)?;
    Ok(session)
}
