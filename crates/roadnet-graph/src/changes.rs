//! Undoable edits.
//!
//! Each variant carries everything it needs to revert and re-apply itself, so
//! it never reads editor state beyond the graph it is applied to. Every
//! `undo`/`redo` validates before it mutates.

use crate::connection::{PairLinks, connect_path, toggle_connection};
use crate::node::MapNode;
use crate::road_map::{MapMarker, RemovedNodes, RoadMap};
use roadnet_core::{ConnectionType, GraphError, NodeFlag, NodeId, Vec3};

/// A per-node offset actually applied by a move, after snapping and rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeDelta {
    pub id: NodeId,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn get(self, position: Vec3) -> f64 {
        match self {
            Axis::X => position.x,
            Axis::Y => position.y,
            Axis::Z => position.z,
        }
    }

    pub fn with(self, position: Vec3, value: f64) -> Vec3 {
        match self {
            Axis::X => Vec3 { x: value, ..position },
            Axis::Y => Vec3 { y: value, ..position },
            Axis::Z => Vec3 { z: value, ..position },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    AddNode {
        node: MapNode,
    },
    DeleteNodes {
        removed: RemovedNodes,
    },
    MoveNodes {
        deltas: Vec<NodeDelta>,
        /// Deltas were resolved against the grid.
        snapped: bool,
    },
    Connection {
        start: NodeId,
        end: NodeId,
        kind: ConnectionType,
        before: PairLinks,
        after: PairLinks,
    },
    CurveCommit {
        nodes: Vec<MapNode>,
        start: NodeId,
        end: NodeId,
        path_type: ConnectionType,
    },
    MarkerAdd {
        marker: MapMarker,
    },
    MarkerRemove {
        index: usize,
        marker: MapMarker,
    },
    MarkerEdit {
        node: NodeId,
        old_name: String,
        old_group: String,
        new_name: String,
        new_group: String,
    },
    PriorityToggle {
        /// Flags before the toggle.
        previous: Vec<(NodeId, NodeFlag)>,
    },
    AxisAlign {
        axis: Axis,
        value: f64,
        previous: Vec<(NodeId, f64)>,
    },
}

impl Change {
    pub fn undo(&mut self, map: &mut RoadMap) -> Result<(), GraphError> {
        match self {
            Change::AddNode { node } => {
                map.require(node.id)?;
                map.remove_nodes(&[node.id])?;
            }
            Change::DeleteNodes { removed } => {
                map.restore_nodes(removed)?;
            }
            Change::MoveNodes { deltas, .. } => {
                apply_deltas(map, deltas, -1.0)?;
            }
            Change::Connection {
                start, end, before, ..
            } => {
                before.apply(map, *start, *end)?;
            }
            Change::CurveCommit { nodes, .. } => {
                let ids: Vec<NodeId> = nodes.iter().map(MapNode::id).collect();
                map.remove_nodes(&ids)?;
            }
            Change::MarkerAdd { marker } => {
                map.remove_marker(marker.node)?;
            }
            Change::MarkerRemove { index, marker } => {
                map.insert_marker(*index, marker.clone())?;
            }
            Change::MarkerEdit {
                node,
                old_name,
                old_group,
                ..
            } => {
                map.edit_marker(*node, old_name, old_group)?;
            }
            Change::PriorityToggle { previous } => {
                set_flags(map, previous.iter().copied())?;
            }
            Change::AxisAlign { axis, previous, .. } => {
                let axis = *axis;
                set_coordinates(map, axis, previous.iter().copied())?;
            }
        }
        Ok(())
    }

    pub fn redo(&mut self, map: &mut RoadMap) -> Result<(), GraphError> {
        match self {
            Change::AddNode { node } => {
                map.restore_nodes(&RemovedNodes::detached([node.clone()]))?;
            }
            Change::DeleteNodes { removed } => {
                *removed = map.remove_nodes(&removed.ids())?;
            }
            Change::MoveNodes { deltas, .. } => {
                apply_deltas(map, deltas, 1.0)?;
            }
            Change::Connection {
                start, end, after, ..
            } => {
                after.apply(map, *start, *end)?;
            }
            Change::CurveCommit {
                nodes,
                start,
                end,
                path_type,
            } => {
                map.require(*start)?;
                map.require(*end)?;
                map.restore_nodes(&RemovedNodes::detached(nodes.iter().cloned()))?;
                let mut path = Vec::with_capacity(nodes.len() + 2);
                path.push(*start);
                path.extend(nodes.iter().map(MapNode::id));
                path.push(*end);
                connect_path(map, &path, *path_type)?;
            }
            Change::MarkerAdd { marker } => {
                map.insert_marker(usize::MAX, marker.clone())?;
            }
            Change::MarkerRemove { marker, .. } => {
                map.remove_marker(marker.node)?;
            }
            Change::MarkerEdit {
                node,
                new_name,
                new_group,
                ..
            } => {
                map.edit_marker(*node, new_name, new_group)?;
            }
            Change::PriorityToggle { previous } => {
                set_flags(
                    map,
                    previous
                        .iter()
                        .map(|&(id, flag)| (id, flag.toggled_priority())),
                )?;
            }
            Change::AxisAlign {
                axis,
                value,
                previous,
            } => {
                let (axis, value) = (*axis, *value);
                set_coordinates(map, axis, previous.iter().map(|&(id, _)| (id, value)))?;
            }
        }
        Ok(())
    }

    /// Short label for history menus.
    pub fn description(&self) -> String {
        match self {
            Change::AddNode { node } => format!("Add node {}", node.id),
            Change::DeleteNodes { removed } => match removed.len() {
                1 => "Delete node".to_string(),
                n => format!("Delete {n} nodes"),
            },
            Change::MoveNodes { deltas, snapped } => {
                let what = if deltas.len() == 1 {
                    "node".to_string()
                } else {
                    format!("{} nodes", deltas.len())
                };
                if *snapped {
                    format!("Move {what} (snapped)")
                } else {
                    format!("Move {what}")
                }
            }
            Change::Connection {
                start, end, kind, ..
            } => format!("Toggle {kind:?} connection {start} -> {end}"),
            Change::CurveCommit { nodes, .. } => format!("Create curve ({} nodes)", nodes.len()),
            Change::MarkerAdd { marker } => format!("Add marker '{}'", marker.name),
            Change::MarkerRemove { marker, .. } => format!("Remove marker '{}'", marker.name),
            Change::MarkerEdit { new_name, .. } => format!("Edit marker '{new_name}'"),
            Change::PriorityToggle { previous } => {
                format!("Toggle priority of {} node(s)", previous.len())
            }
            Change::AxisAlign { axis, previous, .. } => {
                format!("Align {} node(s) on {axis:?}", previous.len())
            }
        }
    }
}

fn apply_deltas(map: &mut RoadMap, deltas: &[NodeDelta], sign: f64) -> Result<(), GraphError> {
    for delta in deltas {
        map.require(delta.id)?;
    }
    for delta in deltas {
        let node = map.require_mut(delta.id)?;
        let p = node.position();
        node.set_position(Vec3::new(
            p.x + sign * delta.dx,
            p.y + sign * delta.dy,
            p.z + sign * delta.dz,
        ));
    }
    Ok(())
}

fn set_flags(
    map: &mut RoadMap,
    flags: impl Iterator<Item = (NodeId, NodeFlag)> + Clone,
) -> Result<(), GraphError> {
    for (id, _) in flags.clone() {
        map.require(id)?;
    }
    for (id, flag) in flags {
        map.require_mut(id)?.flag = flag;
    }
    Ok(())
}

fn set_coordinates(
    map: &mut RoadMap,
    axis: Axis,
    values: impl Iterator<Item = (NodeId, f64)> + Clone,
) -> Result<(), GraphError> {
    for (id, _) in values.clone() {
        map.require(id)?;
    }
    for (id, value) in values {
        let node = map.require_mut(id)?;
        let position = axis.with(node.position(), value);
        node.set_position(position);
    }
    Ok(())
}

/// Build a connection change by toggling `start -> end` on `map`.
pub fn toggle_change(
    map: &mut RoadMap,
    start: NodeId,
    end: NodeId,
    kind: ConnectionType,
) -> Result<Change, GraphError> {
    let before = PairLinks::capture(map, start, end)?;
    toggle_connection(map, start, end, kind)?;
    let after = PairLinks::capture(map, start, end)?;
    Ok(Change::Connection {
        start,
        end,
        kind,
        before,
        after,
    })
}
