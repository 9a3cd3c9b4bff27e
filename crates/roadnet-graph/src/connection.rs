//! Connection state machine.
//!
//! Links are not stored as objects. Their kind is read from which of the four
//! lists of a node pair contain the other node:
//!
//! | kind     | A.out has B | B.in has A | A.in has B | B.out has A |
//! |----------|-------------|------------|------------|-------------|
//! | standard | yes         | yes        | no         | no          |
//! | dual     | yes         | yes        | yes        | yes         |
//! | reverse  | yes         | no         | no         | no          |

use crate::node::{push_unique, remove_id};
use crate::road_map::RoadMap;
use roadnet_core::{ConnectionType, GraphError, NodeId};

/// Rendered kind of a directed `from -> to` link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Standard,
    SubPriority,
    Dual,
    DualSubPriority,
    Reverse,
}

/// Toggle the link `start -> end` of the requested type.
///
/// Creates the link when `start` has no outgoing reference to `end`,
/// otherwise removes it. Toggling a pair that had no links in either
/// direction twice with the same type restores the original lists.
pub fn toggle_connection(
    map: &mut RoadMap,
    start: NodeId,
    end: NodeId,
    kind: ConnectionType,
) -> Result<(), GraphError> {
    if start == end {
        return Ok(());
    }
    map.require(start)?;
    map.require(end)?;

    let exists = map.require(start)?.outgoing.contains(&end);
    if !exists {
        push_unique(&mut map.require_mut(start)?.outgoing, end);
        match kind {
            ConnectionType::Standard | ConnectionType::SubPriority => {
                push_unique(&mut map.require_mut(end)?.incoming, start);
            }
            ConnectionType::Reverse => {
                remove_id(&mut map.require_mut(start)?.incoming, end);
                let target = map.require_mut(end)?;
                remove_id(&mut target.incoming, start);
                remove_id(&mut target.outgoing, start);
            }
            ConnectionType::Dual => {
                let target = map.require_mut(end)?;
                push_unique(&mut target.incoming, start);
                push_unique(&mut target.outgoing, start);
                push_unique(&mut map.require_mut(start)?.incoming, end);
            }
        }
    } else {
        match kind {
            ConnectionType::Standard | ConnectionType::SubPriority => {
                remove_id(&mut map.require_mut(start)?.outgoing, end);
                remove_id(&mut map.require_mut(end)?.incoming, start);
            }
            ConnectionType::Reverse | ConnectionType::Dual => {
                let source = map.require_mut(start)?;
                remove_id(&mut source.outgoing, end);
                remove_id(&mut source.incoming, end);
                let target = map.require_mut(end)?;
                remove_id(&mut target.incoming, start);
                remove_id(&mut target.outgoing, start);
            }
        }
    }
    tracing::trace!("Toggled {kind:?} connection {start} -> {end}");
    Ok(())
}

/// Create links along a node sequence, each consecutive pair in order.
pub fn connect_path(
    map: &mut RoadMap,
    path: &[NodeId],
    kind: ConnectionType,
) -> Result<(), GraphError> {
    for &id in path {
        map.require(id)?;
    }
    for pair in path.windows(2) {
        if !map.require(pair[0])?.outgoing.contains(&pair[1]) {
            toggle_connection(map, pair[0], pair[1], kind)?;
        }
    }
    Ok(())
}

pub fn is_dual(map: &RoadMap, a: NodeId, b: NodeId) -> bool {
    match (map.node(a), map.node(b)) {
        (Some(a_node), Some(b_node)) => a_node.outgoing.contains(&b) && b_node.outgoing.contains(&a),
        _ => false,
    }
}

pub fn is_reverse(map: &RoadMap, a: NodeId, b: NodeId) -> bool {
    match (map.node(a), map.node(b)) {
        (Some(a_node), Some(b_node)) => {
            a_node.outgoing.contains(&b) && !b_node.incoming.contains(&a)
        }
        _ => false,
    }
}

/// Classify the directed link `from -> to`, or `None` when `from` has no
/// outgoing reference to `to`. Sub-priority is taken from `from`'s flag.
pub fn classify(map: &RoadMap, from: NodeId, to: NodeId) -> Option<EdgeKind> {
    let source = map.node(from)?;
    if !source.outgoing.contains(&to) {
        return None;
    }
    let sub = source.flag.is_sub_priority();
    let kind = if is_dual(map, from, to) {
        if sub {
            EdgeKind::DualSubPriority
        } else {
            EdgeKind::Dual
        }
    } else if is_reverse(map, from, to) {
        EdgeKind::Reverse
    } else if sub {
        EdgeKind::SubPriority
    } else {
        EdgeKind::Standard
    };
    Some(kind)
}

/// The four link lists of a node pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PairLinks {
    pub start_incoming: Vec<NodeId>,
    pub start_outgoing: Vec<NodeId>,
    pub end_incoming: Vec<NodeId>,
    pub end_outgoing: Vec<NodeId>,
}

impl PairLinks {
    pub fn capture(map: &RoadMap, start: NodeId, end: NodeId) -> Result<Self, GraphError> {
        let source = map.require(start)?;
        let target = map.require(end)?;
        Ok(Self {
            start_incoming: source.incoming.clone(),
            start_outgoing: source.outgoing.clone(),
            end_incoming: target.incoming.clone(),
            end_outgoing: target.outgoing.clone(),
        })
    }

    /// Overwrite the pair's lists with this snapshot.
    pub fn apply(&self, map: &mut RoadMap, start: NodeId, end: NodeId) -> Result<(), GraphError> {
        let len = map.len();
        for &id in self
            .start_incoming
            .iter()
            .chain(&self.start_outgoing)
            .chain(&self.end_incoming)
            .chain(&self.end_outgoing)
        {
            if id.0 == 0 || id.index() >= len {
                return Err(GraphError::IdOutOfRange { id, len });
            }
        }
        map.require(start)?;
        map.require(end)?;

        let source = map.require_mut(start)?;
        source.incoming = self.start_incoming.clone();
        source.outgoing = self.start_outgoing.clone();
        let target = map.require_mut(end)?;
        target.incoming = self.end_incoming.clone();
        target.outgoing = self.end_outgoing.clone();
        Ok(())
    }
}
