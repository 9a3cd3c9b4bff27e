//! Node arena and marker collection.
//!
//! Nodes live in a `Vec` whose order defines their ids (`1..=N`). Removal and
//! re-insertion renumber every stored reference in one staged pass: the new
//! node list is built next to the old one and swapped in only once it is
//! complete.

use crate::node::MapNode;
use roadnet_core::{GraphError, NodeFlag, NodeId, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Group assigned to markers created without one.
pub const DEFAULT_MARKER_GROUP: &str = "All";

/// Named destination attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapMarker {
    pub node: NodeId,
    pub name: String,
    pub group: String,
}

/// Which link list of a node holds a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LinkList {
    Incoming,
    Outgoing,
}

/// A reference held by a surviving node, pointing at a removed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkRef {
    pub holder: NodeId,
    pub list: LinkList,
    /// Position of the reference inside the holder's list.
    pub position: usize,
}

/// Everything needed to put one removed node back, in the id space of the
/// graph as it was before the removal.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedNode {
    pub node: MapNode,
    pub referenced_by: Vec<LinkRef>,
    /// The attached marker and its position in the marker collection.
    pub marker: Option<(usize, MapMarker)>,
}

/// Snapshot of one atomic batch removal, sorted by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovedNodes {
    pub nodes: Vec<RemovedNode>,
}

impl RemovedNodes {
    /// Snapshot for nodes that had no links or markers, as after creation.
    pub fn detached(nodes: impl IntoIterator<Item = MapNode>) -> Self {
        let mut nodes: Vec<RemovedNode> = nodes
            .into_iter()
            .map(|node| RemovedNode {
                node: node.detached(),
                referenced_by: Vec::new(),
                marker: None,
            })
            .collect();
        nodes.sort_by_key(|removed| removed.node.id);
        Self { nodes }
    }

    pub fn ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|removed| removed.node.id).collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id a node had before this removal maps to after it, or `None` for a
    /// removed node.
    pub fn renumbered(&self, id: NodeId) -> Option<NodeId> {
        let below = self
            .nodes
            .iter()
            .take_while(|removed| removed.node.id <= id)
            .count();
        match self.nodes.get(below.wrapping_sub(1)) {
            Some(removed) if removed.node.id == id => None,
            _ => Some(NodeId(id.0 - below as u32)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoadMap {
    nodes: Vec<MapNode>,
    markers: Vec<MapMarker>,
    structural_version: u64,
}

impl RoadMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[MapNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        if id.0 == 0 {
            return None;
        }
        self.nodes.get(id.index())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut MapNode> {
        if id.0 == 0 {
            return None;
        }
        self.nodes.get_mut(id.index())
    }

    pub fn require(&self, id: NodeId) -> Result<&MapNode, GraphError> {
        self.node(id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn require_mut(&mut self, id: NodeId) -> Result<&mut MapNode, GraphError> {
        self.node_mut(id).ok_or(GraphError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn markers(&self) -> &[MapMarker] {
        &self.markers
    }

    pub fn marker_of(&self, id: NodeId) -> Option<&MapMarker> {
        self.markers.iter().find(|marker| marker.node == id)
    }

    pub fn structural_version(&self) -> u64 {
        self.structural_version
    }

    pub(crate) fn bump_version(&mut self) {
        self.structural_version += 1;
    }

    /// Replace the whole content with `other`, keeping the version counter
    /// monotonic across loads.
    pub fn replace_with(&mut self, other: RoadMap) {
        let version = self.structural_version.max(other.structural_version) + 1;
        self.nodes = other.nodes;
        self.markers = other.markers;
        self.structural_version = version;
    }

    /// Append a node with the next dense id.
    pub fn add_node(&mut self, position: Vec3, flag: NodeFlag) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(MapNode::new(id, position, flag));
        id
    }

    pub fn remove_node(&mut self, id: NodeId) -> Result<RemovedNodes, GraphError> {
        self.remove_nodes(&[id])
    }

    /// Remove a batch of nodes as a single structural operation.
    ///
    /// Every surviving node is renumbered once, every reference to a removed
    /// node is stripped and markers of removed nodes are detached. The returned
    /// snapshot restores the exact prior state through [`Self::restore_nodes`].
    pub fn remove_nodes(&mut self, ids: &[NodeId]) -> Result<RemovedNodes, GraphError> {
        let len = self.nodes.len();
        let mut doomed = vec![false; len];
        for &id in ids {
            if id.0 == 0 || id.index() >= len {
                return Err(GraphError::UnknownNode(id));
            }
            doomed[id.index()] = true;
        }

        let is_doomed = |id: NodeId| doomed.get(id.index()).copied().unwrap_or(false);

        let mut removed: Vec<RemovedNode> = self
            .nodes
            .iter()
            .filter(|node| is_doomed(node.id))
            .map(|node| RemovedNode {
                node: node.clone(),
                referenced_by: Vec::new(),
                marker: None,
            })
            .collect();
        let slot_of: BTreeMap<NodeId, usize> = removed
            .iter()
            .enumerate()
            .map(|(slot, entry)| (entry.node.id, slot))
            .collect();

        for holder in self.nodes.iter().filter(|node| !is_doomed(node.id)) {
            for (list, ids) in [
                (LinkList::Incoming, &holder.incoming),
                (LinkList::Outgoing, &holder.outgoing),
            ] {
                for (position, target) in ids.iter().enumerate() {
                    if let Some(&slot) = slot_of.get(target) {
                        removed[slot].referenced_by.push(LinkRef {
                            holder: holder.id,
                            list,
                            position,
                        });
                    }
                }
            }
        }
        for (index, marker) in self.markers.iter().enumerate() {
            if let Some(&slot) = slot_of.get(&marker.node) {
                removed[slot].marker = Some((index, marker.clone()));
            }
        }

        // old index -> new id
        let mut remap: Vec<Option<NodeId>> = Vec::with_capacity(len);
        let mut next = 0usize;
        for &gone in &doomed {
            if gone {
                remap.push(None);
            } else {
                remap.push(Some(NodeId::from_index(next)));
                next += 1;
            }
        }
        let renumber = |id: NodeId| remap.get(id.index()).copied().flatten();

        let nodes: Vec<MapNode> = self
            .nodes
            .iter()
            .filter(|node| !is_doomed(node.id))
            .map(|node| {
                let mut node = node.clone();
                node.id = renumber(node.id).unwrap_or(node.id);
                node.remap_links(renumber);
                node
            })
            .collect();
        let markers: Vec<MapMarker> = self
            .markers
            .iter()
            .filter_map(|marker| {
                renumber(marker.node).map(|node| MapMarker {
                    node,
                    ..marker.clone()
                })
            })
            .collect();

        self.nodes = nodes;
        self.markers = markers;
        self.bump_version();

        tracing::debug!(
            "Removed {} node(s), {} remaining",
            removed.len(),
            self.nodes.len()
        );
        Ok(RemovedNodes { nodes: removed })
    }

    /// Put back nodes captured by [`Self::remove_nodes`].
    ///
    /// Each node gets its captured id; nodes currently holding those ids and
    /// everything above shift up. Captured references are re-inserted at their
    /// original positions. Fails without touching the graph when the captured
    /// ids no longer fit the current graph.
    pub fn restore_nodes(&mut self, removed: &RemovedNodes) -> Result<(), GraphError> {
        if removed.is_empty() {
            return Ok(());
        }
        let final_len = self.nodes.len() + removed.len();
        let out_of_range = |id: NodeId| GraphError::IdOutOfRange { id, len: final_len };

        let mut restored: BTreeMap<NodeId, &RemovedNode> = BTreeMap::new();
        for entry in &removed.nodes {
            let id = entry.node.id;
            if id.0 == 0 || id.index() >= final_len {
                return Err(out_of_range(id));
            }
            if restored.insert(id, entry).is_some() {
                return Err(GraphError::InvalidGraphData(format!(
                    "node {id} captured twice"
                )));
            }
        }
        for entry in &removed.nodes {
            let own = entry
                .node
                .incoming
                .iter()
                .chain(&entry.node.outgoing)
                .chain(&entry.node.warning_nodes);
            for &id in own {
                if id.0 == 0 || id.index() >= final_len {
                    return Err(out_of_range(id));
                }
            }
            for link in &entry.referenced_by {
                if link.holder.0 == 0
                    || link.holder.index() >= final_len
                    || restored.contains_key(&link.holder)
                {
                    return Err(out_of_range(link.holder));
                }
            }
        }

        // current id -> final id
        let mut shift: Vec<NodeId> = Vec::with_capacity(self.nodes.len());
        for slot in 0..final_len {
            let id = NodeId::from_index(slot);
            if !restored.contains_key(&id) {
                shift.push(id);
            }
        }
        let shifted = |id: NodeId| shift.get(id.index()).copied();

        let restored_markers: Vec<(usize, MapMarker)> = removed
            .nodes
            .iter()
            .filter_map(|entry| entry.marker.clone())
            .collect();
        let occupied: HashSet<NodeId> = self
            .markers
            .iter()
            .filter_map(|marker| shifted(marker.node))
            .collect();
        if let Some((_, marker)) = restored_markers
            .iter()
            .find(|(_, marker)| occupied.contains(&marker.node))
        {
            return Err(GraphError::DuplicateMarker(marker.node));
        }

        let mut current = self.nodes.iter();
        let mut nodes: Vec<MapNode> = Vec::with_capacity(final_len);
        for slot in 0..final_len {
            let id = NodeId::from_index(slot);
            let node = match restored.get(&id) {
                Some(entry) => {
                    let mut node = entry.node.clone();
                    node.id = id;
                    node
                }
                None => {
                    let Some(existing) = current.next() else {
                        return Err(out_of_range(id));
                    };
                    let mut node = existing.clone();
                    node.id = id;
                    node.remap_links(shifted);
                    node
                }
            };
            nodes.push(node);
        }

        let mut links: Vec<(LinkRef, NodeId)> = removed
            .nodes
            .iter()
            .flat_map(|entry| {
                entry
                    .referenced_by
                    .iter()
                    .map(move |link| (*link, entry.node.id))
            })
            .collect();
        links.sort_by_key(|(link, _)| (link.holder, link.list, link.position));
        for (link, target) in links {
            let holder = &mut nodes[link.holder.index()];
            let list = match link.list {
                LinkList::Incoming => &mut holder.incoming,
                LinkList::Outgoing => &mut holder.outgoing,
            };
            if !list.contains(&target) {
                list.insert(link.position.min(list.len()), target);
            }
        }

        let mut markers: Vec<MapMarker> = self
            .markers
            .iter()
            .filter_map(|marker| {
                shifted(marker.node).map(|node| MapMarker {
                    node,
                    ..marker.clone()
                })
            })
            .collect();
        let mut restored_markers = restored_markers;
        restored_markers.sort_by_key(|(index, _)| *index);
        for (index, marker) in restored_markers {
            markers.insert(index.min(markers.len()), marker);
        }

        self.nodes = nodes;
        self.markers = markers;
        self.bump_version();

        tracing::debug!(
            "Restored {} node(s), {} total",
            removed.len(),
            self.nodes.len()
        );
        Ok(())
    }

    pub fn add_marker(
        &mut self,
        id: NodeId,
        name: &str,
        group: &str,
    ) -> Result<MapMarker, GraphError> {
        self.require(id)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GraphError::EmptyMarkerName);
        }
        if self.marker_of(id).is_some() {
            return Err(GraphError::DuplicateMarker(id));
        }
        let group = match group.trim() {
            "" => DEFAULT_MARKER_GROUP,
            group => group,
        };
        let marker = MapMarker {
            node: id,
            name: name.to_string(),
            group: group.to_string(),
        };
        self.markers.push(marker.clone());
        Ok(marker)
    }

    /// Detach the marker of `id`, returning it with its former position.
    pub fn remove_marker(&mut self, id: NodeId) -> Result<(usize, MapMarker), GraphError> {
        let index = self
            .markers
            .iter()
            .position(|marker| marker.node == id)
            .ok_or(GraphError::NoMarker(id))?;
        Ok((index, self.markers.remove(index)))
    }

    /// Put a marker back at a given position in the collection.
    pub(crate) fn insert_marker(&mut self, index: usize, marker: MapMarker) -> Result<(), GraphError> {
        self.require(marker.node)?;
        if self.marker_of(marker.node).is_some() {
            return Err(GraphError::DuplicateMarker(marker.node));
        }
        let index = index.min(self.markers.len());
        self.markers.insert(index, marker);
        Ok(())
    }

    /// Rename and regroup the marker of `id`, returning the previous values.
    pub fn edit_marker(
        &mut self,
        id: NodeId,
        name: &str,
        group: &str,
    ) -> Result<MapMarker, GraphError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GraphError::EmptyMarkerName);
        }
        let marker = self
            .markers
            .iter_mut()
            .find(|marker| marker.node == id)
            .ok_or(GraphError::NoMarker(id))?;
        let previous = marker.clone();
        marker.name = name.to_string();
        marker.group = match group.trim() {
            "" => DEFAULT_MARKER_GROUP.to_string(),
            group => group.to_string(),
        };
        Ok(previous)
    }

    /// Check that ids are dense and every stored reference resolves.
    pub fn check_consistency(&self) -> Result<(), GraphError> {
        let len = self.nodes.len();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id != NodeId::from_index(index) {
                return Err(GraphError::InvalidGraphData(format!(
                    "node at slot {index} has id {}",
                    node.id
                )));
            }
            for list in [&node.incoming, &node.outgoing] {
                let mut seen = HashSet::new();
                for &id in list {
                    if id.0 == 0 || id.index() >= len {
                        return Err(GraphError::IdOutOfRange { id, len });
                    }
                    if !seen.insert(id) {
                        return Err(GraphError::InvalidGraphData(format!(
                            "node {} lists {id} twice",
                            node.id
                        )));
                    }
                }
            }
        }
        let mut marked = HashSet::new();
        for marker in &self.markers {
            if marker.node.0 == 0 || marker.node.index() >= len {
                return Err(GraphError::IdOutOfRange {
                    id: marker.node,
                    len,
                });
            }
            if !marked.insert(marker.node) {
                return Err(GraphError::DuplicateMarker(marker.node));
            }
        }
        Ok(())
    }
}
