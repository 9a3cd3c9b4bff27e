use roadnet_core::{NodeFlag, NodeId, NodeWarning, Vec3};

/// A waypoint in the road network.
///
/// Links are stored as id lists rather than references, so removal and
/// renumbering are plain array rewrites. The lists behave as ordered sets:
/// insertion order is kept for stable serialization and an id never appears
/// twice. They are only modified through [`crate::connection`] and the
/// [`crate::RoadMap`] structural operations.
#[derive(Debug, Clone, PartialEq)]
pub struct MapNode {
    pub(crate) id: NodeId,
    pub(crate) position: Vec3,
    pub flag: NodeFlag,
    pub(crate) incoming: Vec<NodeId>,
    pub(crate) outgoing: Vec<NodeId>,

    // Editor session state, never persisted.
    pub selected: bool,
    pub(crate) warning: Option<NodeWarning>,
    pub(crate) warning_nodes: Vec<NodeId>,
}

impl MapNode {
    pub(crate) fn new(id: NodeId, position: Vec3, flag: NodeFlag) -> Self {
        Self {
            id,
            position: position.rounded(),
            flag,
            incoming: Vec::new(),
            outgoing: Vec::new(),
            selected: false,
            warning: None,
            warning_nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Stores the position rounded to the fixed coordinate precision.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position.rounded();
    }

    pub fn incoming(&self) -> &[NodeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[NodeId] {
        &self.outgoing
    }

    pub fn has_warning(&self) -> bool {
        self.warning.is_some()
    }

    pub fn warning(&self) -> Option<NodeWarning> {
        self.warning
    }

    /// Nodes this node overlaps with, as found by the last scan.
    pub fn warning_nodes(&self) -> &[NodeId] {
        &self.warning_nodes
    }

    pub(crate) fn clear_warning(&mut self) {
        self.warning = None;
        self.warning_nodes.clear();
    }

    /// Copy with links and editor state stripped, as a freshly created node.
    pub(crate) fn detached(&self) -> Self {
        Self::new(self.id, self.position, self.flag)
    }

    /// Rewrite every stored reference through `remap`, dropping the ones it
    /// maps to `None`.
    pub(crate) fn remap_links(&mut self, remap: impl Fn(NodeId) -> Option<NodeId>) {
        self.incoming = self.incoming.iter().filter_map(|&id| remap(id)).collect();
        self.outgoing = self.outgoing.iter().filter_map(|&id| remap(id)).collect();
        self.warning_nodes = self
            .warning_nodes
            .iter()
            .filter_map(|&id| remap(id))
            .collect();
        if self.warning == Some(NodeWarning::Overlap) && self.warning_nodes.is_empty() {
            self.warning = None;
        }
    }
}

pub(crate) fn push_unique(list: &mut Vec<NodeId>, id: NodeId) {
    if !list.contains(&id) {
        list.push(id);
    }
}

pub(crate) fn remove_id(list: &mut Vec<NodeId>, id: NodeId) {
    list.retain(|&other| other != id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_rounds_position() {
        let node = MapNode::new(NodeId(1), Vec3::new(1.00049, 2.0, -0.12345), NodeFlag::Standard);
        assert_eq!(node.position(), Vec3::new(1.0, 2.0, -0.123));
        assert!(node.incoming().is_empty());
        assert!(node.outgoing().is_empty());
        assert!(!node.has_warning());
    }

    #[test]
    fn test_remap_links_drops_unmapped() {
        let mut node = MapNode::new(NodeId(2), Vec3::default(), NodeFlag::Standard);
        node.outgoing = vec![NodeId(1), NodeId(3), NodeId(4)];
        node.incoming = vec![NodeId(3)];
        node.warning = Some(NodeWarning::Overlap);
        node.warning_nodes = vec![NodeId(3)];

        node.remap_links(|id| match id.0 {
            3 => None,
            n if n > 3 => Some(NodeId(n - 1)),
            _ => Some(id),
        });

        assert_eq!(node.outgoing(), &[NodeId(1), NodeId(3)]);
        assert!(node.incoming().is_empty());
        assert!(!node.has_warning());
    }

    #[test]
    fn test_push_unique_keeps_order() {
        let mut list = vec![NodeId(3)];
        push_unique(&mut list, NodeId(1));
        push_unique(&mut list, NodeId(3));
        assert_eq!(list, vec![NodeId(3), NodeId(1)]);
        remove_id(&mut list, NodeId(3));
        assert_eq!(list, vec![NodeId(1)]);
    }
}
