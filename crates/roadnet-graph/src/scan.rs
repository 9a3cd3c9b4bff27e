//! Overlap and elevation checks run over the whole graph.

use crate::road_map::RoadMap;
use roadnet_core::{NodeId, NodeWarning};
use std::collections::HashMap;

/// Recompute the warnings of every node.
///
/// Nodes closer than `tolerance` on the x/z plane warn each other and keep
/// each other's ids; nodes below zero elevation get
/// [`NodeWarning::NegativeElevation`]. Returns the number of warned nodes.
pub fn scan_overlaps(map: &mut RoadMap, tolerance: f64) -> usize {
    let ids: Vec<NodeId> = map.nodes().iter().map(|node| node.id()).collect();
    for &id in &ids {
        if let Some(node) = map.node_mut(id) {
            node.clear_warning();
        }
    }
    scan_nodes(map, &ids, tolerance);

    let warned = map.nodes().iter().filter(|node| node.has_warning()).count();
    tracing::debug!("Overlap scan: {warned} node(s) flagged");
    warned
}

/// Recheck only `targets` against the whole graph.
///
/// Former overlap partners drop their backrefs to the targets; a partner left
/// with no overlaps falls back to its elevation warning, if any. Other
/// warnings are untouched.
pub fn rescan_nodes(map: &mut RoadMap, targets: &[NodeId], tolerance: f64) {
    let mut partners: Vec<(NodeId, NodeId)> = Vec::new();
    for &id in targets {
        if let Some(node) = map.node_mut(id) {
            partners.extend(node.warning_nodes.iter().map(|&other| (other, id)));
            node.clear_warning();
        }
    }
    for (partner, target) in partners {
        if targets.contains(&partner) {
            continue;
        }
        let Some(node) = map.node_mut(partner) else {
            continue;
        };
        node.warning_nodes.retain(|&other| other != target);
        if node.warning_nodes.is_empty() && node.warning == Some(NodeWarning::Overlap) {
            node.warning = (node.position().y < 0.0).then_some(NodeWarning::NegativeElevation);
        }
    }
    scan_nodes(map, targets, tolerance);
}

fn scan_nodes(map: &mut RoadMap, targets: &[NodeId], tolerance: f64) {
    let cell = tolerance.max(f64::EPSILON);
    let key = |x: f64, z: f64| ((x / cell).floor() as i64, (z / cell).floor() as i64);

    let mut buckets: HashMap<(i64, i64), Vec<(NodeId, f64, f64)>> = HashMap::new();
    for node in map.nodes() {
        let p = node.position();
        buckets.entry(key(p.x, p.z)).or_default().push((node.id(), p.x, p.z));
    }

    let mut pairs: Vec<(NodeId, NodeId)> = Vec::new();
    let mut negative: Vec<NodeId> = Vec::new();
    for &id in targets {
        let Some(node) = map.node(id) else {
            continue;
        };
        let p = node.position();
        if p.y < 0.0 {
            negative.push(id);
        }
        let (cx, cz) = key(p.x, p.z);
        for dx in -1..=1 {
            for dz in -1..=1 {
                let Some(bucket) = buckets.get(&(cx + dx, cz + dz)) else {
                    continue;
                };
                for &(other, x, z) in bucket {
                    if other == id {
                        continue;
                    }
                    let distance = ((p.x - x).powi(2) + (p.z - z).powi(2)).sqrt();
                    if distance <= tolerance {
                        pairs.push((id, other));
                    }
                }
            }
        }
    }

    for id in negative {
        if let Some(node) = map.node_mut(id) {
            if node.warning.is_none() {
                node.warning = Some(NodeWarning::NegativeElevation);
            }
        }
    }
    for (a, b) in pairs {
        for (holder, other) in [(a, b), (b, a)] {
            if let Some(node) = map.node_mut(holder) {
                node.warning = Some(NodeWarning::Overlap);
                if !node.warning_nodes.contains(&other) {
                    node.warning_nodes.push(other);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadnet_core::{NodeFlag, Vec3};

    #[test]
    fn test_overlapping_nodes_warn_each_other() {
        let mut map = RoadMap::new();
        map.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard);
        map.add_node(Vec3::new(0.05, 3.0, 0.0), NodeFlag::Standard);
        map.add_node(Vec3::new(5.0, 0.0, 0.0), NodeFlag::Standard);
        map.add_node(Vec3::new(9.0, -1.0, 0.0), NodeFlag::Standard);

        assert_eq!(scan_overlaps(&mut map, 0.1), 3);
        let first = map.node(NodeId(1)).unwrap();
        assert_eq!(first.warning(), Some(NodeWarning::Overlap));
        assert_eq!(first.warning_nodes(), &[NodeId(2)]);
        assert_eq!(map.node(NodeId(2)).unwrap().warning_nodes(), &[NodeId(1)]);
        assert!(!map.node(NodeId(3)).unwrap().has_warning());
        assert_eq!(
            map.node(NodeId(4)).unwrap().warning(),
            Some(NodeWarning::NegativeElevation)
        );
    }

    #[test]
    fn test_rescan_of_moved_node_releases_partner() {
        let mut map = RoadMap::new();
        map.add_node(Vec3::new(0.0, -2.0, 0.0), NodeFlag::Standard);
        map.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard);
        map.add_node(Vec3::new(0.05, 0.0, 0.0), NodeFlag::Standard);
        scan_overlaps(&mut map, 0.1);
        assert_eq!(map.node(NodeId(1)).unwrap().warning_nodes(), &[NodeId(2), NodeId(3)]);

        map.node_mut(NodeId(3))
            .unwrap()
            .set_position(Vec3::new(6.0, 0.0, 0.0));
        rescan_nodes(&mut map, &[NodeId(3)], 0.1);
        assert!(!map.node(NodeId(3)).unwrap().has_warning());
        assert_eq!(map.node(NodeId(1)).unwrap().warning_nodes(), &[NodeId(2)]);
        assert_eq!(map.node(NodeId(2)).unwrap().warning_nodes(), &[NodeId(1)]);

        map.node_mut(NodeId(2))
            .unwrap()
            .set_position(Vec3::new(-6.0, 0.0, 0.0));
        rescan_nodes(&mut map, &[NodeId(2)], 0.1);
        let first = map.node(NodeId(1)).unwrap();
        assert!(first.warning_nodes().is_empty());
        assert_eq!(first.warning(), Some(NodeWarning::NegativeElevation));
        assert!(!map.node(NodeId(2)).unwrap().has_warning());
    }

    #[test]
    fn test_rescan_clears_resolved_overlap() {
        let mut map = RoadMap::new();
        map.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard);
        map.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard);
        scan_overlaps(&mut map, 0.1);

        map.node_mut(NodeId(2))
            .unwrap()
            .set_position(Vec3::new(3.0, 0.0, 0.0));
        rescan_nodes(&mut map, &[NodeId(1), NodeId(2)], 0.1);
        assert!(!map.node(NodeId(1)).unwrap().has_warning());
        assert!(!map.node(NodeId(2)).unwrap().has_warning());
    }
}
