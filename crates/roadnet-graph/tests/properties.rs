use proptest::prelude::*;
use roadnet_core::{ConnectionType, EditorConfig, NodeFlag, NodeId, Vec3};
use roadnet_events::EventBus;
use roadnet_graph::{
    Change, ChangeManager, CubicCurve, QuadCurve, RoadMap, serialize_graph, toggle_connection,
};

/// Random graph: node positions plus a list of standard links.
fn graph_strategy() -> impl Strategy<Value = RoadMap> {
    (2usize..12).prop_flat_map(|count| {
        let positions = prop::collection::vec((-100.0f64..100.0, 0.0f64..10.0, -100.0f64..100.0), count);
        let links = prop::collection::vec((1..=count as u32, 1..=count as u32), 0..count * 2);
        (positions, links).prop_map(|(positions, links)| {
            let mut map = RoadMap::new();
            for (x, y, z) in positions {
                map.add_node(Vec3::new(x, y, z), NodeFlag::Standard);
            }
            for (a, b) in links {
                let already = map
                    .node(NodeId(a))
                    .is_some_and(|node| node.outgoing().contains(&NodeId(b)));
                if !already {
                    let _ = toggle_connection(&mut map, NodeId(a), NodeId(b), ConnectionType::Standard);
                }
            }
            map
        })
    })
}

fn connection_type() -> impl Strategy<Value = ConnectionType> {
    prop_oneof![
        Just(ConnectionType::Standard),
        Just(ConnectionType::SubPriority),
        Just(ConnectionType::Dual),
        Just(ConnectionType::Reverse),
    ]
}

fn two_nodes() -> RoadMap {
    let mut map = RoadMap::new();
    map.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard);
    map.add_node(Vec3::new(25.0, 3.0, -40.0), NodeFlag::Standard);
    map
}

proptest! {
    /// Every interpolation count yields exactly n - 1 interior samples framed
    /// by the two anchors.
    #[test]
    fn prop_curve_sample_count(n in 2usize..200, cx in -50.0f64..50.0, cz in -50.0f64..50.0) {
        let map = two_nodes();
        let mut config = EditorConfig::default();
        config.curve.max_interpolation_points = 200;

        let mut quad = QuadCurve::with_points(&map, NodeId(1), NodeId(2), n, &config).unwrap();
        quad.update_control_point(0, cx, cz);
        prop_assert_eq!(quad.interior().len(), n - 1);
        prop_assert_eq!(quad.preview().len(), n + 1);
        prop_assert_eq!(quad.preview()[0].position, map.node(NodeId(1)).unwrap().position());
        prop_assert_eq!(quad.preview()[n].position, map.node(NodeId(2)).unwrap().position());

        let mut cubic = CubicCurve::with_points(&map, NodeId(2), NodeId(1), n, &config).unwrap();
        cubic.update_control_point(1, cx, cz);
        prop_assert_eq!(cubic.interior().len(), n - 1);
        prop_assert_eq!(cubic.preview()[n].anchor, Some(NodeId(1)));
    }

    /// Toggling a pair that has no links between its nodes twice with the
    /// same type restores every list exactly.
    #[test]
    fn prop_toggle_round_trip(
        map in graph_strategy(),
        a in 1u32..12,
        b in 1u32..12,
        kind in connection_type(),
    ) {
        let len = map.len() as u32;
        let (a, b) = (NodeId((a - 1) % len + 1), NodeId((b - 1) % len + 1));
        let mut map = map;
        // clear the pair first so the toggle starts from "no edge"
        for (x, y) in [(a, b), (b, a)] {
            if map.node(x).unwrap().outgoing().contains(&y) {
                toggle_connection(&mut map, x, y, ConnectionType::Dual).unwrap();
            }
        }
        let before = serialize_graph(&map);

        toggle_connection(&mut map, a, b, kind).unwrap();
        toggle_connection(&mut map, a, b, kind).unwrap();
        prop_assert_eq!(serialize_graph(&map), before);
    }

    /// Removing any subset leaves ids dense and every reference valid.
    #[test]
    fn prop_delete_keeps_ids_dense(map in graph_strategy(), picks in prop::collection::vec(1u32..12, 1..5)) {
        let len = map.len() as u32;
        let ids: Vec<NodeId> = picks.iter().map(|p| NodeId((p - 1) % len + 1)).collect();
        let mut distinct = ids.clone();
        distinct.sort();
        distinct.dedup();

        let mut map = map;
        let before = serialize_graph(&map);
        let removed = map.remove_nodes(&ids).unwrap();

        prop_assert_eq!(map.len(), (len as usize) - distinct.len());
        prop_assert!(map.check_consistency().is_ok());
        for gone in &distinct {
            prop_assert_eq!(removed.renumbered(*gone), None);
        }
        for (index, node) in map.nodes().iter().enumerate() {
            prop_assert_eq!(node.id(), NodeId::from_index(index));
            for id in node.incoming().iter().chain(node.outgoing()) {
                prop_assert!(id.0 >= 1 && id.0 as usize <= map.len());
            }
        }

        map.restore_nodes(&removed).unwrap();
        prop_assert_eq!(serialize_graph(&map), before);
    }

    /// Undoing a freshly recorded change restores the prior graph.
    #[test]
    fn prop_undo_restores_state(map in graph_strategy(), pick in 1u32..12, kind in connection_type(), op in 0u8..4) {
        let len = map.len() as u32;
        let id = NodeId((pick - 1) % len + 1);
        let other = NodeId(id.0 % len + 1);

        let mut map = map;
        let before = serialize_graph(&map);
        let mut history = ChangeManager::new(10, EventBus::new());
        history.record(Change::MarkerAdd { marker: map.add_marker(NodeId(1), "Seed", "").unwrap() }, &map);
        let seeded = serialize_graph(&map);

        let change = match op {
            0 => Change::DeleteNodes { removed: map.remove_nodes(&[id]).unwrap() },
            1 => roadnet_graph::changes::toggle_change(&mut map, id, other, kind).unwrap(),
            2 => {
                let new = map.add_node(Vec3::new(1.0, 2.0, 3.0), NodeFlag::SubPriority);
                Change::AddNode { node: map.node(new).unwrap().clone() }
            }
            _ => {
                let previous = vec![(id, map.node(id).unwrap().flag)];
                map.node_mut(id).unwrap().flag = NodeFlag::SubPriority;
                Change::PriorityToggle { previous }
            }
        };
        history.record(change, &map);

        history.undo(&mut map).unwrap();
        prop_assert_eq!(serialize_graph(&map), seeded);
        history.undo(&mut map).unwrap();
        prop_assert_eq!(serialize_graph(&map), before);
    }
}
