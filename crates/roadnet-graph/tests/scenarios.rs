use roadnet_core::{ConnectionType, EditorConfig, NodeFlag, NodeId, Vec2, Vec3};
use roadnet_events::{Event, EventBus};
use roadnet_graph::{
    CubicCurve, EditorSession, FlatHeightMap, GraphArrays, HistoryError, RoadMap, serialize_graph,
};

fn session_with(positions: &[(f64, f64, f64)]) -> anyhow::Result<EditorSession> {
    let _ = tracing_subscriber::fmt::try_init();
    let mut session = EditorSession::new(EditorConfig::default(), EventBus::new());
    for &(x, y, z) in positions {
        session.add_node(Vec3::new(x, y, z), NodeFlag::Standard)?;
    }
    Ok(session)
}

fn links(map: &RoadMap, id: u32) -> (Vec<NodeId>, Vec<NodeId>) {
    let node = map.node(NodeId(id)).expect("node exists");
    (node.incoming().to_vec(), node.outgoing().to_vec())
}

#[test]
fn test_standard_toggle_twice_clears_both_lists() -> anyhow::Result<()> {
    let mut session = session_with(&[(0.0, 0.0, 0.0), (10.0, 0.0, 10.0)])?;

    session.toggle_connection(NodeId(1), NodeId(2), ConnectionType::Standard)?;
    assert_eq!(links(session.map(), 1).1, vec![NodeId(2)]);
    assert_eq!(links(session.map(), 2).0, vec![NodeId(1)]);

    session.toggle_connection(NodeId(1), NodeId(2), ConnectionType::Standard)?;
    assert_eq!(links(session.map(), 1), (vec![], vec![]));
    assert_eq!(links(session.map(), 2), (vec![], vec![]));
    Ok(())
}

#[test]
fn test_delete_middle_node_and_undo() -> anyhow::Result<()> {
    let mut session = session_with(&[(0.0, 0.0, 0.0), (5.0, 0.0, 0.0), (10.0, 0.0, 0.0)])?;
    session.toggle_connection(NodeId(1), NodeId(3), ConnectionType::Dual)?;
    session.toggle_connection(NodeId(2), NodeId(3), ConnectionType::Standard)?;
    session.add_marker(NodeId(3), "Silo", "Farm")?;
    let before = session.serialize_graph();

    assert_eq!(session.delete_nodes(&[NodeId(2)])?, 1);
    let map = session.map();
    assert_eq!(map.len(), 2);
    map.check_consistency()?;
    // old node 3 is now node 2
    assert_eq!(map.node(NodeId(2)).expect("node").position().x, 10.0);
    assert_eq!(links(map, 1), (vec![NodeId(2)], vec![NodeId(2)]));
    assert_eq!(links(map, 2), (vec![NodeId(1)], vec![NodeId(1)]));
    assert_eq!(map.marker_of(NodeId(2)).expect("marker").name, "Silo");

    session.undo()?;
    assert_eq!(session.serialize_graph(), before);
    assert_eq!(session.map().node(NodeId(3)).expect("node").position().x, 10.0);
    Ok(())
}

#[test]
fn test_cubic_curve_commit_and_single_undo() -> anyhow::Result<()> {
    let mut session = session_with(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)])?;
    let before = session.serialize_graph();

    session.start_cubic_curve(NodeId(1), NodeId(2))?;
    let curve: &mut CubicCurve = session.cubic_curve_mut().expect("curve started");
    curve.set_interpolation_points(4)?;
    assert!(curve.set_control_point(0, Vec2::new(0.0, 5.0)));
    assert!(curve.set_control_point(1, Vec2::new(10.0, 5.0)));
    assert_eq!(curve.interior().len(), 3);
    // the midpoint of this arch sits at (5, 3.75)
    assert_eq!(curve.interior()[1].position.x, 5.0);
    assert_eq!(curve.interior()[1].position.z, 3.75);

    assert_eq!(session.commit_curves(&FlatHeightMap(0.0))?, 3);
    let map = session.map();
    assert_eq!(map.len(), 5);
    let path = [NodeId(1), NodeId(3), NodeId(4), NodeId(5), NodeId(2)];
    for pair in path.windows(2) {
        assert_eq!(links(map, pair[0].0).1, vec![pair[1]]);
        assert_eq!(links(map, pair[1].0).0, vec![pair[0]]);
    }

    session.undo()?;
    assert_eq!(session.serialize_graph(), before);

    session.redo()?;
    assert_eq!(session.map().len(), 5);
    assert_eq!(links(session.map(), 1).1, vec![NodeId(3)]);
    Ok(())
}

#[test]
fn test_undo_after_reload_fails_without_mutation() -> anyhow::Result<()> {
    let mut session = session_with(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)])?;
    session.toggle_connection(NodeId(1), NodeId(2), ConnectionType::Reverse)?;

    let data: GraphArrays = session.serialize_graph();
    session.load_graph(&data)?;
    session.events().drain();

    let err = session.undo().expect_err("history predates the load");
    assert!(matches!(err, HistoryError::StaleVersion { .. }));
    assert_eq!(session.serialize_graph(), data);
    assert!(!session.history().can_undo());

    let events = session.events().drain();
    assert!(events.iter().any(|e| matches!(e, Event::HistoryError { .. })));
    Ok(())
}

#[test]
fn test_edits_after_reload_stay_undoable() -> anyhow::Result<()> {
    let mut session = session_with(&[(0.0, 0.0, 0.0), (10.0, 0.0, 0.0)])?;
    let data = session.serialize_graph();
    session.load_graph(&data)?;

    session.toggle_connection(NodeId(2), NodeId(1), ConnectionType::Standard)?;
    session.delete_nodes(&[NodeId(1)])?;
    session.undo()?;
    session.undo()?;
    assert_eq!(session.serialize_graph(), data);

    // the next entry predates the load
    assert!(session.undo().is_err());
    Ok(())
}

#[test]
fn test_graph_arrays_json_round_trip() -> anyhow::Result<()> {
    let mut session = session_with(&[(1.5, 0.25, -3.0), (4.0, 0.0, 4.0)])?;
    session.toggle_connection(NodeId(1), NodeId(2), ConnectionType::Dual)?;
    session.add_marker(NodeId(2), "Gate", "")?;

    let json = serde_json::to_string(&session.serialize_graph())?;
    let data: GraphArrays = serde_json::from_str(&json)?;
    let map = roadnet_graph::load_graph(&data)?;
    assert_eq!(serialize_graph(&map), session.serialize_graph());
    Ok(())
}
