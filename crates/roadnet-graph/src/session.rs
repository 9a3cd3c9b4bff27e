//! Editor session context.
//!
//! Owns the graph, the change history, the curve being drawn and the
//! selection/hover state. Every user-level edit goes through here so it is
//! validated, recorded as one change and announced on the event bus.

use crate::changes::{Axis, Change, NodeDelta, toggle_change};
use crate::curves::{CubicCurve, HeightMap, QuadCurve};
use crate::history::{ChangeManager, HistoryError};
use crate::interchange::{self, GraphArrays};
use crate::road_map::RoadMap;
use crate::scan::{rescan_nodes, scan_overlaps};
use crate::snap::{clamp_delta, snap_to_grid};
use roadnet_core::{ConnectionType, EditorConfig, GraphError, NodeFlag, NodeId, Vec2, Vec3};
use roadnet_events::{Event, EventBus};
use std::collections::BTreeSet;

pub struct EditorSession {
    map: RoadMap,
    history: ChangeManager,
    config: EditorConfig,
    events: EventBus,
    quad_curve: Option<QuadCurve>,
    cubic_curve: Option<CubicCurve>,
    hovered: Option<NodeId>,
    selection_rect: Option<(Vec2, Vec2)>,
    stale: bool,
}

impl EditorSession {
    pub fn new(config: EditorConfig, events: EventBus) -> Self {
        Self {
            map: RoadMap::new(),
            history: ChangeManager::new(config.history.max_entries, events.clone()),
            config,
            events,
            quad_curve: None,
            cubic_curve: None,
            hovered: None,
            selection_rect: None,
            stale: false,
        }
    }

    pub fn map(&self) -> &RoadMap {
        &self.map
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EditorConfig) {
        self.config = config;
        self.request_redraw();
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn history(&self) -> &ChangeManager {
        &self.history
    }

    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Mark the current graph as written out.
    pub fn mark_saved(&mut self) {
        self.set_stale(false);
    }

    fn set_stale(&mut self, stale: bool) {
        if self.stale != stale {
            self.stale = stale;
            self.events.publish(Event::StaleChanged { stale });
        }
    }

    pub fn request_redraw(&self) {
        self.events.publish(Event::RedrawRequested);
    }

    fn edited(&mut self) {
        self.set_stale(true);
        self.request_redraw();
    }

    fn record(&mut self, change: Change) {
        self.history.record(change, &self.map);
        self.edited();
    }

    // ------------------------------------------------------------------
    // Graph exchange
    // ------------------------------------------------------------------

    /// Replace the graph wholesale. History is kept, but every entry recorded
    /// before the load is refused from now on.
    pub fn load_graph(&mut self, data: &GraphArrays) -> Result<(), GraphError> {
        let loaded = match interchange::load_graph(data) {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::error!("Failed to load graph: {e}");
                self.events.publish(Event::ShowError {
                    message: format!("Could not load graph: {e}"),
                });
                return Err(e);
            }
        };
        self.cancel_curves();
        self.map.replace_with(loaded);
        self.hovered = None;
        self.selection_rect = None;
        scan_overlaps(&mut self.map, self.config.scan.overlap_tolerance);

        self.events.publish(Event::GraphLoaded {
            node_count: self.map.len(),
            marker_count: self.map.markers().len(),
        });
        self.events.publish(Event::ShowInfo {
            message: format!(
                "Loaded {} nodes and {} markers",
                self.map.len(),
                self.map.markers().len()
            ),
        });
        self.set_stale(false);
        self.request_redraw();
        Ok(())
    }

    pub fn serialize_graph(&self) -> GraphArrays {
        interchange::serialize_graph(&self.map)
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Place a node, snapped to the grid when snapping is on.
    pub fn add_node(&mut self, position: Vec3, flag: NodeFlag) -> Result<NodeId, GraphError> {
        let extent = self.config.view.world_extent();
        if position.x.abs() > extent || position.z.abs() > extent {
            return Err(GraphError::InvalidGraphData(format!(
                "position ({}, {}) is outside the map",
                position.x, position.z
            )));
        }
        let position = if self.config.grid.snap {
            let snapped = snap_to_grid(position.planar(), &self.config.grid);
            Vec3::new(snapped.x, position.y, snapped.y)
        } else {
            position
        };

        let id = self.map.add_node(position, flag);
        rescan_nodes(&mut self.map, &[id], self.config.scan.overlap_tolerance);
        let node = self.map.require(id)?.clone();
        self.record(Change::AddNode { node });
        self.events.publish(Event::NodeAdded { id });
        Ok(id)
    }

    /// Whether `id` may be deleted right now. Anchors of a curve in progress
    /// may not.
    pub fn can_delete(&self, id: NodeId) -> bool {
        let anchored = self.quad_curve.as_ref().is_some_and(|c| c.is_anchor(id))
            || self.cubic_curve.as_ref().is_some_and(|c| c.is_anchor(id));
        !anchored
    }

    /// Delete nodes as one batch. Protected nodes are skipped and logged.
    /// Returns how many nodes were removed.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> Result<usize, GraphError> {
        let requested: BTreeSet<NodeId> = ids.iter().copied().collect();
        for &id in &requested {
            self.map.require(id)?;
        }

        let mut doomed = Vec::with_capacity(requested.len());
        for id in requested {
            if self.can_delete(id) {
                doomed.push(id);
            } else {
                tracing::warn!("Node {id} is anchoring the active curve and cannot be deleted");
                self.events.publish(Event::ShowWarning {
                    message: format!("Node {id} anchors the active curve and was kept"),
                });
            }
        }
        if doomed.is_empty() {
            return Ok(0);
        }

        let partners: BTreeSet<NodeId> = doomed
            .iter()
            .filter_map(|&id| self.map.node(id))
            .flat_map(|node| node.warning_nodes().iter().copied())
            .collect();

        let removed = self.map.remove_nodes(&doomed)?;
        let count = removed.len();

        let renumber = |id: NodeId| removed.renumbered(id);
        if let Some(curve) = self.quad_curve.as_mut() {
            curve.renumber_anchors(renumber);
        }
        if let Some(curve) = self.cubic_curve.as_mut() {
            curve.renumber_anchors(renumber);
        }
        self.hovered = self.hovered.and_then(renumber);
        let partners: Vec<NodeId> = partners.into_iter().filter_map(renumber).collect();
        rescan_nodes(&mut self.map, &partners, self.config.scan.overlap_tolerance);

        tracing::info!("Deleted {count} node(s)");
        self.record(Change::DeleteNodes { removed });
        self.events.publish(Event::NodesDeleted { count });
        Ok(count)
    }

    /// Move nodes by a planar offset. With snapping on each node lands on the
    /// grid point nearest its target. Axes that would leave the map stay put.
    pub fn move_nodes(&mut self, ids: &[NodeId], dx: f64, dz: f64) -> Result<(), GraphError> {
        let ids: BTreeSet<NodeId> = ids.iter().copied().collect();
        for &id in &ids {
            self.map.require(id)?;
        }

        let snapped = self.config.grid.snap;
        let extent = self.config.view.world_extent();
        let mut deltas = Vec::with_capacity(ids.len());
        let mut partners: BTreeSet<NodeId> = BTreeSet::new();
        for &id in &ids {
            let node = self.map.require_mut(id)?;
            let old = node.position();
            let mut target = Vec2::new(old.x + dx, old.z + dz);
            if snapped {
                target = snap_to_grid(target, &self.config.grid);
            }
            let step_x = clamp_delta(old.x, target.x - old.x, extent);
            let step_z = clamp_delta(old.z, target.y - old.z, extent);

            node.set_position(Vec3::new(old.x + step_x, old.y, old.z + step_z));
            let new = node.position();
            if new != old {
                partners.extend(node.warning_nodes().iter().copied());
                deltas.push(NodeDelta {
                    id,
                    dx: new.x - old.x,
                    dy: 0.0,
                    dz: new.z - old.z,
                });
            }
        }
        if deltas.is_empty() {
            return Ok(());
        }

        partners.extend(deltas.iter().map(|delta| delta.id));
        let partners: Vec<NodeId> = partners.into_iter().collect();
        rescan_nodes(&mut self.map, &partners, self.config.scan.overlap_tolerance);
        self.refresh_curves();

        let count = deltas.len();
        self.record(Change::MoveNodes { deltas, snapped });
        self.events.publish(Event::NodesMoved { count });
        Ok(())
    }

    /// Flip nodes between standard and sub-priority.
    pub fn toggle_priority(&mut self, ids: &[NodeId]) -> Result<(), GraphError> {
        let ids: BTreeSet<NodeId> = ids.iter().copied().collect();
        let mut previous = Vec::with_capacity(ids.len());
        for &id in &ids {
            previous.push((id, self.map.require(id)?.flag));
        }
        if previous.is_empty() {
            return Ok(());
        }
        for &(id, flag) in &previous {
            self.map.require_mut(id)?.flag = flag.toggled_priority();
        }
        self.record(Change::PriorityToggle { previous });
        Ok(())
    }

    /// Put every node on the same coordinate along `axis`.
    pub fn align_nodes(&mut self, ids: &[NodeId], axis: Axis, value: f64) -> Result<(), GraphError> {
        let ids: BTreeSet<NodeId> = ids.iter().copied().collect();
        let mut previous = Vec::with_capacity(ids.len());
        for &id in &ids {
            previous.push((id, axis.get(self.map.require(id)?.position())));
        }
        if previous.is_empty() {
            return Ok(());
        }
        for &(id, _) in &previous {
            let node = self.map.require_mut(id)?;
            let position = axis.with(node.position(), value);
            node.set_position(position);
        }
        let value = axis.get(self.map.require(previous[0].0)?.position());
        self.refresh_curves();
        self.record(Change::AxisAlign {
            axis,
            value,
            previous,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Connections
    // ------------------------------------------------------------------

    pub fn toggle_connection(
        &mut self,
        start: NodeId,
        end: NodeId,
        kind: ConnectionType,
    ) -> Result<(), GraphError> {
        if start == end {
            return Ok(());
        }
        let change = toggle_change(&mut self.map, start, end, kind)?;
        self.record(change);
        self.events.publish(Event::ConnectionToggled { start, end });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Markers
    // ------------------------------------------------------------------

    pub fn add_marker(&mut self, id: NodeId, name: &str, group: &str) -> Result<(), GraphError> {
        let marker = self.map.add_marker(id, name, group)?;
        self.record(Change::MarkerAdd { marker });
        Ok(())
    }

    pub fn remove_marker(&mut self, id: NodeId) -> Result<(), GraphError> {
        let (index, marker) = self.map.remove_marker(id)?;
        self.record(Change::MarkerRemove { index, marker });
        Ok(())
    }

    pub fn edit_marker(&mut self, id: NodeId, name: &str, group: &str) -> Result<(), GraphError> {
        let previous = self.map.edit_marker(id, name, group)?;
        let Some(current) = self.map.marker_of(id).cloned() else {
            return Err(GraphError::NoMarker(id));
        };
        self.record(Change::MarkerEdit {
            node: id,
            old_name: previous.name,
            old_group: previous.group,
            new_name: current.name,
            new_group: current.group,
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Curves
    // ------------------------------------------------------------------

    pub fn quad_curve(&self) -> Option<&QuadCurve> {
        self.quad_curve.as_ref()
    }

    pub fn quad_curve_mut(&mut self) -> Option<&mut QuadCurve> {
        self.quad_curve.as_mut()
    }

    pub fn cubic_curve(&self) -> Option<&CubicCurve> {
        self.cubic_curve.as_ref()
    }

    pub fn cubic_curve_mut(&mut self) -> Option<&mut CubicCurve> {
        self.cubic_curve.as_mut()
    }

    /// Begin a quadratic curve between two nodes, replacing any active one.
    pub fn start_quad_curve(&mut self, start: NodeId, end: NodeId) -> Result<(), GraphError> {
        let curve = QuadCurve::new(&self.map, start, end, &self.config)?;
        if let Some(previous) = self.quad_curve.replace(curve) {
            previous.cancel();
        }
        self.events.publish(Event::CurveStarted { start, end });
        self.request_redraw();
        Ok(())
    }

    /// Begin a cubic curve between two nodes, replacing any active one.
    pub fn start_cubic_curve(&mut self, start: NodeId, end: NodeId) -> Result<(), GraphError> {
        let curve = CubicCurve::new(&self.map, start, end, &self.config)?;
        if let Some(previous) = self.cubic_curve.replace(curve) {
            previous.cancel();
        }
        self.events.publish(Event::CurveStarted { start, end });
        self.request_redraw();
        Ok(())
    }

    /// Materialize every active curve. Each curve is one history entry.
    /// Returns the number of nodes created.
    /// A curve that fails to commit stays active; curves committed before it
    /// are kept.
    pub fn commit_curves(&mut self, heights: &dyn HeightMap) -> Result<usize, GraphError> {
        let mut created = 0;
        let result = self
            .commit_quad(heights, &mut created)
            .and_then(|()| self.commit_cubic(heights, &mut created));
        if created > 0 {
            self.events.publish(Event::CurveCommitted { created });
        }
        result.map(|()| created)
    }

    fn commit_quad(&mut self, heights: &dyn HeightMap, created: &mut usize) -> Result<(), GraphError> {
        let Some(curve) = self.quad_curve.as_ref() else {
            return Ok(());
        };
        let change = curve.commit(&mut self.map, heights)?;
        self.quad_curve = None;
        *created += self.finish_commit(change);
        Ok(())
    }

    fn commit_cubic(&mut self, heights: &dyn HeightMap, created: &mut usize) -> Result<(), GraphError> {
        let Some(curve) = self.cubic_curve.as_ref() else {
            return Ok(());
        };
        let change = curve.commit(&mut self.map, heights)?;
        self.cubic_curve = None;
        *created += self.finish_commit(change);
        Ok(())
    }

    fn finish_commit(&mut self, change: Change) -> usize {
        let Change::CurveCommit { nodes, .. } = &change else {
            return 0;
        };
        let ids: Vec<NodeId> = nodes.iter().map(|node| node.id()).collect();
        rescan_nodes(&mut self.map, &ids, self.config.scan.overlap_tolerance);
        let count = ids.len();
        self.record(change);
        count
    }

    /// Drop every active curve without touching the graph.
    pub fn cancel_curves(&mut self) {
        let mut cancelled = false;
        if let Some(curve) = self.quad_curve.take() {
            curve.cancel();
            cancelled = true;
        }
        if let Some(curve) = self.cubic_curve.take() {
            curve.cancel();
            cancelled = true;
        }
        if cancelled {
            self.events.publish(Event::CurveCancelled);
            self.request_redraw();
        }
    }

    fn refresh_curves(&mut self) {
        let stale_quad = match self.quad_curve.as_mut() {
            Some(curve) => curve.refresh_anchors(&self.map).is_err(),
            None => false,
        };
        let stale_cubic = match self.cubic_curve.as_mut() {
            Some(curve) => curve.refresh_anchors(&self.map).is_err(),
            None => false,
        };
        if stale_quad || stale_cubic {
            tracing::warn!("Curve anchor no longer exists, cancelling curve");
            if stale_quad {
                self.quad_curve = None;
            }
            if stale_cubic {
                self.cubic_curve = None;
            }
            self.events.publish(Event::CurveCancelled);
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let version = self.map.structural_version();
        self.history.undo(&mut self.map)?;
        self.after_history_step(version);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let version = self.map.structural_version();
        self.history.redo(&mut self.map)?;
        self.after_history_step(version);
        Ok(())
    }

    fn after_history_step(&mut self, version: u64) {
        if self.map.structural_version() != version {
            // Ids may have shifted under the curve and the hover target.
            if self.quad_curve.is_some() || self.cubic_curve.is_some() {
                tracing::warn!("Graph was renumbered, cancelling active curve");
            }
            self.cancel_curves();
            self.hovered = None;
        } else {
            self.refresh_curves();
        }
        scan_overlaps(&mut self.map, self.config.scan.overlap_tolerance);
        self.edited();
    }

    // ------------------------------------------------------------------
    // Selection and hover
    // ------------------------------------------------------------------

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn set_hovered(&mut self, id: Option<NodeId>) {
        let id = id.filter(|&id| self.map.contains(id));
        if self.hovered != id {
            self.hovered = id;
            self.request_redraw();
        }
    }

    pub fn selection_rect(&self) -> Option<(Vec2, Vec2)> {
        self.selection_rect
    }

    /// Screen-space rubber band drawn over the map, corners in drag order.
    pub fn set_selection_rect(&mut self, rect: Option<(Vec2, Vec2)>) {
        self.selection_rect = rect;
        self.request_redraw();
    }

    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> Result<(), GraphError> {
        self.map.require_mut(id)?.selected = selected;
        self.request_redraw();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        let ids: Vec<NodeId> = self.selected_ids();
        for id in ids {
            if let Some(node) = self.map.node_mut(id) {
                node.selected = false;
            }
        }
        self.request_redraw();
    }

    pub fn selected_ids(&self) -> Vec<NodeId> {
        self.map
            .nodes()
            .iter()
            .filter(|node| node.selected)
            .map(|node| node.id())
            .collect()
    }

    /// Rescan every node for overlaps and negative elevation.
    pub fn scan_warnings(&mut self) -> usize {
        let warned = scan_overlaps(&mut self.map, self.config.scan.overlap_tolerance);
        self.request_redraw();
        warned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curves::FlatHeightMap;

    fn session() -> EditorSession {
        let mut session = EditorSession::new(EditorConfig::default(), EventBus::new());
        session.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard).unwrap();
        session.add_node(Vec3::new(10.0, 0.0, 0.0), NodeFlag::Standard).unwrap();
        session.add_node(Vec3::new(20.0, 0.0, 0.0), NodeFlag::Standard).unwrap();
        session
    }

    #[test]
    fn test_edits_mark_stale() {
        let mut session = session();
        assert!(session.is_stale());
        session.mark_saved();
        session.events().drain();

        session
            .toggle_connection(NodeId(1), NodeId(2), ConnectionType::Standard)
            .unwrap();
        assert!(session.is_stale());
        let events = session.events().drain();
        assert!(events.contains(&Event::StaleChanged { stale: true }));
        assert!(events.contains(&Event::RedrawRequested));
    }

    #[test]
    fn test_anchor_is_protected_from_delete() {
        let mut session = session();
        session.start_quad_curve(NodeId(2), NodeId(3)).unwrap();
        assert!(!session.can_delete(NodeId(2)));

        session.events().drain();
        assert_eq!(session.delete_nodes(&[NodeId(2)]).unwrap(), 0);
        assert_eq!(session.map().len(), 3);
        assert!(
            session
                .events()
                .drain()
                .iter()
                .any(|e| matches!(e, Event::ShowWarning { .. }))
        );

        // The curve keeps pointing at the same nodes after node 1 is gone.
        assert_eq!(session.delete_nodes(&[NodeId(1), NodeId(3)]).unwrap(), 1);
        let curve = session.quad_curve().unwrap();
        assert_eq!((curve.start(), curve.end()), (NodeId(1), NodeId(2)));
    }

    #[test]
    fn test_snapped_move_records_resolved_delta() {
        let mut config = EditorConfig::default();
        config.grid.snap = true;
        let mut session = EditorSession::new(config, EventBus::new());
        let id = session.add_node(Vec3::new(0.0, 0.0, 0.0), NodeFlag::Standard).unwrap();

        session.move_nodes(&[id], 2.7, -0.4).unwrap();
        assert_eq!(session.map().node(id).unwrap().position(), Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(session.history().undo_description().unwrap(), "Move node (snapped)");

        session.undo().unwrap();
        assert_eq!(session.map().node(id).unwrap().position(), Vec3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_move_outside_world_is_clamped() {
        let mut session = session();
        session.move_nodes(&[NodeId(3)], 2000.0, 5.0).unwrap();
        assert_eq!(
            session.map().node(NodeId(3)).unwrap().position(),
            Vec3::new(20.0, 0.0, 5.0)
        );
    }

    #[test]
    fn test_moving_anchor_updates_curve_preview() {
        let mut session = session();
        session.start_cubic_curve(NodeId(1), NodeId(3)).unwrap();
        session.move_nodes(&[NodeId(3)], 0.0, 4.0).unwrap();
        let curve = session.cubic_curve().unwrap();
        assert_eq!(curve.preview().last().unwrap().position.z, 4.0);
    }

    #[test]
    fn test_commit_and_undo_curve() {
        let mut session = session();
        session.start_quad_curve(NodeId(1), NodeId(3)).unwrap();
        session.quad_curve_mut().unwrap().set_interpolation_points(5).unwrap();

        let created = session.commit_curves(&FlatHeightMap(1.5)).unwrap();
        assert_eq!(created, 4);
        assert_eq!(session.map().len(), 7);
        assert!(session.quad_curve().is_none());
        assert_eq!(session.map().node(NodeId(4)).unwrap().position().y, 1.5);

        session.undo().unwrap();
        assert_eq!(session.map().len(), 3);
        assert!(session.map().node(NodeId(1)).unwrap().outgoing().is_empty());
    }

    #[test]
    fn test_failed_commit_keeps_curve() {
        let mut session = session();
        session.start_quad_curve(NodeId(1), NodeId(2)).unwrap();
        session.quad_curve_mut().unwrap().set_interpolation_points(2).unwrap();
        session.start_cubic_curve(NodeId(2), NodeId(3)).unwrap();
        session
            .cubic_curve_mut()
            .unwrap()
            .renumber_anchors(|id| Some(if id == NodeId(3) { NodeId(9) } else { id }));

        let err = session.commit_curves(&FlatHeightMap(0.0)).unwrap_err();
        assert_eq!(err, GraphError::UnknownNode(NodeId(9)));

        // The quadratic curve went in, the cubic one is still being edited.
        assert!(session.quad_curve().is_none());
        assert_eq!(session.map().len(), 4);
        assert_eq!(
            session.history().undo_description().unwrap(),
            "Create curve (1 nodes)"
        );
        let cubic = session.cubic_curve().unwrap();
        assert_eq!((cubic.start(), cubic.end()), (NodeId(2), NodeId(9)));
        assert!(session.events().drain().contains(&Event::CurveCommitted { created: 1 }));
    }

    #[test]
    fn test_marker_edit_undo() {
        let mut session = session();
        session.add_marker(NodeId(2), "Mill", "").unwrap();
        session.edit_marker(NodeId(2), "Old Mill", "Farms").unwrap();
        session.undo().unwrap();
        let marker = session.map().marker_of(NodeId(2)).unwrap();
        assert_eq!((marker.name.as_str(), marker.group.as_str()), ("Mill", "All"));
    }

    #[test]
    fn test_toggle_priority_and_align() {
        let mut session = session();
        session.toggle_priority(&[NodeId(1), NodeId(2)]).unwrap();
        assert_eq!(session.map().node(NodeId(2)).unwrap().flag, NodeFlag::SubPriority);

        session.align_nodes(&[NodeId(1), NodeId(3)], Axis::Z, 6.0).unwrap();
        assert_eq!(session.map().node(NodeId(3)).unwrap().position().z, 6.0);

        session.undo().unwrap();
        session.undo().unwrap();
        assert_eq!(session.map().node(NodeId(2)).unwrap().flag, NodeFlag::Standard);
        assert_eq!(session.map().node(NodeId(3)).unwrap().position().z, 0.0);
    }

    #[test]
    fn test_load_makes_old_history_stale() {
        let mut session = session();
        let data = session.serialize_graph();
        session.load_graph(&data).unwrap();
        assert!(!session.is_stale());

        let err = session.undo().unwrap_err();
        assert!(matches!(err, HistoryError::StaleVersion { .. }));
        assert_eq!(session.serialize_graph(), data);
    }

    #[test]
    fn test_load_announces_graph() {
        let mut session = session();
        session.add_marker(NodeId(1), "Depot", "").unwrap();
        let data = session.serialize_graph();
        session.events().drain();

        session.load_graph(&data).unwrap();
        let events = session.events().drain();
        assert!(events.contains(&Event::GraphLoaded {
            node_count: 3,
            marker_count: 1,
        }));
        assert!(events.contains(&Event::ShowInfo {
            message: "Loaded 3 nodes and 1 markers".into(),
        }));
    }

    #[test]
    fn test_rejected_load_keeps_graph() {
        let mut session = session();
        let before = session.serialize_graph();
        let mut data = before.clone();
        data.outgoing[0] = vec![9];
        session.events().drain();

        assert!(session.load_graph(&data).is_err());
        assert_eq!(session.serialize_graph(), before);
        assert!(
            session
                .events()
                .drain()
                .iter()
                .any(|e| matches!(e, Event::ShowError { .. }))
        );
    }

    #[test]
    fn test_delete_rescans_overlap_partners() {
        let mut session = session();
        let twin = session.add_node(Vec3::new(10.0, 0.0, 0.0), NodeFlag::Standard).unwrap();
        assert!(session.map().node(NodeId(2)).unwrap().has_warning());

        session.delete_nodes(&[twin]).unwrap();
        assert!(!session.map().node(NodeId(2)).unwrap().has_warning());
    }
}
