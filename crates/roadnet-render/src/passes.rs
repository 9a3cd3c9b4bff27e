//! Per-frame primitive generation.
//!
//! Pure functions over a read-only view of the session: the workers call
//! them while holding the session lock and paint the result afterwards.

use crate::primitives::Primitive;
use crate::style::Palette;
use crate::viewport::Viewport;
use roadnet_core::{ConnectionType, GridSettings, NodeFlag, Vec2};
use roadnet_graph::{Curve, CurveShape, EdgeKind, EditorSession, RoadMap, classify};

/// Most grid lines drawn per axis; denser grids are skipped.
const MAX_GRID_LINES: usize = 2048;

/// Connection buckets in drawing order.
pub const CONNECTION_ORDER: [EdgeKind; 5] = [
    EdgeKind::DualSubPriority,
    EdgeKind::Dual,
    EdgeKind::Reverse,
    EdgeKind::SubPriority,
    EdgeKind::Standard,
];

/// Grid lines, drawn only when the grid is enabled and zoomed in past 2x.
pub fn background_pass(viewport: &Viewport, grid: &GridSettings, palette: &Palette) -> Vec<Primitive> {
    let mut primitives = Vec::new();
    if !grid.show || viewport.zoom <= 2.0 || grid.spacing_x <= 0.0 || grid.spacing_z <= 0.0 {
        return primitives;
    }
    let (min, max) = viewport.visible_world_bounds();
    let columns = ((max.x - min.x) / grid.spacing_x).ceil() as usize + 1;
    let rows = ((max.y - min.y) / grid.spacing_z).ceil() as usize + 1;
    if columns > MAX_GRID_LINES || rows > MAX_GRID_LINES {
        return primitives;
    }

    let first_x = (min.x / grid.spacing_x).floor() * grid.spacing_x;
    for i in 0..=columns {
        let x = first_x + i as f64 * grid.spacing_x;
        primitives.push(Primitive::Line {
            from: viewport.world_to_screen(Vec2::new(x, min.y)),
            to: viewport.world_to_screen(Vec2::new(x, max.y)),
            color: palette.grid,
            arrow: false,
        });
    }
    let first_z = (min.y / grid.spacing_z).floor() * grid.spacing_z;
    for i in 0..=rows {
        let z = first_z + i as f64 * grid.spacing_z;
        primitives.push(Primitive::Line {
            from: viewport.world_to_screen(Vec2::new(min.x, z)),
            to: viewport.world_to_screen(Vec2::new(max.x, z)),
            color: palette.grid,
            arrow: false,
        });
    }
    primitives
}

/// Every visible directed link, bucketed by kind and emitted bucket by
/// bucket in [`CONNECTION_ORDER`].
pub fn connection_pass(
    map: &RoadMap,
    viewport: &Viewport,
    palette: &Palette,
    margin: f64,
) -> Vec<Primitive> {
    let pad = margin * viewport.zoom;
    let mut buckets: [Vec<Primitive>; 5] = Default::default();

    for node in map.nodes() {
        let from = viewport.world_to_screen(node.position().planar());
        for &target in node.outgoing() {
            let Some(other) = map.node(target) else {
                continue;
            };
            let to = viewport.world_to_screen(other.position().planar());
            if !viewport.contains_with_margin(from, pad) && !viewport.contains_with_margin(to, pad) {
                continue;
            }
            let Some(kind) = classify(map, node.id(), target) else {
                continue;
            };
            let slot = CONNECTION_ORDER
                .iter()
                .position(|&k| k == kind)
                .unwrap_or(CONNECTION_ORDER.len() - 1);
            buckets[slot].push(Primitive::Line {
                from,
                to,
                color: palette.edge(kind),
                arrow: !matches!(kind, EdgeKind::Dual | EdgeKind::DualSubPriority),
            });
        }
    }
    buckets.into_iter().flatten().collect()
}

/// Nodes and overlays: hover highlight, labels, curve previews and the
/// selection rectangle.
pub fn node_pass(session: &EditorSession, viewport: &Viewport, palette: &Palette) -> Vec<Primitive> {
    let map = session.map();
    let config = session.config();
    let size = config.view.node_size * viewport.zoom;
    let mut primitives = Vec::with_capacity(map.len());

    for node in map.nodes() {
        let center = viewport.world_to_screen(node.position().planar());
        if !viewport.contains(center) {
            continue;
        }
        primitives.push(Primitive::Node {
            center,
            size,
            color: palette.node(node.flag, node.selected, node.has_warning()),
        });
    }

    for marker in map.markers() {
        let Some(node) = map.node(marker.node) else {
            continue;
        };
        let center = viewport.world_to_screen(node.position().planar());
        if viewport.contains(center) {
            primitives.push(Primitive::Text {
                position: Vec2::new(center.x, center.y + size),
                text: marker.name.clone(),
                color: palette.marker_text,
            });
        }
    }

    if config.debug.show_node_ids {
        for node in map.nodes() {
            let center = viewport.world_to_screen(node.position().planar());
            if viewport.contains(center) {
                primitives.push(Primitive::Text {
                    position: Vec2::new(center.x + size, center.y),
                    text: node.id().to_string(),
                    color: palette.text,
                });
            }
        }
    }

    if let Some(node) = session.hovered().and_then(|id| map.node(id)) {
        let center = viewport.world_to_screen(node.position().planar());
        if viewport.contains(center) {
            primitives.push(Primitive::Outline {
                center,
                size: size * 1.5,
                color: palette.node_hovered,
            });
            let mut label = map
                .marker_of(node.id())
                .map(|marker| format!("{} ({})", marker.name, marker.group))
                .unwrap_or_default();
            if config.debug.show_hovered_location {
                let p = node.position();
                if !label.is_empty() {
                    label.push(' ');
                }
                label.push_str(&format!("[{}] x:{} y:{} z:{}", node.id(), p.x, p.y, p.z));
            }
            if !label.is_empty() {
                primitives.push(Primitive::Text {
                    position: Vec2::new(center.x, center.y - size * 2.0),
                    text: label,
                    color: palette.text,
                });
            }
        }
    }

    if let Some(curve) = session.quad_curve() {
        curve_overlay(curve, viewport, palette, size, &mut primitives);
    }
    if let Some(curve) = session.cubic_curve() {
        curve_overlay(curve, viewport, palette, size, &mut primitives);
    }

    if let Some((a, b)) = session.selection_rect() {
        primitives.push(Primitive::Rect {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
            color: palette.selection,
        });
    }
    primitives
}

fn curve_overlay<S: CurveShape>(
    curve: &Curve<S>,
    viewport: &Viewport,
    palette: &Palette,
    size: f64,
    out: &mut Vec<Primitive>,
) {
    let line = palette.curve_path(curve.path_type(), curve.node_flag());
    let arrow = curve.path_type() != ConnectionType::Dual;
    let points: Vec<Vec2> = curve
        .preview()
        .iter()
        .map(|point| viewport.world_to_screen(point.position.planar()))
        .collect();

    for pair in points.windows(2) {
        out.push(Primitive::Line {
            from: pair[0],
            to: pair[1],
            color: line,
            arrow,
        });
    }
    for (point, center) in curve.preview().iter().zip(&points) {
        if point.anchor.is_some() || !viewport.contains(*center) {
            continue;
        }
        let color = match point.flag {
            NodeFlag::SubPriority => palette.node_sub_priority,
            _ => palette.curve_node,
        };
        out.push(Primitive::Node {
            center: *center,
            size,
            color,
        });
    }
    for control in curve.control_points() {
        out.push(Primitive::Node {
            center: viewport.world_to_screen(control),
            size,
            color: palette.control_point,
        });
    }
}
