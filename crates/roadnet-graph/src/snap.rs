//! Grid snapping and world bounds for node moves.

use roadnet_core::{GridSettings, Vec2};

/// Finest resolution a snapped coordinate is rounded to.
const SNAP_RESOLUTION: f64 = 50.0;

/// Grid step along each axis, honoring subdivision snapping.
pub fn grid_step(grid: &GridSettings) -> Vec2 {
    let divisor = if grid.snap_subdivisions {
        f64::from(grid.subdivisions) + 1.0
    } else {
        1.0
    };
    Vec2::new(grid.spacing_x / divisor, grid.spacing_z / divisor)
}

/// Nearest grid intersection to a planar position.
pub fn snap_to_grid(position: Vec2, grid: &GridSettings) -> Vec2 {
    let step = grid_step(grid);
    Vec2::new(snap_axis(position.x, step.x), snap_axis(position.y, step.y))
}

fn snap_axis(value: f64, step: f64) -> f64 {
    let snapped = if step > 0.0 {
        (value / step).round() * step
    } else {
        value
    };
    (snapped * SNAP_RESOLUTION).round() / SNAP_RESOLUTION
}

/// Offset that keeps `value + delta` within `[-extent, extent]`; an axis that
/// would leave the world does not move.
pub fn clamp_delta(value: f64, delta: f64, extent: f64) -> f64 {
    let target = value + delta;
    if target < -extent || target > extent {
        0.0
    } else {
        delta
    }
}
