//! World/screen transform.
//!
//! The map image spans `[-extent, extent]` on both planar axes. `origin` is
//! the map-image coordinate shown at the screen's top-left corner.

use roadnet_core::{ViewSettings, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub origin: Vec2,
    pub world_extent: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, view: &ViewSettings) -> Self {
        Self {
            width,
            height,
            zoom: 1.0,
            origin: Vec2::default(),
            world_extent: view.world_extent(),
        }
    }

    /// Viewport of the given size showing `center` in the middle.
    pub fn centered_on(center: Vec2, width: f64, height: f64, zoom: f64, world_extent: f64) -> Self {
        let zoom = zoom.max(f64::EPSILON);
        Self {
            width,
            height,
            zoom,
            origin: Vec2::new(
                center.x + world_extent - width / (2.0 * zoom),
                center.y + world_extent - height / (2.0 * zoom),
            ),
            world_extent,
        }
    }

    /// Planar world position `(x, z)` to screen pixels.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            (world.x + self.world_extent - self.origin.x) * self.zoom,
            (world.y + self.world_extent - self.origin.y) * self.zoom,
        )
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            screen.x / self.zoom + self.origin.x - self.world_extent,
            screen.y / self.zoom + self.origin.y - self.world_extent,
        )
    }

    /// Strictly inside the visible area.
    pub fn contains(&self, screen: Vec2) -> bool {
        screen.x > 0.0 && screen.x < self.width && screen.y > 0.0 && screen.y < self.height
    }

    /// Inside the visible area grown by `margin` pixels on every side.
    pub fn contains_with_margin(&self, screen: Vec2, margin: f64) -> bool {
        screen.x > -margin
            && screen.x < self.width + margin
            && screen.y > -margin
            && screen.y < self.height + margin
    }

    /// World-space corners of the visible area, top-left first.
    pub fn visible_world_bounds(&self) -> (Vec2, Vec2) {
        (
            self.screen_to_world(Vec2::new(0.0, 0.0)),
            self.screen_to_world(Vec2::new(self.width, self.height)),
        )
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.origin.x -= dx / self.zoom;
        self.origin.y -= dy / self.zoom;
    }

    /// Zoom by `factor`, keeping the world point under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Vec2, factor: f64) {
        if factor <= 0.0 {
            return;
        }
        let world = self.screen_to_world(anchor);
        self.zoom *= factor;
        self.origin = Vec2::new(
            world.x + self.world_extent - anchor.x / self.zoom,
            world.y + self.world_extent - anchor.y / self.zoom,
        );
    }
}
