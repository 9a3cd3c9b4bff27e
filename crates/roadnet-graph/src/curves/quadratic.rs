use super::CurveShape;
use roadnet_core::Vec2;

/// Second-degree Bezier with one control point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    pub control: Vec2,
}

impl CurveShape for Quadratic {
    fn initial(start: Vec2, end: Vec2) -> Self {
        Self {
            control: Vec2::new(start.x, end.y),
        }
    }

    fn point_at(&self, start: Vec2, end: Vec2, t: f64) -> Vec2 {
        let u = 1.0 - t;
        let (a, b, c) = (u * u, 2.0 * u * t, t * t);
        Vec2::new(
            a * start.x + b * self.control.x + c * end.x,
            a * start.y + b * self.control.y + c * end.y,
        )
    }

    fn control_points(&self) -> Vec<Vec2> {
        vec![self.control]
    }

    fn control_point_mut(&mut self, index: usize) -> Option<&mut Vec2> {
        (index == 0).then_some(&mut self.control)
    }
}
