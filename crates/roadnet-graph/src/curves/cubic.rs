use super::CurveShape;
use roadnet_core::Vec2;

/// Third-degree Bezier with two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubic {
    pub control1: Vec2,
    pub control2: Vec2,
}

impl CurveShape for Cubic {
    fn initial(start: Vec2, end: Vec2) -> Self {
        Self {
            control1: Vec2::new(start.x, end.y),
            control2: Vec2::new(end.x, start.y),
        }
    }

    fn point_at(&self, start: Vec2, end: Vec2, t: f64) -> Vec2 {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        Vec2::new(
            a * start.x + b * self.control1.x + c * self.control2.x + d * end.x,
            a * start.y + b * self.control1.y + c * self.control2.y + d * end.y,
        )
    }

    fn control_points(&self) -> Vec<Vec2> {
        vec![self.control1, self.control2]
    }

    fn control_point_mut(&mut self, index: usize) -> Option<&mut Vec2> {
        match index {
            0 => Some(&mut self.control1),
            1 => Some(&mut self.control2),
            _ => None,
        }
    }
}
