//! Bezier curve engines.
//!
//! A curve spans two existing anchor nodes and is shaped by virtual control
//! points. While it is being edited only a preview exists; [`Curve::commit`]
//! turns the interior preview points into real nodes connected in sequence.

mod cubic;
mod quadratic;

pub use cubic::Cubic;
pub use quadratic::Quadratic;

use crate::changes::Change;
use crate::connection::connect_path;
use crate::road_map::RoadMap;
use roadnet_core::{ConnectionType, EditorConfig, GraphError, NodeFlag, NodeId, Vec2, Vec3};

pub type QuadCurve = Curve<Quadratic>;
pub type CubicCurve = Curve<Cubic>;

/// Terrain elevation lookup used when curve nodes are materialized.
pub trait HeightMap {
    fn height_at(&self, x: f64, z: f64) -> f64;
}

impl<F> HeightMap for F
where
    F: Fn(f64, f64) -> f64,
{
    fn height_at(&self, x: f64, z: f64) -> f64 {
        self(x, z)
    }
}

/// Constant elevation everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatHeightMap(pub f64);

impl HeightMap for FlatHeightMap {
    fn height_at(&self, _x: f64, _z: f64) -> f64 {
        self.0
    }
}

/// Control point geometry of one Bezier degree, in the x/z plane.
pub trait CurveShape: Clone + std::fmt::Debug {
    /// Shape used when a curve is first started between two anchors.
    fn initial(start: Vec2, end: Vec2) -> Self;

    fn point_at(&self, start: Vec2, end: Vec2, t: f64) -> Vec2;

    fn control_points(&self) -> Vec<Vec2>;

    fn control_point_mut(&mut self, index: usize) -> Option<&mut Vec2>;
}

/// A point of the curve preview. Anchors carry the id of their graph node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewPoint {
    pub position: Vec3,
    pub flag: NodeFlag,
    pub anchor: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Curve<S: CurveShape> {
    start: NodeId,
    end: NodeId,
    start_position: Vec3,
    end_position: Vec3,
    shape: S,
    interpolation_points: usize,
    max_interpolation_points: usize,
    path_type: ConnectionType,
    node_flag: NodeFlag,
    move_scaler: f64,
    preview: Vec<PreviewPoint>,
}

fn check_interpolation_points(n: usize, max: usize) -> Result<(), GraphError> {
    if n < 2 || n > max {
        return Err(GraphError::InvalidInterpolationPoints(n));
    }
    Ok(())
}

impl<S: CurveShape> Curve<S> {
    /// Start a curve between two existing nodes using the configured default
    /// number of interpolation points.
    pub fn new(
        map: &RoadMap,
        start: NodeId,
        end: NodeId,
        config: &EditorConfig,
    ) -> Result<Self, GraphError> {
        Self::with_points(
            map,
            start,
            end,
            config.curve.default_interpolation_points,
            config,
        )
    }

    pub fn with_points(
        map: &RoadMap,
        start: NodeId,
        end: NodeId,
        interpolation_points: usize,
        config: &EditorConfig,
    ) -> Result<Self, GraphError> {
        if start == end {
            return Err(GraphError::DegenerateCurve(start));
        }
        let max_interpolation_points = config.curve.max_interpolation_points;
        check_interpolation_points(interpolation_points, max_interpolation_points)?;
        let start_position = map.require(start)?.position();
        let end_position = map.require(end)?.position();

        let mut curve = Self {
            start,
            end,
            start_position,
            end_position,
            shape: S::initial(start_position.planar(), end_position.planar()),
            interpolation_points,
            max_interpolation_points,
            path_type: ConnectionType::Standard,
            node_flag: NodeFlag::Standard,
            move_scaler: config.curve.control_point_move_scaler,
            preview: Vec::new(),
        };
        curve.rebuild_preview();
        Ok(curve)
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn is_anchor(&self, id: NodeId) -> bool {
        id == self.start || id == self.end
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    pub fn control_points(&self) -> Vec<Vec2> {
        self.shape.control_points()
    }

    pub fn interpolation_points(&self) -> usize {
        self.interpolation_points
    }

    pub fn path_type(&self) -> ConnectionType {
        self.path_type
    }

    pub fn node_flag(&self) -> NodeFlag {
        self.node_flag
    }

    /// Anchors plus the interior samples, in path order.
    pub fn preview(&self) -> &[PreviewPoint] {
        &self.preview
    }

    /// The `n - 1` interior samples only.
    pub fn interior(&self) -> &[PreviewPoint] {
        let len = self.preview.len();
        if len < 2 {
            return &[];
        }
        &self.preview[1..len - 1]
    }

    /// Must lie in `2..=max_interpolation_points` from the config the curve
    /// was started with.
    pub fn set_interpolation_points(&mut self, n: usize) -> Result<(), GraphError> {
        check_interpolation_points(n, self.max_interpolation_points)?;
        self.interpolation_points = n;
        self.rebuild_preview();
        Ok(())
    }

    /// Drag a control point by a screen-space delta, scaled by the configured
    /// move scaler. Returns `false` for an index the shape does not have.
    pub fn update_control_point(&mut self, index: usize, dx: f64, dz: f64) -> bool {
        let scaler = self.move_scaler;
        let Some(point) = self.shape.control_point_mut(index) else {
            return false;
        };
        point.x += dx * scaler;
        point.y += dz * scaler;
        self.rebuild_preview();
        true
    }

    /// Place a control point at an absolute planar position.
    pub fn set_control_point(&mut self, index: usize, position: Vec2) -> bool {
        let Some(point) = self.shape.control_point_mut(index) else {
            return false;
        };
        *point = position;
        self.rebuild_preview();
        true
    }

    pub fn set_path_type(&mut self, path_type: ConnectionType) {
        self.path_type = path_type;
    }

    /// Change the flag interior nodes will be created with.
    pub fn set_node_flag(&mut self, flag: NodeFlag) {
        self.node_flag = flag;
        for point in self.preview.iter_mut().filter(|point| point.anchor.is_none()) {
            point.flag = flag;
        }
    }

    /// Re-read anchor positions from the graph, rebuilding the preview when
    /// an anchor has moved.
    pub fn refresh_anchors(&mut self, map: &RoadMap) -> Result<bool, GraphError> {
        let start = map.require(self.start)?.position();
        let end = map.require(self.end)?.position();
        if start == self.start_position && end == self.end_position {
            return Ok(false);
        }
        self.start_position = start;
        self.end_position = end;
        self.rebuild_preview();
        Ok(true)
    }

    /// Follow the anchors through a renumbering of the graph.
    pub(crate) fn renumber_anchors(&mut self, renumber: impl Fn(NodeId) -> Option<NodeId>) {
        if let (Some(start), Some(end)) = (renumber(self.start), renumber(self.end)) {
            self.start = start;
            self.end = end;
            for point in &mut self.preview {
                point.anchor = point.anchor.and_then(&renumber);
            }
        }
    }

    fn rebuild_preview(&mut self) {
        let n = self.interpolation_points;
        let a = self.start_position.planar();
        let b = self.end_position.planar();

        self.preview.clear();
        self.preview.reserve(n + 1);
        self.preview.push(PreviewPoint {
            position: self.start_position,
            flag: self.node_flag,
            anchor: Some(self.start),
        });
        // Index-driven so exactly n - 1 samples come out.
        for i in 1..n {
            let t = i as f64 / n as f64;
            let p = self.shape.point_at(a, b, t);
            let y = self.start_position.y + (self.end_position.y - self.start_position.y) * t;
            self.preview.push(PreviewPoint {
                position: Vec3::new(p.x, y, p.y),
                flag: self.node_flag,
                anchor: None,
            });
        }
        self.preview.push(PreviewPoint {
            position: self.end_position,
            flag: self.node_flag,
            anchor: Some(self.end),
        });
    }

    /// Materialize the interior samples as graph nodes and connect
    /// start -> interior -> end with the curve's path type.
    ///
    /// Elevation of every created node comes from `heights`. Returns the
    /// change describing the whole batch so it can be recorded as one entry.
    pub fn commit(&self, map: &mut RoadMap, heights: &dyn HeightMap) -> Result<Change, GraphError> {
        map.require(self.start)?;
        map.require(self.end)?;

        let mut path = Vec::with_capacity(self.preview.len());
        path.push(self.start);
        let mut created = Vec::with_capacity(self.interior().len());
        for point in self.interior() {
            let Vec3 { x, z, .. } = point.position;
            let y = heights.height_at(x, z);
            let id = map.add_node(Vec3::new(x, y, z), self.node_flag);
            path.push(id);
            created.push(map.require(id)?.clone());
        }
        path.push(self.end);
        connect_path(map, &path, self.path_type)?;

        tracing::info!(
            "Curve committed: {} node(s) between {} and {}",
            created.len(),
            self.start,
            self.end
        );
        Ok(Change::CurveCommit {
            nodes: created,
            start: self.start,
            end: self.end,
            path_type: self.path_type,
        })
    }

    /// Drop the curve. Nothing was written to the graph.
    pub fn cancel(self) {
        tracing::debug!("Curve {} -> {} cancelled", self.start, self.end);
    }
}
