use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod config;
pub mod error;

pub use config::{
    CurveSettings, DebugSettings, EditorConfig, GridSettings, HistorySettings, ScanSettings,
    ViewSettings,
};
pub use error::GraphError;

/// Decimal places kept for stored node coordinates.
pub const COORDINATE_PRECISION: u32 = 3;

/// Dense, 1-based node identifier. A graph with `N` nodes always uses `1..=N`,
/// matching the storage order of its node collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Zero-based storage slot for this id.
    pub fn index(self) -> usize {
        (self.0 as usize).saturating_sub(1)
    }

    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-component point. Screen-space for the renderer, `(x, z)` when used as a
/// planar world position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// World-space position. `y` is elevation, `x`/`z` are planar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Same point with every component rounded to [`COORDINATE_PRECISION`].
    pub fn rounded(self) -> Self {
        Self {
            x: round_to_places(self.x, COORDINATE_PRECISION),
            y: round_to_places(self.y, COORDINATE_PRECISION),
            z: round_to_places(self.z, COORDINATE_PRECISION),
        }
    }

    pub fn planar(self) -> Vec2 {
        Vec2::new(self.x, self.z)
    }
}

/// Round half away from zero to a fixed number of decimal places.
pub fn round_to_places(value: f64, places: u32) -> f64 {
    let scale = 10f64.powi(places as i32);
    (value * scale).round() / scale
}

/// Error type for enum conversion failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnumConversionError {
    #[error("Invalid NodeFlag value: {0}")]
    InvalidNodeFlag(i32),
    #[error("Invalid ConnectionType value: {0}")]
    InvalidConnectionType(i32),
}

/// Semantic tag carried by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum NodeFlag {
    #[default]
    Standard = 0,
    SubPriority = 1,
    /// Curve preview point, never part of the road graph.
    Temporary = 98,
    ControlPoint = 99,
}

impl NodeFlag {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_sub_priority(self) -> bool {
        self == NodeFlag::SubPriority
    }

    /// Flip between standard and sub-priority. Other flags are left alone.
    pub fn toggled_priority(self) -> Self {
        match self {
            NodeFlag::Standard => NodeFlag::SubPriority,
            NodeFlag::SubPriority => NodeFlag::Standard,
            other => other,
        }
    }
}

impl TryFrom<i32> for NodeFlag {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(NodeFlag::Standard),
            1 => Ok(NodeFlag::SubPriority),
            98 => Ok(NodeFlag::Temporary),
            99 => Ok(NodeFlag::ControlPoint),
            _ => Err(EnumConversionError::InvalidNodeFlag(value)),
        }
    }
}

/// The kind of directed link requested when toggling a connection.
///
/// `SubPriority` keeps the bookkeeping of `Standard`: sub-priority routing is
/// read from the source node's flag, never from the link itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(i32)]
pub enum ConnectionType {
    #[default]
    Standard = 0,
    SubPriority = 1,
    Dual = 2,
    Reverse = 3,
}

impl TryFrom<i32> for ConnectionType {
    type Error = EnumConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ConnectionType::Standard),
            1 => Ok(ConnectionType::SubPriority),
            2 => Ok(ConnectionType::Dual),
            3 => Ok(ConnectionType::Reverse),
            _ => Err(EnumConversionError::InvalidConnectionType(value)),
        }
    }
}

/// Editor-only diagnostic attached to a node by the overlap scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeWarning {
    /// Another node sits within the overlap tolerance on the x/z plane.
    Overlap,
    /// The node's elevation is below zero.
    NegativeElevation,
}
