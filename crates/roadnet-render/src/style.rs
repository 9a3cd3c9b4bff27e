//! Colors for every drawable kind.

use roadnet_core::{ConnectionType, NodeFlag};
use roadnet_graph::EdgeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn to_tuple(&self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub node: Color,
    pub node_sub_priority: Color,
    pub node_selected: Color,
    pub node_warning: Color,
    pub node_hovered: Color,
    pub control_point: Color,
    pub curve_node: Color,

    pub connection_standard: Color,
    pub connection_sub_priority: Color,
    pub connection_dual: Color,
    pub connection_dual_sub_priority: Color,
    pub connection_reverse: Color,

    pub text: Color,
    pub marker_text: Color,
    pub grid: Color,
    pub selection: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            node: Color::rgb(255, 0, 0),
            node_sub_priority: Color::rgb(255, 200, 0),
            node_selected: Color::rgb(255, 0, 255),
            node_warning: Color::rgb(255, 255, 0),
            node_hovered: Color::rgb(255, 255, 255),
            control_point: Color::rgb(0, 128, 255),
            curve_node: Color::rgb(0, 255, 255),

            connection_standard: Color::rgb(0, 200, 0),
            connection_sub_priority: Color::rgb(255, 165, 0),
            connection_dual: Color::rgb(0, 0, 255),
            connection_dual_sub_priority: Color::rgb(150, 75, 0),
            connection_reverse: Color::rgb(0, 255, 255),

            text: Color::rgb(255, 255, 255),
            marker_text: Color::rgb(255, 255, 255),
            grid: Color::rgba(255, 255, 255, 64),
            selection: Color::rgba(255, 255, 255, 128),
        }
    }
}

impl Palette {
    pub fn edge(&self, kind: EdgeKind) -> Color {
        match kind {
            EdgeKind::Standard => self.connection_standard,
            EdgeKind::SubPriority => self.connection_sub_priority,
            EdgeKind::Dual => self.connection_dual,
            EdgeKind::DualSubPriority => self.connection_dual_sub_priority,
            EdgeKind::Reverse => self.connection_reverse,
        }
    }

    /// Line color of a curve preview drawn with the given path type.
    pub fn curve_path(&self, path: ConnectionType, flag: NodeFlag) -> Color {
        match (path, flag.is_sub_priority()) {
            (ConnectionType::Dual, true) => self.connection_dual_sub_priority,
            (ConnectionType::Dual, false) => self.connection_dual,
            (ConnectionType::Reverse, _) => self.connection_reverse,
            (_, true) => self.connection_sub_priority,
            (_, false) => self.connection_standard,
        }
    }

    pub fn node(&self, flag: NodeFlag, selected: bool, warning: bool) -> Color {
        if selected {
            self.node_selected
        } else if warning {
            self.node_warning
        } else {
            match flag {
                NodeFlag::SubPriority => self.node_sub_priority,
                NodeFlag::ControlPoint => self.control_point,
                NodeFlag::Temporary => self.curve_node,
                NodeFlag::Standard => self.node,
            }
        }
    }
}
