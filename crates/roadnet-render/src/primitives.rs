//! Drawable output of the render passes and the shared surface they paint
//! into.

use crate::style::Color;
use roadnet_core::Vec2;

/// One screen-space drawing command.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Filled square centered on a node.
    Node { center: Vec2, size: f64, color: Color },
    /// Square outline around a highlighted node.
    Outline { center: Vec2, size: f64, color: Color },
    Line {
        from: Vec2,
        to: Vec2,
        color: Color,
        /// Direction arrow at the midpoint.
        arrow: bool,
    },
    Text { position: Vec2, text: String, color: Color },
    Rect { min: Vec2, max: Vec2, color: Color },
}

/// Surface layers, listed in compositing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Grid, drawn by the UI thread before the workers run.
    Background,
    Connections,
    /// Nodes and every overlay drawn on top of them.
    Nodes,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Connections, Layer::Nodes];
}

#[derive(Debug, Default)]
pub struct Surface {
    background: Vec<Primitive>,
    connections: Vec<Primitive>,
    nodes: Vec<Primitive>,
    frames: [u64; 3],
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(layer: Layer) -> usize {
        match layer {
            Layer::Background => 0,
            Layer::Connections => 1,
            Layer::Nodes => 2,
        }
    }

    /// Replace a layer with the output of `frame`.
    pub fn paint(&mut self, layer: Layer, frame: u64, primitives: Vec<Primitive>) {
        *self.layer_mut(layer) = primitives;
        self.frames[Self::slot(layer)] = frame;
    }

    pub fn layer(&self, layer: Layer) -> &[Primitive] {
        match layer {
            Layer::Background => &self.background,
            Layer::Connections => &self.connections,
            Layer::Nodes => &self.nodes,
        }
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<Primitive> {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Connections => &mut self.connections,
            Layer::Nodes => &mut self.nodes,
        }
    }

    /// Frame number that last painted `layer`.
    pub fn frame_of(&self, layer: Layer) -> u64 {
        self.frames[Self::slot(layer)]
    }

    /// All layers flattened in drawing order.
    pub fn composite(&self) -> Vec<Primitive> {
        Layer::ALL
            .iter()
            .flat_map(|&layer| self.layer(layer).iter().cloned())
            .collect()
    }
}
