//! Layered renderer for the road network editor.
//!
//! The UI thread paints the background grid, two persistent workers paint the
//! connection and node layers in parallel, and the three layers composite in
//! a fixed order. Everything here produces [`Primitive`] lists; turning those
//! into pixels is left to the host toolkit.

pub mod latch;
pub mod passes;
pub mod primitives;
pub mod renderer;
pub mod style;
pub mod viewport;

pub use hit_test::{CurveKind, HitResult, hit_test};
pub use latch::FrameLatch;
pub use passes::{CONNECTION_ORDER, background_pass, connection_pass, node_pass};
pub use primitives::{Layer, Primitive, Surface};
pub use renderer::{Frame, RedrawHandle, Renderer, SharedSession};
pub use style::{Color, Palette};
pub use viewport::Viewport;
