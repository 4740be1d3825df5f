//! Rendering module
//!
//! The sandbox draws through the immediate-mode [`Canvas`] trait. On the web
//! a [`VertexCanvas`] tessellates every primitive into triangles that the
//! WebGPU [`RenderState`] uploads once per frame; [`RecordingCanvas`] keeps
//! the resolved primitives instead, for logging and tests.

pub mod canvas;
pub mod pipeline;
pub mod record;
pub mod shapes;
pub mod vertex;

pub use canvas::{Canvas, TextLabel, VertexCanvas};
pub use pipeline::RenderState;
pub use record::{DrawOp, Primitive, RecordingCanvas};
pub use vertex::Vertex;
