//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for sandbox chrome
pub mod colors {
    /// Ground strip (gray 220)
    pub const GROUND: [f32; 4] = [220.0 / 255.0, 220.0 / 255.0, 220.0 / 255.0, 1.0];
    /// Full-screen dim behind the start button
    pub const OVERLAY: [f32; 4] = [0.0, 0.0, 0.0, 150.0 / 255.0];
    pub const START_BUTTON: [f32; 4] = [50.0 / 255.0, 150.0 / 255.0, 1.0, 1.0];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    /// Drag preview outline
    pub const PREVIEW_OUTLINE: [f32; 4] = [0.0, 0.0, 0.0, 80.0 / 255.0];
    /// Stroke weight of the drag preview outline
    pub const PREVIEW_OUTLINE_WEIGHT: f32 = 1.0;
}
