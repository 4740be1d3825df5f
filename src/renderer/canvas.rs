//! Immediate-mode drawing surface
//!
//! Mirrors the small subset of a sketchbook API the sandbox draws with:
//! a push/pop transform stack, fill/stroke state and center-anchored
//! ellipses, rectangles and text.

use glam::{Affine2, Vec2};

use super::shapes;
use super::vertex::Vertex;

/// Drawing operations consumed by the sandbox renderers
pub trait Canvas {
    /// Save transform, fill and stroke
    fn push(&mut self);
    /// Restore the state saved by the matching `push`
    fn pop(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn fill(&mut self, color: [f32; 4]);
    fn no_fill(&mut self);
    fn stroke(&mut self, color: [f32; 4], weight: f32);
    fn no_stroke(&mut self);
    /// Ellipse with full width/height `size` centered at `center`
    fn ellipse(&mut self, center: Vec2, size: Vec2);
    /// Rectangle of `size` centered at `center`
    fn rect(&mut self, center: Vec2, size: Vec2);
    /// Text centered on `position`, drawn with the fill color
    fn text(&mut self, position: Vec2, size: f32, text: &str);
}

/// Transform and paint state saved by `push`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawState {
    pub transform: Affine2,
    pub fill: Option<[f32; 4]>,
    pub stroke: Option<([f32; 4], f32)>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            fill: Some([1.0; 4]),
            stroke: None,
        }
    }
}

impl DrawState {
    pub fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    /// Rotation (radians) of the current transform
    pub fn angle(&self) -> f32 {
        let x_axis = self.transform.matrix2.x_axis;
        x_axis.y.atan2(x_axis.x)
    }
}

/// A piece of text resolved to screen space; the shell lays these out in the
/// DOM since the triangle pipeline has no glyphs.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub position: Vec2,
    pub size: f32,
    pub color: [f32; 4],
    pub text: String,
}

/// Canvas that tessellates everything into a screen-space triangle list
#[derive(Debug, Default)]
pub struct VertexCanvas {
    vertices: Vec<Vertex>,
    labels: Vec<TextLabel>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl VertexCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new frame, keeping allocations
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.labels.clear();
        self.state = DrawState::default();
        self.stack.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    fn emit(&mut self, local: Vec<Vertex>) {
        let transform = self.state.transform;
        self.vertices.extend(local.into_iter().map(|v| {
            let p = transform.transform_point2(Vec2::from(v.position));
            Vertex::new(p.x, p.y, v.color)
        }));
    }
}

impl Canvas for VertexCanvas {
    fn push(&mut self) {
        self.stack.push(self.state);
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(state) => self.state = state,
            None => log::warn!("Canvas::pop without matching push"),
        }
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.translate(offset);
    }

    fn rotate(&mut self, angle: f32) {
        self.state.rotate(angle);
    }

    fn fill(&mut self, color: [f32; 4]) {
        self.state.fill = Some(color);
    }

    fn no_fill(&mut self) {
        self.state.fill = None;
    }

    fn stroke(&mut self, color: [f32; 4], weight: f32) {
        self.state.stroke = Some((color, weight));
    }

    fn no_stroke(&mut self) {
        self.state.stroke = None;
    }

    fn ellipse(&mut self, center: Vec2, size: Vec2) {
        let segments = shapes::ellipse_segments(size.max_element() * 0.5);
        if let Some(color) = self.state.fill {
            self.emit(shapes::ellipse(center, size, color, segments));
        }
        if let Some((color, weight)) = self.state.stroke {
            self.emit(shapes::ellipse_outline(center, size, weight, color, segments));
        }
    }

    fn rect(&mut self, center: Vec2, size: Vec2) {
        if let Some(color) = self.state.fill {
            self.emit(shapes::rect(center, size, color));
        }
        if let Some((color, weight)) = self.state.stroke {
            self.emit(shapes::rect_outline(center, size, weight, color));
        }
    }

    fn text(&mut self, position: Vec2, size: f32, text: &str) {
        let Some(color) = self.state.fill else {
            return;
        };
        self.labels.push(TextLabel {
            position: self.state.transform.transform_point2(position),
            size,
            color,
            text: text.to_owned(),
        });
    }
}
