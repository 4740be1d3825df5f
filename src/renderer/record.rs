//! Canvas that records resolved primitives instead of rasterizing them

use glam::Vec2;

use super::canvas::{Canvas, DrawState};

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Ellipse,
    Rect,
    RectOutline { weight: f32 },
    EllipseOutline { weight: f32 },
    Text(String),
}

/// One drawn primitive with its world-space center and rotation
#[derive(Debug, Clone, PartialEq)]
pub struct DrawOp {
    pub primitive: Primitive,
    pub center: Vec2,
    pub size: Vec2,
    pub angle: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Default)]
pub struct RecordingCanvas {
    ops: Vec<DrawOp>,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Filled primitives only, skipping outlines and text
    pub fn fills(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op.primitive, Primitive::Ellipse | Primitive::Rect))
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match &op.primitive {
            Primitive::Text(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Depth of the push/pop stack; zero after balanced drawing
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn record(&mut self, primitive: Primitive, center: Vec2, size: Vec2, color: [f32; 4]) {
        self.ops.push(DrawOp {
            primitive,
            center: self.state.transform.transform_point2(center),
            size,
            angle: self.state.angle(),
            color,
        });
    }
}

impl Canvas for RecordingCanvas {
    fn push(&mut self) {
        self.stack.push(self.state);
    }

    fn pop(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
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
        if let Some(color) = self.state.fill {
            self.record(Primitive::Ellipse, center, size, color);
        }
        if let Some((color, weight)) = self.state.stroke {
            self.record(Primitive::EllipseOutline { weight }, center, size, color);
        }
    }

    fn rect(&mut self, center: Vec2, size: Vec2) {
        if let Some(color) = self.state.fill {
            self.record(Primitive::Rect, center, size, color);
        }
        if let Some((color, weight)) = self.state.stroke {
            self.record(Primitive::RectOutline { weight }, center, size, color);
        }
    }

    fn text(&mut self, position: Vec2, size: f32, text: &str) {
        if let Some(color) = self.state.fill {
            self.record(
                Primitive::Text(text.to_owned()),
                position,
                Vec2::splat(size),
                color,
            );
        }
    }
}
