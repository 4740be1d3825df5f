//! Key entities and their drawing

use glam::Vec2;

use super::builder::build_key_body;
use super::layout::KeyLayout;
use super::shape::{Rgb, ShapeParameters};
use crate::physics::{BodyId, PhysicsWorld, Pose};
use crate::renderer::Canvas;

/// A committed key: one parameter set bound to one rigid body
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntity {
    pub id: u32,
    pub params: ShapeParameters,
    /// Box the key was dragged out in (width, height)
    pub box_size: Vec2,
    pub body: BodyId,
}

impl KeyEntity {
    /// Build the body for a new key centered at `center`, unrotated
    pub fn spawn<W: PhysicsWorld + ?Sized>(
        world: &mut W,
        id: u32,
        center: Vec2,
        box_size: Vec2,
        params: ShapeParameters,
    ) -> Self {
        let body = build_key_body(world, Pose::new(center, 0.0), box_size, &params);
        Self {
            id,
            params,
            box_size,
            body,
        }
    }

    pub fn layout(&self) -> KeyLayout {
        KeyLayout::new(self.box_size.x, &self.params)
    }

    /// Draw the key at the body's current pose
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C, pose: Pose, background: Rgb) {
        canvas.push();
        canvas.translate(pose.position);
        canvas.rotate(pose.angle);
        draw_key_graphic(canvas, Vec2::ZERO, self.box_size, &self.params, background);
        canvas.pop();
    }
}

/// Draw a key for `params` centered at `center` in the canvas' current frame.
///
/// The head gets a hollow in the background color, then the shaft and the
/// used notches are drawn in the key color.
pub fn draw_key_graphic<C: Canvas + ?Sized>(
    canvas: &mut C,
    center: Vec2,
    box_size: Vec2,
    params: &ShapeParameters,
    background: Rgb,
) {
    let layout = KeyLayout::new(box_size.x, params);
    let color = params.color.to_rgba(1.0);

    canvas.push();
    canvas.translate(center);
    canvas.no_stroke();

    canvas.fill(color);
    canvas.ellipse(layout.head.center, layout.head.size);
    let hollow = layout.hollow();
    canvas.fill(background.to_rgba(1.0));
    canvas.ellipse(hollow.center, hollow.size);

    canvas.fill(color);
    canvas.rect(layout.shaft.center, layout.shaft.size);
    for notch in &layout.notches {
        canvas.rect(notch.center, notch.size);
    }

    canvas.pop();
}
