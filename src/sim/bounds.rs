//! Static walls around the viewport

use glam::Vec2;

use crate::consts::WALL_THICKNESS;
use crate::physics::{BodyId, PhysicsWorld};
use crate::renderer::Canvas;
use crate::renderer::vertex::colors;

/// Height of the ground strip drawn along the bottom edge
pub const GROUND_STRIP: f32 = 10.0;

/// Floor, left, right and ceiling walls sized to the viewport
#[derive(Debug, Clone, Default)]
pub struct BoundaryManager {
    walls: Vec<BodyId>,
    size: Vec2,
}

/// Center and size of each wall for a `width` x `height` viewport, floor first
pub fn wall_rects(width: f32, height: f32) -> [(Vec2, Vec2); 4] {
    let t = WALL_THICKNESS;
    [
        (Vec2::new(width / 2.0, height + t / 2.0), Vec2::new(width, t)),
        (Vec2::new(-t / 2.0, height / 2.0), Vec2::new(t, height)),
        (Vec2::new(width + t / 2.0, height / 2.0), Vec2::new(t, height)),
        (Vec2::new(width / 2.0, -t / 2.0), Vec2::new(width, t)),
    ]
}

impl BoundaryManager {
    pub fn new<W: PhysicsWorld + ?Sized>(world: &mut W, width: f32, height: f32) -> Self {
        let mut bounds = Self::default();
        bounds.rebuild(world, width, height);
        bounds
    }

    /// Replace the walls with ones fitting the new viewport
    pub fn rebuild<W: PhysicsWorld + ?Sized>(&mut self, world: &mut W, width: f32, height: f32) {
        for wall in self.walls.drain(..) {
            world.remove_body(wall);
        }
        self.walls = wall_rects(width, height)
            .into_iter()
            .map(|(center, size)| world.add_static_rect(center, size))
            .collect();
        self.size = Vec2::new(width, height);
        log::debug!("Walls rebuilt for {}x{}", width, height);
    }

    pub fn walls(&self) -> &[BodyId] {
        &self.walls
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Gray strip centered on the bottom edge
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.push();
        canvas.no_stroke();
        canvas.fill(colors::GROUND);
        canvas.rect(
            Vec2::new(self.size.x / 2.0, self.size.y),
            Vec2::new(self.size.x, GROUND_STRIP),
        );
        canvas.pop();
    }
}
