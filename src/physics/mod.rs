//! Rigid body world boundary
//!
//! The sandbox never talks to a solver directly. Everything it needs from one
//! (compound bodies, static walls, point queries, pointer springs, gravity and
//! stepping) goes through [`PhysicsWorld`], so the gesture and builder logic
//! can be exercised against any backend. [`rapier::RapierWorld`] is the one
//! shipped implementation.

pub mod rapier;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use self::rapier::RapierWorld;

/// Opaque handle to a body owned by a [`PhysicsWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u64);

/// Opaque handle to a pointer spring owned by a [`PhysicsWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpringId(pub u64);

/// Collision shape of one part, centered on the part's offset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartShape {
    Ellipse { width: f32, height: f32 },
    Rect { width: f32, height: f32 },
}

/// One rigidly attached piece of a compound body
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Label for logs and debugging ("head", "shaft", "notch")
    pub name: &'static str,
    /// Center in the compound's local frame
    pub offset: Vec2,
    pub shape: PartShape,
    /// None = [`crate::consts::DEFAULT_DENSITY`]
    pub density: Option<f32>,
}

/// Surface and drag properties shared by every part of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub friction: f32,
    pub restitution: f32,
    /// Fraction of velocity lost per 60 Hz step
    pub air_drag: f32,
}

/// Everything needed to create one dynamic compound body
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundDesc {
    pub parts: Vec<Part>,
    pub material: Material,
    /// World position of the local origin
    pub position: Vec2,
    /// World rotation (radians)
    pub angle: f32,
}

/// A spring pulling a body-local anchor toward a world-space target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringDesc {
    pub body: BodyId,
    pub target: Vec2,
    pub local_anchor: Vec2,
    /// Fraction of the stretch corrected per step (0-1)
    pub stiffness: f32,
    /// Fraction of the relative velocity removed per step (0-1)
    pub damping: f32,
}

/// Position and rotation of a body
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(position: Vec2, angle: f32) -> Self {
        Self { position, angle }
    }

    /// Local-frame point → world
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.position + crate::rotate(local, self.angle)
    }

    /// World point → local frame
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        crate::rotate(world - self.position, -self.angle)
    }
}

/// Operations the sandbox consumes from a rigid body engine
pub trait PhysicsWorld {
    /// Create a dynamic compound body; parts keep their relative layout and
    /// the whole body is placed at `desc.position`, rotated by `desc.angle`.
    fn add_compound(&mut self, desc: &CompoundDesc) -> BodyId;

    /// Create an immovable rectangle centered at `center`
    fn add_static_rect(&mut self, center: Vec2, size: Vec2) -> BodyId;

    /// Remove a body and its colliders. Unknown ids are ignored.
    fn remove_body(&mut self, body: BodyId);

    /// Current pose, None when the body does not exist
    fn body_pose(&self, body: BodyId) -> Option<Pose>;

    /// Every body among `candidates` whose shape contains `point`, in
    /// candidate order.
    fn bodies_at_point(&self, candidates: &[BodyId], point: Vec2) -> Vec<BodyId>;

    /// Attach a pointer spring. None when the body does not exist.
    fn add_spring(&mut self, desc: &SpringDesc) -> Option<SpringId>;

    /// Move the world-space end of a spring
    fn set_spring_target(&mut self, spring: SpringId, target: Vec2);

    /// Detach a spring. Unknown ids are ignored.
    fn remove_spring(&mut self, spring: SpringId);

    /// Unitless gravity; the backend applies its own scale
    fn set_gravity(&mut self, gravity: Vec2);
    fn gravity(&self) -> Vec2;

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);

    /// Number of bodies created through this trait and not yet removed
    fn body_count(&self) -> usize;

    /// Number of live springs
    fn spring_count(&self) -> usize;
}
