//! [`PhysicsWorld`] on top of rapier2d
//!
//! Units are screen pixels with +Y pointing down. Material values follow the
//! "per 60 Hz step" conventions the sandbox is tuned with, and are converted
//! to rapier's continuous damping and spring coefficients here.

use std::collections::HashMap;

use glam::Vec2;
use rapier2d::na::{Isometry2, Point2, Vector2};
use rapier2d::parry::query::PointQuery;
use rapier2d::prelude::*;

use super::{BodyId, CompoundDesc, PartShape, PhysicsWorld, Pose, SpringDesc, SpringId};
use crate::consts::{DEFAULT_DENSITY, SIM_DT};

/// Polygon resolution used for elliptical colliders
const ELLIPSE_SEGMENTS: usize = 24;

// ---------------------------------------------------------------------------
// Conversion helpers (private) - glam <-> nalgebra
// ---------------------------------------------------------------------------

fn vec2_to_na(v: Vec2) -> Vector2<f32> {
    Vector2::new(v.x, v.y)
}

fn point_to_na(v: Vec2) -> Point2<f32> {
    Point2::new(v.x, v.y)
}

fn na_iso_to_pose(iso: &Isometry2<f32>) -> Pose {
    Pose::new(
        Vec2::new(iso.translation.x, iso.translation.y),
        iso.rotation.angle(),
    )
}

/// Per-step velocity loss → rapier linear damping coefficient
fn air_drag_to_damping(air_drag: f32) -> f32 {
    let keep = (1.0 - air_drag).max(f32::EPSILON);
    (1.0 / keep - 1.0) / SIM_DT
}

/// Outline of an axis-aligned ellipse centered on the origin
fn ellipse_points(width: f32, height: f32) -> Vec<Point2<f32>> {
    (0..ELLIPSE_SEGMENTS)
        .map(|i| {
            let theta = i as f32 / ELLIPSE_SEGMENTS as f32 * std::f32::consts::TAU;
            Point2::new(width * 0.5 * theta.cos(), height * 0.5 * theta.sin())
        })
        .collect()
}

fn part_collider(shape: PartShape) -> ColliderBuilder {
    match shape {
        PartShape::Ellipse { width, height } => {
            ColliderBuilder::convex_hull(&ellipse_points(width, height))
                .unwrap_or_else(|| ColliderBuilder::ball(width.max(height) * 0.5))
        }
        PartShape::Rect { width, height } => ColliderBuilder::cuboid(width * 0.5, height * 0.5),
    }
}

/// Kinematic anchor body + joint that make up one pointer spring
#[derive(Debug, Clone, Copy)]
struct PointerSpring {
    anchor: RigidBodyHandle,
    joint: ImpulseJointHandle,
    body: RigidBodyHandle,
}

/// Wraps the rapier2d pipeline and handle bookkeeping behind [`PhysicsWorld`]
pub struct RapierWorld {
    /// Pixels/s² per unit of sandbox gravity
    gravity_scale: f32,
    gravity: Vec2,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    handles: HashMap<BodyId, RigidBodyHandle>,
    springs: HashMap<SpringId, PointerSpring>,
    next_body: u64,
    next_spring: u64,
}

impl RapierWorld {
    /// Create an empty world with zero gravity
    pub fn new(gravity_scale: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = SIM_DT;
        Self {
            gravity_scale,
            gravity: Vec2::ZERO,
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            handles: HashMap::new(),
            springs: HashMap::new(),
            next_body: 1,
            next_spring: 1,
        }
    }

    fn register(&mut self, handle: RigidBodyHandle) -> BodyId {
        let id = BodyId(self.next_body);
        self.next_body += 1;
        self.handles.insert(id, handle);
        id
    }

    fn remove_handle(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    /// Mass summed from the attached colliders' densities
    fn collider_mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        let rb = self.bodies.get(handle)?;
        Some(
            rb.colliders()
                .iter()
                .filter_map(|ch| self.colliders.get(*ch))
                .map(|c| c.mass())
                .sum(),
        )
    }

    /// Whether any collider attached to `handle` contains `point`
    fn body_contains(&self, handle: RigidBodyHandle, point: &Point2<f32>) -> bool {
        let Some(rb) = self.bodies.get(handle) else {
            return false;
        };
        rb.colliders().iter().any(|ch| {
            self.colliders.get(*ch).is_some_and(|collider| {
                // Derive from the parent so freshly placed bodies are
                // queryable before their first step.
                let iso = match collider.position_wrt_parent() {
                    Some(local) => rb.position() * local,
                    None => *collider.position(),
                };
                collider.shape().contains_point(&iso, point)
            })
        })
    }
}

impl PhysicsWorld for RapierWorld {
    fn add_compound(&mut self, desc: &CompoundDesc) -> BodyId {
        let damping = air_drag_to_damping(desc.material.air_drag);
        let rb = RigidBodyBuilder::dynamic()
            .translation(vec2_to_na(desc.position))
            .rotation(desc.angle)
            .linear_damping(damping)
            .angular_damping(damping)
            .build();
        let handle = self.bodies.insert(rb);

        for part in &desc.parts {
            let collider = part_collider(part.shape)
                .translation(vec2_to_na(part.offset))
                .density(part.density.unwrap_or(DEFAULT_DENSITY))
                .friction(desc.material.friction)
                .restitution(desc.material.restitution)
                .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }

        self.register(handle)
    }

    fn add_static_rect(&mut self, center: Vec2, size: Vec2) -> BodyId {
        let rb = RigidBodyBuilder::fixed()
            .translation(vec2_to_na(center))
            .build();
        let handle = self.bodies.insert(rb);
        let collider = ColliderBuilder::cuboid(size.x * 0.5, size.y * 0.5).build();
        self.colliders
            .insert_with_parent(collider, handle, &mut self.bodies);
        self.register(handle)
    }

    fn remove_body(&mut self, body: BodyId) {
        let Some(handle) = self.handles.remove(&body) else {
            log::warn!("remove_body: unknown body {:?}", body);
            return;
        };
        // Springs die with their body
        let dangling: Vec<SpringId> = self
            .springs
            .iter()
            .filter(|(_, s)| s.body == handle)
            .map(|(id, _)| *id)
            .collect();
        for spring in dangling {
            self.remove_spring(spring);
        }
        self.remove_handle(handle);
    }

    fn body_pose(&self, body: BodyId) -> Option<Pose> {
        let handle = self.handles.get(&body)?;
        self.bodies.get(*handle).map(|rb| na_iso_to_pose(rb.position()))
    }

    fn bodies_at_point(&self, candidates: &[BodyId], point: Vec2) -> Vec<BodyId> {
        let point = point_to_na(point);
        candidates
            .iter()
            .copied()
            .filter(|id| {
                self.handles
                    .get(id)
                    .is_some_and(|handle| self.body_contains(*handle, &point))
            })
            .collect()
    }

    fn add_spring(&mut self, desc: &SpringDesc) -> Option<SpringId> {
        let body = *self.handles.get(&desc.body)?;
        let mass = self.collider_mass(body)?;

        // Convert "fraction per step" into force-based spring coefficients
        let dt = self.integration_parameters.dt;
        let stiffness = desc.stiffness * mass / (dt * dt);
        let damping = desc.damping * mass / dt;

        let anchor = RigidBodyBuilder::kinematic_position_based()
            .translation(vec2_to_na(desc.target))
            .build();
        let anchor = self.bodies.insert(anchor);

        let joint = SpringJointBuilder::new(0.0, stiffness, damping)
            .local_anchor1(Point2::origin())
            .local_anchor2(point_to_na(desc.local_anchor))
            .build();
        let joint = self.impulse_joints.insert(anchor, body, joint, true);

        let id = SpringId(self.next_spring);
        self.next_spring += 1;
        self.springs.insert(
            id,
            PointerSpring {
                anchor,
                joint,
                body,
            },
        );
        Some(id)
    }

    fn set_spring_target(&mut self, spring: SpringId, target: Vec2) {
        let Some(s) = self.springs.get(&spring).copied() else {
            return;
        };
        if let Some(anchor) = self.bodies.get_mut(s.anchor) {
            anchor.set_next_kinematic_translation(vec2_to_na(target));
        }
        if let Some(rb) = self.bodies.get_mut(s.body) {
            rb.wake_up(true);
        }
    }

    fn remove_spring(&mut self, spring: SpringId) {
        let Some(s) = self.springs.remove(&spring) else {
            return;
        };
        self.impulse_joints.remove(s.joint, true);
        self.remove_handle(s.anchor);
    }

    fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        let gravity = vec2_to_na(self.gravity * self.gravity_scale);
        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }

    fn body_count(&self) -> usize {
        self.handles.len()
    }

    fn spring_count(&self) -> usize {
        self.springs.len()
    }
}
