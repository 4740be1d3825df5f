//! Input dispatch and the per-frame tick
//!
//! Input callbacks only queue [`InputEvent`]s. Each frame the queue is applied
//! in arrival order, then gravity is refreshed from the tilt, the world steps
//! and the grab spring is moved to the pointer.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::gesture::PointerId;
use super::state::Sandbox;
use crate::physics::PhysicsWorld;
use crate::platform::{OrientationSample, PermissionError};

/// Platform input, already converted to surface pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    PointerDown { id: PointerId, x: f32, y: f32 },
    PointerMove { id: PointerId, x: f32, y: f32 },
    PointerUp { id: PointerId },
    /// Raw tilt in degrees (front/back, left/right)
    Orientation { x: f32, y: f32 },
    /// The user answered the permission prompt
    PermissionResult { granted: bool },
    /// The permission prompt failed outright
    PermissionFailed { message: String },
    Resize { w: f32, h: f32 },
    /// The page lost focus; any gesture in progress is abandoned
    FocusLost,
}

/// Apply one input event
pub fn apply_event<W: PhysicsWorld>(sandbox: &mut Sandbox<W>, event: &InputEvent) {
    match event {
        InputEvent::PointerDown { id, x, y } => sandbox.pointer_down(*id, Vec2::new(*x, *y)),
        InputEvent::PointerMove { id, x, y } => sandbox.pointer_move(*id, Vec2::new(*x, *y)),
        InputEvent::PointerUp { id } => sandbox.pointer_up(*id),
        InputEvent::Orientation { x, y } => {
            sandbox.set_orientation(OrientationSample::new(*x, *y))
        }
        InputEvent::PermissionResult { granted } => {
            let result = if *granted {
                Ok(())
            } else {
                Err(PermissionError::Denied)
            };
            sandbox.permission_result(result);
        }
        InputEvent::PermissionFailed { message } => {
            sandbox.permission_result(Err(PermissionError::Rejected(message.clone())))
        }
        InputEvent::Resize { w, h } => sandbox.resize(*w, *h),
        InputEvent::FocusLost => sandbox.cancel_gesture(),
    }
}

/// Advance the sandbox by one frame of `dt` seconds.
///
/// Events are always applied; nothing moves while the start screen is up.
pub fn tick<W: PhysicsWorld>(sandbox: &mut Sandbox<W>, events: &[InputEvent], dt: f32) {
    for event in events {
        apply_event(sandbox, event);
    }

    if !sandbox.is_running() {
        return;
    }

    sandbox.update_gravity();
    sandbox.world.step(dt);
    sandbox.gesture.update_link(&mut sandbox.world);
    sandbox.time_ticks += 1;
}
