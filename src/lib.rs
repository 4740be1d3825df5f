//! Key Drop - a tilt-driven physics sandbox
//!
//! Core modules:
//! - `sim`: Key synthesis, gesture state machine, calibration, sandbox context
//! - `physics`: Rigid body world boundary and its rapier2d implementation
//! - `renderer`: Drawing boundary, vertex tessellation and WebGPU pipeline
//! - `platform`: Device orientation permission model
//! - `settings`: Persisted preferences and tuning

pub mod physics;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{PreviewMode, Settings};

use glam::Vec2;

/// Sandbox configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one step per animation frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Smallest drag box (both sides, pixels) that commits a key
    pub const MIN_SIZE: f32 = 24.0;
    /// Thickness of the static walls enclosing the viewport
    pub const WALL_THICKNESS: f32 = 90.0;

    /// Key material
    pub const KEY_FRICTION: f32 = 0.3;
    pub const KEY_RESTITUTION: f32 = 0.2;
    /// Fraction of velocity lost per 60 Hz step to air
    pub const KEY_AIR_DRAG: f32 = 0.015;
    pub const HEAD_DENSITY: f32 = 0.002;
    pub const DEFAULT_DENSITY: f32 = 0.001;

    /// Grab spring defaults (fraction of the error corrected per step)
    pub const GRAB_STIFFNESS: f32 = 0.1;
    pub const GRAB_DAMPING: f32 = 0.1;

    /// Tilt input range (degrees) and the gravity range it maps onto
    pub const TILT_RANGE: f32 = 90.0;
    pub const GRAVITY_RANGE: f32 = 2.0;
    /// Hard safety clamp on each gravity component
    pub const GRAVITY_LIMIT: f32 = 5.0;

    /// Start button size (pixels)
    pub const START_BUTTON_W: f32 = 220.0;
    pub const START_BUTTON_H: f32 = 70.0;
}

/// Linear remap of `value` from `[from_lo, from_hi]` onto `[to_lo, to_hi]`.
///
/// Not clamped: values outside the source range extrapolate.
#[inline]
pub fn linear_map(value: f32, from_lo: f32, from_hi: f32, to_lo: f32, to_hi: f32) -> f32 {
    to_lo + (value - from_lo) / (from_hi - from_lo) * (to_hi - to_lo)
}

/// Rotate a point by `angle` radians around the origin
#[inline]
pub fn rotate(point: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(point)
}

/// Axis-aligned box spanned by two corners, as (center, size)
#[inline]
pub fn corners_to_box(a: Vec2, b: Vec2) -> (Vec2, Vec2) {
    ((a + b) * 0.5, (b - a).abs())
}
