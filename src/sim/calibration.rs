//! Tilt calibration and the tilt → gravity mapping
//!
//! The reading captured at calibration time becomes "level". Later readings
//! are taken relative to it and mapped linearly onto gravity, with the axes
//! crossed: front/back tilt (x) drives vertical gravity and left/right tilt
//! (y) drives horizontal gravity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{GRAVITY_LIMIT, GRAVITY_RANGE, TILT_RANGE};
use crate::linear_map;

/// Raw tilt offsets captured at calibration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationController {
    offset_x: f32,
    offset_y: f32,
    calibrated: bool,
}

impl CalibrationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current reading as level. Calling again re-zeroes.
    pub fn calibrate(&mut self, raw_x: f32, raw_y: f32) {
        self.offset_x = raw_x;
        self.offset_y = raw_y;
        self.calibrated = true;
        log::info!("Calibrated tilt at ({:.1}, {:.1})", raw_x, raw_y);
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn offsets(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    /// Gravity for a raw reading, None until calibrated
    pub fn compute_gravity(&self, raw_x: f32, raw_y: f32) -> Option<Vec2> {
        if !self.calibrated {
            return None;
        }
        let cal_x = raw_x - self.offset_x;
        let cal_y = raw_y - self.offset_y;
        Some(Vec2::new(tilt_to_gravity(cal_y), tilt_to_gravity(cal_x)))
    }
}

/// One axis: ±TILT_RANGE degrees → ±GRAVITY_RANGE, then the safety clamp
fn tilt_to_gravity(tilt: f32) -> f32 {
    linear_map(tilt, -TILT_RANGE, TILT_RANGE, -GRAVITY_RANGE, GRAVITY_RANGE)
        .clamp(-GRAVITY_LIMIT, GRAVITY_LIMIT)
}
