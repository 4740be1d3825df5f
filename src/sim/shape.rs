//! Procedural key shape parameters
//!
//! A key is fully described by a handful of randomized proportions derived
//! from the box the user dragged. The same parameters drive both the collision
//! body and the drawing, see [`super::layout`].

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Notch depths are always rolled for the maximum count
pub const NOTCH_SLOTS: usize = 7;
pub const MIN_NOTCHES: u8 = 3;
pub const MAX_NOTCHES: u8 = 6;

/// Lowest value of each color channel
pub const COLOR_MIN: f32 = 40.0;
pub const COLOR_MAX: f32 = 255.0;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn gray(level: u8) -> Self {
        Self(level, level, level)
    }

    /// Normalized RGBA for vertex colors
    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [
            self.0 as f32 / 255.0,
            self.1 as f32 / 255.0,
            self.2 as f32 / 255.0,
            alpha,
        ]
    }
}

/// Randomized proportions of one key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeParameters {
    /// Head (bow) ellipse width, never more than half the box width
    pub bow_width: f32,
    /// Head (bow) ellipse height
    pub bow_height: f32,
    pub shaft_height: f32,
    /// Number of notches actually cut, 3..=6
    pub notch_count: u8,
    /// Only the first `notch_count` entries are used
    pub notch_depths: [f32; NOTCH_SLOTS],
    pub color: Rgb,
}

impl ShapeParameters {
    /// Depths of the notches that are actually cut
    pub fn used_depths(&self) -> &[f32] {
        let count = (self.notch_count as usize).min(NOTCH_SLOTS);
        &self.notch_depths[..count]
    }
}

/// Roll the parameters of a key that fills a `width` x `height` box.
///
/// Both sides are expected to be at least [`crate::consts::MIN_SIZE`]; smaller
/// boxes still produce valid (tiny) parameters.
pub fn generate_key_params<R: Rng>(rng: &mut R, width: f32, height: f32) -> ShapeParameters {
    let overall = height * 0.9;
    let shaft_height = overall * rng.random_range(0.25f32..0.35);

    let bow_guess = overall * rng.random_range(0.3f32..0.45) * rng.random_range(0.85f32..1.45);
    let bow_width = (width * 0.5).min(bow_guess);
    let bow_height = overall * rng.random_range(0.3f32..0.45);

    let notch_count = (rng.random_range(MIN_NOTCHES as f32..(MAX_NOTCHES + 1) as f32).floor()
        as u8)
        .clamp(MIN_NOTCHES, MAX_NOTCHES);

    let mut notch_depths = [0.0; NOTCH_SLOTS];
    for depth in notch_depths.iter_mut() {
        *depth = rng.random_range(shaft_height * 0.35..shaft_height * 1.05);
    }

    let mut channel = || rng.random_range(COLOR_MIN..COLOR_MAX) as u8;
    let color = Rgb(channel(), channel(), channel());

    ShapeParameters {
        bow_width,
        bow_height,
        shaft_height,
        notch_count,
        notch_depths,
        color,
    }
}
