//! Local-frame geometry of a key
//!
//! The single source of truth for where the head, shaft and notches sit
//! relative to the key's origin. The body builder turns it into colliders and
//! the renderer turns it into filled primitives, so what you see is what
//! collides.

use glam::Vec2;

use super::shape::ShapeParameters;

/// Share of the box width the head center is pushed left of the origin
const BOW_OFFSET: f32 = 0.3;
/// Share of the box width taken by the shaft
const SHAFT_SHARE: f32 = 0.7;
/// Share of the bow width the shaft overlaps
const BOW_OVERLAP: f32 = 0.6;
/// Share of the shaft (from the tip) that carries notches
const TIP_REGION: f32 = 0.35;
/// Notch width as a share of the notch spacing
const NOTCH_FILL: f32 = 0.7;
/// Scale of the hollow drawn inside the head
pub const HOLLOW_SCALE: f32 = 0.5;

/// Center and size of one axis-aligned local-frame primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalRect {
    pub center: Vec2,
    pub size: Vec2,
}

impl LocalRect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.size.x * 0.5 && d.y <= self.size.y * 0.5
    }
}

/// Resolved key geometry in its own frame (origin = box center)
#[derive(Debug, Clone, PartialEq)]
pub struct KeyLayout {
    /// Head ellipse (center, full width/height)
    pub head: LocalRect,
    pub shaft: LocalRect,
    /// One rectangle per used notch, in index order
    pub notches: Vec<LocalRect>,
}

impl KeyLayout {
    /// Lay out a key for a box `box_width` wide. The box height only enters
    /// through `params`, which were rolled from it.
    pub fn new(box_width: f32, params: &ShapeParameters) -> Self {
        let bow_x = -box_width * BOW_OFFSET;
        let shaft_width = box_width * SHAFT_SHARE;
        let shaft_x = bow_x + params.bow_width * BOW_OVERLAP + shaft_width / 2.0;

        let region_width = shaft_width * TIP_REGION;
        let region_start = shaft_x + shaft_width / 2.0 - region_width;
        let depths = params.used_depths();
        let spacing = region_width / (depths.len() as f32 + 1.0);

        let notches = depths
            .iter()
            .enumerate()
            .map(|(i, &depth)| {
                LocalRect::new(
                    Vec2::new(
                        region_start + spacing * (i as f32 + 1.0),
                        params.shaft_height / 2.0 + depth / 2.0,
                    ),
                    Vec2::new(spacing * NOTCH_FILL, depth),
                )
            })
            .collect();

        Self {
            head: LocalRect::new(
                Vec2::new(bow_x, 0.0),
                Vec2::new(params.bow_width, params.bow_height),
            ),
            shaft: LocalRect::new(
                Vec2::new(shaft_x, 0.0),
                Vec2::new(shaft_width, params.shaft_height),
            ),
            notches,
        }
    }

    /// The hollow drawn inside the head
    pub fn hollow(&self) -> LocalRect {
        LocalRect::new(self.head.center, self.head.size * HOLLOW_SCALE)
    }

    /// Whether a local-frame point lies on the key (head ellipse, shaft or a
    /// notch). The hollow is visual only and counts as solid.
    pub fn contains(&self, p: Vec2) -> bool {
        let half = self.head.size * 0.5;
        let d = (p - self.head.center) / half.max(Vec2::splat(f32::EPSILON));
        d.length_squared() <= 1.0
            || self.shaft.contains(p)
            || self.notches.iter().any(|n| n.contains(p))
    }
}
