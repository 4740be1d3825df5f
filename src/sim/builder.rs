//! Compound rigid body for a key
//!
//! Turns a [`KeyLayout`] into head, shaft and notch parts, then registers the
//! compound with the physics world placed and rotated as one unit.

use glam::Vec2;

use super::layout::KeyLayout;
use super::shape::ShapeParameters;
use crate::consts::*;
use crate::physics::{BodyId, CompoundDesc, Material, Part, PartShape, PhysicsWorld, Pose};

/// Material every key is built with
pub const KEY_MATERIAL: Material = Material {
    friction: KEY_FRICTION,
    restitution: KEY_RESTITUTION,
    air_drag: KEY_AIR_DRAG,
};

/// Describe the compound body for a key; parts are head, shaft, then notches
/// in index order.
pub fn key_compound_desc(
    placement: Pose,
    box_size: Vec2,
    params: &ShapeParameters,
) -> CompoundDesc {
    let layout = KeyLayout::new(box_size.x, params);

    let mut parts = Vec::with_capacity(2 + layout.notches.len());
    parts.push(Part {
        name: "head",
        offset: layout.head.center,
        shape: PartShape::Ellipse {
            width: layout.head.size.x,
            height: layout.head.size.y,
        },
        density: Some(HEAD_DENSITY),
    });
    parts.push(Part {
        name: "shaft",
        offset: layout.shaft.center,
        shape: PartShape::Rect {
            width: layout.shaft.size.x,
            height: layout.shaft.size.y,
        },
        density: None,
    });
    parts.extend(layout.notches.iter().map(|notch| Part {
        name: "notch",
        offset: notch.center,
        shape: PartShape::Rect {
            width: notch.size.x,
            height: notch.size.y,
        },
        density: None,
    }));

    CompoundDesc {
        parts,
        material: KEY_MATERIAL,
        position: placement.position,
        angle: placement.angle,
    }
}

/// Build and register a key body
pub fn build_key_body<W: PhysicsWorld + ?Sized>(
    world: &mut W,
    placement: Pose,
    box_size: Vec2,
    params: &ShapeParameters,
) -> BodyId {
    let desc = key_compound_desc(placement, box_size, params);
    let body = world.add_compound(&desc);
    log::debug!(
        "Built key body {:?}: {} parts at ({:.1}, {:.1})",
        body,
        desc.parts.len(),
        placement.position.x,
        placement.position.y
    );
    body
}
