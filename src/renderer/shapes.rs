//! Shape tessellation for 2D primitives
//!
//! All generators emit triangle lists in the caller's frame; the canvas
//! applies its current transform afterwards.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Segment count for an ellipse whose larger radius is `radius` pixels
pub fn ellipse_segments(radius: f32) -> u32 {
    ((radius * 0.75) as u32).clamp(12, 64)
}

/// Generate vertices for a filled ellipse
pub fn ellipse(center: Vec2, size: Vec2, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);
    let r = size * 0.5;

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + r.x * theta1.cos(),
            center.y + r.y * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + r.x * theta2.cos(),
            center.y + r.y * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for an elliptical outline of the given stroke weight
pub fn ellipse_outline(
    center: Vec2,
    size: Vec2,
    weight: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let outer = size * 0.5 + Vec2::splat(weight * 0.5);
    let inner = (size * 0.5 - Vec2::splat(weight * 0.5)).max(Vec2::ZERO);

    let at = |r: Vec2, theta: f32| center + Vec2::new(r.x * theta.cos(), r.y * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = at(inner, theta1);
        let outer1 = at(outer, theta1);
        let inner2 = at(inner, theta2);
        let outer2 = at(outer, theta2);

        // Two triangles per segment
        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Two triangles covering a quad given in winding order
pub fn quad(corners: [Vec2; 4], color: [f32; 4]) -> Vec<Vertex> {
    let [a, b, c, d] = corners;
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(d.x, d.y, color),
        Vertex::new(a.x, a.y, color),
    ]
}

/// Corners of a center-anchored rectangle, clockwise from top-left
pub fn rect_corners(center: Vec2, size: Vec2) -> [Vec2; 4] {
    let h = size * 0.5;
    [
        center + Vec2::new(-h.x, -h.y),
        center + Vec2::new(h.x, -h.y),
        center + Vec2::new(h.x, h.y),
        center + Vec2::new(-h.x, h.y),
    ]
}

/// Generate vertices for a filled, center-anchored rectangle
pub fn rect(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    quad(rect_corners(center, size), color)
}

/// Generate vertices for a rectangular outline (stroke centered on the edge)
pub fn rect_outline(center: Vec2, size: Vec2, weight: f32, color: [f32; 4]) -> Vec<Vertex> {
    let h = size * 0.5;
    let w = weight;
    let mut vertices = Vec::with_capacity(24);
    // Top, bottom, left, right bands
    vertices.extend(rect(center - Vec2::new(0.0, h.y), Vec2::new(size.x + w, w), color));
    vertices.extend(rect(center + Vec2::new(0.0, h.y), Vec2::new(size.x + w, w), color));
    vertices.extend(rect(center - Vec2::new(h.x, 0.0), Vec2::new(w, size.y + w), color));
    vertices.extend(rect(center + Vec2::new(h.x, 0.0), Vec2::new(w, size.y + w), color));
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0; 4];

    #[test]
    fn test_ellipse_vertex_count_and_extent() {
        let verts = ellipse(Vec2::new(10.0, 20.0), Vec2::new(40.0, 20.0), WHITE, 16);
        assert_eq!(verts.len(), 16 * 3);
        let max_x = verts.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
        let max_y = verts.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        assert!((max_x - 30.0).abs() < 1e-3);
        assert!(max_y <= 30.0 + 1e-3);
    }

    #[test]
    fn test_rect_covers_corners() {
        let verts = rect(Vec2::ZERO, Vec2::new(10.0, 4.0), WHITE);
        assert_eq!(verts.len(), 6);
        assert!(verts.iter().any(|v| v.position == [-5.0, -2.0]));
        assert!(verts.iter().any(|v| v.position == [5.0, 2.0]));
    }

    #[test]
    fn test_rect_outline_has_four_bands() {
        assert_eq!(rect_outline(Vec2::ZERO, Vec2::new(10.0, 10.0), 1.0, WHITE).len(), 24);
    }

    #[test]
    fn test_segments_clamped() {
        assert_eq!(ellipse_segments(1.0), 12);
        assert_eq!(ellipse_segments(10_000.0), 64);
    }

    #[test]
    fn test_ellipse_outline_inner_never_negative() {
        let verts = ellipse_outline(Vec2::ZERO, Vec2::new(2.0, 2.0), 10.0, WHITE, 12);
        assert_eq!(verts.len(), 12 * 6);
        assert!(verts.iter().all(|v| v.position[0].is_finite()));
    }
}
