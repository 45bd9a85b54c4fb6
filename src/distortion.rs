// Bends the sampling coordinate near the glass edge.
// Visual: the background looks refracted toward the rim, untouched near the middle.

use crate::shape::ShapeField;
use crate::types::Vec2;

/// Half-width of the central-difference stencil, in pixels.
pub const GRADIENT_EPSILON: f32 = 1.0;

/// Edge proximity exponent shared by the bend falloff and the highlight.
pub const EDGE_FALLOFF_POWER: i32 = 12;

const BEND_STRENGTH: f32 = -0.05;

/// `sdf / height + 1`: about 0 deep inside, exactly 1 on the edge.
/// A zero height has no meaningful scale, so it reports "deep inside".
#[inline]
pub fn normalized_sdf(sdf: f32, height: f32) -> f32 {
    if height > 0.0 && height.is_finite() { sdf / height + 1.0 } else { 0.0 }
}

/// `normalized_sdf ^ 12`: 0 in the middle, 1 at the rim.
#[inline]
pub fn edge_falloff(normalized: f32) -> f32 {
    normalized.powi(EDGE_FALLOFF_POWER)
}

/// Outward unit normal of the outline at `p`, or None on a flat spot.
pub fn gradient(shape: &ShapeField, p: Vec2) -> Option<Vec2> {
    let e = GRADIENT_EPSILON;
    let dx = shape.distance(p + Vec2::new(e, 0.0)) - shape.distance(p - Vec2::new(e, 0.0));
    let dy = shape.distance(p + Vec2::new(0.0, e)) - shape.distance(p - Vec2::new(0.0, e));
    Vec2::new(dx, dy).normalized()
}

/// UV offset to add to the sampling coordinate at `p` (relative to the glass center).
/// Returns exactly zero when `distortion` is 0, the height is degenerate, or the field is flat.
pub fn displacement(shape: &ShapeField, p: Vec2, distortion: f32, height: f32) -> Vec2 {
    if !(distortion > 0.0) || !(height > 0.0) {
        return Vec2::ZERO;
    }
    let Some(normal) = gradient(shape, p) else {
        return Vec2::ZERO;
    };

    let t = edge_falloff(normalized_sdf(shape.distance(p), height));
    let offset = normal * (BEND_STRENGTH * distortion * t);
    if offset.x.is_finite() && offset.y.is_finite() { offset } else { Vec2::ZERO }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParameterSet, ShapeVariant};

    fn circle() -> ShapeField {
        ShapeField::from_params(&ParameterSet {
            shape: ShapeVariant::Circle,
            width: 50.0,
            height: 50.0,
            ..ParameterSet::default()
        })
    }

    #[test]
    fn test_zero_distortion_is_exactly_zero() {
        for shape in ShapeVariant::ALL {
            let f = ShapeField::from_params(&ParameterSet { shape, ..ParameterSet::default() });
            for (x, y) in [(0.0, 0.0), (49.0, 0.0), (-12.0, 33.0), (300.0, -300.0)] {
                assert_eq!(displacement(&f, Vec2::new(x, y), 0.0, 100.0), Vec2::ZERO);
            }
        }
    }

    #[test]
    fn test_flat_gradient_gives_zero() {
        // circle center: every difference cancels out
        assert_eq!(displacement(&circle(), Vec2::ZERO, 5.0, 50.0), Vec2::ZERO);
    }

    #[test]
    fn test_bend_points_inward_at_rim() {
        let d = displacement(&circle(), Vec2::new(50.0, 0.0), 1.0, 50.0);
        // gradient points outward (+x); the bend pulls samples inward by 0.05 at the rim
        assert!((d.x + 0.05).abs() < 1e-3, "{d:?}");
        assert!(d.y.abs() < 1e-4);
    }

    #[test]
    fn test_bend_fades_toward_center() {
        let rim = displacement(&circle(), Vec2::new(49.0, 0.0), 1.0, 50.0).length();
        let mid = displacement(&circle(), Vec2::new(25.0, 0.0), 1.0, 50.0).length();
        assert!(mid < rim * 0.01);
    }

    #[test]
    fn test_zero_height_is_noop() {
        assert_eq!(displacement(&circle(), Vec2::new(50.0, 0.0), 3.0, 0.0), Vec2::ZERO);
        assert_eq!(normalized_sdf(-4.0, 0.0), 0.0);
    }
}
