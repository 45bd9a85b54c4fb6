// Signed distance to the glass outline.
// Negative inside, positive outside, zero exactly on the edge.
// Visual: every other stage (mask, bend, highlight, shadow) is driven by this one number.

use crate::params::{ParameterSet, ShapeVariant};
use crate::types::Vec2;
use std::f32::consts::TAU;

/// Star/hexagon/donut are sized relative to the smaller half-extent.
pub const RADIAL_SHAPE_SCALE: f32 = 0.8;

/// One glass outline, holding only what its own formula needs.
/// Points are measured from the glass center (the pointer).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeField {
    Rectangle { half_extents: Vec2, corner_radius: f32 },
    Circle { radius: f32 },
    Star { points: u32, outer: f32, inner: f32 },
    Hexagon { apothem: f32 },
    Donut { outer: f32, inner: f32 },
}

impl ShapeField {
    /// Pick and size the outline selected by `params.shape`.
    pub fn from_params(params: &ParameterSet) -> Self {
        let w = params.width.max(0.0);
        let h = params.height.max(0.0);
        let base = w.min(h);
        let radial = RADIAL_SHAPE_SCALE * base;

        match params.shape {
            ShapeVariant::Rectangle => ShapeField::Rectangle {
                half_extents: Vec2::new(w, h),
                corner_radius: params.corner_radius.clamp(0.0, base),
            },
            ShapeVariant::Circle => ShapeField::Circle { radius: base },
            ShapeVariant::Star => ShapeField::Star {
                points: params.star_points.max(2),
                outer: radial,
                inner: radial * params.star_inner_radius.clamp(0.0, 1.0),
            },
            ShapeVariant::Hexagon => ShapeField::Hexagon { apothem: radial },
            ShapeVariant::Donut => ShapeField::Donut {
                outer: radial,
                inner: radial * (1.0 - params.donut_thickness.clamp(0.0, 1.0)),
            },
        }
    }

    /// Signed distance at `p` (relative to the glass center).
    pub fn distance(&self, p: Vec2) -> f32 {
        match *self {
            ShapeField::Rectangle { half_extents, corner_radius } => {
                sdf_rounded_rect(p, half_extents, corner_radius)
            }
            ShapeField::Circle { radius } => p.length() - radius,
            ShapeField::Star { points, outer, inner } => sdf_star(p, points, outer, inner),
            ShapeField::Hexagon { apothem } => sdf_hexagon(p, apothem),
            ShapeField::Donut { outer, inner } => {
                let r = p.length();
                (r - outer).max(inner - r)
            }
        }
    }
}

/// Box minus rounding: shrink the box by `r`, take the box distance, subtract `r` again.
fn sdf_rounded_rect(p: Vec2, b: Vec2, r: f32) -> f32 {
    let q = p.abs() - b + Vec2::new(r, r);
    q.max(0.0).length() + q.x.max(q.y).min(0.0) - r
}

/// Boundary radius at the angle of `p`, linear between valley (segment bisector)
/// and tip (segment edge). Both sides of every seam see t = 1, so no jump.
pub(crate) fn star_boundary_radius(p: Vec2, points: u32, outer: f32, inner: f32) -> f32 {
    let segment = TAU / points.max(2) as f32;
    let half = segment * 0.5;
    let angle = p.y.atan2(p.x).rem_euclid(segment);
    let t = ((angle - half).abs() / half).clamp(0.0, 1.0);
    inner + (outer - inner) * t
}

fn sdf_star(p: Vec2, points: u32, outer: f32, inner: f32) -> f32 {
    p.length() - star_boundary_radius(p, points, outer, inner)
}

/// Flat-top hexagon: fold into one sextant by reflecting across the 60° edge normal,
/// then measure to the top edge segment.
fn sdf_hexagon(p: Vec2, r: f32) -> f32 {
    const K: (f32, f32, f32) = (-0.866_025_4, 0.5, 0.577_350_26);
    let k = Vec2::new(K.0, K.1);

    let mut q = p.abs();
    q = q - k * (2.0 * k.dot(q).min(0.0));
    q = q - Vec2::new(q.x.clamp(-K.2 * r, K.2 * r), r);
    let d = q.length();
    if q.y < 0.0 { -d } else { d }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(shape: ShapeVariant) -> ParameterSet {
        ParameterSet {
            shape,
            width: 50.0,
            height: 50.0,
            corner_radius: 10.0,
            star_points: 5,
            star_inner_radius: 0.5,
            donut_thickness: 0.5,
            ..ParameterSet::default()
        }
    }

    #[test]
    fn test_sign_convention() {
        for shape in ShapeVariant::ALL {
            let f = ShapeField::from_params(&params(shape));
            // Donut is hollow at the center; probe its ring instead.
            let inside = if shape == ShapeVariant::Donut { Vec2::new(30.0, 0.0) } else { Vec2::ZERO };
            assert!(f.distance(inside) < 0.0, "{shape} inside");
            assert!(f.distance(Vec2::new(500.0, 3.0)) > 0.0, "{shape} outside");
        }
    }

    #[test]
    fn test_rectangle_edges() {
        let f = ShapeField::from_params(&ParameterSet {
            width: 100.0,
            height: 60.0,
            corner_radius: 0.0,
            ..ParameterSet::default()
        });
        assert!((f.distance(Vec2::new(100.0, 0.0))).abs() < 1e-4);
        assert!((f.distance(Vec2::new(0.0, 60.0))).abs() < 1e-4);
        assert!((f.distance(Vec2::ZERO) + 60.0).abs() < 1e-4);
        // outside a sharp corner the distance is Euclidean
        assert!((f.distance(Vec2::new(103.0, 64.0)) - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_corner_radius_is_clamped() {
        let f = ShapeField::from_params(&ParameterSet {
            width: 20.0,
            height: 10.0,
            corner_radius: 500.0,
            ..ParameterSet::default()
        });
        match f {
            ShapeField::Rectangle { corner_radius, .. } => assert_eq!(corner_radius, 10.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_hexagon_flat_top() {
        let f = ShapeField::from_params(&params(ShapeVariant::Hexagon));
        let apothem = 0.8 * 50.0;
        assert!(f.distance(Vec2::new(0.0, apothem)).abs() < 1e-3);
        assert!(f.distance(Vec2::new(0.0, -apothem)).abs() < 1e-3);
        // vertices sit on the x axis at apothem / cos(30°)
        let vertex = apothem / (3.0f32.sqrt() / 2.0);
        assert!(f.distance(Vec2::new(vertex, 0.0)).abs() < 1e-2);
    }

    #[test]
    fn test_donut_ring() {
        let f = ShapeField::from_params(&params(ShapeVariant::Donut));
        // outer 40, inner 20
        assert!((f.distance(Vec2::ZERO) - 20.0).abs() < 1e-4);
        assert!((f.distance(Vec2::new(30.0, 0.0)) + 10.0).abs() < 1e-4);
        assert!(f.distance(Vec2::new(0.0, 40.0)).abs() < 1e-4);
        assert!(f.distance(Vec2::new(0.0, -20.0)).abs() < 1e-4);
    }

    #[test]
    fn test_star_tips_and_valleys() {
        let f = ShapeField::from_params(&params(ShapeVariant::Star));
        let outer = 0.8 * 50.0;
        let segment = TAU / 5.0;
        for k in 0..5 {
            let tip = k as f32 * segment;
            let valley = tip + segment * 0.5;
            let at = |a: f32, r: f32| Vec2::new(r * a.cos(), r * a.sin());

            // distance = radius - boundary, so boundary = radius - distance
            let tip_boundary = 60.0 - f.distance(at(tip, 60.0));
            let valley_boundary = 60.0 - f.distance(at(valley, 60.0));
            assert!((tip_boundary - outer).abs() < 1e-3, "tip {k}: {tip_boundary}");
            assert!((valley_boundary - outer * 0.5).abs() < 1e-3, "valley {k}: {valley_boundary}");
        }
    }

    #[test]
    fn test_all_shapes_are_continuous() {
        let eps = 1e-3_f32;
        for shape in ShapeVariant::ALL {
            let f = ShapeField::from_params(&params(shape));
            // sweep a few rings, including ones crossing the donut's inner/outer edges
            for r in [10.0_f32, 20.0, 30.0, 40.0, 55.0] {
                for i in 0..720 {
                    let a = i as f32 / 720.0 * TAU - std::f32::consts::PI;
                    let p = Vec2::new(r * a.cos(), r * a.sin());
                    let q = Vec2::new(r * (a + eps / r).cos(), r * (a + eps / r).sin());
                    let d = (f.distance(p) - f.distance(q)).abs();
                    assert!(d < 10.0 * eps, "{shape} jump {d} at r={r} a={a}");
                }
            }
        }
    }

    #[test]
    fn test_donut_is_continuous_across_the_ring() {
        let f = ShapeField::from_params(&params(ShapeVariant::Donut));
        // outer 40, inner 20: walk outward through 20, the (20+40)/2 crossover and 40
        let step = 0.01_f32;
        for a in [0.0_f32, 1.0, 2.5, -2.0] {
            let dir = Vec2::new(a.cos(), a.sin());
            let mut prev = f.distance(Vec2::ZERO);
            for i in 1..=6000 {
                let r = i as f32 * step;
                let d = f.distance(dir * r);
                // a distance field never changes faster than the point moves
                assert!((d - prev).abs() <= step + 1e-3, "jump {prev} -> {d} at r={r} a={a}");
                prev = d;
            }
            assert!((f.distance(dir * 30.0) + 10.0).abs() < 1e-3);
            assert!(f.distance(dir * 19.9) > 0.0 && f.distance(dir * 20.1) < 0.0);
            assert!(f.distance(dir * 39.9) < 0.0 && f.distance(dir * 40.1) > 0.0);
        }
    }

    #[test]
    fn test_star_wraps_at_pi() {
        let f = ShapeField::from_params(&params(ShapeVariant::Star));
        let a = f.distance(Vec2::new(-30.0, 1e-6));
        let b = f.distance(Vec2::new(-30.0, -1e-6));
        assert!((a - b).abs() < 1e-3);
    }

    #[test]
    fn test_zero_size_shapes_are_finite() {
        for shape in ShapeVariant::ALL {
            let f = ShapeField::from_params(&ParameterSet {
                shape,
                width: 0.0,
                height: 0.0,
                ..ParameterSet::default()
            });
            assert!(f.distance(Vec2::ZERO).is_finite());
            assert!(f.distance(Vec2::new(3.0, -4.0)).is_finite());
        }
    }
}
