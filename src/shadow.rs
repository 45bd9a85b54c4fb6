// Drop shadow under the glass, applied to the background only.
// Visual: a soft dark patch offset from the glass; the glass fill itself is never darkened.

use crate::params::ParameterSet;
use crate::shape::ShapeField;
use crate::types::{Rgb, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCompositor {
    pub intensity: f32,
    pub offset: Vec2,
    pub blur: f32,
}

impl ShadowCompositor {
    pub fn from_params(params: &ParameterSet) -> Self {
        Self {
            intensity: params.shadow_intensity,
            offset: Vec2::new(params.shadow_offset[0], params.shadow_offset[1]),
            blur: params.shadow_blur,
        }
    }

    /// Darkening amount in [0, intensity] at `p` (relative to the glass center).
    pub fn mask(&self, shape: &ShapeField, p: Vec2) -> f32 {
        if !(self.intensity > 0.0) {
            return 0.0;
        }
        let sdf = shape.distance(p - self.offset);
        let coverage = if self.blur > 0.0 {
            (1.0 - sdf / self.blur).clamp(0.0, 1.0)
        } else if sdf <= 0.0 {
            1.0
        } else {
            0.0
        };
        let m = coverage * self.intensity;
        if m.is_finite() { m } else { 0.0 }
    }

    /// `mix(bg, bg * (1 - m), m)`.
    #[inline]
    pub fn darken(bg: Rgb, m: f32) -> Rgb {
        bg.mix(bg.scale(1.0 - m), m)
    }

    /// Background with this pixel's shadow applied.
    pub fn apply(&self, shape: &ShapeField, p: Vec2, bg: Rgb) -> Rgb {
        let m = self.mask(shape, p);
        if m > 0.0 { Self::darken(bg, m) } else { bg }
    }
}
