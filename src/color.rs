// Color grading for the glass fill: saturation, tint, then a bright rim.
// None of these clamp; the final pack to 0x00RRGGBB does that.

use crate::distortion::edge_falloff;
use crate::params::ParameterSet;
use crate::types::Rgb;

/// Peak brightness added right at the outline.
pub const HIGHLIGHT_MAX: f32 = 0.3;

/// Rec.601 luma.
#[inline]
pub fn luma(c: Rgb) -> f32 {
    0.299 * c.r + 0.587 * c.g + 0.114 * c.b
}

/// 0 = grayscale, 1 = unchanged, >1 = boosted (extrapolates, no clamp).
#[inline]
pub fn saturate(c: Rgb, factor: f32) -> Rgb {
    let l = luma(c);
    Rgb::new(l, l, l).mix(c, factor)
}

/// Brightness added to every channel for a pixel at this edge proximity.
#[inline]
pub fn edge_highlight(normalized_sdf: f32) -> f32 {
    HIGHLIGHT_MAX * edge_falloff(normalized_sdf).clamp(0.0, 1.0)
}

/// The per-frame grading settings pulled out of a ParameterSet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorAdjuster {
    pub saturation: f32,
    pub tint: Rgb,
}

impl ColorAdjuster {
    pub fn from_params(params: &ParameterSet) -> Self {
        Self {
            saturation: params.saturation,
            tint: Rgb::new(params.tint[0], params.tint[1], params.tint[2]),
        }
    }

    /// Saturate, tint, then add the rim highlight.
    pub fn apply(&self, c: Rgb, normalized_sdf: f32) -> Rgb {
        saturate(c, self.saturation)
            .mul(self.tint)
            .add_scalar(edge_highlight(normalized_sdf))
    }
}
