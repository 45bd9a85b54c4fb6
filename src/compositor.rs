// Per-pixel glass composite: shadowed background, then the graded glass fill on top.
// Visual: what you see each frame is exactly `render_frame` of the current parameters.

use crate::color::ColorAdjuster;
use crate::distortion::{displacement, normalized_sdf};
use crate::params::ParameterSet;
use crate::sampler::Sampler;
use crate::shadow::ShadowCompositor;
use crate::shape::ShapeField;
use crate::types::{FrameBuffer, Rgb, Vec2};

/// Glass coverage for a signed distance: 1 inside, 0 one pixel outside, linear in between.
#[inline]
pub fn coverage(sdf: f32) -> f32 {
    if sdf.is_nan() {
        return 0.0;
    }
    1.0 - sdf.clamp(0.0, 1.0)
}

/// Everything derived from one ParameterSet, built once per frame.
pub struct FramePlan<'a> {
    params: ParameterSet,
    shape: ShapeField,
    adjuster: ColorAdjuster,
    shadow: ShadowCompositor,
    sampler: Sampler<'a>,
    center: Vec2,
    resolution: Vec2,
}

impl<'a> FramePlan<'a> {
    /// `params` are sanitized here; the caller's snapshot is left alone.
    pub fn new(params: &ParameterSet, texture: Option<&'a FrameBuffer>, width: usize, height: usize) -> Self {
        let params = params.sanitized();
        let resolution = Vec2::new(width as f32, height as f32);
        Self {
            shape: ShapeField::from_params(&params),
            adjuster: ColorAdjuster::from_params(&params),
            shadow: ShadowCompositor::from_params(&params),
            sampler: Sampler::new(texture, resolution),
            center: Vec2::new(params.center_x, params.center_y),
            resolution,
            params,
        }
    }

    pub fn shape(&self) -> &ShapeField {
        &self.shape
    }

    /// Final color of pixel (x, y), evaluated at the pixel center.
    pub fn shade(&self, x: usize, y: usize) -> Rgb {
        let frag = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        let p = frag - self.center;
        let uv = Vec2::new(
            if self.resolution.x > 0.0 { frag.x / self.resolution.x } else { 0.0 },
            if self.resolution.y > 0.0 { frag.y / self.resolution.y } else { 0.0 },
        );

        let bg = self.shadow.apply(&self.shape, p, self.sampler.texel(uv));

        let sdf = self.shape.distance(p);
        let mask = coverage(sdf);
        if mask <= 0.0 {
            return bg;
        }

        let bend = displacement(&self.shape, p, self.params.distortion, self.params.height);
        let raw = self.sampler.sample_aberrated(
            uv + bend,
            self.params.blur_radius,
            self.params.chromatic_aberration,
        );
        let glass = self.adjuster.apply(raw, normalized_sdf(sdf, self.params.height));
        bg.mix(glass, mask)
    }

    /// Fill `out` (already sized to the presentation surface).
    pub fn render_into(&self, out: &mut FrameBuffer) {
        let w = out.width;
        for (i, px) in out.pixels.iter_mut().enumerate() {
            *px = self.shade(i % w, i / w).to_packed();
        }
    }
}

/// Render one full frame of `params` over `texture` into `out`.
/// A missing texture renders as black with the glass still drawn over it.
pub fn render_frame(params: &ParameterSet, texture: Option<&FrameBuffer>, out: &mut FrameBuffer) {
    if out.width == 0 || out.height == 0 {
        return;
    }
    FramePlan::new(params, texture, out.width, out.height).render_into(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::edge_highlight;
    use crate::params::ShapeVariant;

    fn checker(width: usize, height: usize) -> FrameBuffer {
        let mut fb = FrameBuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                fb.pixels[y * width + x] = if (x / 7 + y / 5) % 2 == 0 { 0x00C08040 } else { 0x00204080 };
            }
        }
        fb
    }

    #[test]
    fn test_coverage_in_unit_range() {
        for sdf in [-1e9, -5.0, -0.0, 0.0, 0.25, 0.5, 1.0, 1.5, 1e9, f32::INFINITY, f32::NEG_INFINITY, f32::NAN] {
            let m = coverage(sdf);
            assert!((0.0..=1.0).contains(&m), "sdf {sdf} -> {m}");
        }
    }

    #[test]
    fn test_rectangle_center_is_background_plus_highlight() {
        let bg = checker(400, 300);
        let params = ParameterSet {
            shape: ShapeVariant::Rectangle,
            width: 100.0,
            height: 60.0,
            corner_radius: 0.0,
            distortion: 0.0,
            blur_radius: 0.0,
            chromatic_aberration: 0.0,
            tint: [1.0, 1.0, 1.0],
            saturation: 1.0,
            center_x: 200.0,
            center_y: 150.0,
            ..ParameterSet::default()
        };
        let plan = FramePlan::new(&params, Some(&bg), 400, 300);

        let (x, y) = (200, 150);
        let sdf = plan.shape().distance(Vec2::new(0.5, 0.5));
        let expected = Rgb::from_packed(bg.get(x, y)).add_scalar(edge_highlight(normalized_sdf(sdf, 60.0)));
        assert_eq!(plan.shade(x, y).to_packed(), expected.to_packed());
        assert_eq!(plan.shade(x, y).to_packed(), bg.get(x, y));
    }

    #[test]
    fn test_circle_mask_band() {
        let params = ParameterSet {
            shape: ShapeVariant::Circle,
            width: 50.0,
            height: 50.0,
            blur_radius: 0.0,
            center_x: 200.0,
            center_y: 200.0,
            ..ParameterSet::default()
        };
        let shape = ShapeField::from_params(&params.sanitized());
        for i in 0..360 {
            let a = (i as f32).to_radians();
            let dir = Vec2::new(a.cos(), a.sin());
            for r in [0.0_f32, 10.0, 49.0, 49.99] {
                assert_eq!(coverage(shape.distance(dir * r)), 1.0, "r={r}");
            }
            for r in [51.0_f32, 51.5, 80.0, 400.0] {
                assert_eq!(coverage(shape.distance(dir * r)), 0.0, "r={r}");
            }
        }
    }

    #[test]
    fn test_outside_glass_is_shadowed_background_only() {
        let bg = checker(120, 120);
        let params = ParameterSet {
            shape: ShapeVariant::Circle,
            width: 20.0,
            height: 20.0,
            center_x: 60.0,
            center_y: 60.0,
            shadow_intensity: 0.0,
            ..ParameterSet::default()
        };
        let mut out = FrameBuffer::new(120, 120);
        render_frame(&params, Some(&bg), &mut out);
        // far corner: no glass, no shadow
        assert_eq!(out.get(2, 2), bg.get(2, 2));
        assert_eq!(out.get(117, 110), bg.get(117, 110));
    }

    #[test]
    fn test_shadow_darkens_background_only() {
        let mut bg = FrameBuffer::new(100, 100);
        bg.pixels.fill(0x00808080);
        let params = ParameterSet {
            shape: ShapeVariant::Circle,
            width: 10.0,
            height: 10.0,
            center_x: 30.0,
            center_y: 30.0,
            shadow_intensity: 1.0,
            shadow_offset: [30.0, 30.0],
            shadow_blur: 0.0,
            ..ParameterSet::default()
        };
        let mut out = FrameBuffer::new(100, 100);
        render_frame(&params, Some(&bg), &mut out);
        // shadow center (60,60) is fully dark, far from the glass
        assert_eq!(out.get(60, 60), 0x00000000);
        assert_eq!(out.get(95, 5), 0x00808080);
    }

    #[test]
    fn test_missing_texture_still_renders() {
        let params = ParameterSet {
            width: 10.0,
            height: 10.0,
            center_x: 50.0,
            center_y: 50.0,
            ..ParameterSet::default()
        };
        let mut out = FrameBuffer::new(100, 100);
        out.pixels.fill(0x00FFFFFF);
        render_frame(&params, None, &mut out);
        assert_eq!(out.get(99, 99), 0x00000000);
        // the glass rim highlight still shows over the black
        assert_ne!(out.get(59, 50), 0x00000000);
    }

    #[test]
    fn test_nan_params_never_reach_pixels() {
        let bg = checker(64, 64);
        let params = ParameterSet {
            width: f32::NAN,
            height: f32::NAN,
            distortion: f32::INFINITY,
            blur_radius: f32::NAN,
            center_x: 32.0,
            center_y: 32.0,
            ..ParameterSet::default()
        };
        let mut out = FrameBuffer::new(64, 64);
        render_frame(&params, Some(&bg), &mut out);
        assert!(out.pixels.iter().all(|px| px & 0xFF00_0000 == 0));
    }

    #[test]
    fn test_mode_flag_is_inert() {
        let bg = checker(80, 80);
        let light = ParameterSet { center_x: 40.0, center_y: 40.0, ..ParameterSet::default() };
        let dark = ParameterSet { mode: crate::params::GlassMode::Dark, ..light.clone() };
        let (mut a, mut b) = (FrameBuffer::new(80, 80), FrameBuffer::new(80, 80));
        render_frame(&light, Some(&bg), &mut a);
        render_frame(&dark, Some(&bg), &mut b);
        assert_eq!(a, b);
    }
}
