// Reads the background behind the glass: 5x5 gaussian taps, optional RGB split.
// Visual: blur > 0 frosts the glass; aberration > 0 adds red/blue fringes toward the rim.

use crate::types::{FrameBuffer, Rgb, Vec2};

/// Taps run from -KERNEL_REACH..=KERNEL_REACH on each axis (5x5).
const KERNEL_REACH: i32 = 2;

/// Aberration is expressed in hundredths of the screen.
pub const ABERRATION_UNIT: f32 = 0.01;
pub const RED_SHIFT_SCALE: f32 = 1.2;
pub const BLUE_SHIFT_SCALE: f32 = 0.8;

/// Fetches background colors in UV space for one frame.
/// `texture` is None while the background is not Ready; every read is then black.
pub struct Sampler<'a> {
    texture: Option<&'a FrameBuffer>,
    resolution: Vec2,
}

impl<'a> Sampler<'a> {
    /// `resolution` is the output surface size in pixels (tap spacing is 1/resolution).
    pub fn new(texture: Option<&'a FrameBuffer>, resolution: Vec2) -> Self {
        let texture = texture.filter(|t| t.width > 0 && t.height > 0);
        Self { texture, resolution }
    }

    /// Nearest texel at `uv`, clamped to the edge.
    #[inline]
    pub fn texel(&self, uv: Vec2) -> Rgb {
        let Some(tex) = self.texture else {
            return Rgb::BLACK;
        };
        let fx = if uv.x.is_finite() { uv.x * tex.width as f32 } else { 0.0 };
        let fy = if uv.y.is_finite() { uv.y * tex.height as f32 } else { 0.0 };
        let x = (fx.floor().max(0.0) as usize).min(tex.width - 1);
        let y = (fy.floor().max(0.0) as usize).min(tex.height - 1);
        Rgb::from_packed(tex.get(x, y))
    }

    /// Gaussian-weighted 5x5 average around `uv`; `blur` is the tap spacing in pixels.
    /// blur <= 0 is a plain texel read.
    pub fn sample(&self, uv: Vec2, blur: f32) -> Rgb {
        if !(blur > 0.0) || !blur.is_finite() || self.texture.is_none() {
            return self.texel(uv);
        }

        let step = Vec2::new(
            if self.resolution.x > 0.0 { blur / self.resolution.x } else { 0.0 },
            if self.resolution.y > 0.0 { blur / self.resolution.y } else { 0.0 },
        );
        let denom = 2.0 * blur * blur;
        // tiny blurs underflow the gaussian denominator to zero
        if !(denom > f32::MIN_POSITIVE) {
            return self.texel(uv);
        }

        let mut sum = Rgb::BLACK;
        let mut total = 0.0_f32;
        for dy in -KERNEL_REACH..=KERNEL_REACH {
            for dx in -KERNEL_REACH..=KERNEL_REACH {
                let (fx, fy) = (dx as f32, dy as f32);
                let w = (-(fx * fx + fy * fy) / denom).exp();
                let tap = self.texel(uv + Vec2::new(fx * step.x, fy * step.y));
                sum = sum + tap.scale(w);
                total += w;
            }
        }

        // the center tap always weighs 1, so total >= 1
        if !total.is_finite() {
            return self.texel(uv);
        }
        sum.scale(1.0 / total)
    }

    /// `sample` with red pushed outward and blue pulled inward from the image center.
    /// aberration <= 0 is exactly `sample`.
    pub fn sample_aberrated(&self, uv: Vec2, blur: f32, aberration: f32) -> Rgb {
        if !(aberration > 0.0) {
            return self.sample(uv, blur);
        }

        let dir = uv - Vec2::new(0.5, 0.5);
        let Some(radial) = dir.normalized() else {
            return self.sample(uv, blur);
        };
        let shift = aberration * dir.length() * ABERRATION_UNIT;

        let red = self.sample(uv + radial * (shift * RED_SHIFT_SCALE), blur);
        let green = self.sample(uv, blur);
        let blue = self.sample(uv - radial * (shift * BLUE_SHIFT_SCALE), blur);
        Rgb::new(red.r, green.g, blue.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 8x8 texture where every texel has a distinct color.
    fn gradient_texture() -> FrameBuffer {
        let mut fb = FrameBuffer::new(8, 8);
        for y in 0..8 {
            for x in 0..8 {
                fb.pixels[y * 8 + x] = ((x as u32 * 30) << 16) | ((y as u32 * 30) << 8) | 0x40;
            }
        }
        fb
    }

    fn uv_of(x: usize, y: usize) -> Vec2 {
        Vec2::new((x as f32 + 0.5) / 8.0, (y as f32 + 0.5) / 8.0)
    }

    #[test]
    fn test_zero_blur_returns_exact_texel() {
        let tex = gradient_texture();
        let s = Sampler::new(Some(&tex), Vec2::new(8.0, 8.0));
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(s.sample(uv_of(x, y), 0.0).to_packed(), tex.get(x, y));
            }
        }
    }

    #[test]
    fn test_blur_of_flat_color_is_flat() {
        let mut tex = FrameBuffer::new(8, 8);
        tex.pixels.fill(0x00336699);
        let s = Sampler::new(Some(&tex), Vec2::new(8.0, 8.0));
        assert_eq!(s.sample(uv_of(4, 4), 3.0).to_packed(), 0x00336699);
    }

    #[test]
    fn test_blur_mixes_neighbours() {
        let tex = gradient_texture();
        let s = Sampler::new(Some(&tex), Vec2::new(8.0, 8.0));
        let sharp = s.sample(uv_of(0, 4), 0.0);
        let soft = s.sample(uv_of(0, 4), 1.0);
        // column 0 is the darkest red; blurring pulls in brighter columns
        assert!(soft.r > sharp.r);
    }

    #[test]
    fn test_edges_clamp() {
        let tex = gradient_texture();
        let s = Sampler::new(Some(&tex), Vec2::new(8.0, 8.0));
        assert_eq!(s.texel(Vec2::new(-3.0, -3.0)).to_packed(), tex.get(0, 0));
        assert_eq!(s.texel(Vec2::new(9.0, 9.0)).to_packed(), tex.get(7, 7));
        assert_eq!(s.texel(Vec2::new(f32::NAN, 0.0)).to_packed(), tex.get(0, 0));
    }

    #[test]
    fn test_missing_texture_reads_black() {
        let s = Sampler::new(None, Vec2::new(8.0, 8.0));
        assert_eq!(s.sample(Vec2::new(0.5, 0.5), 2.0), Rgb::BLACK);
        assert_eq!(s.sample_aberrated(Vec2::new(0.1, 0.9), 2.0, 5.0), Rgb::BLACK);
    }

    #[test]
    fn test_aberration_splits_channels_off_center() {
        let tex = gradient_texture();
        let s = Sampler::new(Some(&tex), Vec2::new(8.0, 8.0));
        let uv = uv_of(6, 4);
        let plain = s.sample(uv, 0.0);
        let split = s.sample_aberrated(uv, 0.0, 40.0);
        // red moved outward (+x) onto a brighter column, green stays put
        assert!(split.r > plain.r);
        assert_eq!(split.g, plain.g);
    }

    #[test]
    fn test_aberration_scales_red_out_and_blue_in() {
        // one row; red and blue both encode the column, green is constant
        let mut tex = FrameBuffer::new(64, 1);
        for x in 0..64u32 {
            tex.pixels[x as usize] = ((x * 4) << 16) | (0x40 << 8) | (x * 4);
        }
        let s = Sampler::new(Some(&tex), Vec2::new(64.0, 1.0));
        let uv = Vec2::new(40.5 / 64.0, 0.5);

        // shift = 100 * 0.1328 * 0.01; red lands at +1.2x (column 50), blue at -0.8x (column 33)
        let split = s.sample_aberrated(uv, 0.0, 100.0);
        assert_eq!(split.to_packed(), (200 << 16) | (0x40 << 8) | 132);
    }

    #[test]
    fn test_vanishing_blur_reads_texel() {
        let mut tex = FrameBuffer::new(4, 4);
        tex.pixels.fill(0x00336699);
        let s = Sampler::new(Some(&tex), Vec2::new(4.0, 4.0));
        for blur in [1e-23, 1e-20, 1e-19] {
            assert_eq!(s.sample(Vec2::new(0.5, 0.5), blur).to_packed(), 0x00336699);
        }
        assert_eq!(s.sample_aberrated(Vec2::new(0.9, 0.5), 1e-23, 2.0).to_packed(), 0x00336699);
    }

    #[test]
    fn test_aberration_noop_at_center_and_zero() {
        let tex = gradient_texture();
        let s = Sampler::new(Some(&tex), Vec2::new(8.0, 8.0));
        let center = Vec2::new(0.5, 0.5);
        assert_eq!(s.sample_aberrated(center, 0.0, 10.0), s.sample(center, 0.0));
        assert_eq!(s.sample_aberrated(uv_of(1, 1), 1.0, 0.0), s.sample(uv_of(1, 1), 1.0));
    }
}
