// Core value types shared by every stage of the glass pipeline.

use std::ops::{Add, Mul, Sub};

/// Packed output surface handed to the window each frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    /// All-black surface of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Reallocate to a new presentation size. Returns true when the size changed.
    /// Visual: on window resize the next frame fills the whole new area.
    pub fn resize(&mut self, width: usize, height: usize) -> bool {
        if self.width == width && self.height == height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, 0);
        true
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }
}

/// 2D point / vector in pixels or UV units depending on context.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    #[inline]
    pub fn dot(self, o: Vec2) -> f32 {
        self.x * o.x + self.y * o.y
    }

    #[inline]
    pub fn abs(self) -> Vec2 {
        Vec2::new(self.x.abs(), self.y.abs())
    }

    #[inline]
    pub fn max(self, v: f32) -> Vec2 {
        Vec2::new(self.x.max(v), self.y.max(v))
    }

    /// Unit vector, or None when the length is too small to trust.
    #[inline]
    pub fn normalized(self) -> Option<Vec2> {
        let len = self.length();
        if len.is_finite() && len > 1e-6 {
            Some(Vec2::new(self.x / len, self.y / len))
        } else {
            None
        }
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, o: Vec2) -> Vec2 {
        Vec2::new(self.x - o.x, self.y - o.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, s: f32) -> Vec2 {
        Vec2::new(self.x * s, self.y * s)
    }
}

/// Linear RGB triple in 0..1 (values outside the range are allowed mid-pipeline).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Unpack 0x00RRGGBB.
    #[inline]
    pub fn from_packed(px: u32) -> Self {
        Rgb::new(
            ((px >> 16) & 0xFF) as f32 / 255.0,
            ((px >> 8) & 0xFF) as f32 / 255.0,
            (px & 0xFF) as f32 / 255.0,
        )
    }

    /// Pack to 0x00RRGGBB. This is the only place channels get clamped;
    /// NaN collapses to 0 so it can never reach the screen.
    #[inline]
    pub fn to_packed(self) -> u32 {
        #[inline]
        fn ch(v: f32) -> u32 {
            let v = if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
            (v * 255.0).round() as u32
        }
        (ch(self.r) << 16) | (ch(self.g) << 8) | ch(self.b)
    }

    /// GLSL `mix(self, other, t)` = `self*(1-t) + other*t`; t = 0 and t = 1 are exact.
    #[inline]
    pub fn mix(self, other: Rgb, t: f32) -> Rgb {
        let s = 1.0 - t;
        Rgb::new(
            self.r * s + other.r * t,
            self.g * s + other.g * t,
            self.b * s + other.b * t,
        )
    }

    #[inline]
    pub fn scale(self, s: f32) -> Rgb {
        Rgb::new(self.r * s, self.g * s, self.b * s)
    }

    #[inline]
    pub fn mul(self, o: Rgb) -> Rgb {
        Rgb::new(self.r * o.r, self.g * o.g, self.b * o.b)
    }

    #[inline]
    pub fn add_scalar(self, v: f32) -> Rgb {
        Rgb::new(self.r + v, self.g + v, self.b + v)
    }
}

impl Add for Rgb {
    type Output = Rgb;
    fn add(self, o: Rgb) -> Rgb {
        Rgb::new(self.r + o.r, self.g + o.g, self.b + o.b)
    }
}
