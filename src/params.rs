// Everything one frame of the glass effect needs to know, plus the
// single-writer / single-reader handoff that moves it from the editor to the renderer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, RwLock};

/// Which signed distance formula draws the glass outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    #[default]
    Rectangle,
    Circle,
    Star,
    Hexagon,
    Donut,
}

impl ShapeVariant {
    pub const ALL: [ShapeVariant; 5] = [
        ShapeVariant::Rectangle,
        ShapeVariant::Circle,
        ShapeVariant::Star,
        ShapeVariant::Hexagon,
        ShapeVariant::Donut,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeVariant::Rectangle => "rectangle",
            ShapeVariant::Circle => "circle",
            ShapeVariant::Star => "star",
            ShapeVariant::Hexagon => "hexagon",
            ShapeVariant::Donut => "donut",
        }
    }

    /// Stable small integer used by the exported shader.
    pub fn index(self) -> u32 {
        match self {
            ShapeVariant::Rectangle => 0,
            ShapeVariant::Circle => 1,
            ShapeVariant::Star => 2,
            ShapeVariant::Hexagon => 3,
            ShapeVariant::Donut => 4,
        }
    }

    pub fn from_index(i: u32) -> Option<Self> {
        ShapeVariant::ALL.get(i as usize).copied()
    }
}

impl fmt::Display for ShapeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Light/dark glass. Carried and persisted, never read by the pixel math.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlassMode {
    #[default]
    Light,
    Dark,
}

impl GlassMode {
    pub fn toggled(self) -> Self {
        match self {
            GlassMode::Light => GlassMode::Dark,
            GlassMode::Dark => GlassMode::Light,
        }
    }
}

/// Immutable snapshot of every knob the glass effect has.
/// Field names serialize in camelCase so saved designs read like the editor's labels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSet {
    // geometry (half-extents in pixels)
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub shape: ShapeVariant,
    pub donut_thickness: f32,
    pub star_points: u32,
    pub star_inner_radius: f32,

    // pointer position (device pixels)
    pub center_x: f32,
    pub center_y: f32,

    // optics
    pub distortion: f32,
    pub blur_radius: f32,
    pub chromatic_aberration: f32,
    pub saturation: f32,
    pub tint: [f32; 3],

    // drop shadow
    pub shadow_intensity: f32,
    pub shadow_offset: [f32; 2],
    pub shadow_blur: f32,

    pub mode: GlassMode,

    // overlay (drawn by the HUD, not by the compositor)
    pub overlay_text: String,
    pub icon_size: f32,
    pub icon_color: [f32; 3],
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            width: 150.0,
            height: 100.0,
            corner_radius: 30.0,
            shape: ShapeVariant::Rectangle,
            donut_thickness: 0.4,
            star_points: 5,
            star_inner_radius: 0.5,
            center_x: 0.0,
            center_y: 0.0,
            distortion: 1.0,
            blur_radius: 2.0,
            chromatic_aberration: 0.0,
            saturation: 1.2,
            tint: [1.0, 1.0, 1.0],
            shadow_intensity: 0.3,
            shadow_offset: [8.0, 12.0],
            shadow_blur: 20.0,
            mode: GlassMode::Light,
            overlay_text: String::new(),
            icon_size: 24.0,
            icon_color: [1.0, 1.0, 1.0],
        }
    }
}

/// `v` if finite and >= 0, otherwise the fallback (negatives clamp to 0).
fn non_negative(v: f32, fallback: f32) -> f32 {
    if v.is_nan() || v.is_infinite() { fallback } else { v.max(0.0) }
}

fn unit(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { fallback }
}

fn finite(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

impl ParameterSet {
    /// Copy with every field forced into its documented range.
    /// The compositor only ever renders sanitized sets.
    pub fn sanitized(&self) -> ParameterSet {
        let d = ParameterSet::default();
        ParameterSet {
            width: non_negative(self.width, d.width),
            height: non_negative(self.height, d.height),
            corner_radius: non_negative(self.corner_radius, d.corner_radius),
            shape: self.shape,
            donut_thickness: unit(self.donut_thickness, d.donut_thickness),
            star_points: self.star_points.max(2),
            star_inner_radius: unit(self.star_inner_radius, d.star_inner_radius),
            center_x: finite(self.center_x, d.center_x),
            center_y: finite(self.center_y, d.center_y),
            distortion: non_negative(self.distortion, d.distortion),
            blur_radius: non_negative(self.blur_radius, d.blur_radius),
            chromatic_aberration: non_negative(self.chromatic_aberration, d.chromatic_aberration),
            saturation: non_negative(self.saturation, d.saturation),
            tint: [
                non_negative(self.tint[0], 1.0),
                non_negative(self.tint[1], 1.0),
                non_negative(self.tint[2], 1.0),
            ],
            shadow_intensity: unit(self.shadow_intensity, d.shadow_intensity),
            shadow_offset: [
                finite(self.shadow_offset[0], d.shadow_offset[0]),
                finite(self.shadow_offset[1], d.shadow_offset[1]),
            ],
            shadow_blur: non_negative(self.shadow_blur, d.shadow_blur),
            mode: self.mode,
            overlay_text: self.overlay_text.clone(),
            icon_size: non_negative(self.icon_size, d.icon_size),
            icon_color: [
                unit(self.icon_color[0], 1.0),
                unit(self.icon_color[1], 1.0),
                unit(self.icon_color[2], 1.0),
            ],
        }
    }

    /// Same parameters, glass moved under the pointer.
    pub fn at(&self, x: f32, y: f32) -> ParameterSet {
        ParameterSet { center_x: x, center_y: y, ..self.clone() }
    }
}

/// Editor-side handle: publishes whole new snapshots between frames.
/// The renderer grabs the latest `Arc` once at frame start and never sees a half-written set.
#[derive(Clone, Debug)]
pub struct ParamsHandle {
    current: Arc<RwLock<Arc<ParameterSet>>>,
}

impl ParamsHandle {
    pub fn new(initial: ParameterSet) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(initial))) }
    }

    /// Replace the published set wholesale.
    pub fn publish(&self, params: ParameterSet) {
        let next = Arc::new(params);
        match self.current.write() {
            Ok(mut slot) => *slot = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Latest published set (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<ParameterSet> {
        match self.current.read() {
            Ok(slot) => Arc::clone(&slot),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Read-modify-publish helper for the keyboard editor.
    pub fn update(&self, f: impl FnOnce(&mut ParameterSet)) {
        let mut next = (*self.snapshot()).clone();
        f(&mut next);
        self.publish(next);
    }
}
