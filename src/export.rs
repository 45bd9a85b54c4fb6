// Turns a saved design into a standalone GLSL fragment shader, and reads the values back.
// Visual: the exported shader, fed the same background, draws the same glass as the window.
//
// Every parameter becomes a `const` line with its value written out; the shader body
// below uses the same formulas as the shape/distortion/sampler/color/shadow modules.

use crate::error::{GlassError, Result};
use crate::library::Design;
use crate::params::{GlassMode, ParameterSet, ShapeVariant};
use std::collections::HashMap;
use std::fmt::Write as _;

const OVERLAY_TAG: &str = "// overlay_text: ";

/// Shortest text that parses back to the same f32 (Rust's `{:?}` guarantees this).
fn float_lit(v: f32) -> String {
    format!("{v:?}")
}

/// Full shader source for `design`. Parameters are sanitized first so every literal is finite.
pub fn export_design(design: &Design) -> String {
    let mut out = String::new();
    // writeln! into a String cannot fail
    let _ = writeln!(out, "#version 330 core");
    let _ = writeln!(out, "// glass-lens export: {}", design.name.replace('\n', " "));
    let _ = writeln!(out, "// background: {}", design.background_url.replace('\n', " "));
    let _ = writeln!(out, "// upload the background top row first, NEAREST filtering, CLAMP_TO_EDGE");
    out.push('\n');
    out.push_str(&export_constants(&design.params));
    out.push('\n');
    out.push_str(SHADER_BODY);
    out
}

/// Just the `const` block (plus the overlay text comment) for a parameter set.
pub fn export_constants(params: &ParameterSet) -> String {
    let p = params.sanitized();
    let f = |name: &str, v: f32| format!("const float {name} = {};\n", float_lit(v));
    let v2 = |name: &str, v: [f32; 2]| format!("const vec2 {name} = vec2({}, {});\n", float_lit(v[0]), float_lit(v[1]));
    let v3 = |name: &str, v: [f32; 3]| {
        format!("const vec3 {name} = vec3({}, {}, {});\n", float_lit(v[0]), float_lit(v[1]), float_lit(v[2]))
    };

    let mut s = String::new();
    s += &format!("const int SHAPE = {}; // {}\n", p.shape.index(), p.shape);
    s += &f("WIDTH", p.width);
    s += &f("HEIGHT", p.height);
    s += &f("CORNER_RADIUS", p.corner_radius);
    s += &f("DONUT_THICKNESS", p.donut_thickness);
    s += &format!("const int STAR_POINTS = {};\n", p.star_points);
    s += &f("STAR_INNER_RADIUS", p.star_inner_radius);
    s += &v2("CENTER", [p.center_x, p.center_y]);
    s += &f("DISTORTION", p.distortion);
    s += &f("BLUR_RADIUS", p.blur_radius);
    s += &f("CHROMATIC_ABERRATION", p.chromatic_aberration);
    s += &f("SATURATION", p.saturation);
    s += &v3("TINT", p.tint);
    s += &f("SHADOW_INTENSITY", p.shadow_intensity);
    s += &v2("SHADOW_OFFSET", p.shadow_offset);
    s += &f("SHADOW_BLUR", p.shadow_blur);
    s += &format!(
        "const int GLASS_MODE = {}; // not read by the shader\n",
        match p.mode {
            GlassMode::Light => 0,
            GlassMode::Dark => 1,
        }
    );
    s += &f("ICON_SIZE", p.icon_size);
    s += &v3("ICON_COLOR", p.icon_color);
    // serde_json string escaping keeps any text on one line and reversible
    let overlay = serde_json::to_string(&p.overlay_text).unwrap_or_else(|_| "\"\"".into());
    s += OVERLAY_TAG;
    s += &overlay;
    s.push('\n');
    s
}

/// Read the literal values back out of exported source.
pub fn parse_exported(source: &str) -> Result<ParameterSet> {
    let mut consts: HashMap<String, Vec<String>> = HashMap::new();
    let mut overlay_text = String::new();

    for line in source.lines().map(str::trim) {
        if let Some(json) = line.strip_prefix(OVERLAY_TAG) {
            overlay_text = serde_json::from_str(json)
                .map_err(|e| GlassError::Export(format!("overlay text: {e}")))?;
            continue;
        }
        let Some(decl) = line.strip_prefix("const ") else {
            continue;
        };
        // `<type> <NAME> = <value>; // comment`
        let decl = decl.split("//").next().unwrap_or("").trim().trim_end_matches(';');
        let Some((lhs, rhs)) = decl.split_once('=') else {
            continue;
        };
        let Some(name) = lhs.split_whitespace().nth(1) else {
            continue;
        };
        let rhs = rhs.trim();
        let parts = match rhs.find('(') {
            Some(open) => rhs[open + 1..]
                .trim_end_matches(')')
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            None => vec![rhs.to_string()],
        };
        consts.insert(name.to_string(), parts);
    }

    let consts = Constants(consts);
    let num = |name: &str, i: usize| consts.float(name, i);
    let int = |name: &str| consts.int(name);

    let shape_index = int("SHAPE")?;
    let shape = ShapeVariant::from_index(shape_index)
        .ok_or_else(|| GlassError::Export(format!("unknown shape {shape_index}")))?;
    let mode = match int("GLASS_MODE")? {
        0 => GlassMode::Light,
        1 => GlassMode::Dark,
        other => return Err(GlassError::Export(format!("unknown glass mode {other}"))),
    };

    Ok(ParameterSet {
        width: num("WIDTH", 0)?,
        height: num("HEIGHT", 0)?,
        corner_radius: num("CORNER_RADIUS", 0)?,
        shape,
        donut_thickness: num("DONUT_THICKNESS", 0)?,
        star_points: int("STAR_POINTS")?,
        star_inner_radius: num("STAR_INNER_RADIUS", 0)?,
        center_x: num("CENTER", 0)?,
        center_y: num("CENTER", 1)?,
        distortion: num("DISTORTION", 0)?,
        blur_radius: num("BLUR_RADIUS", 0)?,
        chromatic_aberration: num("CHROMATIC_ABERRATION", 0)?,
        saturation: num("SATURATION", 0)?,
        tint: [num("TINT", 0)?, num("TINT", 1)?, num("TINT", 2)?],
        shadow_intensity: num("SHADOW_INTENSITY", 0)?,
        shadow_offset: [num("SHADOW_OFFSET", 0)?, num("SHADOW_OFFSET", 1)?],
        shadow_blur: num("SHADOW_BLUR", 0)?,
        mode,
        overlay_text,
        icon_size: num("ICON_SIZE", 0)?,
        icon_color: [num("ICON_COLOR", 0)?, num("ICON_COLOR", 1)?, num("ICON_COLOR", 2)?],
    })
}

/// `NAME -> [component text]` scraped from the const block.
struct Constants(HashMap<String, Vec<String>>);

impl Constants {
    fn component(&self, name: &str, i: usize) -> Result<&str> {
        let parts = self
            .0
            .get(name)
            .ok_or_else(|| GlassError::Export(format!("missing constant {name}")))?;
        parts
            .get(i)
            .map(String::as_str)
            .ok_or_else(|| GlassError::Export(format!("{name} has no component {i}")))
    }

    fn float(&self, name: &str, i: usize) -> Result<f32> {
        let text = self.component(name, i)?;
        text.parse::<f32>()
            .map_err(|e| GlassError::Export(format!("{name}: {text:?}: {e}")))
    }

    fn int(&self, name: &str) -> Result<u32> {
        let text = self.component(name, 0)?;
        text.parse::<u32>()
            .map_err(|e| GlassError::Export(format!("{name}: {text:?}: {e}")))
    }
}

const SHADER_BODY: &str = r#"uniform sampler2D u_background;
uniform vec2 u_resolution;
out vec4 fragColor;

float pow12(float x) {
    float x2 = x * x;
    float x4 = x2 * x2;
    return x4 * x4 * x4;
}

float sdRoundedRect(vec2 p, vec2 b, float r) {
    vec2 q = abs(p) - b + vec2(r);
    return length(max(q, 0.0)) + min(max(q.x, q.y), 0.0) - r;
}

float sdStar(vec2 p, int n, float outerR, float innerR) {
    float segment = 6.283185307 / float(n);
    float halfSeg = segment * 0.5;
    float a = mod(atan(p.y, p.x), segment);
    float t = clamp(abs(a - halfSeg) / halfSeg, 0.0, 1.0);
    return length(p) - (innerR + (outerR - innerR) * t);
}

float sdHexagon(vec2 p, float r) {
    const vec3 k = vec3(-0.8660254, 0.5, 0.57735026);
    p = abs(p);
    p -= 2.0 * min(dot(k.xy, p), 0.0) * k.xy;
    p -= vec2(clamp(p.x, -k.z * r, k.z * r), r);
    return p.y < 0.0 ? -length(p) : length(p);
}

float shapeDistance(vec2 p) {
    float base = min(WIDTH, HEIGHT);
    float radial = 0.8 * base;
    if (SHAPE == 0) return sdRoundedRect(p, vec2(WIDTH, HEIGHT), clamp(CORNER_RADIUS, 0.0, base));
    if (SHAPE == 1) return length(p) - base;
    if (SHAPE == 2) return sdStar(p, max(STAR_POINTS, 2), radial, radial * STAR_INNER_RADIUS);
    if (SHAPE == 3) return sdHexagon(p, radial);
    float innerR = radial * (1.0 - DONUT_THICKNESS);
    float r = length(p);
    return max(r - radial, innerR - r);
}

float normalizedSdf(float sdf) {
    return HEIGHT > 0.0 ? sdf / HEIGHT + 1.0 : 0.0;
}

vec3 texel(vec2 uv) {
    return texture(u_background, uv).rgb;
}

vec3 blurSample(vec2 uv, float blur) {
    if (blur <= 0.0) return texel(uv);
    vec3 sum = vec3(0.0);
    float total = 0.0;
    for (int dy = -2; dy <= 2; dy++) {
        for (int dx = -2; dx <= 2; dx++) {
            vec2 o = vec2(float(dx), float(dy));
            float w = exp(-dot(o, o) / (2.0 * blur * blur));
            sum += texel(uv + o * blur / u_resolution) * w;
            total += w;
        }
    }
    return sum / total;
}

vec3 sampleGlass(vec2 uv) {
    if (CHROMATIC_ABERRATION <= 0.0) return blurSample(uv, BLUR_RADIUS);
    vec2 dir = uv - vec2(0.5);
    float dist = length(dir);
    if (dist <= 1e-6) return blurSample(uv, BLUR_RADIUS);
    vec2 radial = dir / dist;
    float shift = CHROMATIC_ABERRATION * dist * 0.01;
    float r = blurSample(uv + radial * (shift * 1.2), BLUR_RADIUS).r;
    float g = blurSample(uv, BLUR_RADIUS).g;
    float b = blurSample(uv - radial * (shift * 0.8), BLUR_RADIUS).b;
    return vec3(r, g, b);
}

void main() {
    vec2 frag = vec2(gl_FragCoord.x, u_resolution.y - gl_FragCoord.y);
    vec2 p = frag - CENTER;
    vec2 uv = frag / u_resolution;

    vec3 bg = texel(uv);
    float shadowSdf = shapeDistance(p - SHADOW_OFFSET);
    float cover = SHADOW_BLUR > 0.0 ? clamp(1.0 - shadowSdf / SHADOW_BLUR, 0.0, 1.0) : (shadowSdf <= 0.0 ? 1.0 : 0.0);
    float shadowMask = cover * SHADOW_INTENSITY;
    bg = mix(bg, bg * (1.0 - shadowMask), shadowMask);

    float sdf = shapeDistance(p);
    float mask = 1.0 - clamp(sdf, 0.0, 1.0);
    vec3 color = bg;
    if (mask > 0.0) {
        vec2 bend = vec2(0.0);
        if (DISTORTION > 0.0 && HEIGHT > 0.0) {
            vec2 grad = vec2(
                shapeDistance(p + vec2(1.0, 0.0)) - shapeDistance(p - vec2(1.0, 0.0)),
                shapeDistance(p + vec2(0.0, 1.0)) - shapeDistance(p - vec2(0.0, 1.0)));
            if (length(grad) > 1e-6) {
                bend = normalize(grad) * (-0.05 * DISTORTION * pow12(normalizedSdf(sdf)));
            }
        }
        vec3 glass = sampleGlass(uv + bend);
        float l = dot(glass, vec3(0.299, 0.587, 0.114));
        glass = mix(vec3(l), glass, SATURATION) * TINT;
        glass += mix(0.0, 0.3, clamp(pow12(normalizedSdf(sdf)), 0.0, 1.0));
        color = mix(bg, glass, mask);
    }
    fragColor = vec4(clamp(color, 0.0, 1.0), 1.0);
}
"#;
