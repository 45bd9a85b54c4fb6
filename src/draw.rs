// Window + software drawing utilities.
// Visual effects provided here:
// 1) A window that shows the composited glass frame.
// 2) The overlay: icon disc + caption centered on the glass.
// 3) A tiny 5x7 bitmap font for the HUD line (FPS, shape, status messages).

use crate::editor::EditorKey;
use crate::error::{GlassError, Result};
use crate::types::FrameBuffer;
use minifb::{Key, KeyRepeat, MouseMode, Window, WindowOptions};

pub struct Drawer {
    window: Window, // the on-screen window you see
}

impl Drawer {
    /// Create a resizable window.
    /// Visual: a new empty window appears with your chosen title.
    pub fn new(title: &str, width: usize, height: usize, fps: u32) -> Result<Self> {
        let opts = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, opts)
            .map_err(|e| GlassError::WindowInit(e.to_string()))?;
        window.set_target_fps(fps as usize);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| GlassError::WindowUpdate(e.to_string()))
    }

    /// Returns false when the user closes the window (so we can stop the loop).
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Current presentation size; the next frame is rendered at exactly this size.
    pub fn size(&self) -> (usize, usize) {
        let (w, h) = self.window.get_size();
        (w.max(1), h.max(1))
    }

    /// Mouse position in window pixels (clamped to the window).
    /// Visual: the glass is centered here every frame.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Clamp)
    }

    /// Editor keys hit since the last frame (no auto-repeat).
    pub fn editor_keys(&self) -> Vec<EditorKey> {
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .filter_map(map_key)
            .collect()
    }
}

fn map_key(key: Key) -> Option<EditorKey> {
    Some(match key {
        Key::Key1 => EditorKey::Shape(0),
        Key::Key2 => EditorKey::Shape(1),
        Key::Key3 => EditorKey::Shape(2),
        Key::Key4 => EditorKey::Shape(3),
        Key::Key5 => EditorKey::Shape(4),
        Key::Up => EditorKey::DistortionUp,
        Key::Down => EditorKey::DistortionDown,
        Key::RightBracket => EditorKey::BlurUp,
        Key::LeftBracket => EditorKey::BlurDown,
        Key::A => EditorKey::AberrationUp,
        Key::Z => EditorKey::AberrationDown,
        Key::Equal => EditorKey::Grow,
        Key::Minus => EditorKey::Shrink,
        Key::M => EditorKey::ToggleMode,
        Key::S => EditorKey::Save,
        Key::L => EditorKey::NextDesign,
        Key::D => EditorKey::DeleteDesign,
        Key::E => EditorKey::Export,
        _ => return None,
    })
}

/* ---------- Software drawing: pixels, icon disc, tiny bitmap font ---------- */

/// Put a pixel on the framebuffer if (x,y) is inside bounds.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    let idx = y * fb.width + x;
    fb.pixels[idx] = color;
}

/// Solid disc of diameter `size` centered at (cx,cy).
/// Visual: the overlay icon sitting in the middle of the glass.
pub fn draw_icon(fb: &mut FrameBuffer, cx: i32, cy: i32, size: f32, color: u32) {
    let r = (size * 0.5).round();
    if !(r >= 1.0) || fb.width == 0 || fb.height == 0 {
        return;
    }
    // saturating cast; only the part of the disc that overlaps the buffer is walked
    let r = r as i64;
    let (cx, cy) = (cx as i64, cy as i64);
    let x0 = cx.saturating_sub(r).max(0);
    let x1 = cx.saturating_add(r).min(fb.width as i64 - 1);
    let y0 = cy.saturating_sub(r).max(0);
    let y1 = cy.saturating_add(r).min(fb.height as i64 - 1);

    let r2 = r.saturating_mul(r);
    for y in y0..=y1 {
        let dy = y - cy;
        for x in x0..=x1 {
            let dx = x - cx;
            if dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy)) <= r2 {
                fb.pixels[y as usize * fb.width + x as usize] = color;
            }
        }
    }
}

/// Pack a 0..1 RGB triple for drawing.
pub fn rgb_u32(c: [f32; 3]) -> u32 {
    crate::types::Rgb::new(c[0], c[1], c[2]).to_packed()
}

/* ---------- 5x7 bitmap font (uppercase ASCII; lowercase is drawn as uppercase) ---------- */

/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g { ($a:expr,$b:expr,$c:expr,$d:expr,$e:expr,$f:expr,$g:expr) => {
        Some([$a,$b,$c,$d,$e,$f,$g])
    }; }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110),
        '1' => g!(0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110),
        '2' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111),
        '3' => g!(0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110),
        '4' => g!(0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010),
        '5' => g!(0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110),
        '6' => g!(0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110),
        '7' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000),
        '8' => g!(0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110),
        '9' => g!(0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100),

        'A' => g!(0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'B' => g!(0b11110,0b10001,0b10001,0b11110,0b10001,0b10001,0b11110),
        'C' => g!(0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110),
        'D' => g!(0b11100,0b10010,0b10001,0b10001,0b10001,0b10010,0b11100),
        'E' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b11111),
        'F' => g!(0b11111,0b10000,0b10000,0b11110,0b10000,0b10000,0b10000),
        'G' => g!(0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01111),
        'H' => g!(0b10001,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001),
        'I' => g!(0b01110,0b00100,0b00100,0b00100,0b00100,0b00100,0b01110),
        'J' => g!(0b00111,0b00010,0b00010,0b00010,0b00010,0b10010,0b01100),
        'K' => g!(0b10001,0b10010,0b10100,0b11000,0b10100,0b10010,0b10001),
        'L' => g!(0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111),
        'M' => g!(0b10001,0b11011,0b10101,0b10101,0b10001,0b10001,0b10001),
        'N' => g!(0b10001,0b10001,0b11001,0b10101,0b10011,0b10001,0b10001),
        'O' => g!(0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'P' => g!(0b11110,0b10001,0b10001,0b11110,0b10000,0b10000,0b10000),
        'Q' => g!(0b01110,0b10001,0b10001,0b10001,0b10101,0b10010,0b01101),
        'R' => g!(0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001),
        'S' => g!(0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110),
        'T' => g!(0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        'U' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110),
        'V' => g!(0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100),
        'W' => g!(0b10001,0b10001,0b10001,0b10101,0b10101,0b10101,0b01010),
        'X' => g!(0b10001,0b10001,0b01010,0b00100,0b01010,0b10001,0b10001),
        'Y' => g!(0b10001,0b10001,0b01010,0b00100,0b00100,0b00100,0b00100),
        'Z' => g!(0b11111,0b00001,0b00010,0b00100,0b01000,0b10000,0b11111),

        ' ' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000),
        '|' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00100,0b00100),
        ':' => g!(0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000),
        '.' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00100,0b00000),
        ',' => g!(0b00000,0b00000,0b00000,0b00000,0b00100,0b00100,0b01000),
        '-' => g!(0b00000,0b00000,0b00000,0b11111,0b00000,0b00000,0b00000),
        '+' => g!(0b00000,0b00100,0b00100,0b11111,0b00100,0b00100,0b00000),
        '=' => g!(0b00000,0b00000,0b11111,0b00000,0b11111,0b00000,0b00000),
        '/' => g!(0b00001,0b00010,0b00010,0b00100,0b01000,0b01000,0b10000),
        '_' => g!(0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b11111),
        '!' => g!(0b00100,0b00100,0b00100,0b00100,0b00100,0b00000,0b00100),
        '?' => g!(0b01110,0b10001,0b00001,0b00010,0b00100,0b00000,0b00100),
        '(' => g!(0b00010,0b00100,0b01000,0b01000,0b01000,0b00100,0b00010),
        ')' => g!(0b01000,0b00100,0b00010,0b00010,0b00010,0b00100,0b01000),
        '[' => g!(0b01110,0b01000,0b01000,0b01000,0b01000,0b01000,0b01110),
        ']' => g!(0b01110,0b00010,0b00010,0b00010,0b00010,0b00010,0b01110),
        '\'' => g!(0b00100,0b00100,0b00000,0b00000,0b00000,0b00000,0b00000),

        _ => None,
    }
}

/// Pixel width of `text` when drawn with `draw_text_5x7`.
pub fn text_width_5x7(text: &str) -> i32 {
    text.chars().count() as i32 * 6
}

/// Draw a single 5x7 character at (x,y), with a 1-pixel black shadow for contrast.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else {
        return;
    };
    for (offset, c) in [(1, 0x00000000), (0, color)] {
        for (ry, rowbits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if (rowbits & (1 << (4 - rx))) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, c);
                }
            }
        }
    }
}

/// Draw a text string using 5x7 glyphs (5 pixels wide + 1 pixel spacing).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}
