// Background picture behind the glass, and its load lifecycle.
// Visual expectation: the window shows black until the picture finishes decoding,
// then the very next frame shows it. A broken path just stays black; nothing crashes.

use crate::error::{GlassError, Result};
use crate::types::FrameBuffer;
use base64::Engine;
use image::DynamicImage;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

/// Where a background comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackgroundSource {
    /// Plain path or `file://` URL
    File(PathBuf),
    /// `data:image/...;base64,...` URI
    DataUri(String),
    /// Remote URL (not fetched; loading fails soft)
    Remote(String),
}

impl BackgroundSource {
    pub fn parse(locator: &str) -> Self {
        let locator = locator.trim();
        if locator.starts_with("data:") {
            BackgroundSource::DataUri(locator.to_string())
        } else if let Some(path) = locator.strip_prefix("file://") {
            BackgroundSource::File(PathBuf::from(path))
        } else if locator.starts_with("http://") || locator.starts_with("https://") {
            BackgroundSource::Remote(locator.to_string())
        } else {
            BackgroundSource::File(PathBuf::from(locator))
        }
    }
}

/// Decode a background into a packed 0x00RRGGBB buffer.
pub fn decode_source(source: &BackgroundSource) -> Result<FrameBuffer> {
    let img = match source {
        BackgroundSource::File(path) => {
            let data = std::fs::read(path)
                .map_err(|e| GlassError::TextureLoad(format!("{}: {}", path.display(), e)))?;
            decode_bytes(&data)?
        }
        BackgroundSource::DataUri(uri) => {
            let payload = uri
                .find(";base64,")
                .map(|pos| &uri[pos + 8..])
                .ok_or_else(|| GlassError::TextureLoad("Invalid data URI format".into()))?;
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(payload)
                .map_err(|e| GlassError::TextureLoad(format!("base64: {e}")))?;
            decode_bytes(&bytes)?
        }
        BackgroundSource::Remote(url) => {
            return Err(GlassError::TextureLoad(format!("remote backgrounds are not fetched: {url}")));
        }
    };
    Ok(image_to_framebuffer(img))
}

fn decode_bytes(data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data).map_err(|e| GlassError::TextureLoad(format!("decode: {e}")))
}

/// Pack an RGB image the same way the window wants it.
pub fn image_to_framebuffer(img: DynamicImage) -> FrameBuffer {
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    let mut out = Vec::with_capacity((w as usize) * (h as usize));
    for (_x, _y, pixel) in rgb.enumerate_pixels() {
        let r = pixel[0] as u32;
        let g = pixel[1] as u32;
        let b = pixel[2] as u32;
        out.push((r << 16) | (g << 8) | b);
    }
    FrameBuffer { width: w as usize, height: h as usize, pixels: out }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TextureState {
    Unloaded = 0,
    Loading = 1,
    Ready = 2,
    Failed = 3,
}

impl TextureState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => TextureState::Loading,
            2 => TextureState::Ready,
            3 => TextureState::Failed,
            _ => TextureState::Unloaded,
        }
    }
}

struct Shared {
    state: AtomicU8,
    // bumped under `image`'s lock on every request; a finished decode only lands if it is still current
    generation: AtomicU64,
    image: Mutex<Option<Arc<FrameBuffer>>>,
}

/// Background texture owned by a render session.
/// The loader thread publishes the image first and flips the state to Ready second
/// (Release); the render loop reads the state (Acquire) before touching the image.
#[derive(Clone)]
pub struct BackgroundTexture {
    shared: Arc<Shared>,
}

impl Default for BackgroundTexture {
    fn default() -> Self {
        Self::new()
    }
}

impl BackgroundTexture {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: AtomicU8::new(TextureState::Unloaded as u8),
                generation: AtomicU64::new(0),
                image: Mutex::new(None),
            }),
        }
    }

    /// Already-decoded texture, Ready immediately.
    pub fn from_image(image: FrameBuffer) -> Self {
        let tex = Self::new();
        tex.set_image(image);
        tex
    }

    pub fn state(&self) -> TextureState {
        TextureState::from_u8(self.shared.state.load(Ordering::Acquire))
    }

    /// The image, but only once it is Ready.
    pub fn current(&self) -> Option<Arc<FrameBuffer>> {
        if self.state() != TextureState::Ready {
            return None;
        }
        self.lock_image().clone()
    }

    /// Start decoding `locator` on a background thread (fire-and-forget).
    /// The handle is only useful to tests that want to wait for the result.
    pub fn load(&self, locator: &str) -> JoinHandle<()> {
        let generation = self.begin(None, TextureState::Loading);

        let source = BackgroundSource::parse(locator);
        let this = self.clone();
        tracing::debug!(?source, generation, "background load started");

        thread::spawn(move || {
            let (image, state) = match decode_source(&source) {
                Ok(image) => {
                    tracing::info!(width = image.width, height = image.height, "background decoded");
                    (Some(Arc::new(image)), TextureState::Ready)
                }
                Err(e) => {
                    tracing::warn!("background failed to load, rendering without it: {e}");
                    (None, TextureState::Failed)
                }
            };
            if !this.finish(generation, image, state) {
                tracing::debug!(generation, "stale background load dropped");
            }
        })
    }

    /// Swap in an already-decoded image; any load still in flight is discarded.
    pub fn set_image(&self, image: FrameBuffer) {
        self.begin(Some(Arc::new(image)), TextureState::Ready);
    }

    /// Drop the image and go back to Unloaded.
    pub fn unload(&self) {
        self.begin(None, TextureState::Unloaded);
    }

    fn lock_image(&self) -> MutexGuard<'_, Option<Arc<FrameBuffer>>> {
        match self.shared.image.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// New generation + publish, as one step under the image lock.
    fn begin(&self, image: Option<Arc<FrameBuffer>>, state: TextureState) -> u64 {
        let mut slot = self.lock_image();
        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *slot = image;
        self.shared.state.store(state as u8, Ordering::Release);
        generation
    }

    /// Publish a loader result only if no newer request came in meanwhile.
    /// The generation is compared under the same lock every request bumps it under.
    fn finish(&self, generation: u64, image: Option<Arc<FrameBuffer>>, state: TextureState) -> bool {
        let mut slot = self.lock_image();
        if self.shared.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *slot = image;
        self.shared.state.store(state as u8, Ordering::Release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 red PNG
    const RED_PNG: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

    #[test]
    fn test_parse_locators() {
        assert_eq!(BackgroundSource::parse("file:///tmp/a.png"), BackgroundSource::File("/tmp/a.png".into()));
        assert_eq!(BackgroundSource::parse("bg.jpg"), BackgroundSource::File("bg.jpg".into()));
        assert!(matches!(BackgroundSource::parse("https://x/y.png"), BackgroundSource::Remote(_)));
        assert!(matches!(BackgroundSource::parse(RED_PNG), BackgroundSource::DataUri(_)));
    }

    #[test]
    fn test_decode_data_uri() {
        let fb = decode_source(&BackgroundSource::parse(RED_PNG)).unwrap();
        assert_eq!((fb.width, fb.height), (1, 1));
        assert_eq!(fb.pixels[0] & 0x00FF0000, 0x00FF0000);
    }

    #[test]
    fn test_async_load_reaches_ready() {
        let tex = BackgroundTexture::new();
        assert_eq!(tex.state(), TextureState::Unloaded);
        assert!(tex.current().is_none());

        tex.load(RED_PNG).join().unwrap();
        assert_eq!(tex.state(), TextureState::Ready);
        assert_eq!(tex.current().unwrap().width, 1);
    }

    #[test]
    fn test_missing_file_fails_soft() {
        let tex = BackgroundTexture::new();
        tex.load("/definitely/not/here.png").join().unwrap();
        assert_eq!(tex.state(), TextureState::Failed);
        assert!(tex.current().is_none());
    }

    #[test]
    fn test_later_image_wins_over_load_in_flight() {
        for _ in 0..50 {
            let tex = BackgroundTexture::new();
            let pending = tex.load(RED_PNG);
            let mut blue = FrameBuffer::new(2, 2);
            blue.pixels.fill(0x000000FF);
            tex.set_image(blue);
            pending.join().unwrap();

            assert_eq!(tex.state(), TextureState::Ready);
            let img = tex.current().unwrap();
            assert_eq!((img.width, img.get(0, 0)), (2, 0x000000FF));
        }
    }

    #[test]
    fn test_unload_beats_load_in_flight() {
        let tex = BackgroundTexture::new();
        let pending = tex.load(RED_PNG);
        tex.unload();
        pending.join().unwrap();
        assert_eq!(tex.state(), TextureState::Unloaded);
        assert!(tex.current().is_none());
    }

    #[test]
    fn test_unload_clears_image() {
        let tex = BackgroundTexture::from_image(FrameBuffer::new(2, 2));
        assert_eq!(tex.state(), TextureState::Ready);
        tex.unload();
        assert_eq!(tex.state(), TextureState::Unloaded);
        assert!(tex.current().is_none());
    }
}
