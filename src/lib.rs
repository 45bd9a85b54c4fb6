// Software "liquid glass" lens: a shaped, refracting, frosted overlay composited
// over a background image, with a small design library and shader export.

pub mod color;
pub mod compositor;
pub mod config;
pub mod distortion;
pub mod draw;
pub mod editor;
pub mod error;
pub mod export;
pub mod library;
pub mod params;
pub mod sampler;
pub mod session;
pub mod shadow;
pub mod shape;
pub mod texture;
pub mod types;

pub use compositor::render_frame;
pub use error::{GlassError, Result};
pub use params::{GlassMode, ParameterSet, ParamsHandle, ShapeVariant};
pub use session::{FrameLoop, LoopControl, RenderSession};
pub use texture::{BackgroundTexture, TextureState};
pub use types::FrameBuffer;
