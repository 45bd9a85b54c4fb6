// Render session lifecycle and the frame-paced loop that drives it.
// Visual: one `tick` = one new image in the window, built from whatever parameters
// and background were current when the tick began.

use crate::compositor::render_frame;
use crate::error::{GlassError, Result};
use crate::params::ParamsHandle;
use crate::texture::{BackgroundTexture, TextureState};
use crate::types::FrameBuffer;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Rendering,
    TornDown,
}

/// Owns the output surface and the background; reads parameters from the editor's handle.
pub struct RenderSession {
    state: SessionState,
    params: ParamsHandle,
    texture: BackgroundTexture,
    surface: FrameBuffer,
    frames: u64,
    last_texture_state: TextureState,
}

impl RenderSession {
    pub fn new(params: ParamsHandle, texture: BackgroundTexture) -> Self {
        Self {
            state: SessionState::Uninitialized,
            params,
            texture,
            surface: FrameBuffer::new(0, 0),
            frames: 0,
            last_texture_state: TextureState::Unloaded,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn texture(&self) -> &BackgroundTexture {
        &self.texture
    }

    pub fn surface(&self) -> &FrameBuffer {
        &self.surface
    }

    /// Give the session its first presentation size. Uninitialized -> Ready.
    pub fn attach_surface(&mut self, width: usize, height: usize) -> Result<()> {
        match self.state {
            SessionState::TornDown => Err(GlassError::Session("session already torn down".into())),
            SessionState::Uninitialized => {
                self.surface.resize(width, height);
                self.state = SessionState::Ready;
                tracing::debug!(width, height, "surface attached");
                Ok(())
            }
            SessionState::Ready | SessionState::Rendering => {
                self.surface.resize(width, height);
                Ok(())
            }
        }
    }

    /// Ready -> Rendering.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SessionState::Ready => {
                self.state = SessionState::Rendering;
                tracing::info!("render session started");
                Ok(())
            }
            SessionState::Rendering => Ok(()),
            other => Err(GlassError::Session(format!("cannot start from {other:?}"))),
        }
    }

    /// Any state -> TornDown. Later ticks render nothing.
    pub fn teardown(&mut self) {
        if self.state != SessionState::TornDown {
            tracing::info!(frames = self.frames, "render session torn down");
        }
        self.state = SessionState::TornDown;
    }

    /// Drive `frame` on `frame_loop` with this session, then tear down.
    /// Teardown happens whether the loop stopped cleanly or a frame failed.
    pub fn run<F>(&mut self, frame_loop: &FrameLoop, mut frame: F) -> Result<u64>
    where
        F: FnMut(&mut RenderSession, u64) -> Result<LoopControl>,
    {
        let result = frame_loop.run(|tick| frame(&mut *self, tick));
        if let Err(e) = &result {
            tracing::error!("frame loop failed: {e}");
        }
        self.teardown();
        result
    }

    /// Render one frame at the given presentation size.
    /// Returns the finished surface, or None when the session is not Rendering.
    pub fn tick(&mut self, width: usize, height: usize) -> Option<&mut FrameBuffer> {
        if self.state != SessionState::Rendering {
            return None;
        }

        // one snapshot per frame; the editor can publish again while we draw
        let params = self.params.snapshot();

        let tex_state = self.texture.state();
        if tex_state != self.last_texture_state {
            tracing::debug!(?tex_state, frame = self.frames, "background state changed");
            self.last_texture_state = tex_state;
        }
        let background = self.texture.current();

        if self.surface.resize(width, height) {
            tracing::debug!(width, height, "surface resized");
        }
        render_frame(&params, background.as_deref(), &mut self.surface);
        self.frames += 1;
        Some(&mut self.surface)
    }
}

/// Shared stop signal for a FrameLoop. Cloneable, callable from any thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// What a frame callback wants next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Fixed-cadence loop: run a frame, wait out the rest of the frame budget, repeat.
/// The stop flag is checked before every re-arm, so nothing runs after a stop is seen.
pub struct FrameLoop {
    frame_budget: Duration,
    stop: StopHandle,
}

impl FrameLoop {
    /// `fps == 0` runs frames back to back.
    pub fn new(fps: u32) -> Self {
        let frame_budget = if fps == 0 { Duration::ZERO } else { Duration::from_micros(1_000_000 / fps as u64) };
        Self { frame_budget, stop: StopHandle::default() }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Run until the callback returns Stop, the handle is stopped, or the callback errors.
    /// Returns how many frames ran.
    pub fn run<F>(&self, mut frame: F) -> Result<u64>
    where
        F: FnMut(u64) -> Result<LoopControl>,
    {
        let mut ticks = 0u64;
        while !self.stop.is_stopped() {
            let started = Instant::now();
            ticks += 1;

            if frame(ticks)? == LoopControl::Stop {
                self.stop.stop();
            }
            if self.stop.is_stopped() {
                break;
            }

            let spent = started.elapsed();
            if spent < self.frame_budget {
                thread::sleep(self.frame_budget - spent);
            }
        }
        tracing::debug!(ticks, "frame loop finished");
        Ok(ticks)
    }
}
