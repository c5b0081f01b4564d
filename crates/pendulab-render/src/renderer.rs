//! Renderer trait and HeadlessRenderer stub.
//!
//! The renderer is called once per frame with the mirror's output. The
//! headless renderer discards all frames, serving as a no-op for tests
//! and batch sweeps.

use pendulab_types::PendulabResult;

use crate::mirror::{RenderConfig, RenderTransforms};

/// A single render frame.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    /// Simulation step this frame corresponds to.
    pub step: u64,
    /// Simulated time (seconds).
    pub sim_time: f64,
    pub transforms: RenderTransforms,
}

impl RenderFrame {
    pub fn new(sim_time: f64, transforms: RenderTransforms) -> Self {
        Self {
            step: transforms.step,
            sim_time,
            transforms,
        }
    }
}

/// Trait for presenting simulation output.
///
/// # Implementations
/// - [`HeadlessRenderer`] — Discards frames (tests, sweeps)
/// - [`JsonFrameExporter`](crate::json_exporter::JsonFrameExporter) — Records frames to JSON
pub trait Renderer: Send {
    /// Initialize the renderer with the visual scaling in use.
    fn init(&mut self, config: &RenderConfig) -> PendulabResult<()>;

    /// Submit a frame for rendering.
    fn submit_frame(&mut self, frame: &RenderFrame) -> PendulabResult<()>;

    /// Finalize rendering (flush buffers, close files, etc.).
    fn finalize(&mut self) -> PendulabResult<()>;

    /// Returns the renderer name.
    fn name(&self) -> &str;

    /// Returns the number of frames submitted.
    fn frame_count(&self) -> u32;
}

/// Headless renderer — discards all frames.
pub struct HeadlessRenderer {
    frames: u32,
}

impl HeadlessRenderer {
    /// Creates a new headless renderer.
    pub fn new() -> Self {
        Self { frames: 0 }
    }
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HeadlessRenderer {
    fn init(&mut self, _config: &RenderConfig) -> PendulabResult<()> {
        Ok(())
    }

    fn submit_frame(&mut self, _frame: &RenderFrame) -> PendulabResult<()> {
        self.frames += 1;
        Ok(())
    }

    fn finalize(&mut self) -> PendulabResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "headless"
    }

    fn frame_count(&self) -> u32 {
        self.frames
    }
}
