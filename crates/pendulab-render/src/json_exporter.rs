//! JSON frame exporter — records per-frame transforms for an external viewer.
//!
//! Implements the `Renderer` trait. Captures the bob and rod transforms of
//! every submitted frame, then serializes the whole animation to a JSON
//! file on `finalize()`.

use serde::Serialize;

use pendulab_types::{PendulabError, PendulabResult};

use crate::mirror::{RenderConfig, RenderTransforms};
use crate::renderer::{RenderFrame, Renderer};

/// A single frame of captured transforms.
#[derive(Serialize)]
struct FrameData {
    step: u64,
    sim_time: f64,
    transforms: RenderTransforms,
}

/// Complete animation data for JSON export.
#[derive(Serialize)]
struct AnimationData {
    config: RenderConfig,
    frames: Vec<FrameData>,
}

/// Exports simulation frames to a JSON file.
///
/// Usage:
/// ```text
/// let mut exporter = JsonFrameExporter::new("frames.json");
/// exporter.init(&render_config)?;
/// // ... run the session, calling submit_frame() each tick ...
/// exporter.finalize()?; // Writes the JSON file
/// ```
pub struct JsonFrameExporter {
    output_path: String,
    config: RenderConfig,
    frames: Vec<FrameData>,
}

impl JsonFrameExporter {
    /// Creates a new exporter that will write to the given path.
    pub fn new(output_path: &str) -> Self {
        Self {
            output_path: output_path.to_string(),
            config: RenderConfig::default(),
            frames: Vec::new(),
        }
    }

    /// Serializes the captured frames without writing to disk.
    pub fn to_json(&self) -> PendulabResult<String> {
        let data = AnimationData {
            config: self.config.clone(),
            frames: self
                .frames
                .iter()
                .map(|f| FrameData {
                    step: f.step,
                    sim_time: f.sim_time,
                    transforms: f.transforms,
                })
                .collect(),
        };
        serde_json::to_string(&data).map_err(|e| {
            PendulabError::Serialization(format!("JSON serialization failed: {e}"))
        })
    }
}

impl Renderer for JsonFrameExporter {
    fn init(&mut self, config: &RenderConfig) -> PendulabResult<()> {
        self.config = config.clone();
        self.frames.clear();
        Ok(())
    }

    fn submit_frame(&mut self, frame: &RenderFrame) -> PendulabResult<()> {
        self.frames.push(FrameData {
            step: frame.step,
            sim_time: frame.sim_time,
            transforms: frame.transforms,
        });
        Ok(())
    }

    fn finalize(&mut self) -> PendulabResult<()> {
        let json = self.to_json()?;
        std::fs::write(&self.output_path, json)?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json_exporter"
    }

    fn frame_count(&self) -> u32 {
        self.frames.len() as u32
    }
}
