//! Headless frame driver.
//!
//! Calls [`PendulumSession::tick`] once per frame and hands each frame's
//! transforms to an optional [`Renderer`]. A numeric degeneracy costs one
//! frame; the session has already rebuilt its bodies, so driving continues.

use pendulab_measure::{MeasurementState, RunSummary};
use pendulab_render::{RenderFrame, Renderer};
use pendulab_types::{PendulabError, PendulabResult};

use crate::session::PendulumSession;

/// What a batch of frames did.
#[derive(Debug, Clone, Default)]
pub struct DriveSummary {
    /// Frames driven, including degenerate ones.
    pub frames: u64,
    /// Runs completed during the batch.
    pub completed: Vec<RunSummary>,
    /// Frames that ended in a numeric degeneracy.
    pub degeneracies: u32,
}

/// Drives a session frame by frame.
pub struct FrameDriver<'a> {
    session: &'a mut PendulumSession,
    renderer: Option<&'a mut dyn Renderer>,
}

impl<'a> FrameDriver<'a> {
    pub fn new(session: &'a mut PendulumSession) -> Self {
        Self {
            session,
            renderer: None,
        }
    }

    /// Drives `session` and presents every frame through `renderer`.
    pub fn with_renderer(
        session: &'a mut PendulumSession,
        renderer: &'a mut dyn Renderer,
    ) -> PendulabResult<Self> {
        renderer.init(&session.config().render)?;
        Ok(Self {
            session,
            renderer: Some(renderer),
        })
    }

    pub fn session(&mut self) -> &mut PendulumSession {
        self.session
    }

    /// Drives exactly `frames` frames.
    pub fn run_frames(&mut self, frames: u64) -> PendulabResult<DriveSummary> {
        let mut summary = DriveSummary::default();
        for _ in 0..frames {
            if let Some(run) = self.frame(&mut summary)? {
                summary.completed.push(run);
            }
        }
        Ok(summary)
    }

    /// Arms a run if none is in progress, then drives until a run completes
    /// or `max_frames` frames have passed.
    ///
    /// `Ok(None)` means the budget ran out; the run is left in progress for
    /// the caller to inspect or stop.
    pub fn run_until_recorded(&mut self, max_frames: u64) -> PendulabResult<Option<RunSummary>> {
        if self.session.measurement().state() == MeasurementState::Idle {
            self.session.start_measurement()?;
        }
        let mut summary = DriveSummary::default();
        for _ in 0..max_frames {
            if let Some(run) = self.frame(&mut summary)? {
                return Ok(Some(run));
            }
            // A degeneracy drops the run; arm a fresh one.
            if self.session.measurement().state() == MeasurementState::Idle {
                self.session.start_measurement()?;
            }
        }
        tracing::warn!(
            max_frames,
            state = self.session.measurement().state().name(),
            "frame budget exhausted before a run completed"
        );
        Ok(None)
    }

    /// Finalizes the renderer, if any.
    pub fn finish(self) -> PendulabResult<()> {
        if let Some(renderer) = self.renderer {
            renderer.finalize()?;
        }
        Ok(())
    }

    fn frame(&mut self, summary: &mut DriveSummary) -> PendulabResult<Option<RunSummary>> {
        summary.frames += 1;
        let output = match self.session.tick() {
            Ok(output) => output,
            Err(PendulabError::NumericDegeneracy { .. }) => {
                summary.degeneracies += 1;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if let Some(renderer) = self.renderer.as_deref_mut() {
            renderer.submit_frame(&RenderFrame::new(output.snapshot.sim_time, output.transforms))?;
        }
        Ok(output.completed().copied())
    }
}
