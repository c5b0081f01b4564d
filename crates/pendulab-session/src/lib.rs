//! # pendulab-session
//!
//! One [`PendulumSession`] exclusively owns the bodies, constraint,
//! measurement run and dataset of a pendulum experiment. Each
//! [`tick`](PendulumSession::tick) runs the frame pipeline in order:
//!
//! ```text
//! stepper ──BodySnapshot──▶ render mirror
//!                      └──▶ measurement automaton ──(complete)──▶ dataset
//! ```
//!
//! The [`FrameDriver`] stands in for the host's display-refresh loop.

pub mod driver;
pub mod session;

pub use driver::{DriveSummary, FrameDriver};
pub use session::{PendulumSession, TickOutput};
