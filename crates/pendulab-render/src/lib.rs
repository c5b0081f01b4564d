//! # pendulab-render
//!
//! Presentation side of the pendulum core.
//!
//! Provides the [`RenderMirror`] (body snapshot → mesh transforms), a
//! `Renderer` trait with a `HeadlessRenderer` stub, and a
//! `JsonFrameExporter` that records transforms for an external viewer.

pub mod json_exporter;
pub mod mirror;
pub mod renderer;

pub use json_exporter::JsonFrameExporter;
pub use mirror::{BobTransform, RenderConfig, RenderMirror, RenderTransforms, RodTransform};
pub use renderer::{HeadlessRenderer, RenderFrame, Renderer};
