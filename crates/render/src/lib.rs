//! Rendering adapter: the camera rig, a renderer-agnostic description of one
//! frame, and the label surfaces scenes allocate for signage.
//!
//! # Invariants
//! - Renderers read a [`FrameView`]; they never mutate simulation state.
//! - The smoothed camera only moves continuously, except through an
//!   explicit [`SmoothedCamera::snap`] or [`SmoothedCamera::translate`].
//! - Every label surface a scene allocates is released when it disposes.
//!
//! # Workaround
//! Ships a debug text renderer so hosts without a GPU (the CLI, tests) can
//! drive the full frame loop. The wgpu backend lives in `folio-render-wgpu`.

mod camera;
mod label;
mod renderer;

pub use camera::{CameraPolicy, CameraPose, SmoothedCamera};
pub use label::{DisabledCanvas, LabelCanvas, LabelId, MemoryCanvas, RenderError};
pub use renderer::{DebugTextRenderer, FrameView, LabelView, Prop, Renderer};

pub fn crate_info() -> &'static str {
    "folio-render v0.1.0"
}
