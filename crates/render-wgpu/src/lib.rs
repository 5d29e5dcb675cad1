//! wgpu render backend for the portfolio world.
//!
//! Draws every [`folio_render::Prop`] of a frame as an instanced, lit cube
//! over the frame's sky color, darkened by the teleport fade. Labels are
//! left to the host's UI layer; [`project_to_screen`] places them.
//!
//! # Invariants
//! - Rendering reads the frame description only and never touches the
//!   session.

mod gpu;
mod shaders;

pub use gpu::{WgpuFrame, WgpuRenderer, project_to_screen};

pub fn crate_info() -> &'static str {
    "folio-render-wgpu v0.1.0"
}
