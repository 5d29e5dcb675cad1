//! Input sampling: physical and virtual key state, per-frame snapshots, and the
//! keyboard surface that maps key codes to movement intents and actions.
//!
//! # Invariants
//! - Touch (virtual) keys travel the exact path physical keys do.
//! - A snapshot is a copy; consuming keys from it never touches live state.
//! - Nothing is recorded while the sampler is detached.

pub mod action;
pub mod keys;
pub mod sampler;

pub use action::{Action, MoveIntent};
pub use sampler::{Attachment, EventDisposition, InputHandle, InputSampler, KeySnapshot};

pub fn crate_info() -> &'static str {
    "folio-input v0.1.0"
}
