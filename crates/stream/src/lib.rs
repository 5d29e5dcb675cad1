//! Streaming for endless-forward scenes: a sparse window of decoration
//! chunks around a moving center, and the hash that decorates them.
//!
//! # Invariants
//! - The live chunk set is recomputed each update and diffed against the
//!   existing keys; nothing outside the window survives an update.
//! - Chunk content is a pure function of its coordinate, so an evicted chunk
//!   rebuilds identically.

mod budget;
mod grid;
mod hash;
mod window;

pub use budget::FrameTimer;
pub use grid::{ChunkCoord, ChunkGrid};
pub use hash::{hash01, hash_u64};
pub use window::{ChunkWindow, WindowDiff};

pub fn crate_info() -> &'static str {
    "folio-stream v0.1.0"
}
