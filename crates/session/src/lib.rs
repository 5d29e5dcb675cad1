//! The world session: one mounted view of the portfolio world.
//!
//! Owns the input sampler, the player, the active scene, the camera, the
//! teleport transition and the ambient audio. Hosts call
//! [`Session::frame`] once per display refresh and read the overlay
//! channels between frames.
//!
//! # Invariants
//! - Exactly one scene is active while mounted; a disposed scene is never
//!   ticked, framed or drawn.
//! - Per frame: input is sampled and consumed, then the player moves, then
//!   the scene ticks, then the camera eases, then one frame is drawn.
//! - Unmounting detaches input, disposes the scene and releases audio on
//!   every exit path, including drop.

mod audio;
mod handle;
mod manager;
mod overlay;
mod session;

pub use audio::{AmbientAudio, AudioError, AudioSink, NullSink};
pub use handle::{AnchorHandle, request_anchor};
pub use manager::SceneManager;
pub use overlay::{BubbleFeed, Overlay, Panel};
pub use session::{Session, SessionError};

pub fn crate_info() -> &'static str {
    "folio-session v0.1.0"
}
