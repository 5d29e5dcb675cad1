//! Shared vocabulary for the folio world: scene keys, anchors, traversable
//! bounds, smoothing math and the configuration tree.
//!
//! # Invariants
//! - Everything here is plain data or a pure function.
//! - Configuration is validated once at load; consumers trust it afterwards.

pub mod config;
pub mod math;
pub mod types;

pub use config::{
    AudioConfig, CameraConfig, ConfigError, FrameConfig, HubConfig, HubLayout, OverlayConfig,
    PlayerConfig, StreamConfig, TeleportConfig, WorldConfig,
};
pub use types::{Anchor, Bounds, SceneKey};

pub fn crate_info() -> &'static str {
    "folio-common v0.1.0"
}
