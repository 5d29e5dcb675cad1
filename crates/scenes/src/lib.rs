//! Scenes: self-contained units of world content behind one capability
//! trait, and the factory that builds them.
//!
//! # Invariants
//! - A scene never outlives its disposal: `dispose` consumes the box.
//! - Anchor support is an optional capability queried through
//!   [`Scene::anchors`], never discovered by calling and failing.
//! - Label surfaces allocated during construction are released on dispose,
//!   and on construction failure before the error is returned.

mod ai_room;
mod corridor;
mod dressing;
mod hub;
mod scene;

pub use ai_room::AiRoomScene;
pub use corridor::CorridorScene;
pub use hub::HubScene;
pub use scene::{AnchorSupport, Scene, SceneError, SceneEvent, TickContext, build_scene};

pub fn crate_info() -> &'static str {
    "folio-scenes v0.1.0"
}
