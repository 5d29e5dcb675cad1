use folio_common::{Anchor, Bounds, HubLayout, SceneKey, WorldConfig};
use folio_kernel::{NodeKind, Player, RoomPhase};
use folio_render::{CameraPolicy, CameraPose, FrameView, LabelCanvas, LabelId, RenderError};
use glam::Vec3;

use crate::{AiRoomScene, CorridorScene, HubScene};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("failed to build scene content: {0}")]
    Render(#[from] RenderError),
}

/// Per-frame input to [`Scene::tick`].
#[derive(Debug)]
pub struct TickContext<'a> {
    /// Moved by the controller earlier this frame. Scrolling scenes may
    /// shift it when they recenter.
    pub player: &'a mut Player,
    pub dt: f32,
}

/// Something a scene tick wants the outside world to react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    NodeEntered {
        kind: NodeKind,
        title: String,
        subtitle: String,
        first_visit: bool,
    },
    NodeLeft {
        kind: NodeKind,
    },
    PhaseAdvanced(RoomPhase),
    /// The world root and the player moved by `shift`; the camera must
    /// follow rigidly.
    Recentered {
        shift: Vec3,
    },
}

/// Jump-to-landmark capability.
pub trait AnchorSupport {
    /// Anchors this scene knows, in menu order.
    fn anchor_names(&self) -> &'static [Anchor];

    /// Reposition the player. Returns `false` for an anchor the scene
    /// does not have.
    fn set_anchor(&mut self, anchor: Anchor, player: &mut Player) -> bool;
}

/// One unit of world content. Exactly one is active at a time.
pub trait Scene {
    fn key(&self) -> SceneKey;

    fn bounds(&self) -> Bounds;

    /// Place the player at the scene's spawn point.
    fn enter(&mut self, player: &mut Player);

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Vec<SceneEvent>;

    fn camera_policy(&self) -> CameraPolicy;

    fn camera_target(&self, player: &Player) -> CameraPose {
        self.camera_policy().target(player)
    }

    /// `None` when the scene has no landmarks to jump to.
    fn anchors(&mut self) -> Option<&mut dyn AnchorSupport> {
        None
    }

    /// Append this frame's props and labels.
    fn draw(&self, frame: &mut FrameView);

    /// Contextual guidance shown in the HUD while the scene is active.
    fn hud_hint(&self) -> &'static str;

    /// Release everything the scene owns.
    fn dispose(self: Box<Self>, canvas: &mut dyn LabelCanvas);
}

/// Construct a fresh scene. Scenes are never cached.
pub fn build_scene(
    key: SceneKey,
    config: &WorldConfig,
    canvas: &mut dyn LabelCanvas,
) -> Result<Box<dyn Scene>, SceneError> {
    let scene: Box<dyn Scene> = match (key, config.hub.layout) {
        (SceneKey::Hub, HubLayout::Island) => Box::new(HubScene::new(canvas)?),
        (SceneKey::Hub, HubLayout::Corridor) => Box::new(CorridorScene::new(config, canvas)?),
        (SceneKey::Ai, _) => Box::new(AiRoomScene::new(&config.camera)),
    };
    tracing::debug!(scene = %key, labels = canvas.live(), "scene constructed");
    Ok(scene)
}

/// Allocate one label per text, releasing the partial set on failure.
pub(crate) fn allocate_labels<'a>(
    canvas: &mut dyn LabelCanvas,
    texts: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<LabelId>, RenderError> {
    let mut ids = Vec::new();
    for text in texts {
        match canvas.create_label(text) {
            Ok(id) => ids.push(id),
            Err(err) => {
                for id in ids {
                    canvas.release(id);
                }
                return Err(err);
            }
        }
    }
    Ok(ids)
}

pub(crate) fn release_labels(canvas: &mut dyn LabelCanvas, ids: Vec<LabelId>) {
    for id in ids {
        canvas.release(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_render::{DisabledCanvas, MemoryCanvas};

    #[test]
    fn factory_builds_each_key() {
        let mut canvas = MemoryCanvas::new();
        let config = WorldConfig::default();
        let hub = build_scene(SceneKey::Hub, &config, &mut canvas).unwrap();
        assert_eq!(hub.key(), SceneKey::Hub);
        let ai = build_scene(SceneKey::Ai, &config, &mut canvas).unwrap();
        assert_eq!(ai.key(), SceneKey::Ai);
        hub.dispose(&mut canvas);
        ai.dispose(&mut canvas);
        assert_eq!(canvas.live(), 0);
    }

    #[test]
    fn corridor_layout_builds_corridor() {
        let mut canvas = MemoryCanvas::new();
        let mut config = WorldConfig::default();
        config.hub.layout = HubLayout::Corridor;
        let mut hub = build_scene(SceneKey::Hub, &config, &mut canvas).unwrap();
        // Corridors leave the longitudinal axis open.
        assert_eq!(hub.bounds().z, None);
        assert!(hub.anchors().is_some());
        hub.dispose(&mut canvas);
    }

    #[test]
    fn missing_drawing_context_is_fatal() {
        let err = build_scene(SceneKey::Hub, &WorldConfig::default(), &mut DisabledCanvas)
            .err()
            .unwrap();
        assert!(matches!(err, SceneError::Render(_)));
    }

    #[test]
    fn partial_allocation_is_rolled_back() {
        struct FailsOnThird(MemoryCanvas);
        impl LabelCanvas for FailsOnThird {
            fn create_label(&mut self, text: &str) -> Result<LabelId, RenderError> {
                if self.0.live() == 2 {
                    return DisabledCanvas.create_label(text);
                }
                self.0.create_label(text)
            }
            fn release(&mut self, id: LabelId) {
                self.0.release(id)
            }
            fn live(&self) -> usize {
                self.0.live()
            }
        }

        let mut canvas = FailsOnThird(MemoryCanvas::new());
        assert!(allocate_labels(&mut canvas, ["a", "b", "c", "d"]).is_err());
        assert_eq!(canvas.live(), 0);
    }
}
