use folio_common::{Anchor, SceneKey, WorldConfig};
use folio_input::MoveIntent;
use folio_kernel::Player;
use folio_render::{CameraPose, FrameView, LabelCanvas, Prop, SmoothedCamera};
use folio_scenes::{Scene, SceneError, SceneEvent, TickContext, build_scene};
use glam::Vec3;

const AVATAR_SIZE: Vec3 = Vec3::new(0.7, 1.8, 0.5);
const AVATAR_COLOR: [f32; 3] = [0.95, 0.55, 0.25];
/// Walk-cycle hop height.
const AVATAR_BOB: f32 = 0.06;

/// Owns the active scene together with the player and camera it drives.
///
/// Switching builds the replacement first and disposes the outgoing scene
/// only once the new one exists, so a failed build leaves the old scene
/// running.
pub struct SceneManager {
    config: WorldConfig,
    active: Option<Box<dyn Scene>>,
    player: Player,
    camera: SmoothedCamera,
    builds: usize,
    disposals: usize,
}

impl std::fmt::Debug for SceneManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("active", &self.active_key())
            .field("player", &self.player)
            .field("builds", &self.builds)
            .field("disposals", &self.disposals)
            .finish()
    }
}

impl SceneManager {
    pub fn new(
        config: &WorldConfig,
        initial: SceneKey,
        canvas: &mut dyn LabelCanvas,
    ) -> Result<Self, SceneError> {
        let mut scene = build_scene(initial, config, canvas)?;
        let mut player = Player::default();
        scene.enter(&mut player);
        let pose = scene.camera_target(&player);
        tracing::info!(scene = %initial, "scene activated");
        Ok(Self {
            config: config.clone(),
            active: Some(scene),
            player,
            camera: SmoothedCamera::new(&config.camera, pose),
            builds: 1,
            disposals: 0,
        })
    }

    /// `None` once disposed.
    pub fn active_key(&self) -> Option<SceneKey> {
        self.active.as_ref().map(|s| s.key())
    }

    pub fn active(&self) -> Option<&dyn Scene> {
        self.active.as_deref()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn camera(&self) -> &SmoothedCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut SmoothedCamera {
        &mut self.camera
    }

    /// Scenes constructed since creation.
    pub fn builds(&self) -> usize {
        self.builds
    }

    pub fn disposals(&self) -> usize {
        self.disposals
    }

    /// Replace the active scene. Returns `Ok(false)` when `key` is already
    /// active.
    pub fn switch_scene(
        &mut self,
        key: SceneKey,
        canvas: &mut dyn LabelCanvas,
    ) -> Result<bool, SceneError> {
        if self.active_key() == Some(key) {
            return Ok(false);
        }
        let mut next = build_scene(key, &self.config, canvas)?;
        self.builds += 1;
        if let Some(old) = self.active.take() {
            tracing::debug!(scene = %old.key(), "disposing outgoing scene");
            old.dispose(canvas);
            self.disposals += 1;
        }
        next.enter(&mut self.player);
        self.camera.snap(next.camera_target(&self.player));
        self.active = Some(next);
        tracing::info!(scene = %key, "scene activated");
        Ok(true)
    }

    /// Silent no-op (`false`) when the active scene has no anchors.
    pub fn jump_to_anchor(&mut self, anchor: Anchor) -> bool {
        let Some(scene) = self.active.as_mut() else {
            return false;
        };
        let Some(anchors) = scene.anchors() else {
            tracing::debug!(%anchor, "active scene has no anchors");
            return false;
        };
        let moved = anchors.set_anchor(anchor, &mut self.player);
        if moved {
            tracing::debug!(%anchor, position = ?self.player.position, "jumped to anchor");
        }
        moved
    }

    pub fn supports_anchors(&mut self) -> bool {
        self.active.as_mut().is_some_and(|s| s.anchors().is_some())
    }

    /// Move the player, tick the scene, then ease the camera.
    pub fn update(&mut self, intent: &MoveIntent, dt: f32) -> Vec<SceneEvent> {
        let Some(scene) = self.active.as_mut() else {
            return Vec::new();
        };
        self.player
            .update(intent, dt, &self.config.player, &scene.bounds());
        let events = scene.tick(&mut TickContext {
            player: &mut self.player,
            dt,
        });
        for event in &events {
            if let SceneEvent::Recentered { shift } = event {
                self.camera.translate(*shift);
            }
        }
        self.camera.follow(scene.camera_target(&self.player), dt);
        events
    }

    /// Frame description for the current state, without the teleport fade.
    pub fn frame_view(&self) -> Option<FrameView> {
        let scene = self.active.as_ref()?;
        let mut frame = FrameView::new(scene.key(), self.camera.pose(), self.camera.fov_degrees);
        scene.draw(&mut frame);
        let p = &self.player;
        let hop = (p.bob.sin() * AVATAR_BOB).abs();
        frame.props.push(
            Prop::new(
                p.position + Vec3::new(0.0, AVATAR_SIZE.y * 0.5 + hop, 0.0),
                AVATAR_SIZE,
                AVATAR_COLOR,
            )
            .with_yaw(p.yaw),
        );
        Some(frame)
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn hud_hint(&self) -> &'static str {
        self.active.as_ref().map_or("", |s| s.hud_hint())
    }

    /// Dispose the active scene. Idempotent.
    pub fn dispose(&mut self, canvas: &mut dyn LabelCanvas) {
        if let Some(scene) = self.active.take() {
            tracing::debug!(scene = %scene.key(), "disposing scene");
            scene.dispose(canvas);
            self.disposals += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::HubLayout;
    use folio_render::MemoryCanvas;

    fn manager(canvas: &mut MemoryCanvas) -> SceneManager {
        SceneManager::new(&WorldConfig::default(), SceneKey::Hub, canvas).unwrap()
    }

    #[test]
    fn switching_to_active_key_is_noop() {
        let mut canvas = MemoryCanvas::new();
        let mut m = manager(&mut canvas);
        let walk = MoveIntent {
            forward: true,
            left: true,
            ..MoveIntent::IDLE
        };
        for _ in 0..20 {
            m.update(&walk, 1.0 / 60.0);
        }
        let pose = m.camera_pose();
        let player = *m.player();
        let labels = canvas.live();

        assert!(!m.switch_scene(SceneKey::Hub, &mut canvas).unwrap());
        assert_eq!(m.builds(), 1);
        assert_eq!(m.disposals(), 0);
        assert_eq!(m.camera_pose(), pose);
        assert_eq!(*m.player(), player);
        assert_eq!(canvas.live(), labels);
    }

    #[test]
    fn switch_disposes_outgoing_once() {
        let mut canvas = MemoryCanvas::new();
        let mut m = manager(&mut canvas);
        assert!(canvas.live() > 0);
        assert!(m.switch_scene(SceneKey::Ai, &mut canvas).unwrap());
        assert_eq!(m.active_key(), Some(SceneKey::Ai));
        assert_eq!(m.disposals(), 1);
        // The AI room holds no labels.
        assert_eq!(canvas.live(), 0);

        assert!(m.switch_scene(SceneKey::Hub, &mut canvas).unwrap());
        assert_eq!(m.builds(), 3);
        assert_eq!(m.disposals(), 2);
    }

    #[test]
    fn anchors_only_where_supported() {
        let mut canvas = MemoryCanvas::new();
        let mut m = manager(&mut canvas);
        assert!(m.supports_anchors());
        assert!(m.jump_to_anchor(Anchor::Projects));
        assert!(m.player().position.x < 0.0);

        m.switch_scene(SceneKey::Ai, &mut canvas).unwrap();
        let before = m.player().position;
        assert!(!m.supports_anchors());
        assert!(!m.jump_to_anchor(Anchor::Career));
        assert_eq!(m.player().position, before);
    }

    #[test]
    fn update_keeps_player_in_scene_bounds() {
        let mut canvas = MemoryCanvas::new();
        let mut m = manager(&mut canvas);
        let intent = MoveIntent {
            left: true,
            sprint: true,
            ..MoveIntent::IDLE
        };
        for _ in 0..600 {
            m.update(&intent, 1.0 / 60.0);
        }
        let bounds = m.active().unwrap().bounds();
        assert!(bounds.contains(m.player().position));
        assert!((m.player().position.x - bounds.min_x).abs() < 1e-4);
    }

    #[test]
    fn corridor_recenter_moves_camera_with_world() {
        let mut canvas = MemoryCanvas::new();
        let mut config = WorldConfig::default();
        config.hub.layout = HubLayout::Corridor;
        let mut m = SceneManager::new(&config, SceneKey::Hub, &mut canvas).unwrap();
        let forward = MoveIntent {
            forward: true,
            ..MoveIntent::IDLE
        };
        let mut shifted = Vec3::ZERO;
        for _ in 0..240 {
            for event in m.update(&forward, 1.0 / 60.0) {
                if let SceneEvent::Recentered { shift } = event {
                    shifted += shift;
                }
            }
        }
        assert!(shifted.z > 0.0);
        // The player never drifts far from the local origin.
        assert!(m.player().position.z.abs() <= config.hub.recenter_distance + 1.0);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut canvas = MemoryCanvas::new();
        let mut m = manager(&mut canvas);
        m.dispose(&mut canvas);
        m.dispose(&mut canvas);
        assert_eq!(m.disposals(), 1);
        assert_eq!(canvas.live(), 0);
        assert!(m.frame_view().is_none());
        assert!(m.update(&MoveIntent::IDLE, 0.016).is_empty());
    }
}
