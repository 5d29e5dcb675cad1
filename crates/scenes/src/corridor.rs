use folio_common::{Anchor, Bounds, SceneKey, WorldConfig};
use folio_kernel::{NodeContent, NodeKind, Player, ProximityTracker, TriggerNode};
use folio_render::{CameraPolicy, FrameView, LabelCanvas, LabelId, LabelView, Prop, RenderError};
use folio_stream::{ChunkCoord, ChunkGrid, ChunkWindow};
use glam::Vec3;

use crate::dressing;
use crate::hub::{
    CAREER, GATE_COLOR, GATE_SUBTITLE, GATE_TITLE, PROJECTS, crossing_events, label_text,
    node_props,
};
use crate::scene::{
    AnchorSupport, Scene, SceneEvent, TickContext, allocate_labels, release_labels,
};

const LANE_X: f32 = 6.0;
const LANE_TOLERANCE: f32 = 2.0;
const NODE_RADIUS: f32 = 4.0;
const NODE_SPACING: f32 = 16.0;
const FIRST_PROJECT_Z: f32 = -14.0;
const FIRST_CAREER_Z: f32 = -18.0;
const GATE_RADIUS: f32 = 2.5;
const HALF_WIDTH: f32 = 9.5;
const DECOR_CLEARANCE: f32 = 8.0;
const DECOR_PER_CHUNK: u32 = 6;

fn gate_z() -> f32 {
    FIRST_PROJECT_Z - NODE_SPACING * PROJECTS.len() as f32
}

/// Endless-forward hub. The player stays near local z = 0; the world root
/// scrolls by `origin_z` and decoration streams in chunks around the
/// player's world position.
///
/// Local and world space relate by `local = world + (0, 0, origin_z)`.
#[derive(Debug)]
pub struct CorridorScene {
    tracker: ProximityTracker,
    colors: Vec<[f32; 3]>,
    labels: Vec<LabelId>,
    label_texts: Vec<String>,
    origin_z: f32,
    recenter_distance: f32,
    grid: ChunkGrid,
    window: ChunkWindow<Vec<Prop>>,
}

impl CorridorScene {
    pub fn new(config: &WorldConfig, canvas: &mut dyn LabelCanvas) -> Result<Self, RenderError> {
        let mut nodes = Vec::new();
        let mut colors = Vec::new();
        for (i, (title, subtitle, color)) in PROJECTS.iter().enumerate() {
            nodes.push(
                TriggerNode::new(
                    format!("p{}", i + 1),
                    NodeKind::Project,
                    Vec3::new(-LANE_X, 0.0, FIRST_PROJECT_Z - NODE_SPACING * i as f32),
                    NODE_RADIUS,
                    NodeContent::new(*title, *subtitle),
                )
                .with_lateral_tolerance(LANE_TOLERANCE),
            );
            colors.push(*color);
        }
        for (i, (title, subtitle, color)) in CAREER.iter().enumerate() {
            nodes.push(
                TriggerNode::new(
                    format!("c{}", i + 1),
                    NodeKind::Career,
                    Vec3::new(LANE_X, 0.0, FIRST_CAREER_Z - NODE_SPACING * i as f32),
                    NODE_RADIUS,
                    NodeContent::new(*title, *subtitle),
                )
                .with_lateral_tolerance(LANE_TOLERANCE),
            );
            colors.push(*color);
        }
        nodes.push(TriggerNode::new(
            "gate",
            NodeKind::Ai,
            Vec3::new(0.0, 0.0, gate_z()),
            GATE_RADIUS,
            NodeContent::new(GATE_TITLE, GATE_SUBTITLE),
        ));
        colors.push(GATE_COLOR);

        let label_texts: Vec<String> = nodes.iter().map(|n| label_text(&n.content)).collect();
        let labels = allocate_labels(canvas, label_texts.iter().map(String::as_str))?;

        Ok(Self {
            tracker: ProximityTracker::new(nodes),
            colors,
            labels,
            label_texts,
            origin_z: 0.0,
            recenter_distance: config.hub.recenter_distance,
            grid: ChunkGrid::new(config.stream.chunk_size),
            window: ChunkWindow::new(config.stream.radius, config.stream.load_budget),
        })
    }

    pub fn origin_z(&self) -> f32 {
        self.origin_z
    }

    pub fn to_world(&self, local: Vec3) -> Vec3 {
        local - Vec3::new(0.0, 0.0, self.origin_z)
    }

    pub fn to_local(&self, world: Vec3) -> Vec3 {
        world + Vec3::new(0.0, 0.0, self.origin_z)
    }

    pub fn live_chunks(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.window.iter().map(|(c, _)| *c)
    }

    pub fn chunk_window(&self) -> &ChunkWindow<Vec<Prop>> {
        &self.window
    }

    pub fn tracker(&self) -> &ProximityTracker {
        &self.tracker
    }

    fn anchor_world(anchor: Anchor) -> Vec3 {
        match anchor {
            Anchor::Intro => Vec3::ZERO,
            Anchor::Projects => Vec3::new(-LANE_X, 0.0, FIRST_PROJECT_Z + 1.0),
            Anchor::Career => Vec3::new(LANE_X, 0.0, FIRST_CAREER_Z + 1.0),
            Anchor::Ai => Vec3::new(0.0, 0.0, gate_z() + GATE_RADIUS + 0.5),
        }
    }

    /// Pull the player back to local z = 0 once it drifts too far.
    fn recenter(&mut self, player: &mut Player) -> Option<Vec3> {
        let drift = player.position.z;
        if drift.abs() <= self.recenter_distance {
            return None;
        }
        let shift = Vec3::new(0.0, 0.0, -drift);
        player.position += shift;
        self.origin_z += shift.z;
        tracing::debug!(origin_z = self.origin_z, "corridor recentered");
        Some(shift)
    }

    fn stream(&mut self, world: Vec3) {
        let grid = self.grid;
        let center = grid.position_to_chunk(world);
        let diff = self.window.update(center, |c| {
            dressing::scatter(
                c.x,
                c.z,
                grid.chunk_origin(c),
                grid.chunk_size(),
                DECOR_PER_CHUNK,
                DECOR_CLEARANCE,
            )
        });
        if !diff.is_empty() {
            tracing::trace!(
                loaded = diff.loaded.len(),
                evicted = diff.evicted.len(),
                pending = diff.pending,
                "corridor chunks streamed"
            );
        }
    }
}

impl Scene for CorridorScene {
    fn key(&self) -> SceneKey {
        SceneKey::Hub
    }

    fn bounds(&self) -> Bounds {
        Bounds::lateral(-HALF_WIDTH, HALF_WIDTH)
    }

    fn enter(&mut self, player: &mut Player) {
        player.place(Vec3::ZERO);
        player.yaw = 0.0;
        self.origin_z = 0.0;
        self.tracker.reset();
        self.window.clear();
        self.stream(Vec3::ZERO);
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Vec<SceneEvent> {
        let mut events = Vec::new();
        if let Some(shift) = self.recenter(ctx.player) {
            events.push(SceneEvent::Recentered { shift });
        }
        let world = self.to_world(ctx.player.position);
        self.stream(world);
        let crossings = self.tracker.tick(world, ctx.dt);
        events.extend(crossing_events(&self.tracker, crossings));
        events
    }

    fn camera_policy(&self) -> CameraPolicy {
        CameraPolicy::Corridor {
            height: 7.5,
            distance: 11.0,
            parallax: 0.35,
            max_parallax: 2.5,
            look_height: 1.2,
            look_ahead: 6.0,
        }
    }

    fn anchors(&mut self) -> Option<&mut dyn AnchorSupport> {
        Some(self)
    }

    fn draw(&self, frame: &mut FrameView) {
        let shift = Vec3::new(0.0, 0.0, self.origin_z);
        // Ground and lanes follow the pinned player, so they never run out.
        frame.props.push(Prop::new(
            Vec3::new(0.0, -0.35, 0.0),
            Vec3::new(2.0 * HALF_WIDTH + 6.0, 0.7, 160.0),
            [0.42, 0.70, 0.38],
        ));
        for x in [-LANE_X, 0.0, LANE_X] {
            frame.props.push(Prop::new(
                Vec3::new(x, 0.01, 0.0),
                Vec3::new(1.6, 0.02, 160.0),
                [0.83, 0.76, 0.60],
            ));
        }
        for (_, props) in self.window.iter() {
            frame.props.extend(props.iter().map(|p| Prop {
                position: p.position + shift,
                ..*p
            }));
        }
        for (i, (node, _, glow)) in self.tracker.iter().enumerate() {
            let local = TriggerNode {
                position: node.position + shift,
                ..node.clone()
            };
            frame.props.extend(node_props(&local, self.colors[i], glow));
            frame.labels.push(LabelView {
                surface: self.labels[i],
                position: local.position + Vec3::new(0.0, 2.8, -0.6),
                text: self.label_texts[i].clone(),
                opacity: glow.label_opacity,
            });
        }
    }

    fn hud_hint(&self) -> &'static str {
        "Corridor: keep walking forward. Step onto the left lane for projects, \
         the right lane for career. 1/2/3 jump, Enter teleports."
    }

    fn dispose(mut self: Box<Self>, canvas: &mut dyn LabelCanvas) {
        let chunks = self.window.clear().len();
        release_labels(canvas, std::mem::take(&mut self.labels));
        tracing::debug!(chunks, "corridor scene disposed");
    }
}

impl AnchorSupport for CorridorScene {
    fn anchor_names(&self) -> &'static [Anchor] {
        &Anchor::ALL
    }

    fn set_anchor(&mut self, anchor: Anchor, player: &mut Player) -> bool {
        let target = Self::anchor_world(anchor);
        self.origin_z = -target.z;
        player.place(Vec3::new(target.x, 0.0, 0.0));
        tracing::debug!(%anchor, origin_z = self.origin_z, "corridor anchor jump");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_render::MemoryCanvas;

    fn corridor() -> (CorridorScene, Player) {
        let mut canvas = MemoryCanvas::new();
        let mut scene = CorridorScene::new(&WorldConfig::default(), &mut canvas).unwrap();
        let mut player = Player::default();
        scene.enter(&mut player);
        (scene, player)
    }

    /// Walk `frames` steps of `step` along z at lateral offset `x`.
    fn walk(
        scene: &mut CorridorScene,
        player: &mut Player,
        x: f32,
        step: f32,
        frames: usize,
    ) -> Vec<SceneEvent> {
        let mut all = Vec::new();
        for _ in 0..frames {
            player.position.x = x;
            player.position.z += step;
            let mut ctx = TickContext {
                player: &mut *player,
                dt: 1.0 / 60.0,
            };
            all.extend(scene.tick(&mut ctx));
        }
        all
    }

    #[test]
    fn player_stays_pinned_while_world_scrolls() {
        let (mut scene, mut player) = corridor();
        let limit = WorldConfig::default().hub.recenter_distance;
        let mut last_world = 0.0;
        let mut recenters = 0;
        for _ in 0..600 {
            let events = walk(&mut scene, &mut player, 0.0, -0.1, 1);
            recenters += events
                .iter()
                .filter(|e| matches!(e, SceneEvent::Recentered { .. }))
                .count();
            assert!(player.position.z.abs() <= limit);
            let world = scene.to_world(player.position).z;
            assert!(world < last_world);
            last_world = world;
        }
        assert!(recenters >= 5);
        assert!((last_world + 60.0).abs() < 1e-2, "{last_world}");
    }

    #[test]
    fn recenter_shift_matches_player_jump() {
        let (mut scene, mut player) = corridor();
        let events = walk(&mut scene, &mut player, 0.0, -8.5, 1);
        assert_eq!(
            events.first(),
            Some(&SceneEvent::Recentered {
                shift: Vec3::new(0.0, 0.0, 8.5)
            })
        );
        assert_eq!(player.position.z, 0.0);
        assert_eq!(scene.to_world(player.position).z, -8.5);
    }

    #[test]
    fn center_path_never_fires_lane_nodes() {
        let (mut scene, mut player) = corridor();
        // Walk past every lane node but stop short of the gate.
        let events = walk(&mut scene, &mut player, 0.0, -0.1, 700);
        assert!(events.iter().all(|e| !matches!(
            e,
            SceneEvent::NodeEntered {
                kind: NodeKind::Project | NodeKind::Career,
                ..
            }
        )));
    }

    #[test]
    fn lane_step_fires_node() {
        let (mut scene, mut player) = corridor();
        walk(&mut scene, &mut player, 0.0, -0.1, 130);
        let events = walk(&mut scene, &mut player, -LANE_X, 0.0, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            SceneEvent::NodeEntered {
                kind: NodeKind::Project,
                first_visit: true,
                ..
            }
        )));
    }

    #[test]
    fn chunks_follow_the_window() {
        let (mut scene, mut player) = corridor();
        let cfg = WorldConfig::default();
        let side = (2 * cfg.stream.radius + 1) as usize;
        assert_eq!(scene.live_chunks().count(), side * side);

        walk(&mut scene, &mut player, 0.0, -0.2, 600);
        let center = scene.chunk_window().center().unwrap();
        assert_eq!(
            center,
            ChunkGrid::new(cfg.stream.chunk_size).position_to_chunk(scene.to_world(player.position))
        );
        assert!(
            scene
                .live_chunks()
                .all(|c| c.chebyshev(center) <= cfg.stream.radius)
        );
        assert_eq!(scene.live_chunks().count(), side * side);
    }

    #[test]
    fn anchor_resets_scroll_offset() {
        let (mut scene, mut player) = corridor();
        walk(&mut scene, &mut player, 0.0, -0.1, 400);
        assert!(scene.origin_z() > 0.0);

        assert!(scene.set_anchor(Anchor::Career, &mut player));
        assert_eq!(player.position, Vec3::new(LANE_X, 0.0, 0.0));
        assert_eq!(scene.to_world(player.position), CorridorScene::anchor_world(Anchor::Career));

        assert!(scene.set_anchor(Anchor::Intro, &mut player));
        assert_eq!(scene.origin_z(), 0.0);
        assert_eq!(player.position, Vec3::ZERO);
    }

    #[test]
    fn draw_places_content_in_local_space() {
        let (mut scene, mut player) = corridor();
        scene.set_anchor(Anchor::Projects, &mut player);
        walk(&mut scene, &mut player, -LANE_X, 0.0, 1);
        let mut frame = FrameView::new(SceneKey::Hub, scene.camera_target(&player), 55.0);
        scene.draw(&mut frame);
        // First project sign sits just ahead of the pinned player.
        let sign = &frame.labels[0];
        assert!(sign.text.starts_with("Projekt 1"));
        assert!((sign.position.z - (-1.0 - 0.6)).abs() < 1e-4, "{:?}", sign.position);
    }
}
