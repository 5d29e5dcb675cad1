use folio_common::math::{damp, lerp};
use folio_common::{Anchor, Bounds, SceneKey};
use folio_kernel::{Glow, NodeContent, NodeKind, Player, ProximityEvent, ProximityTracker, TriggerNode};
use folio_render::{CameraPolicy, FrameView, LabelCanvas, LabelId, LabelView, Prop, RenderError};
use folio_stream::hash01;
use glam::Vec3;

use crate::dressing;
use crate::scene::{
    AnchorSupport, Scene, SceneEvent, TickContext, allocate_labels, release_labels,
};

pub(crate) const PROJECTS: [(&str, &str, [f32; 3]); 4] = [
    ("Projekt 1", "Plattformen", [0.53, 0.97, 0.79]),
    ("Projekt 2", "Frontend UX", [0.54, 0.89, 1.00]),
    ("Projekt 3", "Realtime", [0.97, 0.82, 0.40]),
    ("Projekt 4", "Automation", [1.00, 0.69, 0.87]),
];

pub(crate) const CAREER: [(&str, &str, [f32; 3]); 4] = [
    ("2015–2017", "Einstieg", [1.00, 0.83, 0.61]),
    ("2018–2020", "Delivery", [0.55, 1.00, 0.80]),
    ("2021–2023", "Lead", [0.61, 0.72, 1.00]),
    ("Heute", "Coaching", [0.96, 0.66, 1.00]),
];

pub(crate) const GATE_TITLE: &str = "AI Room";
pub(crate) const GATE_SUBTITLE: &str = "Enter to teleport";
pub(crate) const GATE_COLOR: [f32; 3] = [0.42, 0.66, 1.00];

const PROJECT_LANE_X: f32 = -6.6;
const CAREER_LANE_X: f32 = 6.6;
const PROJECT_Z: [f32; 4] = [-4.0, -10.0, -15.5, -21.2];
const CAREER_Z: [f32; 4] = [-5.0, -11.0, -17.0, -21.6];
const PROJECT_RADIUS: f32 = 3.6;
const CAREER_RADIUS: f32 = 3.2;
const GATE: Vec3 = Vec3::new(0.0, 0.0, -26.0);
const GATE_RADIUS: f32 = 2.5;

const SPAWN: Vec3 = Vec3::new(0.0, 0.0, 2.0);
const POOL: Vec3 = Vec3::new(1.6, 0.0, -2.2);
const POOL_RADIUS: f32 = 4.5;
const WIND_NEAR_POOL: f32 = 0.68;
const WIND_ELSEWHERE: f32 = 0.38;
const WIND_SMOOTHING: f32 = 0.06;
const CLOUD_WRAP_X: f32 = 20.0;
const CLOUD_COUNT: u32 = 8;

/// Label text for a node: title over subtitle.
pub(crate) fn label_text(content: &NodeContent) -> String {
    format!("{}\n{}", content.title, content.subtitle)
}

pub(crate) fn node_props(node: &TriggerNode, color: [f32; 3], glow: Glow) -> [Prop; 2] {
    let emissive = (glow.light / 2.0).clamp(0.0, 1.0);
    let ring = 1.8 * glow.ring_scale;
    [
        Prop::new(
            node.position + Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.6, 2.0, 0.6),
            color,
        )
        .with_emissive(emissive),
        Prop::new(
            node.position + Vec3::new(0.0, 0.04, 0.0),
            Vec3::new(ring, 0.05, ring),
            color,
        )
        .with_emissive(emissive * 0.5),
    ]
}

/// Translate tracker crossings into scene events.
pub(crate) fn crossing_events(tracker: &ProximityTracker, events: Vec<ProximityEvent>) -> Vec<SceneEvent> {
    events
        .into_iter()
        .filter_map(|event| match event {
            ProximityEvent::Entered { index, first_visit } => {
                tracker.node(index).map(|node| SceneEvent::NodeEntered {
                    kind: node.kind,
                    title: node.content.title.clone(),
                    subtitle: node.content.subtitle.clone(),
                    first_visit,
                })
            }
            ProximityEvent::Left { index } => tracker
                .node(index)
                .map(|node| SceneEvent::NodeLeft { kind: node.kind }),
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Cloud {
    position: Vec3,
    speed: f32,
}

/// The floating island: a project lane on the left, a career lane on the
/// right, a pool near the start plateau and the AI gate at the far end.
#[derive(Debug)]
pub struct HubScene {
    tracker: ProximityTracker,
    colors: Vec<[f32; 3]>,
    labels: Vec<LabelId>,
    label_texts: Vec<String>,
    wind: f32,
    clouds: Vec<Cloud>,
    dressing: Vec<Prop>,
}

impl HubScene {
    pub fn new(canvas: &mut dyn LabelCanvas) -> Result<Self, RenderError> {
        let mut nodes = Vec::new();
        let mut colors = Vec::new();
        for (i, (title, subtitle, color)) in PROJECTS.iter().enumerate() {
            nodes.push(TriggerNode::new(
                format!("p{}", i + 1),
                NodeKind::Project,
                Vec3::new(PROJECT_LANE_X, 0.0, PROJECT_Z[i]),
                PROJECT_RADIUS,
                NodeContent::new(*title, *subtitle),
            ));
            colors.push(*color);
        }
        for (i, (title, subtitle, color)) in CAREER.iter().enumerate() {
            nodes.push(TriggerNode::new(
                format!("c{}", i + 1),
                NodeKind::Career,
                Vec3::new(CAREER_LANE_X, 0.0, CAREER_Z[i]),
                CAREER_RADIUS,
                NodeContent::new(*title, *subtitle),
            ));
            colors.push(*color);
        }
        nodes.push(TriggerNode::new(
            "gate",
            NodeKind::Ai,
            GATE,
            GATE_RADIUS,
            NodeContent::new(GATE_TITLE, GATE_SUBTITLE),
        ));
        colors.push(GATE_COLOR);

        let label_texts: Vec<String> = nodes.iter().map(|n| label_text(&n.content)).collect();
        let labels = allocate_labels(canvas, label_texts.iter().map(String::as_str))?;

        let clouds = (0..CLOUD_COUNT)
            .map(|i| Cloud {
                position: Vec3::new(
                    -18.0 + hash01(i as i32, 0, 11) * 36.0,
                    9.0 + hash01(i as i32, 0, 12) * 7.0,
                    -34.0 + hash01(i as i32, 0, 13) * 38.0,
                ),
                speed: 0.6 + hash01(i as i32, 0, 14) * 0.8,
            })
            .collect();

        Ok(Self {
            tracker: ProximityTracker::new(nodes),
            colors,
            labels,
            label_texts,
            wind: 0.32,
            clouds,
            dressing: island_dressing(),
        })
    }

    /// Ambient wind level; higher near the pool.
    pub fn wind(&self) -> f32 {
        self.wind
    }

    pub fn sun_intensity(&self) -> f32 {
        1.2 + 0.25 * self.wind
    }

    pub fn tracker(&self) -> &ProximityTracker {
        &self.tracker
    }

    pub fn cloud_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.clouds.iter().map(|c| c.position)
    }

    fn anchor_position(anchor: Anchor) -> Vec3 {
        match anchor {
            Anchor::Intro => SPAWN,
            // One unit in front of the first node of each lane.
            Anchor::Projects => Vec3::new(PROJECT_LANE_X, 0.0, PROJECT_Z[0] + 1.0),
            Anchor::Career => Vec3::new(CAREER_LANE_X, 0.0, CAREER_Z[0] + 1.0),
            Anchor::Ai => GATE + Vec3::new(0.0, 0.0, GATE_RADIUS + 0.5),
        }
    }
}

fn island_dressing() -> Vec<Prop> {
    let mut props = vec![
        // Island body and the central path.
        Prop::new(Vec3::new(0.0, -0.35, -8.0), Vec3::new(23.0, 0.7, 46.0), [0.42, 0.70, 0.38]),
        Prop::new(Vec3::new(0.0, 0.01, -12.0), Vec3::new(1.8, 0.02, 30.0), [0.83, 0.76, 0.60]),
        // Pool and cabin by the start plateau.
        Prop::new(POOL + Vec3::new(0.0, 0.05, 0.0), Vec3::new(5.0, 0.1, 4.0), [0.35, 0.70, 0.92])
            .with_emissive(0.1),
        Prop::new(Vec3::new(-2.2, 1.2, 2.8), Vec3::new(2.6, 2.4, 2.2), [0.72, 0.55, 0.40]),
        Prop::new(Vec3::new(-2.2, 2.6, 2.8), Vec3::new(3.0, 0.5, 2.6), [0.55, 0.30, 0.25]),
        Prop::new(Vec3::new(-1.0, 0.3, 6.5), Vec3::new(3.0, 0.2, 1.2), [0.60, 0.45, 0.30]),
    ];
    for (cz, z0) in (-4..2).map(|i| (i, i as f32 * 8.0)) {
        for (cx, x0) in [(-1, -11.0), (1, 8.0)] {
            props.extend(dressing::scatter(cx, cz, Vec3::new(x0, 0.0, z0), 3.0, 4, 0.0));
        }
    }
    props
}

impl Scene for HubScene {
    fn key(&self) -> SceneKey {
        SceneKey::Hub
    }

    fn bounds(&self) -> Bounds {
        Bounds::rect(-10.5, 10.5, -30.0, 14.0)
    }

    fn enter(&mut self, player: &mut Player) {
        player.place(SPAWN);
        player.yaw = 0.0;
        self.tracker.reset();
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Vec<SceneEvent> {
        let p = ctx.player.position;
        let near_pool = p.distance(POOL) < POOL_RADIUS;
        let target = if near_pool { WIND_NEAR_POOL } else { WIND_ELSEWHERE };
        self.wind = lerp(self.wind, target, damp(WIND_SMOOTHING, ctx.dt));

        for cloud in &mut self.clouds {
            cloud.position.x += cloud.speed * 1.2 * ctx.dt;
            if cloud.position.x > CLOUD_WRAP_X {
                cloud.position.x = -CLOUD_WRAP_X;
            }
        }

        let events = self.tracker.tick(p, ctx.dt);
        crossing_events(&self.tracker, events)
    }

    fn camera_policy(&self) -> CameraPolicy {
        CameraPolicy::Oblique {
            offset: Vec3::new(0.0, 11.4, 14.0),
            depth_parallax: 0.04,
            look_height: 1.8,
            look_lateral: 0.5,
            look_forward: -2.0,
        }
    }

    fn anchors(&mut self) -> Option<&mut dyn AnchorSupport> {
        Some(self)
    }

    fn draw(&self, frame: &mut FrameView) {
        let k = (self.sun_intensity() / 1.4).min(1.0);
        frame.sky = [0.55 * k, 0.78 * k, 0.98 * k];
        frame.props.extend_from_slice(&self.dressing);
        for cloud in &self.clouds {
            frame.props.push(Prop::new(cloud.position, Vec3::new(3.2, 1.0, 2.0), [1.0, 1.0, 1.0]));
        }
        for (i, (node, _, glow)) in self.tracker.iter().enumerate() {
            frame.props.extend(node_props(node, self.colors[i], glow));
            frame.labels.push(LabelView {
                surface: self.labels[i],
                position: node.position + Vec3::new(0.0, 2.8, -0.6),
                text: self.label_texts[i].clone(),
                opacity: glow.label_opacity,
            });
        }
    }

    fn hud_hint(&self) -> &'static str {
        "Floating island: walk with WASD/arrows, Shift sprints. 1 projects (left), \
         2 career (right), 3 start plateau, 4 AI gate, Enter teleports."
    }

    fn dispose(self: Box<Self>, canvas: &mut dyn LabelCanvas) {
        release_labels(canvas, self.labels);
        tracing::debug!("hub scene disposed");
    }
}

impl AnchorSupport for HubScene {
    fn anchor_names(&self) -> &'static [Anchor] {
        &Anchor::ALL
    }

    fn set_anchor(&mut self, anchor: Anchor, player: &mut Player) -> bool {
        player.place(Self::anchor_position(anchor));
        tracing::debug!(%anchor, "hub anchor jump");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_render::MemoryCanvas;

    fn hub() -> (HubScene, MemoryCanvas) {
        let mut canvas = MemoryCanvas::new();
        let scene = HubScene::new(&mut canvas).unwrap();
        (scene, canvas)
    }

    fn tick(scene: &mut HubScene, player: &mut Player, frames: usize) -> Vec<SceneEvent> {
        let mut all = Vec::new();
        for _ in 0..frames {
            let mut ctx = TickContext {
                player: &mut *player,
                dt: 1.0 / 60.0,
            };
            all.extend(scene.tick(&mut ctx));
        }
        all
    }

    #[test]
    fn one_label_per_node_and_released_on_dispose() {
        let (scene, mut canvas) = hub();
        assert_eq!(canvas.live(), 9);
        Box::new(scene).dispose(&mut canvas);
        assert_eq!(canvas.live(), 0);
    }

    #[test]
    fn spawn_is_inside_bounds_and_outside_every_radius() {
        let (mut scene, _canvas) = hub();
        let mut player = Player::default();
        scene.enter(&mut player);
        assert!(scene.bounds().contains(player.position));
        assert!(tick(&mut scene, &mut player, 1).is_empty());
    }

    #[test]
    fn anchors_land_next_to_first_lane_node() {
        let (mut scene, _canvas) = hub();
        let mut player = Player::default();
        scene.enter(&mut player);

        assert!(scene.set_anchor(Anchor::Career, &mut player));
        assert_eq!(player.position, Vec3::new(6.6, 0.0, -4.0));
        let events = tick(&mut scene, &mut player, 1);
        assert_eq!(
            events,
            vec![SceneEvent::NodeEntered {
                kind: NodeKind::Career,
                title: "2015–2017".into(),
                subtitle: "Einstieg".into(),
                first_visit: true,
            }]
        );

        assert!(scene.set_anchor(Anchor::Projects, &mut player));
        let events = tick(&mut scene, &mut player, 1);
        assert!(events.contains(&SceneEvent::NodeLeft {
            kind: NodeKind::Career
        }));
        assert!(events.iter().any(|e| matches!(
            e,
            SceneEvent::NodeEntered {
                kind: NodeKind::Project,
                ..
            }
        )));
    }

    #[test]
    fn every_anchor_is_inside_bounds() {
        let (scene, _canvas) = hub();
        for anchor in Anchor::ALL {
            assert!(scene.bounds().contains(HubScene::anchor_position(anchor)), "{anchor}");
        }
    }

    #[test]
    fn wind_rises_near_pool() {
        let (mut scene, _canvas) = hub();
        let mut player = Player::at(POOL);
        tick(&mut scene, &mut player, 600);
        assert!((scene.wind() - WIND_NEAR_POOL).abs() < 1e-3);
        player.place(Vec3::new(-8.0, 0.0, -28.0));
        tick(&mut scene, &mut player, 600);
        assert!((scene.wind() - WIND_ELSEWHERE).abs() < 1e-3);
    }

    #[test]
    fn clouds_wrap() {
        let (mut scene, _canvas) = hub();
        let mut player = Player::at(SPAWN);
        // Slowest cloud needs about 56 s to cross the whole span.
        tick(&mut scene, &mut player, 60 * 60);
        assert!(
            scene
                .cloud_positions()
                .all(|p| (-CLOUD_WRAP_X..=CLOUD_WRAP_X).contains(&p.x))
        );
    }

    #[test]
    fn draw_emits_labels_with_glow_opacity() {
        let (mut scene, _canvas) = hub();
        let mut player = Player::at(Vec3::new(PROJECT_LANE_X, 0.0, PROJECT_Z[0]));
        tick(&mut scene, &mut player, 120);
        let mut frame = FrameView::new(
            SceneKey::Hub,
            scene.camera_target(&player),
            55.0,
        );
        scene.draw(&mut frame);
        assert_eq!(frame.labels.len(), 9);
        assert!(frame.labels[0].opacity > frame.labels[1].opacity);
        assert!(frame.labels[0].text.starts_with("Projekt 1"));
    }
}
