use folio_common::math::{damp, lerp};
use folio_common::{Bounds, CameraConfig, SceneKey};
use folio_kernel::{
    NodeContent, NodeKind, PhaseTracker, Player, ProximityTracker, RoomPhase, TriggerNode,
};
use folio_render::{CameraPolicy, FrameView, LabelCanvas, Prop};
use folio_stream::hash01;
use glam::Vec3;

use crate::scene::{Scene, SceneEvent, TickContext};

const INPUT: Vec3 = Vec3::new(-4.5, 1.2, -5.0);
const AGENT: Vec3 = Vec3::new(0.0, 1.5, -9.0);
const OUTPUT: Vec3 = Vec3::new(4.5, 1.2, -5.0);
const NODE_RADIUS: f32 = 2.0;
const SPAWN: Vec3 = Vec3::new(0.0, 0.0, 2.5);
const PARTICLES: u32 = 96;
/// Seconds of boosted flow after a phase advance.
const BOOST_SECS: f32 = 1.6;
const INTENSITY_SMOOTHING: f32 = 0.08;

const NODE_COLORS: [[f32; 3]; 3] = [[0.16, 0.42, 1.0], [0.42, 0.66, 1.0], [0.17, 0.84, 0.48]];

/// The secondary room: input, agent and output stations walked in order.
#[derive(Debug)]
pub struct AiRoomScene {
    tracker: ProximityTracker,
    phase: PhaseTracker,
    camera: CameraConfig,
    clock: f32,
    last_advance: Option<f32>,
    intensity: f32,
    seeds: Vec<f32>,
    decor: Vec<Prop>,
}

impl AiRoomScene {
    pub fn new(camera: &CameraConfig) -> Self {
        let station = |id: &str, pos: Vec3, title: &str, subtitle: &str| {
            TriggerNode::new(id, NodeKind::Ai, pos, NODE_RADIUS, NodeContent::new(title, subtitle))
        };
        let nodes = vec![
            station("input", INPUT, "Input", "Signals arrive"),
            station("agent", AGENT, "Agent", "Reasoning step"),
            station("output", OUTPUT, "Output", "Result delivered"),
        ];
        let seeds = (0..PARTICLES).map(|i| hash01(i as i32, 0, 21)).collect();
        let decor = (0..24)
            .map(|i| {
                let x = -10.0 + hash01(i, 1, 22) * 20.0;
                let z = -2.0 - hash01(i, 1, 23) * 12.0;
                Prop::new(Vec3::new(x, 0.28, z), Vec3::splat(0.5), [0.05, 0.09, 0.15])
                    .with_yaw(hash01(i, 1, 24) * std::f32::consts::PI)
                    .with_emissive(0.12)
            })
            .collect();
        Self {
            tracker: ProximityTracker::new(nodes),
            phase: PhaseTracker::new(),
            camera: camera.clone(),
            clock: 0.0,
            last_advance: None,
            intensity: 0.2,
            seeds,
            decor,
        }
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase.phase()
    }

    /// Data-flow brightness; eases toward 0.9 right after an advance.
    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Station the current phase is waiting for.
    fn goal_index(&self) -> Option<usize> {
        match self.phase.phase() {
            RoomPhase::Input => Some(0),
            RoomPhase::Agent => Some(1),
            RoomPhase::Output => Some(2),
            RoomPhase::Done => None,
        }
    }

    /// Station highlighted for the current phase.
    fn active_index(&self) -> usize {
        self.goal_index().unwrap_or(2)
    }

    /// Particle position on its input -> agent -> output loop.
    fn particle(&self, seed: f32) -> Vec3 {
        let t = self.clock;
        let cycle = (t * 0.25 + seed).fract();
        let (a, b, u) = if cycle < 0.5 {
            (INPUT, AGENT, cycle / 0.5)
        } else {
            (AGENT, OUTPUT, (cycle - 0.5) / 0.5)
        };
        let wobble = Vec3::new(
            (t + seed).sin(),
            (t + seed).cos(),
            (t * 0.8 + seed).sin(),
        ) * 0.05;
        a.lerp(b, u) + wobble
    }
}

impl Scene for AiRoomScene {
    fn key(&self) -> SceneKey {
        SceneKey::Ai
    }

    fn bounds(&self) -> Bounds {
        Bounds::rect(-9.5, 9.5, -10.5, 10.5)
    }

    fn enter(&mut self, player: &mut Player) {
        player.place(SPAWN);
        player.yaw = 0.0;
        self.tracker.reset();
        self.phase.reset();
        self.last_advance = None;
    }

    fn tick(&mut self, ctx: &mut TickContext<'_>) -> Vec<SceneEvent> {
        self.clock += ctx.dt;
        let mut events = Vec::new();

        self.tracker.tick(ctx.player.position, ctx.dt);
        let reached = self
            .goal_index()
            .is_some_and(|i| self.tracker.pulse(i) > 0.0);
        if let Some(next) = self.phase.advance_if(reached) {
            tracing::debug!(phase = ?next, "ai room phase advanced");
            self.last_advance = Some(self.clock);
            events.push(SceneEvent::PhaseAdvanced(next));
        }

        let boosted = self
            .last_advance
            .is_some_and(|at| self.clock - at <= BOOST_SECS);
        let target = if boosted { 0.9 } else { 0.2 };
        self.intensity = lerp(self.intensity, target, damp(INTENSITY_SMOOTHING, ctx.dt));
        events
    }

    fn camera_policy(&self) -> CameraPolicy {
        CameraPolicy::trailing(&self.camera)
    }

    fn draw(&self, frame: &mut FrameView) {
        frame.sky = [0.024, 0.039, 0.063];
        frame.props.push(Prop::new(
            Vec3::new(0.0, -0.05, 0.0),
            Vec3::new(26.0, 0.1, 22.0),
            [0.04, 0.06, 0.09],
        ));
        frame.props.extend_from_slice(&self.decor);
        let active = self.active_index();
        for (i, (node, _, _)) in self.tracker.iter().enumerate() {
            let emissive = if i == active { 1.0 } else { 0.45 };
            frame.props.push(
                Prop::new(node.position, Vec3::splat(1.1), NODE_COLORS[i]).with_emissive(emissive),
            );
        }
        let glow = 0.5 + self.intensity * 0.5;
        for seed in &self.seeds {
            frame.props.push(
                Prop::new(self.particle(*seed), Vec3::splat(0.1), [1.0, 1.0, 1.0])
                    .with_emissive(glow),
            );
        }
    }

    fn hud_hint(&self) -> &'static str {
        "AI room: walk to input, then agent, then output. Escape returns to the island."
    }

    fn dispose(self: Box<Self>, _canvas: &mut dyn LabelCanvas) {
        tracing::debug!(phase = ?self.phase.phase(), "ai room disposed");
    }
}
