use folio_common::math::{damp, lerp, pulse};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Per-frame easing factor for node glow values.
const GLOW_SMOOTHING: f32 = 0.12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Project,
    Career,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLink {
    pub label: String,
    pub url: String,
}

/// What a node presents when the player reaches it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeContent {
    pub title: String,
    pub subtitle: String,
    pub links: Vec<NodeLink>,
}

impl NodeContent {
    pub fn new(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            links: Vec::new(),
        }
    }

    pub fn with_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.push(NodeLink {
            label: label.into(),
            url: url.into(),
        });
        self
    }
}

/// Static named landmark with a circular trigger zone on the ground plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerNode {
    pub id: String,
    pub kind: NodeKind,
    pub position: Vec3,
    pub radius: f32,
    /// When set, the player must also be within this lateral (x) offset.
    /// Nodes on side lanes use it so forward progress alone never fires them.
    pub lateral_tolerance: Option<f32>,
    pub content: NodeContent,
}

impl TriggerNode {
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        position: Vec3,
        radius: f32,
        content: NodeContent,
    ) -> Self {
        assert!(radius > 0.0, "trigger radius must be positive");
        Self {
            id: id.into(),
            kind,
            position,
            radius,
            lateral_tolerance: None,
            content,
        }
    }

    pub fn with_lateral_tolerance(mut self, tolerance: f32) -> Self {
        assert!(tolerance > 0.0, "lateral tolerance must be positive");
        self.lateral_tolerance = Some(tolerance);
        self
    }

    /// Ground-plane distance; height is ignored.
    pub fn distance_to(&self, p: Vec3) -> f32 {
        Vec2::new(p.x - self.position.x, p.z - self.position.z).length()
    }

    fn lane_allows(&self, p: Vec3) -> bool {
        self.lateral_tolerance
            .is_none_or(|tol| (p.x - self.position.x).abs() < tol)
    }

    pub fn pulse_at(&self, p: Vec3) -> f32 {
        if !self.lane_allows(p) {
            return 0.0;
        }
        pulse(self.distance_to(p), self.radius)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.pulse_at(p) > 0.0
    }
}

/// Visual feedback levels that ease toward a pulse-driven target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub light: f32,
    pub ring_scale: f32,
    pub label_opacity: f32,
}

impl Default for Glow {
    fn default() -> Self {
        Self::target(0.0)
    }
}

impl Glow {
    pub fn target(pulse: f32) -> Self {
        Self {
            light: 0.8 + pulse * 1.2,
            ring_scale: 1.0 + pulse * 0.1,
            label_opacity: 0.75 + pulse * 0.2,
        }
    }

    pub fn ease_toward(&mut self, pulse: f32, dt: f32) {
        let goal = Self::target(pulse);
        let w = damp(GLOW_SMOOTHING, dt);
        self.light = lerp(self.light, goal.light, w);
        self.ring_scale = lerp(self.ring_scale, goal.ring_scale, w);
        self.label_opacity = lerp(self.label_opacity, goal.label_opacity, w);
    }
}

/// A radius crossing reported by [`ProximityTracker::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProximityEvent {
    Entered { index: usize, first_visit: bool },
    Left { index: usize },
}

#[derive(Debug, Clone)]
struct Tracked {
    node: TriggerNode,
    pulse: f32,
    glow: Glow,
    inside: bool,
    visited: bool,
}

/// Evaluates a fixed node set against the player every tick.
#[derive(Debug, Clone)]
pub struct ProximityTracker {
    nodes: Vec<Tracked>,
}

impl ProximityTracker {
    pub fn new(nodes: Vec<TriggerNode>) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|node| Tracked {
                    node,
                    pulse: 0.0,
                    glow: Glow::default(),
                    inside: false,
                    visited: false,
                })
                .collect(),
        }
    }

    /// Update pulses and glows; report radius crossings.
    ///
    /// `first_visit` is true only for the first entry since construction or
    /// the last [`reset`](Self::reset).
    pub fn tick(&mut self, player: Vec3, dt: f32) -> Vec<ProximityEvent> {
        let mut events = Vec::new();
        for (index, t) in self.nodes.iter_mut().enumerate() {
            t.pulse = t.node.pulse_at(player);
            t.glow.ease_toward(t.pulse, dt);
            let inside = t.pulse > 0.0;
            if inside && !t.inside {
                let first_visit = !t.visited;
                t.visited = true;
                tracing::debug!(node = %t.node.id, first_visit, "entered trigger radius");
                events.push(ProximityEvent::Entered { index, first_visit });
            } else if !inside && t.inside {
                events.push(ProximityEvent::Left { index });
            }
            t.inside = inside;
        }
        events
    }

    pub fn reset(&mut self) {
        for t in &mut self.nodes {
            t.pulse = 0.0;
            t.glow = Glow::default();
            t.inside = false;
            t.visited = false;
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, index: usize) -> Option<&TriggerNode> {
        self.nodes.get(index).map(|t| &t.node)
    }

    pub fn pulse(&self, index: usize) -> f32 {
        self.nodes.get(index).map_or(0.0, |t| t.pulse)
    }

    pub fn glow(&self, index: usize) -> Glow {
        self.nodes.get(index).map_or_else(Glow::default, |t| t.glow)
    }

    pub fn was_visited(&self, index: usize) -> bool {
        self.nodes.get(index).is_some_and(|t| t.visited)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TriggerNode, f32, Glow)> {
        self.nodes.iter().map(|t| (&t.node, t.pulse, t.glow))
    }
}

/// Stages of the guided walk through the secondary room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RoomPhase {
    Input,
    Agent,
    Output,
    Done,
}

impl RoomPhase {
    pub fn next(self) -> Option<RoomPhase> {
        match self {
            Self::Input => Some(Self::Agent),
            Self::Agent => Some(Self::Output),
            Self::Output => Some(Self::Done),
            Self::Done => None,
        }
    }
}

/// Forward-only phase variable. Each phase fires its event exactly once per
/// visit; only [`reset`](Self::reset) moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTracker {
    phase: RoomPhase,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self {
            phase: RoomPhase::Input,
        }
    }

    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Advance one step when the current phase's goal is reached.
    pub fn advance_if(&mut self, reached: bool) -> Option<RoomPhase> {
        if !reached {
            return None;
        }
        let next = self.phase.next()?;
        self.phase = next;
        Some(next)
    }

    pub fn reset(&mut self) {
        self.phase = RoomPhase::Input;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(x: f32, z: f32, r: f32) -> TriggerNode {
        TriggerNode::new(
            "n",
            NodeKind::Project,
            Vec3::new(x, 0.0, z),
            r,
            NodeContent::new("Title", "Sub"),
        )
    }

    #[test]
    fn pulse_is_one_at_node_and_zero_at_radius() {
        let n = node(2.0, 3.0, 4.0);
        assert_eq!(n.pulse_at(Vec3::new(2.0, 0.0, 3.0)), 1.0);
        assert_eq!(n.pulse_at(Vec3::new(6.0, 0.0, 3.0)), 0.0);
        assert_eq!(n.pulse_at(Vec3::new(20.0, 0.0, 3.0)), 0.0);
    }

    #[test]
    fn pulse_strictly_decreases_inside_radius() {
        let n = node(0.0, 0.0, 3.0);
        let mut last = f32::INFINITY;
        for i in 0..30 {
            let d = i as f32 * 0.1;
            let p = n.pulse_at(Vec3::new(d, 0.0, 0.0));
            assert!(p < last);
            last = p;
        }
    }

    #[test]
    fn height_is_ignored() {
        let n = node(0.0, 0.0, 2.0);
        assert_eq!(n.pulse_at(Vec3::new(0.0, 50.0, 0.0)), 1.0);
    }

    #[test]
    #[should_panic(expected = "trigger radius must be positive")]
    fn zero_radius_is_rejected() {
        node(0.0, 0.0, 0.0);
    }

    #[test]
    fn lateral_tolerance_gates_lane() {
        let n = node(6.0, -10.0, 4.0).with_lateral_tolerance(1.0);
        // Within radius but outside the lane.
        assert_eq!(n.pulse_at(Vec3::new(4.5, 0.0, -10.0)), 0.0);
        assert!(n.pulse_at(Vec3::new(5.5, 0.0, -10.0)) > 0.0);
    }

    #[test]
    fn entry_fires_first_visit_once_per_visit() {
        let mut t = ProximityTracker::new(vec![node(0.0, 0.0, 2.0)]);
        let far = Vec3::new(10.0, 0.0, 0.0);
        let near = Vec3::ZERO;

        assert!(t.tick(far, 0.016).is_empty());
        assert_eq!(
            t.tick(near, 0.016),
            vec![ProximityEvent::Entered {
                index: 0,
                first_visit: true
            }]
        );
        // Staying inside fires nothing.
        assert!(t.tick(near, 0.016).is_empty());
        assert_eq!(t.tick(far, 0.016), vec![ProximityEvent::Left { index: 0 }]);
        assert_eq!(
            t.tick(near, 0.016),
            vec![ProximityEvent::Entered {
                index: 0,
                first_visit: false
            }]
        );

        t.reset();
        assert!(!t.was_visited(0));
        assert_eq!(
            t.tick(near, 0.016),
            vec![ProximityEvent::Entered {
                index: 0,
                first_visit: true
            }]
        );
    }

    #[test]
    fn glow_eases_instead_of_snapping() {
        let mut t = ProximityTracker::new(vec![node(0.0, 0.0, 2.0)]);
        t.tick(Vec3::ZERO, 1.0 / 60.0);
        let g = t.glow(0);
        assert!(g.light > Glow::target(0.0).light);
        assert!(g.light < Glow::target(1.0).light);
        for _ in 0..600 {
            t.tick(Vec3::ZERO, 1.0 / 60.0);
        }
        assert!((t.glow(0).light - Glow::target(1.0).light).abs() < 1e-3);
    }

    #[test]
    fn phase_only_moves_forward() {
        let mut p = PhaseTracker::new();
        assert_eq!(p.advance_if(false), None);
        assert_eq!(p.advance_if(true), Some(RoomPhase::Agent));
        assert_eq!(p.advance_if(true), Some(RoomPhase::Output));
        assert_eq!(p.advance_if(true), Some(RoomPhase::Done));
        assert_eq!(p.advance_if(true), None);
        assert_eq!(p.phase(), RoomPhase::Done);
        p.reset();
        assert_eq!(p.phase(), RoomPhase::Input);
    }
}
