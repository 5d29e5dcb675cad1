use folio_common::SceneKey;
use folio_kernel::TransitionPhase;
use folio_session::{Panel, Session};

/// Read-only queries against a running session for debugging and dev UI.
pub struct SessionInspector;

impl SessionInspector {
    pub fn summary(session: &Session) -> SessionSummary {
        let overlay = session.overlay();
        let overlay = overlay.borrow();
        let manager = session.manager();
        SessionSummary {
            frames: session.frames(),
            scene: session.active_scene(),
            transition: session.transition().phase(),
            builds: manager.builds(),
            disposals: manager.disposals(),
            live_labels: session.canvas().live(),
            hud: overlay.hud().to_string(),
            bubbles: overlay.bubbles().len(),
            career_panel: overlay.is_open(Panel::Career),
            average_frame_ms: session.frame_timer().average().as_secs_f32() * 1000.0,
            stalls: session.frame_timer().stalls(),
        }
    }

    pub fn player(session: &Session) -> PlayerInfo {
        let p = session.player();
        PlayerInfo {
            position: p.position.to_array(),
            yaw: p.yaw,
            speed: p.speed(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionSummary {
    pub frames: u64,
    /// `None` after unmount.
    pub scene: Option<SceneKey>,
    pub transition: TransitionPhase,
    pub builds: usize,
    pub disposals: usize,
    pub live_labels: usize,
    pub hud: String,
    pub bubbles: usize,
    pub career_panel: bool,
    pub average_frame_ms: f32,
    pub stalls: u64,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scene = self.scene.map_or("none", SceneKey::as_str);
        write!(
            f,
            "Session: frames={} scene={} transition={:?} builds={} disposals={} labels={} bubbles={} avg_frame={:.1}ms stalls={}",
            self.frames,
            scene,
            self.transition,
            self.builds,
            self.disposals,
            self.live_labels,
            self.bubbles,
            self.average_frame_ms,
            self.stalls,
        )
    }
}

#[derive(Debug, Clone)]
pub struct PlayerInfo {
    pub position: [f32; 3],
    pub yaw: f32,
    pub speed: f32,
}

impl std::fmt::Display for PlayerInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Player pos=({:.2}, {:.2}, {:.2}) yaw={:.2} speed={:.2}",
            self.position[0], self.position[1], self.position[2], self.yaw, self.speed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_common::WorldConfig;
    use folio_render::MemoryCanvas;
    use folio_session::{NullSink, Overlay};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    fn session() -> (Session, Instant) {
        let t0 = Instant::now();
        let session = Session::mount(
            WorldConfig::default(),
            Rc::new(RefCell::new(Overlay::new(5))),
            Box::new(MemoryCanvas::new()),
            Box::new(NullSink),
            t0,
        )
        .unwrap();
        (session, t0)
    }

    #[test]
    fn summary_of_fresh_session() {
        let (session, _) = session();
        let summary = SessionInspector::summary(&session);
        assert_eq!(summary.frames, 0);
        assert_eq!(summary.scene, Some(SceneKey::Hub));
        assert_eq!(summary.transition, TransitionPhase::Idle);
        assert_eq!(summary.builds, 1);
        assert!(summary.live_labels > 0);
    }

    #[test]
    fn summary_after_unmount() {
        let (mut session, t0) = session();
        session.frame(t0 + Duration::from_millis(16)).unwrap();
        session.unmount();
        let summary = SessionInspector::summary(&session);
        assert_eq!(summary.frames, 1);
        assert_eq!(summary.scene, None);
        assert_eq!(summary.live_labels, 0);
        assert!(format!("{summary}").contains("scene=none"));
    }

    #[test]
    fn player_display() {
        let (session, _) = session();
        let info = SessionInspector::player(&session);
        assert_eq!(info.position, [0.0, 0.0, 2.0]);
        assert!(format!("{info}").starts_with("Player pos=(0.00, 0.00, 2.00)"));
    }
}
