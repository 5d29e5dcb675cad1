use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;
use std::time::{Duration, Instant};

use folio_common::{Anchor, ConfigError, SceneKey, WorldConfig};
use folio_input::action::BINDINGS;
use folio_input::{Action, Attachment, InputHandle, InputSampler, MoveIntent};
use folio_kernel::{
    NodeKind, Player, RoomPhase, TeleportTransition, TransitionPhase, TransitionStep,
};
use folio_render::{FrameView, LabelCanvas, Renderer};
use folio_scenes::{SceneError, SceneEvent};
use folio_stream::FrameTimer;

use crate::audio::{AmbientAudio, AudioSink};
use crate::handle::{AnchorHandle, AnchorQueue};
use crate::manager::SceneManager;
use crate::overlay::{Overlay, Panel};

const TELEPORTING_TO_AI: &str = "Teleporting to the AI room...";
const TELEPORTING_HOME: &str = "Teleporting back to the island...";
const TIMER_WINDOW: usize = 120;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("session is not mounted")]
    Unmounted,
}

/// One mounted world view.
///
/// Created by [`Session::mount`], driven by [`Session::frame`] and torn down
/// by [`Session::unmount`] or drop.
pub struct Session {
    config: WorldConfig,
    sampler: InputSampler,
    attachment: Option<Attachment>,
    manager: SceneManager,
    transition: TeleportTransition,
    overlay: Rc<RefCell<Overlay>>,
    anchors: Option<Rc<RefCell<AnchorQueue>>>,
    canvas: Box<dyn LabelCanvas>,
    audio: AmbientAudio,
    timer: FrameTimer,
    last_frame: Option<Instant>,
    /// Keys down at the previous frame, for edge detection.
    held: BTreeSet<String>,
    frames: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("manager", &self.manager)
            .field("transition", &self.transition.phase())
            .field("frames", &self.frames)
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

impl Session {
    /// Build the hub, attach input and seed the HUD.
    pub fn mount(
        config: WorldConfig,
        overlay: Rc<RefCell<Overlay>>,
        mut canvas: Box<dyn LabelCanvas>,
        sink: Box<dyn AudioSink>,
        now: Instant,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let manager = SceneManager::new(&config, SceneKey::Hub, canvas.as_mut())?;
        let sampler = InputSampler::new();
        let attachment = sampler.attach();
        let anchors = Rc::new(RefCell::new(AnchorQueue::default()));

        overlay.borrow_mut().set_hud(manager.hud_hint());
        let audio = AmbientAudio::new(sink, &config.audio);
        let max_dt_ms = config.frame.max_dt_ms;
        tracing::info!(layout = ?config.hub.layout, "session mounted");

        let mut session = Self {
            transition: TeleportTransition::from_config(&config.teleport),
            config,
            sampler,
            attachment: Some(attachment),
            manager,
            overlay,
            anchors: Some(anchors),
            canvas,
            audio,
            timer: FrameTimer::new(TIMER_WINDOW)
                .with_stall_threshold(Duration::from_millis(max_dt_ms)),
            last_frame: Some(now),
            held: BTreeSet::new(),
            frames: 0,
        };
        session.sync_anchor_support();
        Ok(session)
    }

    pub fn is_mounted(&self) -> bool {
        self.attachment.is_some()
    }

    /// Where the host window feeds physical key events.
    pub fn sampler(&self) -> &InputSampler {
        &self.sampler
    }

    /// Virtual-key capability for touch controls.
    pub fn input_handle(&self) -> InputHandle {
        self.sampler.handle()
    }

    /// Anchor capability for external menus. `None` once unmounted.
    pub fn anchor_handle(&self) -> Option<AnchorHandle> {
        self.anchors.as_ref().map(AnchorHandle::new)
    }

    pub fn overlay(&self) -> Rc<RefCell<Overlay>> {
        self.overlay.clone()
    }

    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    pub fn active_scene(&self) -> Option<SceneKey> {
        self.manager.active_key()
    }

    pub fn player(&self) -> &Player {
        self.manager.player()
    }

    pub fn transition(&self) -> &TeleportTransition {
        &self.transition
    }

    pub fn audio(&self) -> &AmbientAudio {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut AmbientAudio {
        &mut self.audio
    }

    pub fn canvas(&self) -> &dyn LabelCanvas {
        self.canvas.as_ref()
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.manager.camera_mut().set_aspect(width, height);
    }

    /// Advance one frame and describe it.
    pub fn frame(&mut self, now: Instant) -> Result<FrameView, SessionError> {
        if !self.is_mounted() {
            return Err(SessionError::Unmounted);
        }
        let _span = tracing::info_span!("frame", n = self.frames).entered();
        let elapsed = self
            .last_frame
            .map_or(Duration::ZERO, |prev| now.saturating_duration_since(prev));
        self.last_frame = Some(now);
        if self.timer.record(elapsed) {
            tracing::debug!(
                elapsed_ms = elapsed.as_millis() as u64,
                "frame stalled, step clamped"
            );
        }
        let dt = elapsed.as_secs_f32().min(self.config.frame.max_dt());

        if let TransitionStep::SwitchScene(key) = self.transition.poll(now) {
            self.manager.switch_scene(key, self.canvas.as_mut())?;
            self.overlay.borrow_mut().set_hud(self.manager.hud_hint());
            self.sync_anchor_support();
        }

        let mut keys = self.sampler.snapshot();
        let pressed: Vec<(&str, Action)> = BINDINGS
            .iter()
            .filter(|(code, _)| keys.is_down(code) && !self.held.contains(*code))
            .copied()
            .collect();
        self.held = keys.iter().map(str::to_string).collect();

        let requested = self.drain_anchor_requests();
        if self.transition.is_busy(now) {
            if !requested.is_empty() {
                tracing::debug!(count = requested.len(), "anchor requests dropped during teleport");
            }
        } else {
            for anchor in requested {
                self.manager.jump_to_anchor(anchor);
            }
            for (code, action) in pressed {
                if keys.consume(code) {
                    self.apply(action, now);
                }
            }
        }

        let intent = if self.transition.is_busy(now) {
            MoveIntent::IDLE
        } else {
            MoveIntent::from_snapshot(&keys)
        };
        let events = self.manager.update(&intent, dt);
        for event in events {
            self.publish(event);
        }
        self.audio.set_movement_speed(self.manager.player().speed());

        let mut frame = self.manager.frame_view().ok_or(SessionError::Unmounted)?;
        frame.fade = self.transition.fade_level(now);
        self.frames += 1;
        tracing::trace!(
            dt,
            props = frame.props.len(),
            fade = frame.fade,
            avg_ms = self.timer.average().as_secs_f32() * 1000.0,
            "frame composed"
        );
        Ok(frame)
    }

    /// [`Session::frame`], then hand the description to `renderer`.
    pub fn frame_with<R: Renderer>(
        &mut self,
        now: Instant,
        renderer: &R,
    ) -> Result<R::Output, SessionError> {
        let frame = self.frame(now)?;
        Ok(renderer.render(&frame))
    }

    /// Detach input, dispose the scene and release audio. Idempotent.
    pub fn unmount(&mut self) {
        let Some(attachment) = self.attachment.take() else {
            return;
        };
        attachment.detach();
        self.anchors = None;
        self.manager.dispose(self.canvas.as_mut());
        self.audio.dispose();
        tracing::info!(frames = self.frames, "session unmounted");
    }

    fn drain_anchor_requests(&mut self) -> Vec<Anchor> {
        self.anchors
            .as_ref()
            .map(|q| q.borrow_mut().pending.drain(..).collect())
            .unwrap_or_default()
    }

    fn sync_anchor_support(&mut self) {
        let supported = self.manager.supports_anchors();
        if let Some(queue) = &self.anchors {
            let mut queue = queue.borrow_mut();
            queue.supported = supported;
            if !supported {
                queue.pending.clear();
            }
        }
    }

    fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::JumpTo(anchor) => {
                if !self.manager.jump_to_anchor(anchor) {
                    return;
                }
                let mut overlay = self.overlay.borrow_mut();
                overlay.push_bubble(jump_notice(anchor));
                if anchor == Anchor::Career {
                    overlay.raise(Panel::Career);
                }
            }
            Action::TeleportForward => self.teleport(SceneKey::Hub, SceneKey::Ai, now),
            Action::TeleportBack => self.teleport(SceneKey::Ai, SceneKey::Hub, now),
        }
    }

    fn teleport(&mut self, from: SceneKey, to: SceneKey, now: Instant) {
        if self.manager.active_key() != Some(from) {
            return;
        }
        if self.transition.begin(now, to) {
            let text = match to {
                SceneKey::Ai => TELEPORTING_TO_AI,
                SceneKey::Hub => TELEPORTING_HOME,
            };
            self.overlay.borrow_mut().set_hud(text);
        }
    }

    fn publish(&mut self, event: SceneEvent) {
        // The outgoing scene keeps ticking while the screen fades out; its
        // proximity changes must not replace the teleport notice.
        if self.transition.phase() == TransitionPhase::FadingOut {
            tracing::trace!(?event, "overlay update held during fade-out");
            return;
        }
        let mut overlay = self.overlay.borrow_mut();
        match event {
            SceneEvent::NodeEntered {
                kind,
                title,
                subtitle,
                first_visit,
            } => {
                overlay.set_hud(format!("{title}: {subtitle}"));
                if first_visit {
                    overlay.push_bubble(format!("[{}] {title}", kind_tag(kind)));
                    if kind == NodeKind::Career {
                        overlay.raise(Panel::Career);
                    }
                }
            }
            SceneEvent::NodeLeft { .. } => overlay.set_hud(self.manager.hud_hint()),
            SceneEvent::PhaseAdvanced(phase) => {
                let text = phase_notice(phase);
                overlay.set_hud(text);
                overlay.push_bubble(text);
            }
            SceneEvent::Recentered { .. } => {}
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn jump_notice(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Projects => "[INFO] Left to the project path (key 1)",
        Anchor::Career => "[INFO] Right to the career terrace (key 2)",
        Anchor::Intro => "[INFO] Back to the start plateau (key 3)",
        Anchor::Ai => "[INFO] To the AI gate (key 4)",
    }
}

fn kind_tag(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Project => "PROJECT",
        NodeKind::Career => "CAREER",
        NodeKind::Ai => "GATE",
    }
}

fn phase_notice(phase: RoomPhase) -> &'static str {
    match phase {
        RoomPhase::Input => "Step to the input station.",
        RoomPhase::Agent => "Input received. The agent is thinking.",
        RoomPhase::Output => "Agent done. Collect the output.",
        RoomPhase::Done => "Pipeline complete. Escape takes you back.",
    }
}
