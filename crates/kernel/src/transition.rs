use std::time::{Duration, Instant};

use folio_common::{SceneKey, TeleportConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    FadingOut,
    FadingIn,
}

#[derive(Debug, Clone, Copy)]
enum State {
    Idle,
    FadingOut { started: Instant, target: SceneKey },
    FadingIn { started: Instant },
}

/// What the caller must do after [`TeleportTransition::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    None,
    /// Fade-out just completed: swap scenes now, fade-in has begun.
    SwitchScene(SceneKey),
    /// Fade-in completed; the transition is idle again.
    Finished,
}

/// Two-phase teleport fade driven by wall-clock instants.
///
/// The fade level is a pure function of `now`, so a stalled frame never
/// desynchronizes it from real elapsed time.
#[derive(Debug, Clone)]
pub struct TeleportTransition {
    state: State,
    fade_out: Duration,
    fade_in: Duration,
    epsilon: f32,
}

impl TeleportTransition {
    pub fn new(fade_out: Duration, fade_in: Duration, epsilon: f32) -> Self {
        Self {
            state: State::Idle,
            fade_out,
            fade_in,
            epsilon,
        }
    }

    pub fn from_config(config: &TeleportConfig) -> Self {
        Self::new(
            Duration::from_millis(config.fade_out_ms),
            Duration::from_millis(config.fade_in_ms),
            config.epsilon,
        )
    }

    pub fn phase(&self) -> TransitionPhase {
        match self.state {
            State::Idle => TransitionPhase::Idle,
            State::FadingOut { .. } => TransitionPhase::FadingOut,
            State::FadingIn { .. } => TransitionPhase::FadingIn,
        }
    }

    /// Scene a fade-out in progress will switch to.
    pub fn target(&self) -> Option<SceneKey> {
        match self.state {
            State::FadingOut { target, .. } => Some(target),
            _ => None,
        }
    }

    /// Overlay opacity in `[0, 1]`.
    pub fn fade_level(&self, now: Instant) -> f32 {
        match self.state {
            State::Idle => 0.0,
            State::FadingOut { started, .. } => progress(started, now, self.fade_out),
            State::FadingIn { started } => 1.0 - progress(started, now, self.fade_in),
        }
    }

    /// True while fading out, or fading in above the epsilon threshold.
    pub fn is_busy(&self, now: Instant) -> bool {
        match self.state {
            State::Idle => false,
            State::FadingOut { .. } => true,
            State::FadingIn { .. } => self.fade_level(now) > self.epsilon,
        }
    }

    /// Start fading out toward `target`. Ignored (returns `false`) while busy.
    pub fn begin(&mut self, now: Instant, target: SceneKey) -> bool {
        if self.is_busy(now) {
            tracing::debug!(%target, "teleport ignored, transition in progress");
            return false;
        }
        tracing::debug!(%target, "teleport fade-out started");
        self.state = State::FadingOut {
            started: now,
            target,
        };
        true
    }

    pub fn poll(&mut self, now: Instant) -> TransitionStep {
        match self.state {
            State::Idle => TransitionStep::None,
            State::FadingOut { started, target } => {
                if now.saturating_duration_since(started) >= self.fade_out {
                    self.state = State::FadingIn { started: now };
                    tracing::debug!(%target, "fade-out complete, switching scene");
                    TransitionStep::SwitchScene(target)
                } else {
                    TransitionStep::None
                }
            }
            State::FadingIn { started } => {
                if now.saturating_duration_since(started) >= self.fade_in {
                    self.state = State::Idle;
                    tracing::debug!("fade-in complete");
                    TransitionStep::Finished
                } else {
                    TransitionStep::None
                }
            }
        }
    }
}

fn progress(started: Instant, now: Instant, span: Duration) -> f32 {
    if span.is_zero() {
        return 1.0;
    }
    (now.saturating_duration_since(started).as_secs_f32() / span.as_secs_f32()).clamp(0.0, 1.0)
}
