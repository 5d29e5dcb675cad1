use folio_common::AudioConfig;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
    #[error("audio device unavailable: {0}")]
    Device(String),
}

/// A looping ambience track the platform plays for us.
pub trait AudioSink {
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
}

/// Sink for hosts without audio.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn pause(&mut self) {}

    fn set_volume(&mut self, _volume: f32) {}

    fn set_muted(&mut self, _muted: bool) {}
}

/// Ambience whose volume follows the player's speed.
///
/// Starts muted. A rejected start is swallowed and retried on the next
/// unmute.
pub struct AmbientAudio {
    sink: Box<dyn AudioSink>,
    config: AudioConfig,
    muted: bool,
    playing: bool,
    target_volume: f32,
    disposed: bool,
}

impl std::fmt::Debug for AmbientAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmbientAudio")
            .field("muted", &self.muted)
            .field("playing", &self.playing)
            .field("target_volume", &self.target_volume)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl AmbientAudio {
    pub fn new(sink: Box<dyn AudioSink>, config: &AudioConfig) -> Self {
        Self {
            sink,
            target_volume: config.base_volume,
            config: config.clone(),
            muted: true,
            playing: false,
            disposed: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn target_volume(&self) -> f32 {
        self.target_volume
    }

    /// Try to start playback. Failures are absorbed.
    pub fn resume(&mut self) {
        if self.disposed || self.playing {
            return;
        }
        match self.sink.play() {
            Ok(()) => self.playing = true,
            Err(err) => tracing::debug!(%err, "ambient playback rejected, retrying on unmute"),
        }
    }

    pub fn set_muted(&mut self, muted: bool) {
        if self.disposed {
            return;
        }
        self.muted = muted;
        if muted {
            self.sink.set_volume(0.0);
            self.sink.set_muted(true);
            return;
        }
        self.sink.set_muted(false);
        self.resume();
        self.sink.set_volume(self.target_volume);
    }

    pub fn set_movement_speed(&mut self, speed: f32) {
        if self.disposed {
            return;
        }
        let max = self.config.max_speed;
        let clamped = speed.clamp(0.0, max);
        self.target_volume = self.config.base_volume + clamped / max * self.config.movement_volume;
        if !self.muted {
            self.sink.set_volume(self.target_volume);
        }
    }

    /// Pause and stop accepting commands. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.sink.pause();
        self.playing = false;
        self.disposed = true;
    }
}
