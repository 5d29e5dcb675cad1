use std::path::Path;

use folio_session::{AudioError, AudioSink};
use kira::{
    Volume,
    manager::{AudioManager, AudioManagerSettings, backend::DefaultBackend},
    sound::static_sound::{StaticSoundData, StaticSoundHandle, StaticSoundSettings},
    tween::Tween,
};

/// Looping ambience played through kira.
///
/// Without an audio device or a readable track every call is a no-op and
/// `play` reports the device as unavailable.
pub struct KiraSink {
    manager: Option<AudioManager>,
    track: Option<StaticSoundData>,
    handle: Option<StaticSoundHandle>,
    volume: f32,
    muted: bool,
}

impl KiraSink {
    pub fn new(track: Option<&Path>) -> Self {
        let manager = match AudioManager::<DefaultBackend>::new(AudioManagerSettings::default()) {
            Ok(m) => Some(m),
            Err(e) => {
                tracing::warn!("audio device unavailable, ambience disabled: {e}");
                None
            }
        };
        let track = track.and_then(|path| match StaticSoundData::from_file(path) {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("failed to load ambience '{}': {e}", path.display());
                None
            }
        });
        Self {
            manager,
            track,
            handle: None,
            volume: 0.0,
            muted: true,
        }
    }

    fn effective_volume(&self) -> f64 {
        if self.muted { 0.0 } else { f64::from(self.volume) }
    }

    fn apply_volume(&mut self) {
        let volume = self.effective_volume();
        if let Some(handle) = &mut self.handle {
            let _ = handle.set_volume(Volume::Amplitude(volume), Tween::default());
        }
    }
}

impl AudioSink for KiraSink {
    fn play(&mut self) -> Result<(), AudioError> {
        if let Some(handle) = &mut self.handle {
            let _ = handle.resume(Tween::default());
            return Ok(());
        }
        let (Some(manager), Some(track)) = (self.manager.as_mut(), self.track.as_ref()) else {
            return Err(AudioError::Device("no audio device or ambience track".into()));
        };
        let mut settings = StaticSoundSettings::new().loop_region(0.0..);
        settings.volume = Volume::Amplitude(if self.muted { 0.0 } else { f64::from(self.volume) }).into();
        let handle = manager
            .play(track.clone().with_settings(settings))
            .map_err(|e| AudioError::PlaybackRejected(e.to_string()))?;
        self.handle = Some(handle);
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(handle) = &mut self.handle {
            let _ = handle.pause(Tween::default());
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        self.apply_volume();
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_volume();
    }
}
