//! World configuration: tuning constants for every subsystem.
//!
//! Loaded from YAML or JSON (chosen by file extension) and validated once.
//! Every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension: {0:?}")]
    UnsupportedFormat(String),
    #[error("invalid config value {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub player: PlayerConfig,
    pub camera: CameraConfig,
    pub frame: FrameConfig,
    pub teleport: TeleportConfig,
    pub hub: HubConfig,
    pub stream: StreamConfig,
    pub overlay: OverlayConfig,
    pub audio: AudioConfig,
}

/// Movement tuning for the player controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Base walking speed in units per second.
    pub speed: f32,
    /// Multiplier applied while a shift key is held.
    pub sprint_factor: f32,
    /// Fraction of the velocity gap closed per 60 Hz frame.
    pub velocity_smoothing: f32,
    /// Fraction of the heading gap closed per 60 Hz frame.
    pub yaw_smoothing: f32,
    /// Bob phase advance per second while moving.
    pub bob_rate: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            speed: 5.2,
            sprint_factor: 1.7,
            velocity_smoothing: 0.18,
            yaw_smoothing: 0.15,
            bob_rate: 10.0,
        }
    }
}

/// Default trailing camera and the interpolation applied to every policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub height: f32,
    pub distance: f32,
    pub look_height: f32,
    pub look_ahead: f32,
    /// Fraction of the distance to the target left after one second.
    pub smoothing_base: f32,
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            height: 4.2,
            distance: 7.5,
            look_height: 1.4,
            look_ahead: 2.0,
            smoothing_base: 0.0006,
            fov_degrees: 55.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Upper bound on a single frame delta.
    pub max_dt_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { max_dt_ms: 33 }
    }
}

impl FrameConfig {
    pub fn max_dt(&self) -> f32 {
        self.max_dt_ms as f32 / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeleportConfig {
    pub fade_out_ms: u64,
    pub fade_in_ms: u64,
    /// Fade level below which the transition counts as finished for input.
    pub epsilon: f32,
}

impl Default for TeleportConfig {
    fn default() -> Self {
        Self {
            fade_out_ms: 450,
            fade_in_ms: 600,
            epsilon: 0.02,
        }
    }
}

/// Which hub layout to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HubLayout {
    /// Bounded floating island.
    #[default]
    Island,
    /// Endless forward corridor with streamed decoration.
    Corridor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub layout: HubLayout,
    /// Corridor only: longitudinal drift allowed before the world recenters.
    pub recenter_distance: f32,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            layout: HubLayout::Island,
            recenter_distance: 8.0,
        }
    }
}

/// Chunk streaming around the corridor player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub chunk_size: f32,
    /// Chebyshev radius (in chunks) kept alive around the center chunk.
    pub radius: i32,
    /// Maximum chunks constructed per frame.
    pub load_budget: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: 12.0,
            radius: 2,
            load_budget: 25,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub bubble_capacity: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { bubble_capacity: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub base_volume: f32,
    /// Volume added at `max_speed`.
    pub movement_volume: f32,
    pub max_speed: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            base_volume: 0.22,
            movement_volume: 0.16,
            max_speed: 6.0,
        }
    }
}

impl WorldConfig {
    /// Load from a `.yaml`/`.yml` or `.json` file and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded world config");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("player.speed", self.player.speed)?;
        let sprint = self.player.sprint_factor;
        if !(sprint.is_finite() && sprint >= 1.0) {
            return Err(invalid("player.sprint_factor", "must be at least 1.0"));
        }
        unit_factor("player.velocity_smoothing", self.player.velocity_smoothing)?;
        unit_factor("player.yaw_smoothing", self.player.yaw_smoothing)?;
        if !(self.camera.smoothing_base > 0.0 && self.camera.smoothing_base < 1.0) {
            return Err(invalid("camera.smoothing_base", "must lie in (0, 1)"));
        }
        finite("camera.height", self.camera.height)?;
        finite("camera.look_height", self.camera.look_height)?;
        finite("camera.look_ahead", self.camera.look_ahead)?;
        positive("camera.distance", self.camera.distance)?;
        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(invalid("camera.fov_degrees", "must lie in (0, 180)"));
        }
        if self.frame.max_dt_ms == 0 {
            return Err(invalid("frame.max_dt_ms", "must be positive"));
        }
        if self.teleport.fade_out_ms == 0 || self.teleport.fade_in_ms == 0 {
            return Err(invalid("teleport", "fade durations must be positive"));
        }
        if !(self.teleport.epsilon > 0.0 && self.teleport.epsilon < 1.0) {
            return Err(invalid("teleport.epsilon", "must lie in (0, 1)"));
        }
        positive("hub.recenter_distance", self.hub.recenter_distance)?;
        positive("stream.chunk_size", self.stream.chunk_size)?;
        if self.stream.radius < 0 {
            return Err(invalid("stream.radius", "must not be negative"));
        }
        if self.stream.load_budget == 0 {
            return Err(invalid("stream.load_budget", "must be positive"));
        }
        if self.overlay.bubble_capacity == 0 {
            return Err(invalid("overlay.bubble_capacity", "must be positive"));
        }
        positive("audio.max_speed", self.audio.max_speed)?;
        volume("audio.base_volume", self.audio.base_volume)?;
        volume("audio.movement_volume", self.audio.movement_volume)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v > 0.0 && v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be a positive number"))
    }
}

fn finite(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, "must be a finite number"))
    }
}

fn volume(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(invalid(field, "must lie in [0, 1]"))
    }
}

// NaN fails every comparison, so the range checks below reject it too.
fn unit_factor(field: &'static str, v: f32) -> Result<(), ConfigError> {
    if v > 0.0 && v <= 1.0 {
        Ok(())
    } else {
        Err(invalid(field, "must lie in (0, 1]"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        WorldConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let cfg = WorldConfig::from_yaml_str("player:\n  speed: 3.0\nhub:\n  layout: corridor\n")
            .unwrap();
        assert_eq!(cfg.player.speed, 3.0);
        assert_eq!(cfg.player.sprint_factor, 1.7);
        assert_eq!(cfg.hub.layout, HubLayout::Corridor);
        assert_eq!(cfg.teleport, TeleportConfig::default());
    }

    #[test]
    fn json_is_accepted() {
        let cfg = WorldConfig::from_json_str(r#"{"overlay": {"bubble_capacity": 3}}"#).unwrap();
        assert_eq!(cfg.overlay.bubble_capacity, 3);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = WorldConfig::from_yaml_str("player:\n  sprint_factor: 0.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "player.sprint_factor",
                ..
            }
        ));
        assert!(WorldConfig::from_yaml_str("teleport:\n  epsilon: 0.0\n").is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for (text, field) in [
            ("player:\n  sprint_factor: .nan\n", "player.sprint_factor"),
            ("player:\n  sprint_factor: .inf\n", "player.sprint_factor"),
            ("player:\n  velocity_smoothing: .nan\n", "player.velocity_smoothing"),
            ("teleport:\n  epsilon: .nan\n", "teleport.epsilon"),
            ("camera:\n  height: .nan\n", "camera.height"),
            ("audio:\n  base_volume: .nan\n", "audio.base_volume"),
        ] {
            match WorldConfig::from_yaml_str(text) {
                Err(ConfigError::Invalid { field: got, .. }) => assert_eq!(got, field, "{text}"),
                other => panic!("{text}: expected {field} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("world.yaml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "frame:\n  max_dt_ms: 20").unwrap();
        let cfg = WorldConfig::load(&path).unwrap();
        assert_eq!(cfg.frame.max_dt_ms, 20);

        let bad = dir.path().join("world.toml");
        std::fs::write(&bad, "").unwrap();
        assert!(matches!(
            WorldConfig::load(&bad),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn yaml_round_trip() {
        let cfg = WorldConfig::default();
        let text = cfg.to_yaml_string().unwrap();
        assert_eq!(WorldConfig::from_yaml_str(&text).unwrap(), cfg);
    }
}
