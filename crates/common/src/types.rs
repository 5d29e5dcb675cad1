use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies one of the scenes the world can show. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKey {
    /// The island (or corridor) with the project and career lanes.
    Hub,
    /// The secondary room reached through the teleport gate.
    Ai,
}

impl SceneKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hub => "hub",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for SceneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named landmark a scene may teleport the player to without a fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Intro,
    Projects,
    Career,
    /// In front of the teleport gate.
    Ai,
}

impl Anchor {
    pub const ALL: [Anchor; 4] = [Anchor::Intro, Anchor::Projects, Anchor::Career, Anchor::Ai];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Intro => "intro",
            Self::Projects => "projects",
            Self::Career => "career",
            Self::Ai => "ai",
        }
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traversable region of a scene on the ground plane.
///
/// The lateral (x) interval is always closed. The longitudinal (z) interval
/// is optional: corridor scenes scroll the world instead of moving the
/// player along z, so they leave it open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f32,
    pub max_x: f32,
    pub z: Option<(f32, f32)>,
}

impl Bounds {
    pub fn rect(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        debug_assert!(min_x <= max_x && min_z <= max_z);
        Self {
            min_x,
            max_x,
            z: Some((min_z, max_z)),
        }
    }

    pub fn lateral(min_x: f32, max_x: f32) -> Self {
        debug_assert!(min_x <= max_x);
        Self {
            min_x,
            max_x,
            z: None,
        }
    }

    /// Clamp a position into the bounds. Height is left untouched.
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        let x = p.x.clamp(self.min_x, self.max_x);
        let z = match self.z {
            Some((lo, hi)) => p.z.clamp(lo, hi),
            None => p.z,
        };
        Vec3::new(x, p.y, z)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        let in_x = p.x >= self.min_x && p.x <= self.max_x;
        let in_z = match self.z {
            Some((lo, hi)) => p.z >= lo && p.z <= hi,
            None => true,
        };
        in_x && in_z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_key_display() {
        assert_eq!(SceneKey::Hub.to_string(), "hub");
        assert_eq!(SceneKey::Ai.to_string(), "ai");
    }

    #[test]
    fn bounds_clamp_rect() {
        let b = Bounds::rect(-1.0, 1.0, -2.0, 2.0);
        let p = b.clamp(Vec3::new(5.0, 3.0, -9.0));
        assert_eq!(p, Vec3::new(1.0, 3.0, -2.0));
        assert!(b.contains(p));
    }

    #[test]
    fn lateral_bounds_leave_z_open() {
        let b = Bounds::lateral(-1.0, 1.0);
        let p = b.clamp(Vec3::new(-4.0, 0.0, 1000.0));
        assert_eq!(p, Vec3::new(-1.0, 0.0, 1000.0));
        assert!(b.contains(Vec3::new(0.0, 0.0, -1e6)));
    }

    #[test]
    fn anchors_round_trip_through_yaml_names() {
        let a: Anchor = serde_yaml::from_str("career").unwrap();
        assert_eq!(a, Anchor::Career);
        assert_eq!(Anchor::ALL.len(), 4);
    }
}
