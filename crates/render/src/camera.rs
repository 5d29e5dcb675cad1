use folio_common::CameraConfig;
use folio_common::math::decay;
use folio_kernel::Player;
use glam::{Mat4, Quat, Vec3};

/// Camera position plus the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn new(eye: Vec3, target: Vec3) -> Self {
        Self { eye, target }
    }

    pub fn translated(self, shift: Vec3) -> Self {
        Self {
            eye: self.eye + shift,
            target: self.target + shift,
        }
    }
}

/// How a scene frames the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraPolicy {
    /// Behind the player, rotated with its yaw.
    Trailing {
        height: f32,
        distance: f32,
        look_height: f32,
        look_ahead: f32,
    },
    /// Fixed overhead angle. The eye drifts back by `depth_parallax` of the
    /// player's z; the look-at point follows `look_lateral` of its x.
    Oblique {
        offset: Vec3,
        depth_parallax: f32,
        look_height: f32,
        look_lateral: f32,
        look_forward: f32,
    },
    /// Overhead-oblique framing for scrolling corridors. Lateral parallax is
    /// proportional to the player's x and bounded by `max_parallax`.
    Corridor {
        height: f32,
        distance: f32,
        parallax: f32,
        max_parallax: f32,
        look_height: f32,
        look_ahead: f32,
    },
}

impl CameraPolicy {
    pub fn trailing(config: &CameraConfig) -> Self {
        Self::Trailing {
            height: config.height,
            distance: config.distance,
            look_height: config.look_height,
            look_ahead: config.look_ahead,
        }
    }

    pub fn target(&self, player: &Player) -> CameraPose {
        let p = player.position;
        match *self {
            Self::Trailing {
                height,
                distance,
                look_height,
                look_ahead,
            } => {
                // Facing is -Z rotated by yaw, so +Z rotated by yaw is behind.
                let offset = Quat::from_rotation_y(player.yaw) * Vec3::new(0.0, height, distance);
                let look = p + Vec3::Y * look_height + player.facing() * look_ahead;
                CameraPose::new(p + offset, look)
            }
            Self::Oblique {
                offset,
                depth_parallax,
                look_height,
                look_lateral,
                look_forward,
            } => {
                let eye = p + offset + Vec3::new(0.0, 0.0, -p.z * depth_parallax);
                let look = Vec3::new(p.x * look_lateral, look_height, p.z + look_forward);
                CameraPose::new(eye, look)
            }
            Self::Corridor {
                height,
                distance,
                parallax,
                max_parallax,
                look_height,
                look_ahead,
            } => {
                let lateral = (p.x * parallax).clamp(-max_parallax, max_parallax);
                let eye = Vec3::new(lateral, height, p.z + distance);
                let look = Vec3::new(lateral, look_height, p.z - look_ahead);
                CameraPose::new(eye, look)
            }
        }
    }
}

/// The rendered camera. Eases toward a target pose every frame.
#[derive(Debug, Clone)]
pub struct SmoothedCamera {
    pose: CameraPose,
    smoothing_base: f32,
    pub fov_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl SmoothedCamera {
    pub fn new(config: &CameraConfig, initial: CameraPose) -> Self {
        Self {
            pose: initial,
            smoothing_base: config.smoothing_base,
            fov_degrees: config.fov_degrees,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 500.0,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Jump straight to `pose`. Used right after a scene switch.
    pub fn snap(&mut self, pose: CameraPose) {
        self.pose = pose;
    }

    /// Move a fraction `1 - base^dt` of the way to `target`.
    pub fn follow(&mut self, target: CameraPose, dt: f32) {
        let w = decay(self.smoothing_base, dt);
        self.pose.eye = self.pose.eye.lerp(target.eye, w);
        self.pose.target = self.pose.target.lerp(target.target, w);
    }

    /// Shift rigidly with a recentered world so framing stays continuous.
    pub fn translate(&mut self, shift: Vec3) {
        self.pose = self.pose.translated(shift);
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.pose.eye, self.pose.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
