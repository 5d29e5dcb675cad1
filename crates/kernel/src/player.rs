use folio_common::math::{damp, lerp_angle};
use folio_common::{Bounds, PlayerConfig};
use folio_input::MoveIntent;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Below this speed an idle player is considered at rest.
const REST_SPEED: f32 = 1e-3;

/// The explorer avatar's simulated state.
///
/// Forward is -Z. `yaw` rotates -Z about +Y, so `yaw = 0` faces -Z and the
/// avatar mesh can use it directly as its Y rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    pub yaw: f32,
    pub velocity: Vec3,
    /// Walk-cycle phase for the avatar animation. Grows while moving.
    pub bob: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Player {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            velocity: Vec3::ZERO,
            bob: 0.0,
        }
    }

    /// Unit vector the player faces on the ground plane.
    pub fn facing(&self) -> Vec3 {
        Quat::from_rotation_y(self.yaw) * Vec3::NEG_Z
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Place the player without carrying momentum.
    pub fn place(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    /// Advance one frame.
    ///
    /// Velocity eases toward the intent with the frame-rate independent
    /// weight `1 - (1 - k)^(dt * 60)`, then position integrates with explicit
    /// Euler and is clamped into `bounds`. Starting from rest, the eased
    /// velocity trails a constant target by about `(1 - k) / k` reference
    /// frames, so one second of walking covers slightly less than `speed`.
    pub fn update(&mut self, intent: &MoveIntent, dt: f32, config: &PlayerConfig, bounds: &Bounds) {
        let dt = dt.max(0.0);
        let axes = intent.axes();
        let mut target = Vec3::new(axes.x, 0.0, -axes.y);
        if target != Vec3::ZERO {
            let sprint = if intent.sprint {
                config.sprint_factor
            } else {
                1.0
            };
            target = target.normalize() * config.speed * sprint;
        }

        self.velocity = self
            .velocity
            .lerp(target, damp(config.velocity_smoothing, dt));
        if target == Vec3::ZERO && self.velocity.length() < REST_SPEED {
            self.velocity = Vec3::ZERO;
        }

        self.position = bounds.clamp(self.position + self.velocity * dt);

        if intent.is_moving() {
            self.bob += dt * config.bob_rate;
            if self.velocity.length() > REST_SPEED {
                let heading = heading_of(self.velocity);
                self.yaw = lerp_angle(self.yaw, heading, damp(config.yaw_smoothing, dt));
            }
        }
    }
}

/// Yaw that faces along `v` on the ground plane.
pub fn heading_of(v: Vec3) -> f32 {
    (-v.x).atan2(-v.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn open() -> Bounds {
        Bounds::rect(-1000.0, 1000.0, -1000.0, 1000.0)
    }

    fn run(player: &mut Player, intent: MoveIntent, frames: usize, bounds: &Bounds) {
        let cfg = PlayerConfig::default();
        for _ in 0..frames {
            player.update(&intent, DT, &cfg, bounds);
        }
    }

    fn forward(sprint: bool) -> MoveIntent {
        MoveIntent {
            forward: true,
            sprint,
            ..MoveIntent::IDLE
        }
    }

    #[test]
    fn forward_one_second_reaches_base_speed_distance() {
        let cfg = PlayerConfig::default();
        let mut p = Player::default();
        run(&mut p, forward(false), 60, &open());
        assert!(p.position.x.abs() < 1e-5);
        // Eased start costs ~(1-k)/k frames of travel.
        assert!((p.position.z + cfg.speed).abs() < 0.1 * cfg.speed, "{:?}", p.position);
        assert!(p.position.z < 0.0);
    }

    #[test]
    fn sprint_scales_displacement_by_factor() {
        let cfg = PlayerConfig::default();
        let mut walk = Player::default();
        let mut sprint = Player::default();
        run(&mut walk, forward(false), 60, &open());
        run(&mut sprint, forward(true), 60, &open());
        let ratio = sprint.position.z / walk.position.z;
        assert!((ratio - cfg.sprint_factor).abs() < 1e-3, "ratio {ratio}");
    }

    #[test]
    fn opposite_keys_produce_no_motion() {
        let mut p = Player::default();
        let intent = MoveIntent {
            left: true,
            right: true,
            ..MoveIntent::IDLE
        };
        run(&mut p, intent, 30, &open());
        assert_eq!(p.position, Vec3::ZERO);
        assert_eq!(p.velocity, Vec3::ZERO);
    }

    #[test]
    fn diagonal_is_normalized() {
        let cfg = PlayerConfig::default();
        let mut p = Player::default();
        let intent = MoveIntent {
            forward: true,
            right: true,
            ..MoveIntent::IDLE
        };
        run(&mut p, intent, 600, &open());
        assert!((p.speed() - cfg.speed).abs() < 1e-3);
    }

    #[test]
    fn idle_velocity_converges_and_position_settles() {
        let mut p = Player::default();
        run(&mut p, forward(false), 30, &open());
        run(&mut p, MoveIntent::IDLE, 240, &open());
        assert_eq!(p.velocity, Vec3::ZERO);
        let settled = p.position;
        run(&mut p, MoveIntent::IDLE, 60, &open());
        assert_eq!(p.position, settled);
    }

    #[test]
    fn position_stays_in_bounds_even_with_huge_dt() {
        let cfg = PlayerConfig::default();
        let bounds = Bounds::rect(-2.0, 2.0, -3.0, 3.0);
        let mut p = Player::default();
        let intents = [
            forward(true),
            MoveIntent {
                left: true,
                back: true,
                ..MoveIntent::IDLE
            },
            MoveIntent {
                right: true,
                sprint: true,
                ..MoveIntent::IDLE
            },
        ];
        for (i, intent) in intents.iter().cycle().take(90).enumerate() {
            let dt = if i % 7 == 0 { 5.0 } else { 0.033 };
            p.update(intent, dt, &cfg, &bounds);
            assert!(bounds.contains(p.position), "{:?}", p.position);
        }
    }

    #[test]
    fn yaw_turns_toward_heading_and_holds_when_idle() {
        let mut p = Player::default();
        let right = MoveIntent {
            right: true,
            ..MoveIntent::IDLE
        };
        run(&mut p, right, 240, &open());
        // Moving +X faces yaw = -PI/2.
        assert!((p.yaw + std::f32::consts::FRAC_PI_2).abs() < 1e-2, "yaw {}", p.yaw);
        assert!((p.facing() - Vec3::X).length() < 1e-2);

        let held = p.yaw;
        run(&mut p, MoveIntent::IDLE, 120, &open());
        assert_eq!(p.yaw, held);
    }

    #[test]
    fn bob_accumulates_only_while_moving() {
        let mut p = Player::default();
        run(&mut p, MoveIntent::IDLE, 10, &open());
        assert_eq!(p.bob, 0.0);
        let mut last = 0.0;
        for _ in 0..20 {
            run(&mut p, forward(false), 1, &open());
            assert!(p.bob > last);
            last = p.bob;
        }
    }

    #[test]
    fn place_drops_momentum() {
        let mut p = Player::default();
        run(&mut p, forward(false), 20, &open());
        p.place(Vec3::new(3.0, 0.0, 4.0));
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.position, Vec3::new(3.0, 0.0, 4.0));
    }
}
