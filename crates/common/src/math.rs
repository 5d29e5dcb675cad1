//! Scalar helpers shared by the controller, camera and proximity code.

use std::f32::consts::{PI, TAU};

/// Reference frame rate the per-frame smoothing factors are tuned for.
pub const REFERENCE_HZ: f32 = 60.0;

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Interpolation weight for a per-frame factor `k` applied over `dt` seconds.
///
/// `1 - (1 - k)^(dt * 60)`: at exactly 60 Hz this is `k`; at other rates the
/// same fraction of the gap closes per second.
pub fn damp(k: f32, dt: f32) -> f32 {
    let k = k.clamp(0.0, 1.0);
    let dt = dt.max(0.0);
    1.0 - (1.0 - k).powf(dt * REFERENCE_HZ)
}

/// Interpolation weight for a decay base: `base` is the fraction of the gap
/// left after one second.
pub fn decay(base: f32, dt: f32) -> f32 {
    1.0 - base.clamp(0.0, 1.0).powf(dt.max(0.0))
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(a: f32) -> f32 {
    let mut a = (a + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a += TAU;
    }
    a
}

/// Interpolate between two angles along the shorter arc.
pub fn lerp_angle(a: f32, b: f32, t: f32) -> f32 {
    wrap_angle(a + wrap_angle(b - a) * t)
}

/// Proximity intensity: 1 at the node, 0 at or beyond the radius.
pub fn pulse(distance: f32, radius: f32) -> f32 {
    debug_assert!(radius > 0.0);
    (1.0 - distance / radius).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damp_matches_k_at_reference_rate() {
        let w = damp(0.18, 1.0 / 60.0);
        assert!((w - 0.18).abs() < 1e-5);
        assert_eq!(damp(0.18, 0.0), 0.0);
    }

    #[test]
    fn damp_is_frame_rate_independent() {
        // One second at 30 Hz and one second at 120 Hz close the same gap.
        let mut a = 0.0_f32;
        for _ in 0..30 {
            a = lerp(a, 1.0, damp(0.18, 1.0 / 30.0));
        }
        let mut b = 0.0_f32;
        for _ in 0..120 {
            b = lerp(b, 1.0, damp(0.18, 1.0 / 120.0));
        }
        assert!((a - b).abs() < 1e-4);
    }

    #[test]
    fn decay_leaves_base_after_one_second() {
        let w = decay(0.0006, 1.0);
        assert!((1.0 - w - 0.0006).abs() < 1e-6);
    }

    #[test]
    fn lerp_angle_takes_short_arc() {
        let a = 3.0;
        let b = -3.0;
        let mid = lerp_angle(a, b, 0.5);
        // Short arc crosses PI, not zero.
        assert!(mid.abs() > 3.0);
    }

    #[test]
    fn pulse_edges() {
        assert_eq!(pulse(0.0, 3.0), 1.0);
        assert_eq!(pulse(3.0, 3.0), 0.0);
        assert_eq!(pulse(10.0, 3.0), 0.0);
        assert!(pulse(1.0, 3.0) > pulse(2.0, 3.0));
    }

    #[test]
    fn smoothstep_clamps() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
