//! Deterministic scene dressing. Nothing here holds state; the same inputs
//! always yield the same props.

use folio_render::Prop;
use folio_stream::hash01;
use glam::Vec3;

const BLOSSOMS: [[f32; 3]; 4] = [
    [0.97, 0.55, 0.75],
    [0.99, 0.85, 0.40],
    [0.60, 0.80, 1.00],
    [0.98, 0.98, 0.95],
];

pub(crate) fn tree(base: Vec3, scale: f32) -> [Prop; 2] {
    [
        Prop::new(
            base + Vec3::new(0.0, 0.95 * scale, 0.0),
            Vec3::new(0.35, 1.9, 0.35) * scale,
            [0.45, 0.31, 0.20],
        ),
        Prop::new(
            base + Vec3::new(0.0, 2.25 * scale, 0.0),
            Vec3::splat(1.6 * scale),
            [0.30, 0.62, 0.34],
        ),
    ]
}

pub(crate) fn flower(base: Vec3, pick: f32) -> [Prop; 2] {
    let color = BLOSSOMS[((pick * BLOSSOMS.len() as f32) as usize).min(BLOSSOMS.len() - 1)];
    [
        Prop::new(
            base + Vec3::new(0.0, 0.35, 0.0),
            Vec3::new(0.06, 0.7, 0.06),
            [0.35, 0.65, 0.35],
        ),
        Prop::new(base + Vec3::new(0.0, 0.75, 0.0), Vec3::splat(0.22), color)
            .with_emissive(0.15),
    ]
}

/// Scatter trees and flowers over a square patch keyed by integer
/// coordinates. Points within `clear_half_width` of x = 0 are skipped so
/// paths stay walkable.
pub(crate) fn scatter(
    cx: i32,
    cz: i32,
    origin: Vec3,
    size: f32,
    count: u32,
    clear_half_width: f32,
) -> Vec<Prop> {
    let mut props = Vec::new();
    for i in 0..count {
        let salt = i * 4;
        let x = origin.x + hash01(cx, cz, salt) * size;
        let z = origin.z + hash01(cx, cz, salt + 1) * size;
        if x.abs() < clear_half_width {
            continue;
        }
        let base = Vec3::new(x, 0.0, z);
        let kind = hash01(cx, cz, salt + 2);
        let variation = hash01(cx, cz, salt + 3);
        if kind < 0.35 {
            props.extend(tree(base, 0.8 + variation * 0.5));
        } else {
            props.extend(flower(base, variation));
        }
    }
    props
}
