/// Splitmix64 finalizer: a bijective avalanche over 64 bits.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Stateless integer hash of a grid coordinate and a salt.
pub fn hash_u64(x: i32, z: i32, salt: u32) -> u64 {
    let packed = ((x as u32 as u64) << 32) | z as u32 as u64;
    splitmix64(packed ^ splitmix64(salt as u64))
}

/// Deterministic value in `[0, 1)` for `(x, z, salt)`.
///
/// Decoration uses distinct salts per property (position jitter, scale,
/// color) so one coordinate yields independent-looking values.
pub fn hash01(x: i32, z: i32, salt: u32) -> f32 {
    // Top 24 bits fit an f32 mantissa exactly.
    (hash_u64(x, z, salt) >> 40) as f32 / (1u64 << 24) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_inputs_same_output() {
        assert_eq!(hash01(3, -7, 1), hash01(3, -7, 1));
        assert_eq!(hash_u64(i32::MIN, i32::MAX, 9), hash_u64(i32::MIN, i32::MAX, 9));
    }

    #[test]
    fn stays_in_unit_interval() {
        for x in -20..20 {
            for z in -20..20 {
                let v = hash01(x, z, 42);
                assert!((0.0..1.0).contains(&v), "{v}");
            }
        }
    }

    #[test]
    fn salt_and_axes_matter() {
        assert_ne!(hash_u64(1, 2, 0), hash_u64(1, 2, 1));
        assert_ne!(hash_u64(1, 2, 0), hash_u64(2, 1, 0));
    }

    #[test]
    fn roughly_uniform() {
        let n = 4096;
        let mean: f32 = (0..n).map(|i| hash01(i, i * 3, 5)).sum::<f32>() / n as f32;
        assert!((mean - 0.5).abs() < 0.05, "mean {mean}");
    }
}
