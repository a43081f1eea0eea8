//! Deterministic hash-based noise for terrain synthesis.
//!
//! Every function here is a pure function of `(coordinates, seed)`: no
//! stateful PRNG, no library noise object. Each cell can be evaluated
//! independently and in any order, which is what makes the terrain pipeline
//! reproducible across runs, platforms, and any future parallel split.

// ---------------------------------------------------------------------------
// Avalanche hash
// ---------------------------------------------------------------------------

/// Fixed-point avalanche mix over `(x, y, seed)`.
///
/// Multiplies each input by a large odd constant, xor-folds, and finishes
/// with a murmur-style finalizer. Same inputs always yield the same output;
/// negative coordinates are valid and wrap through `u32`.
#[inline]
pub fn hash_cell(x: i32, y: i32, seed: u32) -> u64 {
    let mut v = u64::from(x as u32).wrapping_mul(0x9E37_79B1_85EB_CA87);
    v ^= u64::from(y as u32).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    v ^= u64::from(seed).wrapping_mul(0x1656_67B1_9E37_79F9);
    v ^= v >> 33;
    v = v.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    v ^= v >> 33;
    v = v.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    v ^= v >> 33;
    v
}

/// Hash mapped to a float in [0, 1] via the low 24 bits.
#[inline]
pub fn hash01(x: i32, y: i32, seed: u32) -> f32 {
    (hash_cell(x, y, seed) & 0x00FF_FFFF) as f32 / 0x00FF_FFFF as f32
}

// ---------------------------------------------------------------------------
// Fractal lattice noise
// ---------------------------------------------------------------------------

/// 3-octave lattice value noise in [0, 1].
///
/// Input coordinates are floored to an integer lattice, then each octave
/// hashes the frequency-scaled lattice point with a per-octave seed offset.
/// Amplitude halves and frequency doubles per octave. Deliberately not
/// interpolated: the terrain pipeline's diffusion pass does the smoothing,
/// and a piecewise-constant base keeps the function exactly reproducible.
pub fn fractal01(x: f32, y: f32, seed: u32) -> f32 {
    let ix = x.floor() as i32;
    let iy = y.floor() as i32;
    let mut sum = 0.0_f32;
    let mut amp = 0.55_f32;
    let mut freq = 1.0_f64;
    for octave in 0..3_u32 {
        let sx = (f64::from(ix) * freq).floor() as i32;
        let sy = (f64::from(iy) * freq).floor() as i32;
        sum += hash01(sx, sy, seed.wrapping_add(octave * 131)) * amp;
        amp *= 0.5;
        freq *= 2.0;
    }
    sum.clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
