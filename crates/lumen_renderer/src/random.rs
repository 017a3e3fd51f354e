//! Per-pixel random source.
//!
//! Every pixel owns a [`PixelRng`] seeded from its coordinates and the
//! frame's [`FrameSeeds`]. Draws hash the advancing state with the classic
//! `fract(sin(x) * 43758.5453)` trick, so two pixels or two frames never
//! share a sequence, and no state is shared between threads.
//!
//! The helpers below take `&mut dyn RngCore`, so tests can drive them with
//! any seeded generator as well.

use std::f64::consts::PI;

use lumen_math::Vec3;
use rand::{Rng, RngCore};

/// Multiplier of the sine hash.
const HASH_SCALE: f64 = 43758.5453;

/// State increment between the two halves of one draw.
const STATE_STEP: f64 = 0.01;

/// Upper bound on rejection-sampling rounds.
///
/// Each round accepts with probability >= pi/6, so hitting the bound means
/// the generator is degenerate; the samplers then return a fixed fallback
/// instead of spinning forever.
const MAX_REJECTION_ATTEMPTS: u32 = 64;

/// The pair of host-drawn seeds that decorrelates one frame from the next.
///
/// These must change every frame, otherwise every frame repeats the same
/// noise and accumulation converges on a biased image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSeeds {
    pub seed_a: f64,
    pub seed_b: f64,
}

impl FrameSeeds {
    pub fn new(seed_a: f64, seed_b: f64) -> Self {
        Self { seed_a, seed_b }
    }

    /// Draw a fresh seed pair from a host generator.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            seed_a: rng.gen_range(0.0..1000.0),
            seed_b: rng.gen_range(250.0..750.0),
        }
    }
}

/// Hash-based generator for a single pixel within a single frame.
#[derive(Debug, Clone)]
pub struct PixelRng {
    /// Pixel center; never (0, 0), which would pin the hash at zero
    coord: [f64; 2],
    state: f64,
}

impl PixelRng {
    pub fn new(x: u32, y: u32, seeds: FrameSeeds) -> Self {
        let coord = [x as f64 + 0.5, y as f64 + 0.5];
        let state = coord[0] * seeds.seed_a + coord[1] * seeds.seed_b;
        Self { coord, state }
    }

    /// Next value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        let s0 = self.state + STATE_STEP;
        let s1 = s0 + STATE_STEP;
        self.state = s1;

        let dt = self.coord[0] * s0 + self.coord[1] * s1;
        let sn = dt.rem_euclid(PI);
        // sin is non-negative on [0, pi), so the product is too.
        (sn.sin() * HASH_SCALE).fract()
    }
}

impl RngCore for PixelRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_f64() * 4_294_967_296.0) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Uniform f32 in [0, 1).
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    // 24 random mantissa bits
    (rng.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
}

/// Uniform f32 in [min, max).
#[inline]
pub fn gen_range_f32(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    min + (max - min) * gen_f32(rng)
}

/// Random point in the square [-0.5, 0.5] x [-0.5, 0.5] (z = 0).
pub fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f32(rng) - 0.5, gen_f32(rng) - 0.5, 0.0)
}

/// Random point inside the unit disk (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let p = Vec3::new(
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
            0.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
    Vec3::ZERO
}

/// Random point inside the unit ball.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let p = Vec3::new(
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
            gen_range_f32(rng, -1.0, 1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
    Vec3::ZERO
}

/// Random direction, uniform on the unit sphere.
pub fn random_unit_vector(rng: &mut dyn RngCore) -> Vec3 {
    for _ in 0..MAX_REJECTION_ATTEMPTS {
        let p = random_in_unit_sphere(rng);
        let len_sq = p.length_squared();
        // Tiny vectors lose all direction when normalized.
        if len_sq > 1e-12 {
            return p / len_sq.sqrt();
        }
    }
    Vec3::Y
}
