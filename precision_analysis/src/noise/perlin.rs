use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::{offset_record, NoiseModel};
use crate::io::PoseRecord;

/// Improved Perlin gradient noise in three dimensions.
#[derive(Debug, Clone)]
pub struct PerlinNoise {
    perm: Vec<usize>,
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

fn grad(hash: usize, x: f64, y: f64, z: f64) -> f64 {
    let h = hash & 15;
    let u = if h < 8 { x } else { y };
    let v = if h < 4 {
        y
    } else if h == 12 || h == 14 {
        x
    } else {
        z
    };
    (if h & 1 == 0 { u } else { -u }) + (if h & 2 == 0 { v } else { -v })
}

impl PerlinNoise {
    /// Builds the permutation table from `seed`.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut perm: Vec<usize> = (0..512).collect();
        perm.shuffle(&mut rng);
        perm.extend_from_within(..);
        Self { perm }
    }

    /// Noise value at `(x, y, z)`; zero on every integer lattice point.
    pub fn noise(&self, x: f64, y: f64, z: f64) -> f64 {
        let p = &self.perm;
        let xi = (x.floor() as i64 & 255) as usize;
        let yi = (y.floor() as i64 & 255) as usize;
        let zi = (z.floor() as i64 & 255) as usize;
        let (x, y, z) = (x - x.floor(), y - y.floor(), z - z.floor());
        let (u, v, w) = (fade(x), fade(y), fade(z));

        let a = p[xi] + yi;
        let aa = p[a] + zi;
        let ab = p[a + 1] + zi;
        let b = p[xi + 1] + yi;
        let ba = p[b] + zi;
        let bb = p[b + 1] + zi;

        lerp(
            lerp(
                lerp(grad(p[aa], x, y, z), grad(p[ba], x - 1.0, y, z), u),
                lerp(grad(p[ab], x, y - 1.0, z), grad(p[bb], x - 1.0, y - 1.0, z), u),
                v,
            ),
            lerp(
                lerp(
                    grad(p[aa + 1], x, y, z - 1.0),
                    grad(p[ba + 1], x - 1.0, y, z - 1.0),
                    u,
                ),
                lerp(
                    grad(p[ab + 1], x, y - 1.0, z - 1.0),
                    grad(p[bb + 1], x - 1.0, y - 1.0, z - 1.0),
                    u,
                ),
                v,
            ),
            w,
        )
    }

    /// Fractal Brownian motion: `octaves` layers of noise, each at double
    /// the frequency and `persistence` times the amplitude of the previous.
    /// The normalized sum is shifted by `-0.5` and scaled to `2 * scale`.
    #[allow(clippy::too_many_arguments)]
    pub fn fbm(
        &self,
        x: f64,
        y: f64,
        z: f64,
        octaves: u32,
        persistence: f64,
        frequency: f64,
        scale: f64,
    ) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut max_amp = 0.0;
        let mut freq = frequency;
        for _ in 0..octaves {
            total += self.noise(x * freq, y * freq, z * freq) * amplitude;
            max_amp += amplitude;
            amplitude *= persistence;
            freq *= 2.0;
        }
        if max_amp == 0.0 {
            return 0.0;
        }
        (total / max_amp - 0.5) * 2.0 * scale
    }
}

/// Smooth, slowly varying drift built from Perlin noise.
///
/// Record `i` samples the noise at time `0.1 * i`; each of the six channels
/// (x, y, z, rz, ry, rx) reads a separate lane of the noise field.
#[derive(Debug, Clone, PartialEq)]
pub struct PerlinDrift {
    pub pos_scale: f64,
    pub rot_scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub seed: u64,
}

const TIME_STEP: f64 = 0.1;
const LANE_SPACING: f64 = 100.0;

impl Default for PerlinDrift {
    fn default() -> Self {
        Self {
            pos_scale: 5.0,
            rot_scale: 0.05,
            octaves: 4,
            persistence: 0.5,
            seed: 42,
        }
    }
}

impl PerlinDrift {
    fn channel(&self, noise: &PerlinNoise, t: f64, lane: usize, scale: f64) -> f64 {
        if scale == 0.0 {
            return 0.0;
        }
        noise.fbm(
            t,
            lane as f64 * LANE_SPACING,
            0.0,
            self.octaves,
            self.persistence,
            1.0,
            scale,
        )
    }
}

impl NoiseModel for PerlinDrift {
    fn apply(&self, records: &[PoseRecord]) -> Vec<PoseRecord> {
        let noise = PerlinNoise::new(self.seed);
        records
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                let t = i as f64 * TIME_STEP;
                let dp = Vector3::new(
                    self.channel(&noise, t, 0, self.pos_scale),
                    self.channel(&noise, t, 1, self.pos_scale),
                    self.channel(&noise, t, 2, self.pos_scale),
                );
                let da = Vector3::new(
                    self.channel(&noise, t, 3, self.rot_scale),
                    self.channel(&noise, t, 4, self.rot_scale),
                    self.channel(&noise, t, 5, self.rot_scale),
                );
                offset_record(rec, dp, da)
            })
            .collect()
    }
}
