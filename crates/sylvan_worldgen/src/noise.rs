use noise::{NoiseFn, Perlin};

use crate::seed::WorldSeed;

const OCTAVES: u32 = 6;
const LACUNARITY: f64 = 2.0;
const PERSISTENCE: f64 = 0.5;

/// Fractional Brownian Motion along a line through 2D Perlin noise.
/// Each octave samples its own row so integer lattice points are not all
/// zero. Normalised to [-1, 1].
pub fn fbm(
    perlin: &Perlin,
    x: f64,
    octaves: u32,
    base_frequency: f64,
    lacunarity: f64,
    persistence: f64,
) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = base_frequency;
    let mut max_value = 0.0;

    for octave in 0..octaves {
        let sample = perlin.get([x * frequency, 0.5 + octave as f64]);
        value += sample.clamp(-1.0, 1.0) * amplitude;
        max_value += amplitude;

        amplitude *= persistence;
        frequency *= lacunarity;
    }

    if max_value > 0.0 {
        value / max_value
    } else {
        0.0
    }
}

/// Seeded 1D coherent noise.
///
/// `noise(x, factor)` is bounded by `|factor|` for every `x`. Features are
/// `start_point` world units wide at the coarsest octave, halving with each
/// finer octave.
#[derive(Clone)]
pub struct NoiseGenerator {
    perlin: Perlin,
    start_point: f64,
}

impl NoiseGenerator {
    pub fn new(seed: WorldSeed, start_point: f64) -> Self {
        Self {
            perlin: Perlin::new(seed.value),
            start_point: if start_point > 0.0 { start_point } else { 1.0 },
        }
    }

    pub fn start_point(&self) -> f64 {
        self.start_point
    }

    pub fn noise(&self, x: f64, factor: f64) -> f64 {
        fbm(
            &self.perlin,
            x,
            OCTAVES,
            1.0 / self.start_point,
            LACUNARITY,
            PERSISTENCE,
        ) * factor
    }
}

impl std::fmt::Debug for NoiseGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseGenerator")
            .field("start_point", &self.start_point)
            .finish_non_exhaustive()
    }
}
