//! Multi-octave fractal Brownian motion (fBm) height field.

use noise::{NoiseFn, Perlin, Simplex};

use crate::options::{NoiseFunction, TerrainOptions};

const OCTAVES: u32 = 4;
const LACUNARITY: f64 = 2.0;
const PERSISTENCE: f64 = 0.5;

enum Basis {
    Simplex(Simplex),
    Perlin(Perlin),
}

impl Basis {
    fn get(&self, point: [f64; 2]) -> f64 {
        match self {
            Self::Simplex(n) => n.get(point),
            Self::Perlin(n) => n.get(point),
        }
    }
}

/// Samples terrain height at world-space (x, z) for one set of options.
///
/// Output lies in `[-amplitude, amplitude]`: octaves are weighted by
/// `PERSISTENCE^i` and the sum is normalised by the weight total.
pub struct HeightField {
    basis: Basis,
    base_frequency: f64,
    amplitude: f64,
}

impl HeightField {
    pub fn new(options: &TerrainOptions) -> Self {
        let seed = fold_seed(options.seed);
        let basis = match options.noise {
            NoiseFunction::Simplex => Basis::Simplex(Simplex::new(seed)),
            NoiseFunction::Perlin => Basis::Perlin(Perlin::new(seed)),
        };
        let span = options.width.max(options.depth).max(f32::EPSILON) as f64;
        Self {
            basis,
            base_frequency: options.roughness.max(0.0) as f64 / span,
            amplitude: options.height as f64,
        }
    }

    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut weight_sum = 0.0;
        let mut frequency = self.base_frequency;
        let mut weight = 1.0;

        for _ in 0..OCTAVES {
            total += self.basis.get([x * frequency, z * frequency]) * weight;
            weight_sum += weight;
            frequency *= LACUNARITY;
            weight *= PERSISTENCE;
        }

        (total / weight_sum).clamp(-1.0, 1.0) * self.amplitude
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

/// Noise bases take a 32-bit seed; fold the high half in so distinct 64-bit
/// seeds rarely collide.
fn fold_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}
