use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Base noise used for every octave of the height field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoiseFunction {
    #[default]
    Simplex,
    Perlin,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown noise function {0:?} (expected simplex or perlin)")]
pub struct UnknownNoiseFunction(pub String);

impl FromStr for NoiseFunction {
    type Err = UnknownNoiseFunction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simplex" => Ok(Self::Simplex),
            "perlin" => Ok(Self::Perlin),
            _ => Err(UnknownNoiseFunction(s.to_string())),
        }
    }
}

impl fmt::Display for NoiseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Simplex => "simplex",
            Self::Perlin => "perlin",
        })
    }
}

/// Inputs to [`crate::TerrainGenerator::generate`].
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainOptions {
    /// Footprint along X.
    pub width: f32,
    /// Peak height above (and depth below) the base plane.
    pub height: f32,
    /// Footprint along Z.
    pub depth: f32,
    pub seed: u64,
    pub noise: NoiseFunction,
    /// Number of broad features across the longer side of the footprint.
    pub roughness: f32,
}

impl Default for TerrainOptions {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 8.0,
            depth: 300.0,
            seed: 0,
            noise: NoiseFunction::Simplex,
            roughness: 10.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_function_parses_case_insensitively() {
        assert_eq!("Simplex".parse::<NoiseFunction>().unwrap(), NoiseFunction::Simplex);
        assert_eq!(" perlin ".parse::<NoiseFunction>().unwrap(), NoiseFunction::Perlin);
        assert!("value".parse::<NoiseFunction>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for noise in [NoiseFunction::Simplex, NoiseFunction::Perlin] {
            assert_eq!(noise.to_string().parse::<NoiseFunction>().unwrap(), noise);
        }
    }
}
