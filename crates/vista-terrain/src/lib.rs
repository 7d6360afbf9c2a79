//! Procedural terrain for the Vista viewer.
//!
//! A fractal noise height field is sampled on a regular grid spanning the
//! requested footprint and emitted as a flat triangle list with planar
//! texture coordinates.

mod heightmap;
mod mesh;
mod options;

pub use heightmap::HeightField;
pub use mesh::{TerrainGenerator, TerrainMesh};
pub use options::{NoiseFunction, TerrainOptions, UnknownNoiseFunction};
