//! Command-line arguments for the `vista` binary.

use std::path::PathBuf;

use clap::Parser;
use vista_terrain::NoiseFunction;

use crate::Config;

/// Values given here win over whatever `config.ron` contains.
#[derive(Parser, Debug, Default)]
#[command(name = "vista", about = "Procedural terrain viewer with a day/night sky")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Terrain noise seed (defaults to the wall clock).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Terrain noise function (simplex, perlin).
    #[arg(long)]
    pub noise: Option<NoiseFunction>,

    /// Terrain roughness.
    #[arg(long)]
    pub roughness: Option<f32>,

    /// Asset root directory.
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = Some(seed);
        }
        if let Some(noise) = args.noise {
            self.terrain.noise = noise;
        }
        if let Some(roughness) = args.roughness {
            self.terrain.roughness = roughness;
        }
        if let Some(ref root) = args.assets {
            self.assets.root = root.clone();
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            seed: Some(7),
            noise: Some(NoiseFunction::Perlin),
            assets: Some(PathBuf::from("/tmp/assets")),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.seed, Some(7));
        assert_eq!(config.terrain.noise, NoiseFunction::Perlin);
        assert_eq!(config.assets.root, PathBuf::from("/tmp/assets"));
        assert_eq!(config.terrain.roughness, 10.0, "untouched fields keep defaults");
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn test_cli_no_override() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::try_parse_from([
            "vista",
            "--seed",
            "42",
            "--noise",
            "perlin",
            "--roughness",
            "3.5",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(42));
        assert_eq!(args.noise, Some(NoiseFunction::Perlin));
        assert_eq!(args.roughness, Some(3.5));
    }

    #[test]
    fn test_cli_rejects_unknown_noise() {
        let result = CliArgs::try_parse_from(["vista", "--noise", "worley"]);
        assert!(result.is_err(), "unknown noise names must be rejected");
    }
}
