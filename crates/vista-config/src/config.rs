//! Configuration structs with viewer defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vista_scene::{CameraSettings, CelestialSettings, LightingMode, TimeOfDay, WindState};
use vista_terrain::NoiseFunction;

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level viewer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub terrain: TerrainConfig,
    /// Orbit camera start pose, input rates and projection.
    pub camera: CameraSettings,
    pub sky: SkyConfig,
    pub fields: FieldConfig,
    pub assets: AssetConfig,
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Present with `PresentMode::AutoVsync`, otherwise `AutoNoVsync`.
    pub vsync: bool,
    pub title: String,
}

/// Terrain generation options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub width: f32,
    /// Vertical amplitude of the height field.
    pub height: f32,
    pub depth: f32,
    /// Noise seed. `None` derives one from the wall clock at startup.
    pub seed: Option<u64>,
    pub noise: NoiseFunction,
    pub roughness: f32,
    /// Load the terrain from this OBJ (relative to the asset root) instead of
    /// generating it.
    pub mesh_file: Option<String>,
}

/// Sky, lighting and weather settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    pub time_of_day: TimeOfDay,
    pub lighting_mode: LightingMode,
    pub celestial: CelestialSettings,
    pub wind: WindState,
}

/// Decorative entity counts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FieldConfig {
    pub cloud_count: usize,
    pub star_count: usize,
    /// Seed for cloud and star personalities. `None` uses the terrain seed.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory every other asset path is resolved against.
    pub root: PathBuf,
    pub sun_model: String,
    pub moon_model: String,
    pub star_model: String,
    /// Terrain albedo (PNG or JPEG).
    pub terrain_texture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 800,
            vsync: true,
            title: "Vista".to_string(),
        }
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            width: 300.0,
            height: 8.0,
            depth: 300.0,
            seed: None,
            noise: NoiseFunction::Simplex,
            roughness: 10.0,
            mesh_file: None,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            time_of_day: TimeOfDay::Day,
            lighting_mode: LightingMode::BlinnPhong,
            celestial: CelestialSettings::default(),
            wind: WindState::default(),
        }
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            cloud_count: 8,
            star_count: 120,
            seed: None,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            sun_model: "13913_Sun_v2_l3.obj".to_string(),
            moon_model: "moon.obj".to_string(),
            star_model: "flowers.obj".to_string(),
            terrain_texture: "Grass-Texture.jpg".to_string(),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// `<platform config dir>/vista`, or the working directory when the platform
/// has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("vista"))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load `config.ron` from `config_dir`, writing the defaults there first if
    /// the file does not exist yet.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let path = config_dir.join(CONFIG_FILE);

        if path.exists() {
            let config = Self::read(&path)?;
            log::info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::WriteError {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&path, serialized).map_err(|source| ConfigError::WriteError { path, source })
    }

    /// Re-read `config.ron`. Returns `Some` only when the file differs from
    /// `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let fresh = Self::read(&config_dir.join(CONFIG_FILE))?;
        if &fresh == self {
            return Ok(None);
        }
        log::info!("Config reloaded with changes");
        Ok(Some(fresh))
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer_startup() {
        let config = Config::default();
        assert_eq!(config.terrain.width, 300.0);
        assert_eq!(config.terrain.depth, 300.0);
        assert_eq!(config.terrain.height, 8.0);
        assert_eq!(config.terrain.roughness, 10.0);
        assert_eq!(config.terrain.noise, NoiseFunction::Simplex);
        assert!(config.terrain.seed.is_none(), "seed should default to wall clock");
        assert_eq!(config.fields.cloud_count, 8);
        assert_eq!(config.fields.star_count, 120);
        assert_eq!(config.sky.time_of_day, TimeOfDay::Day);
    }

    #[test]
    fn test_default_config_serializes() {
        let ron_str =
            ron::ser::to_string_pretty(&Config::default(), ron::ser::PrettyConfig::new()).unwrap();
        assert!(ron_str.contains("width: 800"), "missing window width in:\n{ron_str}");
        assert!(ron_str.contains("noise: Simplex"), "missing noise selector in:\n{ron_str}");
        assert!(ron_str.contains("moon.obj"), "missing moon model in:\n{ron_str}");
    }

    #[test]
    fn test_config_roundtrip_with_overrides() {
        let mut config = Config::default();
        config.terrain.seed = Some(42);
        config.terrain.noise = NoiseFunction::Perlin;
        config.sky.time_of_day = TimeOfDay::Night;
        config.sky.lighting_mode = LightingMode::Toon;

        let ron_str = ron::to_string(&config).unwrap();
        let back: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = ron::from_str("(terrain: (roughness: 4.0), fields: ())").unwrap();
        assert_eq!(config.terrain.roughness, 4.0);
        assert_eq!(config.terrain.width, 300.0);
        assert_eq!(config.fields, FieldConfig::default());
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn test_unknown_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok(), "unknown fields should be tolerated: {result:?}");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1280;
        config.assets.root = PathBuf::from("/srv/vista/assets");
        config.save(dir.path()).unwrap();

        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("vista");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists(), "default file should be written");
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());

        let mut modified = config.clone();
        modified.fields.star_count = 40;
        modified.save(dir.path()).unwrap();

        let reloaded = config.reload(dir.path()).unwrap();
        assert_eq!(reloaded.map(|c| c.fields.star_count), Some(40));
    }

    #[test]
    fn test_invalid_ron_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }), "got {err:?}");
        assert!(err.to_string().contains(CONFIG_FILE), "message lacks path: {err}");
    }
}
