//! Configuration for the Vista terrain viewer.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Every section tolerates missing fields so older files keep loading.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    AssetConfig, Config, DebugConfig, FieldConfig, SkyConfig, TerrainConfig, WindowConfig,
    default_config_dir,
};
pub use error::ConfigError;
