//! Window, frame loop and startup wiring for the Vista viewer.

pub mod startup;
pub mod window;

pub use startup::{
    PendingAssets, StartupError, build_terrain, resolve_seed, scene_settings, terrain_options,
    upload_terrain,
};
pub use window::{App, run};
