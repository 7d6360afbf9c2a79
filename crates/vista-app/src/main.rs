//! `vista`: procedural terrain under an animated day/night sky.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p vista-app -- --seed 42 --noise perlin`.

use clap::Parser;
use vista_config::{CliArgs, Config, default_config_dir};

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    vista_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config.debug));

    if let Err(e) = vista_app::run(config) {
        tracing::error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
