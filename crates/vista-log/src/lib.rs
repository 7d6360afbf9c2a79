//! Tracing subscriber setup for the Vista viewer.
//!
//! Console output is always on. Debug builds additionally write structured
//! JSON to `vista.log` in the requested directory. `RUST_LOG` takes precedence
//! over the configured level.

use std::path::Path;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use vista_config::DebugConfig;

/// GPU backends are chatty at `info`.
const QUIET_BACKENDS: &str = "wgpu=warn,naga=warn";

pub const LOG_FILE_NAME: &str = "vista.log";

/// Build the filter directive string for a configured level.
///
/// A bare level such as `debug` gets the backend quieting appended; a full
/// directive list (anything with a `,` or `=`) is used as given.
pub fn filter_directives(debug: Option<&DebugConfig>) -> String {
    let level = debug.map(|d| d.log_level.trim()).unwrap_or_default();
    if level.is_empty() {
        format!("info,{QUIET_BACKENDS}")
    } else if level.contains(',') || level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{QUIET_BACKENDS}")
    }
}

pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(None))
}

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed, which happens when
/// tests or embedders initialise logging more than once.
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, debug: Option<&DebugConfig>) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(debug)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    // Asset loader threads are named, so the JSON file keeps thread names too.
    if debug_build
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init().is_ok();
    }

    subscriber.try_init().is_ok()
}
