//! Logger setup for the binary, on top of `env_logger`.

use log::LevelFilter;
use std::env;

/// Initialize logging for the `crossfill` binary.
///
/// Logs at `Info` level, or `Debug` if `debug_enabled` is set. A `RUST_LOG` value in the
/// environment overrides both.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled { LevelFilter::Debug } else { LevelFilter::Info };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(filters) = env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    // A logger may already be installed, e.g. when called twice.
    if builder.try_init().is_ok() {
        log::debug!("Logger initialized at {level:?} level");
    }
}
