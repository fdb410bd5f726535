//! File logging for the TUI.
//!
//! The terminal belongs to the UI, so log records go to a file only.

use std::fs::{self, File};
use std::path::Path;

use log::LevelFilter;
use simplelog::{Config, ConfigBuilder, WriteLogger};

/// Start logging to `path`. Returns false (with a warning on stderr) when the
/// file cannot be created; the app then runs without logs.
pub fn initialize(path: &Path) -> bool {
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        let _ = fs::create_dir_all(parent);
    }

    match File::create(path) {
        Ok(file) => WriteLogger::init(level, build_config(), file).is_ok(),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            false
        }
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        // reqwest/hyper internals are noise at debug level
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build()
}
