// redactgate/src/logger.rs
//! Process-wide `env_logger` setup.
//!
//! `RUST_LOG` is honored unless a level is forced by `--quiet` or `--debug`.
//! Logs go to stderr so stdout stays machine-readable.

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Default filter when neither a flag nor `RUST_LOG` says otherwise.
const DEFAULT_FILTER: &str = "warn";

pub fn init_logger(level_override: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    builder.target(Target::Stderr).format_timestamp(None);
    if let Some(level) = level_override {
        builder.filter_level(level);
    }
    // A logger may already be installed (tests).
    let _ = builder.try_init();
}

/// Maps the global flags to a level override.
pub fn level_from_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
