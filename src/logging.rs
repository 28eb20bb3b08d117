//! Logging configuration for AskDB.
//!
//! The interactive shell logs to a file so diagnostics do not interleave with
//! the prompt; one-shot commands log to stderr.

use std::fs::{self, File};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initializes logging for the interactive shell.
///
/// Location: `~/.local/state/askdb/askdb.log` on Linux (XDG state directory),
/// or the platform-appropriate state/config directory on other systems.
pub fn init_file_logging() {
    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory: {e}");
            return;
        }
    }

    // Truncated on each run to avoid unbounded growth
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file: {e}");
            return;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(false)
        .init();
}

/// Initializes logging for one-shot commands.
pub fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// Returns the path for the log file.
pub fn get_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        return state_dir.join("askdb").join("askdb.log");
    }

    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("askdb").join("askdb.log");
    }

    std::env::temp_dir().join("askdb.log")
}
