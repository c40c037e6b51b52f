//! Tracing subscriber setup.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::Subscriber;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

/// Log file used by the TUI, relative to the system temp dir.
pub const TUI_LOG_FILE: &str = "estat-tui.log";

fn env_filter(default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy()
}

/// Install a stderr `fmt` subscriber filtered by `RUST_LOG`, falling back to `default`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(default: LevelFilter) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(default))
        .with_writer(std::io::stderr)
        // Use colored output in debug mode
        .with_ansi(cfg!(debug_assertions))
        .try_init();
}

/// Logging for the TUI, which owns the terminal.
///
/// Nothing is installed unless `RUST_LOG` is set; events then go to
/// [`TUI_LOG_FILE`] in the temp dir. Returns the file path when logging is on.
pub fn init_tui_logging() -> Option<PathBuf> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let path = tui_log_path(rust_log.as_deref(), &std::env::temp_dir())?;

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file '{}': {e}", path.display());
            return None;
        }
    };

    tracing::subscriber::set_global_default(file_subscriber(file, env_filter(LevelFilter::INFO)))
        .ok()
        .map(|_| path)
}

fn tui_log_path(rust_log: Option<&str>, dir: &Path) -> Option<PathBuf> {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .map(|_| dir.join(TUI_LOG_FILE))
}

fn file_subscriber(file: File, filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .finish()
}
