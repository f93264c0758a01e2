//! Global tracing subscriber.
//!
//! The terminal belongs to the UI, so diagnostics go to a log file. The
//! filter comes from `RUST_LOG` and defaults to `info`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_FILTER: &str = "info";

/// What the installed subscriber writes to
#[derive(Debug, Clone)]
pub struct TracingHandles {
    pub log_path: PathBuf,
}

/// Log file used when none is given on the command line.
pub fn default_log_path() -> PathBuf {
    std::env::temp_dir().join(format!("repodash-{}.log", std::process::id()))
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber writing to `log_file`. Returns `None`
/// when the file cannot be opened or a subscriber is already installed;
/// the dashboard then runs without logging.
pub fn init_global(log_file: &Path) -> Option<TracingHandles> {
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", log_file.display(), e);
            return None;
        }
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .is_ok();

    installed.then(|| TracingHandles {
        log_path: log_file.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_path_is_per_process() {
        let path = default_log_path();
        assert!(path.starts_with(std::env::temp_dir()));
        assert!(path
            .to_string_lossy()
            .contains(&std::process::id().to_string()));
    }

    #[test]
    fn test_unopenable_log_file_disables_logging() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending
        assert!(init_global(dir.path()).is_none());
    }
}
