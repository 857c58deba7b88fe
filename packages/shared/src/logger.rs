//! Logging setup utilities for the client binary.

use std::{
    io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use file_rotate::{ContentLimit, FileRotate, compression::Compression, suffix::AppendCount};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Size at which the log file is rotated (1 MiB).
pub const LOG_FILE_MAX_BYTES: usize = 1024 * 1024;

/// Number of log files kept, the active one included.
pub const LOG_FILES_KEPT: usize = 10;

/// Crates whose records are shown at the default level.
const LIBRARY_TARGETS: [&str; 2] = ["cursevoice_client", "cursevoice_shared"];

/// Build the default filter directive for the library crates and the binary.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "cursevoice-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
pub fn default_filter(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let mut targets: Vec<&str> = LIBRARY_TARGETS.to_vec();
    if !targets.contains(&binary_target.as_str()) {
        targets.push(&binary_target);
    }

    targets
        .iter()
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Path of the log file written for `binary_name` inside `log_dir`.
pub fn log_file_path(log_dir: &Path, binary_name: &str) -> PathBuf {
    log_dir.join(format!("{}.log", binary_name))
}

/// Size-capped log writer at `path`.
///
/// Once the file reaches `max_bytes` it is renamed to `<path>.1` (older files
/// shift to `.2`, `.3`, ...) and a new file is started. At most `max_files`
/// files exist at a time.
pub fn rotating_writer(path: &Path, max_bytes: usize, max_files: usize) -> FileRotate<AppendCount> {
    FileRotate::new(
        path,
        AppendCount::new(max_files.saturating_sub(1)),
        ContentLimit::Bytes(max_bytes),
        Compression::None,
        #[cfg(unix)]
        None,
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// Console output is always enabled. When `log_dir` is given, records are also
/// written (without ANSI colors) to `<log_dir>/<binary_name>.log`, rotated
/// every [`LOG_FILE_MAX_BYTES`] and keeping [`LOG_FILES_KEPT`] files.
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "cursevoice-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
/// * `log_dir` - Optional directory for the log files
///
/// # Errors
///
/// Returns an error if the log directory cannot be created.
///
/// # Examples
///
/// ```no_run
/// use cursevoice_shared::logger::setup_logger;
///
/// setup_logger("cursevoice-client", "info", None).unwrap();
/// ```
pub fn setup_logger(
    binary_name: &str,
    default_log_level: &str,
    log_dir: Option<&Path>,
) -> io::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into());

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let writer = rotating_writer(
                &log_file_path(dir, binary_name),
                LOG_FILE_MAX_BYTES,
                LOG_FILES_KEPT,
            );
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(writer)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    Ok(())
}
