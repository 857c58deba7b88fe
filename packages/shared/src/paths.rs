//! User-data locations on the local filesystem.

use std::{
    io,
    path::{Path, PathBuf},
};

/// Directory name created under the user's home directory.
pub const USER_DATA_DIR_NAME: &str = "curseclientlib";

/// Sub-directory of the user-data directory that receives log files.
pub const LOGS_DIR_NAME: &str = "logs";

/// Resolve `~/curseclientlib`.
///
/// Returns `None` when the home directory cannot be determined.
pub fn user_data_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(USER_DATA_DIR_NAME))
}

/// Log directory below the given user-data directory.
pub fn logs_dir(user_data_dir: &Path) -> PathBuf {
    user_data_dir.join(LOGS_DIR_NAME)
}

/// Create the log directory below `user_data_dir` if it does not exist yet.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_log_dir(user_data_dir: &Path) -> io::Result<PathBuf> {
    let dir = logs_dir(user_data_dir);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
