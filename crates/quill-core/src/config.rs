use crate::error::Result;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const PID_FILENAME: &str = "quill-daemon.pid";
pub const DB_FILENAME: &str = "quill.json";

/// Default size of the rolling input buffer when the store does not set one.
pub const DEFAULT_BUFFER_LENGTH: usize = 20;

/// Hard time budget for a single dynamic snippet evaluation.
pub const EVAL_TIMEOUT_MS: u64 = 5000;

/// Delay between the clipboard write and the simulated paste shortcut.
pub const PASTE_DELAY_MS: u64 = 50;

/// Delay between the clipboard write and the clipboard restore.
pub const RESTORE_DELAY_MS: u64 = 500;

/// Get the quill configuration directory
pub fn get_config_dir() -> PathBuf {
    env::var("HOME")
        .map(|home| PathBuf::from(home).join(".quill"))
        .unwrap_or_else(|_| PathBuf::from(".quill"))
}

/// Ensure the configuration directory and database file exist
pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = get_config_dir();
    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    let db_path = get_db_file_path();
    if !db_path.exists() {
        fs::write(&db_path, "")?;
    }

    Ok(config_dir)
}

/// Get the path to the PID file
pub fn get_pid_file_path() -> PathBuf {
    get_config_dir().join(PID_FILENAME)
}

/// Get the path to the database file
pub fn get_db_file_path() -> PathBuf {
    get_config_dir().join(DB_FILENAME)
}

/// Check if the database file exists
pub fn db_file_exists() -> bool {
    get_db_file_path().exists()
}

/// Check if the daemon PID file names a process
pub fn is_daemon_running() -> Result<Option<u32>> {
    let pid_file = get_pid_file_path();

    if pid_file.exists() {
        match fs::read_to_string(&pid_file) {
            Ok(contents) => match contents.trim().parse::<u32>() {
                Ok(pid) => Ok(Some(pid)),
                Err(_) => {
                    // Invalid PID, treat as not running and clean up
                    let _ = fs::remove_file(&pid_file);
                    Ok(None)
                }
            },
            Err(_) => {
                // Can't read file, treat as not running and clean up
                let _ = fs::remove_file(&pid_file);
                Ok(None)
            }
        }
    } else {
        Ok(None)
    }
}
