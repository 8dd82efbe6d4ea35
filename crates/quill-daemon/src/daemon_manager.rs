//! Daemon lifecycle: a PID-file-guarded detached worker process that owns
//! the engine and the input hook.

use crate::keyboard_listener::start_keyboard_listener;
use crate::permissions::check_permissions;
use crate::process::verify_process_running;
use quill_core::config::{
    db_file_exists, ensure_config_dir, get_config_dir, get_db_file_path, get_pid_file_path,
};
use quill_core::storage::SnippetStore;
use quill_core::{is_daemon_running, system_engine, JsonStore, QuillError, Result};
use std::fs::{self, File};
use std::io::Write;
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Start the daemon as a detached background process.
pub fn start_daemon() -> Result<()> {
    if let Some(pid) = is_daemon_running()? {
        if verify_process_running(pid) {
            return Err(QuillError::DaemonAlreadyRunning(pid));
        }
        println!("Found stale PID file. Cleaning up and starting new daemon...");
        let _ = fs::remove_file(get_pid_file_path());
    }

    println!("Starting quill daemon...");
    ensure_config_dir()?;

    if !db_file_exists() {
        return Err(QuillError::DatabaseNotFound(
            get_db_file_path().to_string_lossy().to_string(),
        ));
    }

    check_permissions()?;

    let current_exe = std::env::current_exe()?;
    let log_file = get_config_dir().join("daemon_log.txt");

    #[cfg(unix)]
    {
        use std::process::Command;
        let cmd = format!(
            "nohup {} daemon-worker > {} 2>&1 &",
            current_exe.to_string_lossy(),
            log_file.to_string_lossy()
        );
        Command::new("sh").arg("-c").arg(&cmd).status()?;
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        let cmd = format!(
            "START /B \"quill daemon\" \"{}\" daemon-worker > \"{}\" 2>&1",
            current_exe.to_string_lossy(),
            log_file.to_string_lossy()
        );
        Command::new("cmd").arg("/C").arg(&cmd).status()?;
    }

    // Wait for the worker to come up and write its PID file.
    for _ in 0..20 {
        thread::sleep(Duration::from_millis(100));
        if is_daemon_running()?.is_some() {
            break;
        }
    }

    match is_daemon_running()? {
        Some(pid) if verify_process_running(pid) => {
            println!("Daemon started successfully with PID {}.", pid);
            Ok(())
        }
        _ => Err(QuillError::Other(format!(
            "Daemon failed to start. Check logs at {}",
            log_file.to_string_lossy()
        ))),
    }
}

/// Stop a running daemon.
pub fn stop_daemon() -> Result<()> {
    let pid_file = get_pid_file_path();
    if !pid_file.exists() {
        return Err(QuillError::DaemonNotRunning);
    }

    let pid = match fs::read_to_string(&pid_file) {
        Ok(contents) => match contents.trim().parse::<u32>() {
            Ok(pid) => pid,
            Err(_) => {
                let _ = fs::remove_file(&pid_file);
                return Err(QuillError::InvalidPid);
            }
        },
        Err(err) => {
            let _ = fs::remove_file(&pid_file);
            return Err(QuillError::Other(format!("Failed to read PID file: {}", err)));
        }
    };

    println!("Attempting to stop daemon with PID {}...", pid);

    if !verify_process_running(pid) {
        println!("Process with PID {} is not running.", pid);
        let _ = fs::remove_file(&pid_file);
        return Ok(());
    }

    // Removing the PID file asks the worker loop to exit on its own; the
    // signal below covers a worker stuck inside the hook.
    let _ = fs::remove_file(&pid_file);

    #[cfg(unix)]
    {
        use std::process::Command;
        let _ = Command::new("kill").arg(pid.to_string()).status();
        thread::sleep(Duration::from_millis(500));
        if verify_process_running(pid) {
            println!("Daemon didn't terminate gracefully, using force kill...");
            let _ = Command::new("kill").args(["-9", &pid.to_string()]).status();
        }
    }

    #[cfg(windows)]
    {
        use std::process::Command;
        let _ = Command::new("taskkill").args(["/PID", &pid.to_string()]).status();
        thread::sleep(Duration::from_millis(500));
        if verify_process_running(pid) {
            println!("Daemon didn't terminate gracefully, using force kill...");
            let _ = Command::new("taskkill")
                .args(["/F", "/T", "/PID", &pid.to_string()])
                .status();
        }
    }

    println!("Daemon stopped successfully.");
    Ok(())
}

/// Report whether the daemon is running.
pub fn daemon_status() -> Result<()> {
    match is_daemon_running()? {
        Some(pid) if verify_process_running(pid) => {
            println!("quill daemon is running with PID {}", pid);
            Ok(())
        }
        Some(pid) => {
            println!("PID file exists but process {} is not running", pid);
            println!("Recommend running 'quill stop' followed by 'quill start'");
            Ok(())
        }
        None => {
            println!("quill daemon is not running");
            Ok(())
        }
    }
}

/// Entry point of the detached worker process: writes the PID file, runs
/// the engine, cleans up on exit.
pub fn daemon_worker_entry() -> Result<()> {
    let pid_file = get_pid_file_path();
    let mut file = File::create(&pid_file)?;
    write!(file, "{}", process::id())?;

    let result = run_daemon_worker();

    let _ = fs::remove_file(&pid_file);
    result
}

/// The daemon worker: construct the engine (normalizing the store), attach
/// the input hook, then watch the database file for external edits until
/// asked to stop.
pub fn run_daemon_worker() -> Result<()> {
    let db_path = get_db_file_path();
    if !db_path.exists() {
        return Err(QuillError::DatabaseNotFound(
            db_path.to_string_lossy().to_string(),
        ));
    }

    let store = Arc::new(JsonStore::open(&db_path)?);
    let engine = system_engine(Arc::clone(&store) as Arc<dyn SnippetStore>)?;
    let engine = Arc::new(Mutex::new(engine));

    let running = Arc::new(AtomicBool::new(true));
    let listener = start_keyboard_listener(Arc::clone(&engine), Arc::clone(&running));

    info!(snippets = store.snippets().len(), "quill daemon running");

    let my_pid = process::id().to_string();
    let mut last_modified = fs::metadata(&db_path)?.modified().ok();

    loop {
        thread::sleep(Duration::from_secs(1));

        // stop_daemon removes (or another instance rewrites) the PID file.
        let pid_file = get_pid_file_path();
        let still_ours = fs::read_to_string(&pid_file)
            .map(|contents| contents.trim() == my_pid)
            .unwrap_or(false);
        if !still_ours {
            info!("PID file gone or replaced, shutting down");
            break;
        }

        // Pick up external snippet edits.
        if let Ok(modified) = fs::metadata(&db_path).and_then(|m| m.modified()) {
            if last_modified.map_or(true, |last| modified > last) {
                last_modified = Some(modified);
                match store.reload() {
                    Ok(()) => info!("snippet database reloaded"),
                    Err(err) => warn!(%err, "failed to reload snippet database"),
                }
            }
        }
    }

    running.store(false, Ordering::Relaxed);
    // The rdev hook blocks its thread until process exit; don't wait for it.
    drop(listener);
    Ok(())
}
