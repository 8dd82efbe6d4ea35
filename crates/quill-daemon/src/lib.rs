pub mod daemon_manager;
pub mod keyboard_listener;
pub mod permissions;
pub mod process;

pub use daemon_manager::{
    daemon_status, daemon_worker_entry, run_daemon_worker, start_daemon, stop_daemon,
};
pub use keyboard_listener::start_keyboard_listener;
