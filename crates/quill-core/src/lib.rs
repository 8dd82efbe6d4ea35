pub mod buffer;
pub mod clipboard;
pub mod config;
pub mod engine;
pub mod error;
pub mod keyboard;
pub mod keymap;
pub mod matcher;
pub mod models;
pub mod notify;
pub mod replace;
pub mod sandbox;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export common items for convenience
pub use config::{get_config_dir, get_db_file_path, is_daemon_running};
pub use engine::{system_engine, EngineDeps, SnippetEngine};
pub use error::{QuillError, Result};
pub use keymap::{KeyEvent, Keymap, KeymapSource, UsKeymap};
pub use models::{Snippet, SnippetBody, StoreData};
pub use storage::{JsonStore, SnippetStore};
