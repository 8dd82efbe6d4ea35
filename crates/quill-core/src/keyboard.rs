use crate::error::{QuillError, Result};
use enigo::Keyboard;
use enigo::{Direction, Enigo, Key, Settings};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

/// Simulated keystrokes the engine emits while replacing a trigger.
pub trait KeySimulator: Send + Sync {
    /// Delay inserted between consecutive simulated key taps. The engine
    /// sets this to zero at construction for fastest backspace emission.
    fn set_inter_key_delay(&self, ms: u64);
    /// Tap Backspace `count` times.
    fn backspace(&self, count: usize) -> Result<()>;
    /// Tap the platform paste shortcut (Command+V or Control+V).
    fn paste(&self, use_command: bool) -> Result<()>;
}

/// True on the platform family whose paste shortcut uses the command key.
pub fn paste_uses_command() -> bool {
    cfg!(target_os = "macos")
}

/// enigo-backed simulator, one controller per operation.
pub struct EnigoSimulator {
    inter_key_delay_ms: AtomicU64,
}

impl EnigoSimulator {
    pub fn new() -> Self {
        Self {
            inter_key_delay_ms: AtomicU64::new(0),
        }
    }

    fn controller(&self) -> Result<Enigo> {
        Enigo::new(&Settings::default()).map_err(|err| {
            QuillError::Enigo(format!("Failed to create keyboard controller: {}", err))
        })
    }
}

impl Default for EnigoSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySimulator for EnigoSimulator {
    fn set_inter_key_delay(&self, ms: u64) {
        self.inter_key_delay_ms.store(ms, Ordering::Relaxed);
    }

    fn backspace(&self, count: usize) -> Result<()> {
        let mut keyboard = self.controller()?;
        let delay = self.inter_key_delay_ms.load(Ordering::Relaxed);
        for _ in 0..count {
            if delay > 0 {
                thread::sleep(Duration::from_millis(delay));
            }
            keyboard
                .key(Key::Backspace, Direction::Click)
                .map_err(|err| {
                    QuillError::Enigo(format!("Failed to send backspace: {}", err))
                })?;
        }
        Ok(())
    }

    fn paste(&self, use_command: bool) -> Result<()> {
        let mut keyboard = self.controller()?;
        let modifier = if use_command { Key::Meta } else { Key::Control };
        keyboard
            .key(modifier, Direction::Press)
            .and_then(|_| keyboard.key(Key::Unicode('v'), Direction::Click))
            .and_then(|_| keyboard.key(modifier, Direction::Release))
            .map_err(|err| QuillError::Enigo(format!("Failed to send paste: {}", err)))
    }
}
