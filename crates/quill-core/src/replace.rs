//! The clipboard-paste choreography that performs a visible replacement.

use crate::clipboard::ClipboardAccess;
use crate::config::{PASTE_DELAY_MS, RESTORE_DELAY_MS};
use crate::error::Result;
use crate::keyboard::{paste_uses_command, KeySimulator};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Performs an in-place text substitution without a text-editing API:
/// write the replacement to the clipboard, tap the paste shortcut after a
/// short delay, restore the previous clipboard after a longer one.
///
/// `replace` returns as soon as the clipboard write lands; the paste and the
/// restore run on a scheduled background task. The delays are load-bearing:
/// the paste must happen after the OS observes the clipboard write, and the
/// original clipboard must survive the paste before being restored. Two
/// replacements inside the same window race each other's restore; that
/// hazard is accepted, not eliminated.
#[derive(Clone)]
pub struct Choreographer {
    clipboard: Arc<dyn ClipboardAccess>,
    simulator: Arc<dyn KeySimulator>,
    use_command_paste: bool,
    paste_delay: Duration,
    restore_delay: Duration,
}

impl Choreographer {
    pub fn new(clipboard: Arc<dyn ClipboardAccess>, simulator: Arc<dyn KeySimulator>) -> Self {
        Self {
            clipboard,
            simulator,
            use_command_paste: paste_uses_command(),
            paste_delay: Duration::from_millis(PASTE_DELAY_MS),
            restore_delay: Duration::from_millis(RESTORE_DELAY_MS),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_timing(mut self, paste_delay: Duration, restore_delay: Duration) -> Self {
        self.paste_delay = paste_delay;
        self.restore_delay = restore_delay;
        self
    }

    /// Substitute `text` at the insertion point.
    ///
    /// An unreadable clipboard restores to empty rather than aborting the
    /// replacement.
    pub fn replace(&self, text: &str) -> Result<()> {
        let previous = self.clipboard.read_text().unwrap_or_default();
        self.clipboard.write_text(text)?;

        let clipboard = Arc::clone(&self.clipboard);
        let simulator = Arc::clone(&self.simulator);
        let use_command = self.use_command_paste;
        let paste_delay = self.paste_delay;
        let restore_delay = self.restore_delay;

        thread::spawn(move || {
            thread::sleep(paste_delay);
            if let Err(err) = simulator.paste(use_command) {
                warn!(%err, "paste simulation failed");
            }
            thread::sleep(restore_delay.saturating_sub(paste_delay));
            if let Err(err) = clipboard.write_text(&previous) {
                warn!(%err, "clipboard restore failed");
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockClipboard, MockSimulator, SimulatedKey};
    use std::time::Instant;

    fn fast_choreographer(
        clipboard: &Arc<MockClipboard>,
        simulator: &Arc<MockSimulator>,
    ) -> Choreographer {
        Choreographer::new(
            Arc::clone(clipboard) as Arc<dyn ClipboardAccess>,
            Arc::clone(simulator) as Arc<dyn KeySimulator>,
        )
        .with_timing(Duration::from_millis(25), Duration::from_millis(60))
    }

    #[test]
    fn write_paste_restore_in_order() {
        let clipboard = Arc::new(MockClipboard::with_text("original"));
        let simulator = Arc::new(MockSimulator::new());
        let choreographer = fast_choreographer(&clipboard, &simulator);

        choreographer.replace("expanded").unwrap();

        // The replacement text lands synchronously.
        assert_eq!(clipboard.writes(), vec!["expanded".to_string()]);
        assert!(simulator.keys().is_empty());

        thread::sleep(Duration::from_millis(150));
        assert_eq!(
            clipboard.writes(),
            vec!["expanded".to_string(), "original".to_string()]
        );
        assert_eq!(simulator.keys(), vec![SimulatedKey::Paste]);
    }

    #[test]
    fn replace_does_not_block_on_the_delays() {
        let clipboard = Arc::new(MockClipboard::with_text(""));
        let simulator = Arc::new(MockSimulator::new());
        let choreographer = Choreographer::new(
            Arc::clone(&clipboard) as Arc<dyn ClipboardAccess>,
            Arc::clone(&simulator) as Arc<dyn KeySimulator>,
        );

        let started = Instant::now();
        choreographer.replace("expanded").unwrap();
        // Well under the 50/500 ms schedule.
        assert!(started.elapsed() < Duration::from_millis(40));
    }

    #[test]
    fn unreadable_clipboard_restores_to_empty() {
        let clipboard = Arc::new(MockClipboard::unreadable());
        let simulator = Arc::new(MockSimulator::new());
        let choreographer = fast_choreographer(&clipboard, &simulator);

        choreographer.replace("expanded").unwrap();
        thread::sleep(Duration::from_millis(150));
        assert_eq!(
            clipboard.writes(),
            vec!["expanded".to_string(), String::new()]
        );
    }
}
