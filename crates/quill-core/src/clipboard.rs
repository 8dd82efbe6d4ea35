use crate::error::{QuillError, Result};
use arboard::Clipboard;

/// Text clipboard access, a fresh OS handle per operation.
pub trait ClipboardAccess: Send + Sync {
    fn read_text(&self) -> Result<String>;
    fn write_text(&self, text: &str) -> Result<()>;
}

pub struct SystemClipboard;

impl ClipboardAccess for SystemClipboard {
    fn read_text(&self) -> Result<String> {
        let mut clipboard =
            Clipboard::new().map_err(|e| QuillError::Clipboard(e.to_string()))?;
        clipboard
            .get_text()
            .map_err(|e| QuillError::Clipboard(e.to_string()))
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard =
            Clipboard::new().map_err(|e| QuillError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| QuillError::Clipboard(e.to_string()))
    }
}
