//! Shared in-memory fakes for the collaborator traits.

use crate::clipboard::ClipboardAccess;
use crate::error::{QuillError, Result};
use crate::keyboard::KeySimulator;
use crate::models::{Snippet, StoreData};
use crate::notify::NotificationSurface;
use crate::storage::SnippetStore;
use crate::telemetry::TelemetrySink;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub struct MockClipboard {
    content: Mutex<String>,
    writes: Mutex<Vec<String>>,
    readable: bool,
}

impl MockClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            content: Mutex::new(text.to_string()),
            writes: Mutex::new(Vec::new()),
            readable: true,
        }
    }

    pub fn unreadable() -> Self {
        Self {
            readable: false,
            ..Self::with_text("")
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl ClipboardAccess for MockClipboard {
    fn read_text(&self) -> Result<String> {
        if self.readable {
            Ok(self.content.lock().unwrap().clone())
        } else {
            Err(QuillError::Clipboard("no text available".into()))
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        *self.content.lock().unwrap() = text.to_string();
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedKey {
    Backspace,
    Paste,
}

#[derive(Default)]
pub struct MockSimulator {
    keys: Mutex<Vec<SimulatedKey>>,
    delay_ms: AtomicUsize,
}

impl MockSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<SimulatedKey> {
        self.keys.lock().unwrap().clone()
    }

    pub fn backspace_count(&self) -> usize {
        self.keys()
            .iter()
            .filter(|k| **k == SimulatedKey::Backspace)
            .count()
    }

    pub fn delay_ms(&self) -> usize {
        self.delay_ms.load(Ordering::Relaxed)
    }
}

impl KeySimulator for MockSimulator {
    fn set_inter_key_delay(&self, ms: u64) {
        self.delay_ms.store(ms as usize, Ordering::Relaxed);
    }

    fn backspace(&self, count: usize) -> Result<()> {
        let mut keys = self.keys.lock().unwrap();
        keys.extend(std::iter::repeat(SimulatedKey::Backspace).take(count));
        Ok(())
    }

    fn paste(&self, _use_command: bool) -> Result<()> {
        self.keys.lock().unwrap().push(SimulatedKey::Paste);
        Ok(())
    }
}

pub struct MockStore {
    data: Mutex<StoreData>,
    normalize_calls: AtomicUsize,
}

impl MockStore {
    pub fn new(snippets: Vec<Snippet>, buffer_length: usize) -> Self {
        Self {
            data: Mutex::new(StoreData {
                user: "test-user".to_string(),
                snippets,
                buffer_length,
            }),
            normalize_calls: AtomicUsize::new(0),
        }
    }

    pub fn normalize_calls(&self) -> usize {
        self.normalize_calls.load(Ordering::Relaxed)
    }
}

impl SnippetStore for MockStore {
    fn user(&self) -> String {
        self.data.lock().unwrap().user.clone()
    }

    fn buffer_length(&self) -> usize {
        self.data.lock().unwrap().buffer_length
    }

    fn snippets(&self) -> Vec<Snippet> {
        self.data.lock().unwrap().snippets.clone()
    }

    fn normalize(&self) -> Result<()> {
        self.normalize_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[derive(Default)]
pub struct MockTelemetry {
    events: Mutex<Vec<(String, Value)>>,
}

impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl TelemetrySink for MockTelemetry {
    fn report(&self, event: &str, payload: Value) {
        self.events.lock().unwrap().push((event.to_string(), payload));
    }
}

pub struct RecordingNotifier {
    supported: bool,
    shown: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn supported() -> Self {
        Self {
            supported: true,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            shown: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }
}

impl NotificationSurface for RecordingNotifier {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn show(&self, title: &str, body: &str) {
        self.shown.lock().unwrap().push((title.to_string(), body.to_string()));
    }
}
