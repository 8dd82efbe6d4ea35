//! The snippet detection and replacement engine.
//!
//! One instance per process. Key and pointer events flow in from the OS
//! hook; each key event runs reset handling, character resolution, buffer
//! mutation and matching to completion before the next one is looked at.
//! Only dynamic evaluation and the clipboard choreography leave work behind
//! on background tasks, so a pending expansion never stalls the stream.

use crate::buffer::InputBuffer;
use crate::clipboard::ClipboardAccess;
use crate::config::EVAL_TIMEOUT_MS;
use crate::error::Result;
use crate::keymap::{
    event_to_text, key_name, KeyEvent, KeymapSource, KEY_ARROWS, KEY_BACKSPACE, KEY_TAB,
};
use crate::keyboard::KeySimulator;
use crate::matcher::find_match;
use crate::models::SnippetBody;
use crate::notify::{NotificationSurface, ERROR_TITLE};
use crate::replace::Choreographer;
use crate::sandbox::{self, EvalError};
use crate::storage::SnippetStore;
use crate::telemetry::{replacement_payload, TelemetrySink, REPLACEMENT_EVENT};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Everything the engine talks to. All externally owned; the engine holds
/// shared handles only.
pub struct EngineDeps {
    pub store: Arc<dyn SnippetStore>,
    pub keymap: Arc<dyn KeymapSource>,
    pub simulator: Arc<dyn KeySimulator>,
    pub clipboard: Arc<dyn ClipboardAccess>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub notifier: Arc<dyn NotificationSurface>,
}

pub struct SnippetEngine {
    buffer: InputBuffer,
    should_match: bool,
    eval_timeout: Duration,
    store: Arc<dyn SnippetStore>,
    keymap: Arc<dyn KeymapSource>,
    simulator: Arc<dyn KeySimulator>,
    choreographer: Choreographer,
    telemetry: Arc<dyn TelemetrySink>,
    notifier: Arc<dyn NotificationSurface>,
}

impl SnippetEngine {
    /// Build the engine: normalizes the persisted snippets before any event
    /// can arrive and zeroes the simulator's inter-key delay.
    pub fn new(deps: EngineDeps) -> Result<Self> {
        deps.store.normalize()?;
        deps.simulator.set_inter_key_delay(0);

        let choreographer =
            Choreographer::new(Arc::clone(&deps.clipboard), Arc::clone(&deps.simulator));

        Ok(Self {
            buffer: InputBuffer::new(),
            should_match: true,
            eval_timeout: Duration::from_millis(EVAL_TIMEOUT_MS),
            store: deps.store,
            keymap: deps.keymap,
            simulator: deps.simulator,
            choreographer,
            telemetry: deps.telemetry,
            notifier: deps.notifier,
        })
    }

    /// Resume processing keystrokes.
    pub fn enable(&mut self) {
        self.should_match = true;
    }

    /// Stop processing keystrokes entirely; events arriving while disabled
    /// leave the buffer untouched.
    pub fn disable(&mut self) {
        self.should_match = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.should_match
    }

    /// What the engine currently believes the user typed recently.
    pub fn buffer_contents(&self) -> &str {
        self.buffer.as_str()
    }

    /// The insertion point may have moved; everything typed so far is
    /// useless for matching.
    pub fn handle_pointer_click(&mut self) {
        self.buffer.clear();
    }

    pub fn handle_key_event(&mut self, event: &KeyEvent) {
        if !self.should_match {
            return;
        }

        if self.should_reset(event) {
            self.buffer.clear();
            return;
        }

        if key_name(event.keycode) == Some(KEY_BACKSPACE) {
            self.buffer.shorten_by(1);
            return;
        }

        let Some(text) = event_to_text(event, &self.keymap.keymap()) else {
            return;
        };

        self.buffer.push_str(&text);
        self.buffer.trim_to(self.store.buffer_length());
        self.replace_if_match();
    }

    fn should_reset(&self, event: &KeyEvent) -> bool {
        match key_name(event.keycode) {
            Some(KEY_BACKSPACE) => event.alt_key,
            Some(KEY_TAB) => true,
            Some(name) => KEY_ARROWS.contains(&name),
            None => false,
        }
    }

    fn replace_if_match(&mut self) {
        let snippets = self.store.snippets();
        let Some(hit) = find_match(self.buffer.as_str(), &snippets) else {
            return;
        };
        let snippet = &snippets[hit.index];
        debug!(snippet_id = snippet.id, matched_len = hit.matched_len(), "trigger matched");

        // The typed trigger must be gone before any replacement text can
        // appear.
        if let Err(err) = self.simulator.backspace(hit.matched_len()) {
            warn!(%err, "failed to delete matched trigger");
            return;
        }

        let payload = replacement_payload(&self.store.user(), snippet);

        match &snippet.body {
            SnippetBody::Literal(value) => {
                if let Err(err) = self.choreographer.replace(value) {
                    warn!(%err, "replacement failed");
                }
                self.telemetry.report(REPLACEMENT_EVENT, payload);
            }
            SnippetBody::DynamicCode(code) => {
                // Fire and forget: the evaluation must not hold up the
                // event stream, so the whole resolve-and-replace tail runs
                // on its own thread.
                let matched = hit.matched.clone();
                let code = code.clone();
                let timeout = self.eval_timeout;
                let choreographer = self.choreographer.clone();
                let telemetry = Arc::clone(&self.telemetry);
                let notifier = Arc::clone(&self.notifier);
                thread::spawn(move || {
                    let text = match sandbox::evaluate(&matched, &code, timeout) {
                        Ok(text) => text,
                        Err(err) => fallback_replacement(notifier.as_ref(), &err),
                    };
                    if let Err(err) = choreographer.replace(&text) {
                        warn!(%err, "replacement failed");
                    }
                    telemetry.report(REPLACEMENT_EVENT, payload);
                });
            }
        }
    }
}

/// Substitute for a failed dynamic evaluation: notify and type nothing, or,
/// without a notification channel, type a short diagnostic instead.
fn fallback_replacement(notifier: &dyn NotificationSurface, err: &EvalError) -> String {
    if notifier.is_supported() {
        notifier.show(ERROR_TITLE, &err.to_string());
        String::new()
    } else {
        format!("{} {}", ERROR_TITLE, err)
    }
}

/// Engine wired to the real system: JSON store plus OS-backed keymap,
/// simulator and clipboard.
pub fn system_engine(store: Arc<dyn SnippetStore>) -> Result<SnippetEngine> {
    use crate::clipboard::SystemClipboard;
    use crate::keyboard::EnigoSimulator;
    use crate::keymap::UsKeymap;
    use crate::notify::LogNotifier;
    use crate::telemetry::LogTelemetry;

    SnippetEngine::new(EngineDeps {
        store,
        keymap: Arc::new(UsKeymap),
        simulator: Arc::new(EnigoSimulator::new()),
        clipboard: Arc::new(SystemClipboard),
        telemetry: Arc::new(LogTelemetry),
        notifier: Arc::new(LogNotifier),
    })
}
