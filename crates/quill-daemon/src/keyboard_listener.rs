//! Global keyboard/mouse hook feeding the snippet engine.
//!
//! rdev delivers bare key presses with no modifier flags, so the listener
//! tracks modifier press/release state itself and stamps every synthesized
//! event with it before handing it to the engine.

use quill_core::{KeyEvent, SnippetEngine};
use rdev::{Event, EventType, Key as RdevKey};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{error, warn};

#[derive(Default, Clone, Copy)]
struct ModifierState {
    shift: bool,
    alt: bool,
    ctrl: bool,
    meta: bool,
}

impl ModifierState {
    /// Returns true when `key` is a modifier whose state was updated.
    fn update(&mut self, key: RdevKey, pressed: bool) -> bool {
        match key {
            RdevKey::ShiftLeft | RdevKey::ShiftRight => self.shift = pressed,
            RdevKey::Alt | RdevKey::AltGr => self.alt = pressed,
            RdevKey::ControlLeft | RdevKey::ControlRight => self.ctrl = pressed,
            RdevKey::MetaLeft | RdevKey::MetaRight => self.meta = pressed,
            _ => return false,
        }
        true
    }
}

/// evdev-style scancode for an rdev key, matching the engine's key tables.
fn rdev_key_to_keycode(key: RdevKey) -> Option<u16> {
    let keycode = match key {
        RdevKey::Num1 => 2,
        RdevKey::Num2 => 3,
        RdevKey::Num3 => 4,
        RdevKey::Num4 => 5,
        RdevKey::Num5 => 6,
        RdevKey::Num6 => 7,
        RdevKey::Num7 => 8,
        RdevKey::Num8 => 9,
        RdevKey::Num9 => 10,
        RdevKey::Num0 => 11,
        RdevKey::Minus => 12,
        RdevKey::Equal => 13,
        RdevKey::Backspace => 14,
        RdevKey::Tab => 15,
        RdevKey::KeyQ => 16,
        RdevKey::KeyW => 17,
        RdevKey::KeyE => 18,
        RdevKey::KeyR => 19,
        RdevKey::KeyT => 20,
        RdevKey::KeyY => 21,
        RdevKey::KeyU => 22,
        RdevKey::KeyI => 23,
        RdevKey::KeyO => 24,
        RdevKey::KeyP => 25,
        RdevKey::LeftBracket => 26,
        RdevKey::RightBracket => 27,
        RdevKey::Return => 28,
        RdevKey::KeyA => 30,
        RdevKey::KeyS => 31,
        RdevKey::KeyD => 32,
        RdevKey::KeyF => 33,
        RdevKey::KeyG => 34,
        RdevKey::KeyH => 35,
        RdevKey::KeyJ => 36,
        RdevKey::KeyK => 37,
        RdevKey::KeyL => 38,
        RdevKey::SemiColon => 39,
        RdevKey::Quote => 40,
        RdevKey::BackQuote => 41,
        RdevKey::BackSlash => 43,
        RdevKey::KeyZ => 44,
        RdevKey::KeyX => 45,
        RdevKey::KeyC => 46,
        RdevKey::KeyV => 47,
        RdevKey::KeyB => 48,
        RdevKey::KeyN => 49,
        RdevKey::KeyM => 50,
        RdevKey::Comma => 51,
        RdevKey::Dot => 52,
        RdevKey::Slash => 53,
        RdevKey::Space => 57,
        RdevKey::UpArrow => 103,
        RdevKey::LeftArrow => 105,
        RdevKey::RightArrow => 106,
        RdevKey::DownArrow => 108,
        _ => return None,
    };
    Some(keycode)
}

/// Hook the global input stream and feed the engine until `running` drops.
///
/// rdev's listen call blocks its thread for the process lifetime and cannot
/// be unhooked; once `running` is false the callback goes inert and the
/// thread dies with the process.
pub fn start_keyboard_listener(
    engine: Arc<Mutex<SnippetEngine>>,
    running: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let modifiers = Arc::new(Mutex::new(ModifierState::default()));
        let running_cb = Arc::clone(&running);

        let callback = move |event: Event| {
            if !running_cb.load(Ordering::Relaxed) {
                return;
            }

            match event.event_type {
                EventType::KeyPress(key) => {
                    let mut mods = modifiers.lock().unwrap();
                    if mods.update(key, true) {
                        return;
                    }
                    let state = *mods;
                    drop(mods);

                    let Some(keycode) = rdev_key_to_keycode(key) else {
                        return;
                    };
                    let key_event = KeyEvent {
                        keycode,
                        shift_key: state.shift,
                        alt_key: state.alt,
                        ctrl_key: state.ctrl,
                        meta_key: state.meta,
                    };
                    engine.lock().unwrap().handle_key_event(&key_event);
                }
                EventType::KeyRelease(key) => {
                    modifiers.lock().unwrap().update(key, false);
                }
                EventType::ButtonPress(_) => {
                    engine.lock().unwrap().handle_pointer_click();
                }
                _ => {}
            }
        };

        // The hook occasionally fails to attach right after login; retry a
        // few times before giving up.
        let mut retry_count = 0;
        let max_retries = 5;

        while running.load(Ordering::Relaxed) && retry_count < max_retries {
            match rdev::listen(callback.clone()) {
                Ok(_) => break,
                Err(err) => {
                    retry_count += 1;
                    warn!(
                        ?err,
                        retry_count, max_retries, "keyboard listener failed, retrying"
                    );
                    thread::sleep(Duration::from_secs(1));
                }
            }
        }

        if retry_count >= max_retries {
            error!(max_retries, "failed to start keyboard listener");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_state_tracks_press_and_release() {
        let mut mods = ModifierState::default();
        assert!(mods.update(RdevKey::ShiftLeft, true));
        assert!(mods.shift);
        assert!(mods.update(RdevKey::AltGr, true));
        assert!(mods.alt);
        assert!(mods.update(RdevKey::ShiftLeft, false));
        assert!(!mods.shift);
        assert!(!mods.update(RdevKey::KeyA, true));
    }

    #[test]
    fn keycodes_line_up_with_the_engine_tables() {
        use quill_core::keymap::key_name;
        for (key, expected) in [
            (RdevKey::KeyB, "KeyB"),
            (RdevKey::Backspace, "Backspace"),
            (RdevKey::Tab, "Tab"),
            (RdevKey::UpArrow, "ArrowUp"),
            (RdevKey::DownArrow, "ArrowDown"),
            (RdevKey::Num1, "Digit1"),
            (RdevKey::Space, "Space"),
        ] {
            let keycode = rdev_key_to_keycode(key).unwrap();
            assert_eq!(key_name(keycode), Some(expected));
        }
    }

    #[test]
    fn unmapped_keys_produce_no_keycode() {
        assert_eq!(rdev_key_to_keycode(RdevKey::Escape), None);
        assert_eq!(rdev_key_to_keycode(RdevKey::F5), None);
    }
}
