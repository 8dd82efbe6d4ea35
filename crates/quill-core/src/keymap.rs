//! Keycode-to-character resolution.
//!
//! A raw key event carries a scancode plus modifier flags; resolution goes
//! scancode -> logical key name -> layout variants, picking exactly one
//! variant by modifier priority. A missing variant never falls back to a
//! lower-priority one.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A raw keydown as delivered by the OS hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub keycode: u16,
    pub shift_key: bool,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
}

impl KeyEvent {
    pub fn plain(keycode: u16) -> Self {
        Self {
            keycode,
            shift_key: false,
            alt_key: false,
            ctrl_key: false,
            meta_key: false,
        }
    }
}

/// The up-to-four printable values a physical key can produce.
///
/// An empty string means "no value for that modifier combination", matching
/// how OS keymap dumps report unassigned variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyVariants {
    pub value: String,
    pub with_shift: String,
    pub with_alt_gr: String,
    pub with_shift_alt_gr: String,
}

pub type Keymap = HashMap<String, KeyVariants>;

/// Source of the live keyboard layout, consulted once per key event so a
/// layout change is picked up without restarting the engine.
pub trait KeymapSource: Send + Sync {
    fn keymap(&self) -> Keymap;
}

pub const KEY_BACKSPACE: &str = "Backspace";
pub const KEY_TAB: &str = "Tab";
pub const KEY_ARROWS: [&str; 4] = ["ArrowUp", "ArrowDown", "ArrowLeft", "ArrowRight"];

/// Logical name for a scancode, or `None` for keys the engine never maps.
///
/// Codes follow the evdev numbering rdev reports on Linux.
pub fn key_name(keycode: u16) -> Option<&'static str> {
    let name = match keycode {
        2 => "Digit1",
        3 => "Digit2",
        4 => "Digit3",
        5 => "Digit4",
        6 => "Digit5",
        7 => "Digit6",
        8 => "Digit7",
        9 => "Digit8",
        10 => "Digit9",
        11 => "Digit0",
        12 => "Minus",
        13 => "Equal",
        14 => KEY_BACKSPACE,
        15 => KEY_TAB,
        16 => "KeyQ",
        17 => "KeyW",
        18 => "KeyE",
        19 => "KeyR",
        20 => "KeyT",
        21 => "KeyY",
        22 => "KeyU",
        23 => "KeyI",
        24 => "KeyO",
        25 => "KeyP",
        26 => "BracketLeft",
        27 => "BracketRight",
        28 => "Enter",
        30 => "KeyA",
        31 => "KeyS",
        32 => "KeyD",
        33 => "KeyF",
        34 => "KeyG",
        35 => "KeyH",
        36 => "KeyJ",
        37 => "KeyK",
        38 => "KeyL",
        39 => "Semicolon",
        40 => "Quote",
        41 => "Backquote",
        43 => "Backslash",
        44 => "KeyZ",
        45 => "KeyX",
        46 => "KeyC",
        47 => "KeyV",
        48 => "KeyB",
        49 => "KeyN",
        50 => "KeyM",
        51 => "Comma",
        52 => "Period",
        53 => "Slash",
        57 => "Space",
        103 => "ArrowUp",
        105 => "ArrowLeft",
        106 => "ArrowRight",
        108 => "ArrowDown",
        _ => return None,
    };
    Some(name)
}

/// Resolve a key event to the text it types, or `None` when the combination
/// is not printable.
///
/// Priority, first match wins: control combinations are never printable;
/// then shift+altgr, shift, altgr, base. The selected variant being empty or
/// the key being absent from the map yields `None` with no fallback.
pub fn event_to_text(event: &KeyEvent, keymap: &Keymap) -> Option<String> {
    if event.ctrl_key || event.meta_key {
        return None;
    }

    let name = key_name(event.keycode)?;
    let variants = keymap.get(name)?;

    let value = if event.shift_key && event.alt_key {
        &variants.with_shift_alt_gr
    } else if event.shift_key {
        &variants.with_shift
    } else if event.alt_key {
        &variants.with_alt_gr
    } else {
        &variants.value
    };

    if value.is_empty() {
        None
    } else {
        Some(value.clone())
    }
}

/// Built-in US layout, standing in for an OS keymap query.
///
/// AltGr variants are unassigned, as on the standard US layout.
pub struct UsKeymap;

impl KeymapSource for UsKeymap {
    fn keymap(&self) -> Keymap {
        us_keymap().clone()
    }
}

fn us_keymap() -> &'static Keymap {
    static MAP: OnceLock<Keymap> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = Keymap::new();

        let mut insert = |name: &str, base: &str, shifted: &str| {
            map.insert(
                name.to_string(),
                KeyVariants {
                    value: base.to_string(),
                    with_shift: shifted.to_string(),
                    ..KeyVariants::default()
                },
            );
        };

        for c in 'a'..='z' {
            let name = format!("Key{}", c.to_ascii_uppercase());
            let upper = c.to_ascii_uppercase().to_string();
            insert(&name, &c.to_string(), &upper);
        }

        let digits = [
            ("Digit1", "1", "!"),
            ("Digit2", "2", "@"),
            ("Digit3", "3", "#"),
            ("Digit4", "4", "$"),
            ("Digit5", "5", "%"),
            ("Digit6", "6", "^"),
            ("Digit7", "7", "&"),
            ("Digit8", "8", "*"),
            ("Digit9", "9", "("),
            ("Digit0", "0", ")"),
        ];
        for (name, base, shifted) in digits {
            insert(name, base, shifted);
        }

        let punctuation = [
            ("Minus", "-", "_"),
            ("Equal", "=", "+"),
            ("BracketLeft", "[", "{"),
            ("BracketRight", "]", "}"),
            ("Semicolon", ";", ":"),
            ("Quote", "'", "\""),
            ("Backquote", "`", "~"),
            ("Backslash", "\\", "|"),
            ("Comma", ",", "<"),
            ("Period", ".", ">"),
            ("Slash", "/", "?"),
            ("Space", " ", " "),
        ];
        for (name, base, shifted) in punctuation {
            insert(name, base, shifted);
        }

        map
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(keycode: u16, shift: bool, alt: bool, ctrl: bool, meta: bool) -> KeyEvent {
        KeyEvent {
            keycode,
            shift_key: shift,
            alt_key: alt,
            ctrl_key: ctrl,
            meta_key: meta,
        }
    }

    #[test]
    fn base_and_shift_variants_resolve() {
        let map = UsKeymap.keymap();
        // KeyB
        assert_eq!(event_to_text(&KeyEvent::plain(48), &map), Some("b".into()));
        assert_eq!(
            event_to_text(&event(48, true, false, false, false), &map),
            Some("B".into())
        );
    }

    #[test]
    fn control_and_meta_are_never_printable() {
        let map = UsKeymap.keymap();
        assert_eq!(event_to_text(&event(48, false, false, true, false), &map), None);
        assert_eq!(event_to_text(&event(48, false, false, false, true), &map), None);
        assert_eq!(event_to_text(&event(48, true, true, true, false), &map), None);
    }

    #[test]
    fn missing_variant_has_no_fallback() {
        let map = UsKeymap.keymap();
        // AltGr is unassigned on the US layout; the base value must not leak.
        assert_eq!(event_to_text(&event(48, false, true, false, false), &map), None);
        assert_eq!(event_to_text(&event(48, true, true, false, false), &map), None);
    }

    #[test]
    fn shift_alt_gr_takes_priority_when_present() {
        let mut map = Keymap::new();
        map.insert(
            "KeyE".into(),
            KeyVariants {
                value: "e".into(),
                with_shift: "E".into(),
                with_alt_gr: "€".into(),
                with_shift_alt_gr: "¢".into(),
            },
        );
        assert_eq!(
            event_to_text(&event(18, true, true, false, false), &map),
            Some("¢".into())
        );
        assert_eq!(
            event_to_text(&event(18, false, true, false, false), &map),
            Some("€".into())
        );
    }

    #[test]
    fn unknown_keycode_is_not_printable() {
        let map = UsKeymap.keymap();
        assert_eq!(event_to_text(&KeyEvent::plain(999), &map), None);
        // Backspace has no printable value either
        assert_eq!(event_to_text(&KeyEvent::plain(14), &map), None);
    }
}
