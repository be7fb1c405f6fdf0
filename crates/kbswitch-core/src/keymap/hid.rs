//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page).
//!
//! This is the canonical key code space for shortcut chords. Host-specific
//! codes are translated to HID at the input boundary, so a descriptor written
//! on one machine means the same physical key everywhere.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10 (Keyboard/Keypad page 0x07).
//!
//! # Canonical names
//!
//! Every key carries the W3C `KeyboardEvent.code` string as its canonical
//! name (`KeyA`, `Digit1`, `ControlLeft`, ...). These names are the tokens of
//! the shortcut descriptor grammar, and they are case-sensitive.
//!
//! # The `Unknown` sentinel
//!
//! [`HidKeyCode::Unknown`] (value 0x0000) doubles as the "no ordinary key"
//! marker of a pure-modifier chord. It has no name and never appears in a
//! descriptor.

use serde::{Deserialize, Serialize};

/// Declares the key set once: variant, HID usage ID, and whether the key
/// produces a printable character. Names are the variant identifiers.
macro_rules! hid_keys {
    ($( $variant:ident = $code:literal, $printable:literal; )*) => {
        /// USB HID Usage ID for keyboard keys (page 0x07).
        ///
        /// The numeric value of each variant is its HID Usage ID on the
        /// keyboard/keypad page.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[repr(u16)]
        pub enum HidKeyCode {
            $( $variant = $code, )*
            /// Sentinel for keys with no HID mapping.
            Unknown = 0x0000,
        }

        impl HidKeyCode {
            /// Every named key, in ascending usage-ID order.
            pub const ALL: &'static [HidKeyCode] = &[ $( HidKeyCode::$variant, )* ];

            /// Canonical `KeyboardEvent.code` name, `None` for `Unknown`.
            pub fn name(self) -> Option<&'static str> {
                match self {
                    $( HidKeyCode::$variant => Some(stringify!($variant)), )*
                    HidKeyCode::Unknown => None,
                }
            }

            /// Returns `true` if pressing the key alone types a character.
            pub fn is_printable(self) -> bool {
                match self {
                    $( HidKeyCode::$variant => $printable, )*
                    HidKeyCode::Unknown => false,
                }
            }
        }
    };
}

hid_keys! {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04, true;
    KeyB = 0x05, true;
    KeyC = 0x06, true;
    KeyD = 0x07, true;
    KeyE = 0x08, true;
    KeyF = 0x09, true;
    KeyG = 0x0A, true;
    KeyH = 0x0B, true;
    KeyI = 0x0C, true;
    KeyJ = 0x0D, true;
    KeyK = 0x0E, true;
    KeyL = 0x0F, true;
    KeyM = 0x10, true;
    KeyN = 0x11, true;
    KeyO = 0x12, true;
    KeyP = 0x13, true;
    KeyQ = 0x14, true;
    KeyR = 0x15, true;
    KeyS = 0x16, true;
    KeyT = 0x17, true;
    KeyU = 0x18, true;
    KeyV = 0x19, true;
    KeyW = 0x1A, true;
    KeyX = 0x1B, true;
    KeyY = 0x1C, true;
    KeyZ = 0x1D, true;

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E, true;
    Digit2 = 0x1F, true;
    Digit3 = 0x20, true;
    Digit4 = 0x21, true;
    Digit5 = 0x22, true;
    Digit6 = 0x23, true;
    Digit7 = 0x24, true;
    Digit8 = 0x25, true;
    Digit9 = 0x26, true;
    Digit0 = 0x27, true;

    // Control and punctuation keys (HID 0x28–0x38)
    Enter = 0x28, false;
    Escape = 0x29, false;
    Backspace = 0x2A, false;
    Tab = 0x2B, false;
    Space = 0x2C, true;
    Minus = 0x2D, true;
    Equal = 0x2E, true;
    BracketLeft = 0x2F, true;
    BracketRight = 0x30, true;
    Backslash = 0x31, true;
    Semicolon = 0x33, true;
    Quote = 0x34, true;
    Backquote = 0x35, true;
    Comma = 0x36, true;
    Period = 0x37, true;
    Slash = 0x38, true;

    CapsLock = 0x39, false;

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A, false;
    F2 = 0x3B, false;
    F3 = 0x3C, false;
    F4 = 0x3D, false;
    F5 = 0x3E, false;
    F6 = 0x3F, false;
    F7 = 0x40, false;
    F8 = 0x41, false;
    F9 = 0x42, false;
    F10 = 0x43, false;
    F11 = 0x44, false;
    F12 = 0x45, false;

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46, false;
    ScrollLock = 0x47, false;
    Pause = 0x48, false;
    Insert = 0x49, false;
    Home = 0x4A, false;
    PageUp = 0x4B, false;
    Delete = 0x4C, false;
    End = 0x4D, false;
    PageDown = 0x4E, false;
    ArrowRight = 0x4F, false;
    ArrowLeft = 0x50, false;
    ArrowDown = 0x51, false;
    ArrowUp = 0x52, false;

    // Numpad (HID 0x53–0x63)
    NumLock = 0x53, false;
    NumpadDivide = 0x54, true;
    NumpadMultiply = 0x55, true;
    NumpadSubtract = 0x56, true;
    NumpadAdd = 0x57, true;
    NumpadEnter = 0x58, false;
    Numpad1 = 0x59, true;
    Numpad2 = 0x5A, true;
    Numpad3 = 0x5B, true;
    Numpad4 = 0x5C, true;
    Numpad5 = 0x5D, true;
    Numpad6 = 0x5E, true;
    Numpad7 = 0x5F, true;
    Numpad8 = 0x60, true;
    Numpad9 = 0x61, true;
    Numpad0 = 0x62, true;
    NumpadDecimal = 0x63, true;

    ContextMenu = 0x65, false;

    // Modifier keys (HID 0xE0–0xE7)
    ControlLeft = 0xE0, false;
    ShiftLeft = 0xE1, false;
    AltLeft = 0xE2, false;
    MetaLeft = 0xE3, false;
    ControlRight = 0xE4, false;
    ShiftRight = 0xE5, false;
    AltRight = 0xE6, false;
    MetaRight = 0xE7, false;
}

impl HidKeyCode {
    /// Returns the raw USB HID Usage ID value for this key code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` if this is a modifier key.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            HidKeyCode::ControlLeft
                | HidKeyCode::ControlRight
                | HidKeyCode::ShiftLeft
                | HidKeyCode::ShiftRight
                | HidKeyCode::AltLeft
                | HidKeyCode::AltRight
                | HidKeyCode::MetaLeft
                | HidKeyCode::MetaRight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_match_keyboard_event_code_strings() {
        assert_eq!(HidKeyCode::KeyA.name(), Some("KeyA"));
        assert_eq!(HidKeyCode::Digit0.name(), Some("Digit0"));
        assert_eq!(HidKeyCode::ControlLeft.name(), Some("ControlLeft"));
        assert_eq!(HidKeyCode::NumpadEnter.name(), Some("NumpadEnter"));
        assert_eq!(HidKeyCode::Unknown.name(), None);
    }

    #[test]
    fn test_exactly_eight_modifier_keys() {
        let modifiers: Vec<_> = HidKeyCode::ALL.iter().filter(|k| k.is_modifier()).collect();
        assert_eq!(modifiers.len(), 8);
        assert!(!HidKeyCode::Unknown.is_modifier());
    }

    #[test]
    fn test_printable_keys() {
        for key in [
            HidKeyCode::KeyQ,
            HidKeyCode::Digit7,
            HidKeyCode::Space,
            HidKeyCode::Slash,
            HidKeyCode::Numpad5,
            HidKeyCode::NumpadAdd,
        ] {
            assert!(key.is_printable(), "{key:?} should be printable");
        }
        for key in [
            HidKeyCode::Enter,
            HidKeyCode::Tab,
            HidKeyCode::F1,
            HidKeyCode::ArrowUp,
            HidKeyCode::ShiftLeft,
            HidKeyCode::Unknown,
        ] {
            assert!(!key.is_printable(), "{key:?} should not be printable");
        }
    }

    #[test]
    fn test_all_is_sorted_by_usage_id() {
        let codes: Vec<u16> = HidKeyCode::ALL.iter().map(|k| k.as_u16()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }
}
