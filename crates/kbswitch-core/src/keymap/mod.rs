//! Key code tables for shortcut chords.
//!
//! The canonical representation is USB HID Usage IDs (page 0x07, Keyboard/Keypad).
//! Host-specific codes are translated to HID at the input boundary.
//!
//! [`KeyTable`] is the lookup every other module goes through: canonical name
//! to key, code to key, and modifier mask to names. It is built once from the
//! static tables in [`hid`] and [`modifiers`] and shared process-wide.

pub mod hid;
pub mod modifiers;
pub mod windows_vk;

use std::collections::HashMap;
use std::sync::OnceLock;

pub use hid::HidKeyCode;
pub use modifiers::ModifierMask;

/// Code of the "no ordinary key" sentinel.
pub const NONE_CODE: u16 = 0;

/// What role a key plays in a chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyKind {
    /// A key that is the trigger of a chord.
    Ordinary { printable: bool },
    /// A modifier key owning one bit of the modifier state.
    Modifier { mask: ModifierMask },
}

/// A named key from the canonical key space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: u16,
    pub name: &'static str,
    pub kind: KeyKind,
}

impl Key {
    /// The sentinel used by pure-modifier chords.
    pub const NONE: Key = Key {
        code: NONE_CODE,
        name: "",
        kind: KeyKind::Ordinary { printable: false },
    };

    fn from_hid(hid: HidKeyCode, name: &'static str) -> Self {
        let kind = if hid.is_modifier() {
            KeyKind::Modifier {
                mask: modifiers::mask_of(hid),
            }
        } else {
            KeyKind::Ordinary {
                printable: hid.is_printable(),
            }
        };
        Self {
            code: hid.as_u16(),
            name,
            kind,
        }
    }

    pub fn is_none(&self) -> bool {
        self.code == NONE_CODE
    }

    pub fn is_modifier(&self) -> bool {
        matches!(self.kind, KeyKind::Modifier { .. })
    }

    /// Modifier bit of this key, `0` for ordinary keys.
    pub fn mask(&self) -> ModifierMask {
        match self.kind {
            KeyKind::Modifier { mask } => mask,
            KeyKind::Ordinary { .. } => 0,
        }
    }

    pub fn is_printable(&self) -> bool {
        matches!(self.kind, KeyKind::Ordinary { printable: true })
    }
}

/// Name and code lookups over the canonical key space.
#[derive(Debug)]
pub struct KeyTable {
    by_name: HashMap<&'static str, Key>,
    by_code: HashMap<u16, Key>,
}

impl KeyTable {
    /// Enumerates every named HID key and indexes it by name and by code.
    pub fn build() -> Self {
        let mut by_name = HashMap::with_capacity(HidKeyCode::ALL.len());
        let mut by_code = HashMap::with_capacity(HidKeyCode::ALL.len());
        for &hid in HidKeyCode::ALL {
            if let Some(name) = hid.name() {
                let key = Key::from_hid(hid, name);
                by_name.insert(name, key);
                by_code.insert(key.code, key);
            }
        }
        Self { by_name, by_code }
    }

    /// Process-wide table, built on first use.
    pub fn global() -> &'static KeyTable {
        static TABLE: OnceLock<KeyTable> = OnceLock::new();
        TABLE.get_or_init(KeyTable::build)
    }

    /// Looks up a key by its case-sensitive canonical name.
    pub fn by_name(&self, name: &str) -> Option<Key> {
        self.by_name.get(name).copied()
    }

    /// Looks up a key by its canonical code. [`NONE_CODE`] is never found.
    pub fn by_code(&self, code: u16) -> Option<Key> {
        self.by_code.get(&code).copied()
    }

    pub fn is_modifier_code(&self, code: u16) -> bool {
        self.by_code(code).is_some_and(|k| k.is_modifier())
    }

    /// Canonical modifier names for `mask`, ascending bit order, aggregate
    /// bits excluded.
    pub fn mask_to_canonical_names(&self, mask: ModifierMask) -> Vec<&'static str> {
        modifiers::mask_to_names(mask)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }
}
