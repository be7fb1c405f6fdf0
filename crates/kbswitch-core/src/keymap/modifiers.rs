//! Modifier-state bit space.
//!
//! Hosts report the set of held modifiers as a single integer. Each
//! left/right modifier key owns exactly one bit. Some hosts also raise a
//! coarse "any ctrl / any shift / any alt" bit next to the side-specific one;
//! those three aggregate bits carry no information a chord can use, so they
//! are masked out before a state is turned into names.
//!
//! | bit | name           |
//! |-----|----------------|
//! | 0   | `ControlLeft`  |
//! | 1   | `ControlRight` |
//! | 2   | `ShiftLeft`    |
//! | 3   | `ShiftRight`   |
//! | 4   | `AltLeft`      |
//! | 5   | `AltRight`     |
//! | 6   | `MetaLeft`     |
//! | 7   | `MetaRight`    |
//! | 8   | aggregate Control |
//! | 9   | aggregate Shift   |
//! | 10  | aggregate Alt     |

use super::hid::HidKeyCode;

/// Bitmask of held modifiers.
pub type ModifierMask = u32;

pub const LEFT_CTRL: ModifierMask = 1 << 0;
pub const RIGHT_CTRL: ModifierMask = 1 << 1;
pub const LEFT_SHIFT: ModifierMask = 1 << 2;
pub const RIGHT_SHIFT: ModifierMask = 1 << 3;
pub const LEFT_ALT: ModifierMask = 1 << 4;
pub const RIGHT_ALT: ModifierMask = 1 << 5;
pub const LEFT_META: ModifierMask = 1 << 6;
pub const RIGHT_META: ModifierMask = 1 << 7;

pub const CTRL: ModifierMask = 1 << 8;
pub const SHIFT: ModifierMask = 1 << 9;
pub const ALT: ModifierMask = 1 << 10;

/// The coarse bits that are never part of a chord.
pub const AGGREGATE_MASK: ModifierMask = CTRL | SHIFT | ALT;

/// Either shift bit.
pub const ANY_SHIFT: ModifierMask = LEFT_SHIFT | RIGHT_SHIFT;

/// Fine-grained modifier bits in ascending bit order, with the key that owns
/// each one.
const MODIFIER_BITS: [(ModifierMask, HidKeyCode); 8] = [
    (LEFT_CTRL, HidKeyCode::ControlLeft),
    (RIGHT_CTRL, HidKeyCode::ControlRight),
    (LEFT_SHIFT, HidKeyCode::ShiftLeft),
    (RIGHT_SHIFT, HidKeyCode::ShiftRight),
    (LEFT_ALT, HidKeyCode::AltLeft),
    (RIGHT_ALT, HidKeyCode::AltRight),
    (LEFT_META, HidKeyCode::MetaLeft),
    (RIGHT_META, HidKeyCode::MetaRight),
];

/// Returns the bit owned by a modifier key, or `0` for ordinary keys.
pub fn mask_of(key: HidKeyCode) -> ModifierMask {
    MODIFIER_BITS
        .iter()
        .find(|(_, k)| *k == key)
        .map_or(0, |(bit, _)| *bit)
}

/// Lists the canonical names of the modifiers in `mask`, ascending bit order.
///
/// Aggregate bits and bits outside the table are ignored.
pub fn mask_to_names(mask: ModifierMask) -> Vec<&'static str> {
    let filtered = mask & !AGGREGATE_MASK;
    MODIFIER_BITS
        .iter()
        .filter(|(bit, _)| filtered & bit != 0)
        .filter_map(|(_, key)| key.name())
        .collect()
}
