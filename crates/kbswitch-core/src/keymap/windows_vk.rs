//! Windows Virtual Key (VK) code translation for the input adapter.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! Low-level keyboard hooks report VK codes, and they report the held
//! modifiers only implicitly, as a stream of modifier key-downs and key-ups.
//! This module answers both questions the adapter asks for each VK:
//! which canonical key is it ([`vk_to_hid`]), and which modifier-state bit
//! does it own ([`vk_modifier_bit`]).
//!
//! The generic `VK_SHIFT`, `VK_CONTROL` and `VK_MENU` codes are reported by
//! some hook paths instead of the side-specific ones. They have no HID key of
//! their own and map to the aggregate bits.

use super::hid::HidKeyCode;
use super::modifiers::{self, ModifierMask};

/// Translates a Windows Virtual Key code to a HID Usage ID.
///
/// Returns [`HidKeyCode::Unknown`] for VK codes with no keyboard HID
/// equivalent (mouse button VKs, browser keys, the generic modifier VKs).
pub fn vk_to_hid(vk: u8) -> HidKeyCode {
    VK_TO_HID_TABLE[vk as usize]
}

/// Returns the modifier-state bit a VK code toggles, or `0` for ordinary keys.
pub fn vk_modifier_bit(vk: u8) -> ModifierMask {
    match vk {
        VK_SHIFT => modifiers::SHIFT,
        VK_CONTROL => modifiers::CTRL,
        VK_MENU => modifiers::ALT,
        _ => modifiers::mask_of(vk_to_hid(vk)),
    }
}

const VK_SHIFT: u8 = 0x10;
const VK_CONTROL: u8 = 0x11;
const VK_MENU: u8 = 0x12;

const VK_PAIRS: &[(u8, HidKeyCode)] = {
    use HidKeyCode::*;
    &[
        // VK_A=0x41 … VK_Z=0x5A
        (0x41, KeyA), (0x42, KeyB), (0x43, KeyC), (0x44, KeyD), (0x45, KeyE),
        (0x46, KeyF), (0x47, KeyG), (0x48, KeyH), (0x49, KeyI), (0x4A, KeyJ),
        (0x4B, KeyK), (0x4C, KeyL), (0x4D, KeyM), (0x4E, KeyN), (0x4F, KeyO),
        (0x50, KeyP), (0x51, KeyQ), (0x52, KeyR), (0x53, KeyS), (0x54, KeyT),
        (0x55, KeyU), (0x56, KeyV), (0x57, KeyW), (0x58, KeyX), (0x59, KeyY),
        (0x5A, KeyZ),
        // VK_0=0x30 … VK_9=0x39
        (0x30, Digit0), (0x31, Digit1), (0x32, Digit2), (0x33, Digit3), (0x34, Digit4),
        (0x35, Digit5), (0x36, Digit6), (0x37, Digit7), (0x38, Digit8), (0x39, Digit9),
        (0x0D, Enter),        // VK_RETURN
        (0x1B, Escape),       // VK_ESCAPE
        (0x08, Backspace),    // VK_BACK
        (0x09, Tab),          // VK_TAB
        (0x20, Space),        // VK_SPACE
        (0x14, CapsLock),     // VK_CAPITAL
        (0x91, ScrollLock),   // VK_SCROLL
        (0x13, Pause),        // VK_PAUSE
        (0x2D, Insert),       // VK_INSERT
        (0x24, Home),         // VK_HOME
        (0x21, PageUp),       // VK_PRIOR
        (0x2E, Delete),       // VK_DELETE
        (0x23, End),          // VK_END
        (0x22, PageDown),     // VK_NEXT
        (0x2C, PrintScreen),  // VK_SNAPSHOT
        (0x5D, ContextMenu),  // VK_APPS
        (0x25, ArrowLeft), (0x26, ArrowUp), (0x27, ArrowRight), (0x28, ArrowDown),
        // VK_F1=0x70 … VK_F12=0x7B
        (0x70, F1), (0x71, F2), (0x72, F3), (0x73, F4), (0x74, F5), (0x75, F6),
        (0x76, F7), (0x77, F8), (0x78, F9), (0x79, F10), (0x7A, F11), (0x7B, F12),
        // VK_NUMPAD0=0x60 … VK_NUMPAD9=0x69
        (0x60, Numpad0), (0x61, Numpad1), (0x62, Numpad2), (0x63, Numpad3),
        (0x64, Numpad4), (0x65, Numpad5), (0x66, Numpad6), (0x67, Numpad7),
        (0x68, Numpad8), (0x69, Numpad9),
        (0x6A, NumpadMultiply), (0x6B, NumpadAdd), (0x6D, NumpadSubtract),
        (0x6E, NumpadDecimal), (0x6F, NumpadDivide), (0x90, NumLock),
        (0xBD, Minus),        // VK_OEM_MINUS
        (0xBB, Equal),        // VK_OEM_PLUS
        (0xDB, BracketLeft),  // VK_OEM_4
        (0xDD, BracketRight), // VK_OEM_6
        (0xDC, Backslash),    // VK_OEM_5
        (0xBA, Semicolon),    // VK_OEM_1
        (0xDE, Quote),        // VK_OEM_7
        (0xC0, Backquote),    // VK_OEM_3
        (0xBC, Comma),        // VK_OEM_COMMA
        (0xBE, Period),       // VK_OEM_PERIOD
        (0xBF, Slash),        // VK_OEM_2
        (0xA2, ControlLeft),  // VK_LCONTROL
        (0xA3, ControlRight), // VK_RCONTROL
        (0xA0, ShiftLeft),    // VK_LSHIFT
        (0xA1, ShiftRight),   // VK_RSHIFT
        (0xA4, AltLeft),      // VK_LMENU
        (0xA5, AltRight),     // VK_RMENU
        (0x5B, MetaLeft),     // VK_LWIN
        (0x5C, MetaRight),    // VK_RWIN
    ]
};

/// VK → HID lookup indexed by VK code (0x00–0xFF).
const VK_TO_HID_TABLE: [HidKeyCode; 256] = {
    let mut table = [HidKeyCode::Unknown; 256];
    let mut i = 0;
    while i < VK_PAIRS.len() {
        let (vk, hid) = VK_PAIRS[i];
        table[vk as usize] = hid;
        i += 1;
    }
    table
};
