//! # kbswitch-core
//!
//! Shared library for KbSwitch containing the canonical key tables, the
//! shortcut engine, and the layout-switch state machine.
//!
//! It has zero dependencies on OS APIs, UI frameworks, async runtimes, or
//! files. The service crate wires it to real input and configuration.
//!
//! # Architecture overview (for beginners)
//!
//! KbSwitch lets you bind key chords such as `ControlLeft,Space` to commands
//! like "next keyboard layout". It keeps track of which layout is current,
//! either for the whole desktop or separately for each application.
//!
//! - **`keymap`** – The canonical key space (USB HID usage IDs, named after
//!   `KeyboardEvent.code`), the modifier bit table, and host key-code
//!   translation.
//!
//! - **`shortcut`** – Chords, their comma-separated text form, and the
//!   ordered registry that dispatches key presses to bound actions.
//!
//! - **`domain`** – The layout-switch state machine: which layout is current
//!   and how that survives cycling, mode changes and edits of the layout list.

pub mod domain;
pub mod keymap;
pub mod shortcut;

// Re-export the most-used types at the crate root so callers can write
// `kbswitch_core::ShortcutRegistry` instead of the full module path.
pub use domain::layout_switch::{LayoutSwitcher, SwitchMode};
pub use keymap::hid::HidKeyCode;
pub use keymap::{Key, KeyKind, KeyTable, ModifierMask, NONE_CODE};
pub use shortcut::{
    Chord, Command, CommandError, DescriptorError, KeyEvent, NoopAction, ShortcutAction,
    ShortcutRegistry, Trigger,
};
