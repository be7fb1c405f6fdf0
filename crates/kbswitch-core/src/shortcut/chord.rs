//! Chords: a set of held modifiers plus at most one ordinary key.

use std::fmt;
use std::sync::Arc;

use crate::keymap::modifiers::{ANY_SHIFT, AGGREGATE_MASK};
use crate::keymap::{Key, KeyTable, ModifierMask};

use super::codec::DescriptorError;
use super::command::{Command, NoopAction, ShortcutAction};

/// A key press as seen by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Canonical code of the key that went down.
    pub key_code: u16,
    /// Modifier bits held at the time of the press.
    pub modifier_state: ModifierMask,
    /// Whether the key that went down is itself a modifier.
    pub is_modifier_key: bool,
}

impl KeyEvent {
    /// Builds an event for a canonical key, deriving `is_modifier_key`.
    pub fn new(key_code: u16, modifier_state: ModifierMask) -> Self {
        Self {
            key_code,
            modifier_state,
            is_modifier_key: KeyTable::global().is_modifier_code(key_code),
        }
    }
}

/// The identity of a chord: required modifier bits and trigger key.
///
/// A `Trigger` always holds at least one modifier. When `key` is
/// [`Key::NONE`] it holds at least two, and fires when one of them is the key
/// being pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Trigger {
    mask: ModifierMask,
    key: Key,
}

impl Trigger {
    /// Validates a modifier mask and key into a trigger.
    ///
    /// Aggregate bits in `mask` are ignored.
    pub fn new(mask: ModifierMask, key: Key) -> Result<Self, DescriptorError> {
        let mask = mask & !AGGREGATE_MASK;
        if key.is_modifier() {
            return Err(DescriptorError::ModifierAsKey(key.name));
        }
        match mask.count_ones() {
            0 => Err(DescriptorError::NoModifiers),
            1 if key.is_none() => Err(DescriptorError::LoneModifier),
            1 if mask & ANY_SHIFT != 0 && key.is_printable() => {
                Err(DescriptorError::ShiftWithPrintable(key.name))
            }
            _ => Ok(Self { mask, key }),
        }
    }

    pub fn mask(&self) -> ModifierMask {
        self.mask
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Returns `true` if `event` fires this trigger.
    pub fn can_act(&self, event: &KeyEvent) -> bool {
        if event.modifier_state & self.mask != self.mask {
            return false;
        }
        if self.key.is_none() {
            event.is_modifier_key
        } else {
            event.key_code == self.key.code
        }
    }
}

/// Canonical descriptor: modifier names in ascending bit order, then the key.
impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = KeyTable::global().mask_to_canonical_names(self.mask);
        f.write_str(&names.join(","))?;
        if !self.key.is_none() {
            write!(f, ",{}", self.key.name)?;
        }
        Ok(())
    }
}

/// A trigger bound to an action.
///
/// Two chords are equal when their triggers are equal; the action is not part
/// of a chord's identity.
#[derive(Clone)]
pub struct Chord {
    trigger: Trigger,
    action: Arc<dyn ShortcutAction>,
}

impl Chord {
    pub fn new(trigger: Trigger, action: Arc<dyn ShortcutAction>) -> Self {
        Self { trigger, action }
    }

    /// A chord bound to [`NoopAction`], for looking up registry entries.
    pub fn unbound(trigger: Trigger) -> Self {
        Self::new(trigger, Arc::new(NoopAction))
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn command(&self) -> Option<Command> {
        self.action.command()
    }

    pub fn can_act(&self, event: &KeyEvent) -> bool {
        self.trigger.can_act(event)
    }

    pub fn act(&self) -> bool {
        self.action.act()
    }
}

impl PartialEq for Chord {
    fn eq(&self, other: &Self) -> bool {
        self.trigger == other.trigger
    }
}

impl Eq for Chord {}

impl fmt::Debug for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chord")
            .field("trigger", &self.trigger.to_string())
            .field("command", &self.command())
            .finish()
    }
}
