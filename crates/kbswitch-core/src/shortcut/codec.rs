//! Textual shortcut descriptors.
//!
//! Grammar:
//! ```text
//! descriptor := "" | token ("," token)*
//! token      := canonical key name (case-sensitive)
//! ```
//!
//! A valid descriptor names at least one modifier and at most one ordinary
//! key. A single modifier needs an ordinary key, and that key must not be a
//! printable one when the modifier is a shift. Tokens that name no key are
//! skipped.
//!
//! The engine boundary never fails: [`parse`] logs why a descriptor was
//! rejected and returns `None`, which callers treat as "unbound".
//! [`parse_trigger`] exposes the reason for callers that want it.

use thiserror::Error;
use tracing::debug;

use crate::keymap::{Key, KeyTable, ModifierMask};

use super::chord::Trigger;

/// Why a descriptor does not describe a usable chord.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("descriptor is empty")]
    Empty,

    #[error("more than one ordinary key: {0} and {1}")]
    MultipleKeys(&'static str, &'static str),

    #[error("no modifier keys")]
    NoModifiers,

    #[error("a single modifier needs an ordinary key")]
    LoneModifier,

    #[error("shift with printable key {0} is ordinary typing")]
    ShiftWithPrintable(&'static str),

    #[error("{0} is a modifier and cannot be the trigger key")]
    ModifierAsKey(&'static str),
}

/// Parses a descriptor, reporting why it was rejected.
pub fn parse_trigger(descriptor: &str) -> Result<Trigger, DescriptorError> {
    if descriptor.is_empty() {
        return Err(DescriptorError::Empty);
    }

    let table = KeyTable::global();
    let mut mask: ModifierMask = 0;
    let mut ordinary: Option<Key> = None;

    for token in descriptor.split(',') {
        let Some(key) = table.by_name(token) else {
            debug!(token, descriptor, "skipping unknown key name");
            continue;
        };
        if key.is_modifier() {
            mask |= key.mask();
            continue;
        }
        match ordinary {
            None => ordinary = Some(key),
            Some(first) if first == key => {}
            Some(first) => return Err(DescriptorError::MultipleKeys(first.name, key.name)),
        }
    }

    Trigger::new(mask, ordinary.unwrap_or(Key::NONE))
}

/// Parses a descriptor; `None` means the descriptor is unbound.
pub fn parse(descriptor: &str) -> Option<Trigger> {
    match parse_trigger(descriptor) {
        Ok(trigger) => Some(trigger),
        Err(DescriptorError::Empty) => None,
        Err(error) => {
            debug!(descriptor, %error, "rejected shortcut descriptor");
            None
        }
    }
}

/// Canonical descriptor of a trigger; an unbound slot serializes as `""`.
pub fn serialize(trigger: Option<&Trigger>) -> String {
    trigger.map(Trigger::to_string).unwrap_or_default()
}

/// Turns a captured key press into a canonical descriptor.
///
/// The pressed key contributes its name only when it is a known, non-modifier
/// key. The result goes through [`parse`], so an unusable press yields `""`.
pub fn descriptor_from_key_press(key_code: u16, modifier_state: ModifierMask) -> String {
    let table = KeyTable::global();
    let mut tokens = table.mask_to_canonical_names(modifier_state);
    if let Some(key) = table.by_code(key_code).filter(|k| !k.is_modifier()) {
        tokens.push(key.name);
    }
    serialize(parse(&tokens.join(",")).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::modifiers::{
        ALT, LEFT_ALT, LEFT_CTRL, LEFT_META, LEFT_SHIFT, RIGHT_ALT, RIGHT_SHIFT,
    };
    use crate::keymap::HidKeyCode;

    #[test]
    fn test_parse_modifier_and_key() {
        let trigger = parse("ControlLeft,Space").unwrap();

        assert_eq!(trigger.mask(), LEFT_CTRL);
        assert_eq!(trigger.key().name, "Space");
    }

    #[test]
    fn test_empty_descriptor_is_unbound_not_an_error() {
        assert_eq!(parse_trigger(""), Err(DescriptorError::Empty));
        assert_eq!(parse(""), None);
    }

    #[test]
    fn test_rejection_set() {
        assert_eq!(parse_trigger("KeyA"), Err(DescriptorError::NoModifiers));
        assert_eq!(
            parse_trigger("ControlLeft,KeyA,KeyB"),
            Err(DescriptorError::MultipleKeys("KeyA", "KeyB"))
        );
        assert_eq!(
            parse_trigger("AltLeft"),
            Err(DescriptorError::LoneModifier)
        );
        assert_eq!(
            parse_trigger("ShiftLeft,Digit3"),
            Err(DescriptorError::ShiftWithPrintable("Digit3"))
        );
    }

    #[test]
    fn test_unknown_tokens_are_skipped() {
        let trigger = parse("ControlLeft,Hyper,KeyZ").unwrap();

        assert_eq!(trigger.to_string(), "ControlLeft,KeyZ");
    }

    #[test]
    fn test_only_unknown_tokens_is_rejected() {
        assert_eq!(parse_trigger("Foo,Bar"), Err(DescriptorError::NoModifiers));
    }

    #[test]
    fn test_repeated_tokens_are_deduplicated() {
        assert_eq!(
            parse("ControlLeft,ControlLeft,KeyA,KeyA").unwrap().to_string(),
            "ControlLeft,KeyA"
        );
        assert_eq!(
            parse_trigger("ShiftLeft,ShiftLeft,KeyA"),
            Err(DescriptorError::ShiftWithPrintable("KeyA"))
        );
    }

    #[test]
    fn test_two_modifiers_without_a_key() {
        let trigger = parse("AltLeft,ShiftLeft").unwrap();

        assert_eq!(trigger.mask(), LEFT_SHIFT | LEFT_ALT);
        assert!(trigger.key().is_none());
        assert_eq!(serialize(Some(&trigger)), "ShiftLeft,AltLeft");
    }

    #[test]
    fn test_serialize_orders_modifiers_by_bit() {
        let trigger = parse("MetaLeft,KeyL,ControlLeft").unwrap();

        assert_eq!(serialize(Some(&trigger)), "ControlLeft,MetaLeft,KeyL");
    }

    #[test]
    fn test_serialize_unbound_is_empty() {
        assert_eq!(serialize(None), "");
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(parse("controlleft,space"), None);
    }

    #[test]
    fn test_from_key_press_builds_a_canonical_descriptor() {
        let descriptor =
            descriptor_from_key_press(HidKeyCode::KeyT.as_u16(), LEFT_META | LEFT_CTRL);

        assert_eq!(descriptor, "ControlLeft,MetaLeft,KeyT");
    }

    #[test]
    fn test_from_key_press_ignores_aggregate_bits() {
        let descriptor = descriptor_from_key_press(HidKeyCode::Tab.as_u16(), RIGHT_ALT | ALT);

        assert_eq!(descriptor, "AltRight,Tab");
    }

    #[test]
    fn test_from_key_press_rejects_unusable_presses() {
        // Shift + letter is typing.
        assert_eq!(
            descriptor_from_key_press(HidKeyCode::KeyA.as_u16(), RIGHT_SHIFT),
            ""
        );
        // A modifier press contributes no key, and one modifier alone is not a chord.
        assert_eq!(
            descriptor_from_key_press(HidKeyCode::AltLeft.as_u16(), LEFT_ALT),
            ""
        );
        // No modifiers held.
        assert_eq!(descriptor_from_key_press(HidKeyCode::F1.as_u16(), 0), "");
    }
}
