//! ShortcutBindings: keeps the registry in step with the configured slots.
//!
//! Each configurable command has one slot holding a descriptor string. The
//! bindings remember the descriptor of every slot, so that editing a slot can
//! find and rebind the chord the previous descriptor registered.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kbswitch_core::keymap::modifiers::AGGREGATE_MASK;
use kbswitch_core::shortcut::codec;
use kbswitch_core::{Chord, Command, KeyEvent, ShortcutRegistry, Trigger};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::resolve_command::CommandResolver;
use crate::infrastructure::storage::config::ShortcutsConfig;

const CYCLE_LAYOUT_SLOT: &str = "cycle_layout";
const TOGGLE_INDICATOR_SLOT: &str = "toggle_indicator";
const JUMP_TO_LAYOUT_SLOT: &str = "jump_to_layout";

/// A configurable shortcut slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutSlot {
    CycleLayout,
    ToggleIndicator,
    /// Jump to the enabled layout at this 1-based position.
    JumpToLayout(usize),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown shortcut slot {0:?} (expected cycle_layout, toggle_indicator or jump_to_layout.<n>)")]
pub struct UnknownSlot(pub String);

impl ShortcutSlot {
    /// The command a chord in this slot runs.
    pub fn command(self) -> Command {
        match self {
            ShortcutSlot::CycleLayout => Command::CycleLayout,
            ShortcutSlot::ToggleIndicator => Command::ToggleIndicator,
            ShortcutSlot::JumpToLayout(n) => Command::JumpToLayout(n.saturating_sub(1)),
        }
    }
}

impl fmt::Display for ShortcutSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutSlot::CycleLayout => f.write_str(CYCLE_LAYOUT_SLOT),
            ShortcutSlot::ToggleIndicator => f.write_str(TOGGLE_INDICATOR_SLOT),
            ShortcutSlot::JumpToLayout(n) => write!(f, "{JUMP_TO_LAYOUT_SLOT}.{n}"),
        }
    }
}

impl FromStr for ShortcutSlot {
    type Err = UnknownSlot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            CYCLE_LAYOUT_SLOT => Ok(ShortcutSlot::CycleLayout),
            TOGGLE_INDICATOR_SLOT => Ok(ShortcutSlot::ToggleIndicator),
            _ => s
                .strip_prefix(JUMP_TO_LAYOUT_SLOT)
                .and_then(|rest| rest.strip_prefix('.'))
                .and_then(|n| n.parse::<usize>().ok())
                .filter(|&n| n >= 1)
                .map(ShortcutSlot::JumpToLayout)
                .ok_or_else(|| UnknownSlot(s.to_string())),
        }
    }
}

struct BindingState {
    descriptors: ShortcutsConfig,
    layout_count: usize,
}

/// Slot descriptors and the registry they populate.
pub struct ShortcutBindings {
    registry: Arc<ShortcutRegistry>,
    resolver: CommandResolver,
    state: Mutex<BindingState>,
}

impl ShortcutBindings {
    pub fn new(registry: Arc<ShortcutRegistry>, resolver: CommandResolver) -> Self {
        Self {
            registry,
            resolver,
            state: Mutex::new(BindingState {
                descriptors: ShortcutsConfig {
                    cycle_layout: String::new(),
                    toggle_indicator: String::new(),
                    jump_to_layout: Vec::new(),
                },
                layout_count: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BindingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers every configured slot: the indicator slot first, then the
    /// cycle slot, then jump slots `1..=layout_count`.
    pub fn load(&self, config: &ShortcutsConfig, layout_count: usize) {
        let mut state = self.lock();
        state.descriptors = config.clone();
        state.layout_count = layout_count;

        let mut slots = vec![ShortcutSlot::ToggleIndicator, ShortcutSlot::CycleLayout];
        slots.extend((1..=layout_count).map(ShortcutSlot::JumpToLayout));
        for slot in slots {
            self.register(slot, descriptor_of(&state.descriptors, slot));
        }
        info!(chords = self.registry.len(), "shortcuts loaded");
    }

    /// Rebinds `slot` to `new_descriptor` and returns the canonical form
    /// stored for it (empty when unbound or invalid).
    ///
    /// Jump slots are 1-based; `JumpToLayout(0)` is ignored.
    pub fn edit(&self, slot: ShortcutSlot, new_descriptor: &str) -> String {
        if slot == ShortcutSlot::JumpToLayout(0) {
            warn!("jump_to_layout slots start at 1; edit ignored");
            return String::new();
        }
        let mut state = self.lock();
        let old = codec::parse(descriptor_of(&state.descriptors, slot));
        let new = codec::parse(new_descriptor);
        let canonical = codec::serialize(new.as_ref());

        let active = match slot {
            ShortcutSlot::JumpToLayout(n) => n <= state.layout_count,
            _ => true,
        };
        if active {
            match (old, new) {
                (Some(old), Some(new)) if old == new => {}
                (Some(old), Some(new)) => self.registry.replace(&old, self.chord(slot, new)),
                (None, Some(new)) => self.registry.add(self.chord(slot, new)),
                (Some(old), None) => {
                    self.registry.remove(&old);
                }
                (None, None) => {}
            }
        }

        set_descriptor(&mut state.descriptors, slot, &canonical);
        debug!(%slot, descriptor = %canonical, "shortcut slot edited");
        canonical
    }

    /// Drops every jump chord and registers jump slots `1..=layout_count`
    /// again.
    pub fn regenerate_jump_shortcuts(&self, layout_count: usize) {
        let mut state = self.lock();
        state.layout_count = layout_count;
        let removed = self
            .registry
            .remove_where(|command| matches!(command, Some(Command::JumpToLayout(_))));
        for n in 1..=layout_count {
            let slot = ShortcutSlot::JumpToLayout(n);
            self.register(slot, descriptor_of(&state.descriptors, slot));
        }
        debug!(removed, layout_count, "jump shortcuts regenerated");
    }

    /// Stored descriptor for `slot`.
    pub fn descriptor(&self, slot: ShortcutSlot) -> String {
        descriptor_of(&self.lock().descriptors, slot).to_string()
    }

    /// Every active slot with its stored descriptor, in load order.
    pub fn slots(&self) -> Vec<(ShortcutSlot, String)> {
        let state = self.lock();
        let mut slots = vec![ShortcutSlot::ToggleIndicator, ShortcutSlot::CycleLayout];
        slots.extend((1..=state.layout_count).map(ShortcutSlot::JumpToLayout));
        slots
            .into_iter()
            .map(|slot| (slot, descriptor_of(&state.descriptors, slot).to_string()))
            .collect()
    }

    /// Snapshot of all stored descriptors, for persisting.
    pub fn to_config(&self) -> ShortcutsConfig {
        self.lock().descriptors.clone()
    }

    fn chord(&self, slot: ShortcutSlot, trigger: Trigger) -> Chord {
        Chord::new(trigger, self.resolver.action_for(slot.command()))
    }

    fn register(&self, slot: ShortcutSlot, descriptor: &str) {
        if let Some(trigger) = codec::parse(descriptor) {
            self.registry.add(self.chord(slot, trigger));
        }
    }
}

/// Turns a key-down into a descriptor for shortcut capture.
///
/// Returns `None` when the press should not end a capture: the key is itself
/// a modifier, or no modifier is held. Otherwise returns the canonical
/// descriptor, which is empty when the press is not a usable chord.
pub fn capture_descriptor(event: &KeyEvent) -> Option<String> {
    if event.is_modifier_key || event.modifier_state & !AGGREGATE_MASK == 0 {
        return None;
    }
    Some(codec::descriptor_from_key_press(
        event.key_code,
        event.modifier_state,
    ))
}

fn descriptor_of(descriptors: &ShortcutsConfig, slot: ShortcutSlot) -> &str {
    match slot {
        ShortcutSlot::CycleLayout => &descriptors.cycle_layout,
        ShortcutSlot::ToggleIndicator => &descriptors.toggle_indicator,
        ShortcutSlot::JumpToLayout(n) => descriptors.jump_descriptor(n),
    }
}

fn set_descriptor(descriptors: &mut ShortcutsConfig, slot: ShortcutSlot, descriptor: &str) {
    match slot {
        ShortcutSlot::CycleLayout => descriptors.cycle_layout = descriptor.to_string(),
        ShortcutSlot::ToggleIndicator => descriptors.toggle_indicator = descriptor.to_string(),
        ShortcutSlot::JumpToLayout(n) => descriptors.set_jump_descriptor(n, descriptor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::switch_layout::tests::service;
    use crate::application::switch_layout::LayoutSwitchService;
    use crate::application::toggle_indicator::IndicatorControl;
    use kbswitch_core::keymap::modifiers::{CTRL, LEFT_ALT, LEFT_CTRL, LEFT_SHIFT};
    use kbswitch_core::{HidKeyCode, SwitchMode};

    fn bindings(layouts: &[&str]) -> (ShortcutBindings, Arc<ShortcutRegistry>, Arc<LayoutSwitchService>) {
        let (layouts, _recorder) = service(layouts, SwitchMode::Global);
        let layouts = Arc::new(layouts);
        let resolver = CommandResolver::new(Arc::clone(&layouts), Arc::new(IndicatorControl::new(true)));
        let registry = Arc::new(ShortcutRegistry::new());
        (
            ShortcutBindings::new(Arc::clone(&registry), resolver),
            registry,
            layouts,
        )
    }

    fn config(cycle: &str, toggle: &str, jumps: &[&str]) -> ShortcutsConfig {
        ShortcutsConfig {
            cycle_layout: cycle.to_string(),
            toggle_indicator: toggle.to_string(),
            jump_to_layout: jumps.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn commands(registry: &ShortcutRegistry) -> Vec<Option<Command>> {
        registry.chords().iter().map(Chord::command).collect()
    }

    fn press(key: HidKeyCode, mask: u32) -> KeyEvent {
        KeyEvent::new(key.as_u16(), mask)
    }

    // ── Slot names ────────────────────────────────────────────────────────────

    #[test]
    fn test_slot_names_round_trip() {
        for slot in [
            ShortcutSlot::CycleLayout,
            ShortcutSlot::ToggleIndicator,
            ShortcutSlot::JumpToLayout(3),
        ] {
            assert_eq!(slot.to_string().parse::<ShortcutSlot>(), Ok(slot));
        }
        assert_eq!(ShortcutSlot::JumpToLayout(2).to_string(), "jump_to_layout.2");
    }

    #[test]
    fn test_slot_parse_rejects_unknown_names() {
        for name in ["", "cycle", "jump_to_layout", "jump_to_layout.0", "jump_to_layout.x"] {
            assert!(name.parse::<ShortcutSlot>().is_err(), "slot {name:?}");
        }
    }

    #[test]
    fn test_jump_slot_command_is_zero_based() {
        assert_eq!(ShortcutSlot::JumpToLayout(1).command(), Command::JumpToLayout(0));
    }

    // ── Load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_registers_in_priority_order() {
        // Arrange
        let (bindings, registry, _) = bindings(&["en", "fr"]);
        let cfg = config(
            "ControlLeft,Space",
            "ControlLeft,AltLeft,KeyI",
            &["AltLeft,Digit1", "AltLeft,Digit2", "AltLeft,Digit3"],
        );

        // Act
        bindings.load(&cfg, 2);

        // Assert: the third jump slot has no enabled layout.
        assert_eq!(
            commands(&registry),
            vec![
                Some(Command::ToggleIndicator),
                Some(Command::CycleLayout),
                Some(Command::JumpToLayout(0)),
                Some(Command::JumpToLayout(1)),
            ]
        );
    }

    #[test]
    fn test_load_skips_unbound_and_invalid_descriptors() {
        let (bindings, registry, _) = bindings(&["en"]);

        bindings.load(&config("ControlLeft,Space", "", &["ShiftLeft,KeyA"]), 1);

        assert_eq!(commands(&registry), vec![Some(Command::CycleLayout)]);
    }

    #[test]
    fn test_loaded_cycle_shortcut_dispatches() {
        // Arrange
        let (bindings, registry, layouts) = bindings(&["en", "fr"]);
        bindings.load(&config("ControlLeft,Space", "", &[]), 2);

        // Act
        let handled = registry.dispatch(&press(HidKeyCode::Space, LEFT_CTRL | CTRL));

        // Assert
        assert!(handled);
        assert_eq!(layouts.current().as_deref(), Some("fr"));
    }

    // ── Edit ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_edit_from_unbound_adds() {
        let (bindings, registry, _) = bindings(&["en"]);
        bindings.load(&config("", "", &[]), 1);

        let stored = bindings.edit(ShortcutSlot::ToggleIndicator, "AltLeft,ControlLeft,KeyI");

        assert_eq!(stored, "ControlLeft,AltLeft,KeyI");
        assert_eq!(commands(&registry), vec![Some(Command::ToggleIndicator)]);
    }

    #[test]
    fn test_edit_to_unbound_removes() {
        let (bindings, registry, _) = bindings(&["en"]);
        bindings.load(&config("ControlLeft,Space", "", &[]), 1);

        let stored = bindings.edit(ShortcutSlot::CycleLayout, "");

        assert_eq!(stored, "");
        assert!(registry.is_empty());
        assert_eq!(bindings.descriptor(ShortcutSlot::CycleLayout), "");
    }

    #[test]
    fn test_edit_replaces_in_place() {
        // Arrange
        let (bindings, registry, _) = bindings(&["en", "fr"]);
        bindings.load(
            &config("ControlLeft,Space", "ControlLeft,AltLeft,KeyI", &["AltLeft,Digit1"]),
            2,
        );

        // Act
        bindings.edit(ShortcutSlot::ToggleIndicator, "ControlLeft,AltLeft,KeyK");

        // Assert: the toggle chord keeps the highest priority.
        let chords = registry.chords();
        assert_eq!(chords[0].command(), Some(Command::ToggleIndicator));
        assert_eq!(chords[0].trigger().to_string(), "ControlLeft,AltLeft,KeyK");
        assert_eq!(chords.len(), 3);
    }

    #[test]
    fn test_edit_jump_slot_zero_is_ignored() {
        // Arrange
        let (bindings, registry, _) = bindings(&["en", "fr"]);
        bindings.load(&config("", "", &["AltLeft,Digit1"]), 2);

        // Act
        let stored = bindings.edit(ShortcutSlot::JumpToLayout(0), "AltLeft,Digit9");

        // Assert: no orphan chord, and slot 1 is untouched.
        assert_eq!(stored, "");
        assert_eq!(commands(&registry), vec![Some(Command::JumpToLayout(0))]);
        assert_eq!(registry.chords()[0].trigger().to_string(), "AltLeft,Digit1");
        assert_eq!(bindings.descriptor(ShortcutSlot::JumpToLayout(1)), "AltLeft,Digit1");
    }

    #[test]
    fn test_edit_to_invalid_descriptor_unbinds_slot() {
        let (bindings, registry, _) = bindings(&["en"]);
        bindings.load(&config("ControlLeft,Space", "", &[]), 1);

        let stored = bindings.edit(ShortcutSlot::CycleLayout, "ShiftLeft,KeyA");

        assert_eq!(stored, "");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_edit_inactive_jump_slot_is_stored_but_not_registered() {
        // Arrange
        let (bindings, registry, _) = bindings(&["en"]);
        bindings.load(&config("", "", &[]), 1);

        // Act
        bindings.edit(ShortcutSlot::JumpToLayout(2), "AltLeft,Digit2");

        // Assert
        assert!(registry.is_empty());
        assert_eq!(bindings.descriptor(ShortcutSlot::JumpToLayout(2)), "AltLeft,Digit2");

        // Enabling a second layout picks the stored descriptor up.
        bindings.regenerate_jump_shortcuts(2);
        assert_eq!(commands(&registry), vec![Some(Command::JumpToLayout(1))]);
    }

    // ── Regenerate ────────────────────────────────────────────────────────────

    #[test]
    fn test_regenerate_jump_shortcuts_follows_layout_count() {
        // Arrange
        let (bindings, registry, _) = bindings(&["en", "fr", "de"]);
        bindings.load(
            &config(
                "ControlLeft,Space",
                "",
                &["AltLeft,Digit1", "AltLeft,Digit2", "AltLeft,Digit3"],
            ),
            3,
        );

        // Act
        bindings.regenerate_jump_shortcuts(1);

        // Assert
        assert_eq!(
            commands(&registry),
            vec![Some(Command::CycleLayout), Some(Command::JumpToLayout(0))]
        );
        assert_eq!(bindings.slots().len(), 3);
    }

    #[test]
    fn test_slots_lists_active_slots_in_load_order() {
        let (bindings, _, _) = bindings(&["en", "fr"]);
        bindings.load(&config("ControlLeft,Space", "", &["AltLeft,Digit1"]), 2);

        assert_eq!(
            bindings.slots(),
            vec![
                (ShortcutSlot::ToggleIndicator, String::new()),
                (ShortcutSlot::CycleLayout, "ControlLeft,Space".to_string()),
                (ShortcutSlot::JumpToLayout(1), "AltLeft,Digit1".to_string()),
                (ShortcutSlot::JumpToLayout(2), String::new()),
            ]
        );
    }

    // ── Capture ───────────────────────────────────────────────────────────────

    #[test]
    fn test_capture_builds_canonical_descriptor() {
        let event = press(HidKeyCode::KeyK, LEFT_ALT | LEFT_CTRL | CTRL);
        assert_eq!(
            capture_descriptor(&event).as_deref(),
            Some("ControlLeft,AltLeft,KeyK")
        );
    }

    #[test]
    fn test_capture_ignores_modifier_presses_and_bare_keys() {
        assert_eq!(capture_descriptor(&press(HidKeyCode::ShiftLeft, LEFT_CTRL)), None);
        assert_eq!(capture_descriptor(&press(HidKeyCode::KeyK, 0)), None);
        assert_eq!(capture_descriptor(&press(HidKeyCode::KeyK, CTRL)), None);
    }

    #[test]
    fn test_capture_of_unusable_chord_is_empty() {
        let event = press(HidKeyCode::KeyA, LEFT_SHIFT);
        assert_eq!(capture_descriptor(&event).as_deref(), Some(""));
    }
}
