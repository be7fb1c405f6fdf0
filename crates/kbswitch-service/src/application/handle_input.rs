//! InputHandler: turns raw host input into shortcut dispatch.
//!
//! The host reports key-downs and key-ups as Windows virtual-key codes. The
//! handler keeps the held modifier bits across events, translates each
//! key-down into a canonical [`KeyEvent`], and hands it to the registry, or to
//! a pending shortcut capture when one was requested.
//!
//! Foreground application changes are forwarded to the layout service.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kbswitch_core::keymap::windows_vk::{vk_modifier_bit, vk_to_hid};
use kbswitch_core::{KeyEvent, ModifierMask, ShortcutRegistry};
use tokio::sync::oneshot;
use tracing::{debug, trace};

use super::manage_shortcuts::capture_descriptor;
use super::switch_layout::LayoutSwitchService;
use crate::infrastructure::input_capture::RawInputEvent;

/// Modifier bits currently held, maintained across key-down/up events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ModifierState(ModifierMask);

impl ModifierState {
    pub fn mask(self) -> ModifierMask {
        self.0
    }

    /// Applies a key transition. Ordinary keys leave the state unchanged.
    pub fn update(&mut self, vk: u8, is_down: bool) {
        let bit = vk_modifier_bit(vk);
        if is_down {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

#[derive(Default)]
struct InputState {
    modifiers: ModifierState,
    capture: Option<oneshot::Sender<String>>,
}

/// Routes raw input events into the shortcut engine.
pub struct InputHandler {
    registry: Arc<ShortcutRegistry>,
    layouts: Arc<LayoutSwitchService>,
    state: Mutex<InputState>,
}

impl InputHandler {
    pub fn new(registry: Arc<ShortcutRegistry>, layouts: Arc<LayoutSwitchService>) -> Self {
        Self {
            registry,
            layouts,
            state: Mutex::new(InputState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InputState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Processes one raw event. Returns `true` when a key-down was consumed
    /// by a shortcut or by a capture.
    pub fn handle(&self, event: RawInputEvent) -> bool {
        match event {
            RawInputEvent::KeyDown { vk_code, .. } => self.key_down(vk_code),
            RawInputEvent::KeyUp { vk_code, .. } => {
                self.lock().modifiers.update(vk_code, false);
                false
            }
            RawInputEvent::ForegroundChanged { app_id } => {
                self.layouts.foreground_changed(&app_id);
                false
            }
        }
    }

    fn key_down(&self, vk_code: u8) -> bool {
        let (event, capture) = {
            let mut state = self.lock();
            state.modifiers.update(vk_code, true);
            let event = KeyEvent::new(vk_to_hid(vk_code).as_u16(), state.modifiers.mask());
            let capture = match capture_descriptor(&event) {
                Some(descriptor) => state.capture.take().map(|tx| (tx, descriptor)),
                None => None,
            };
            (event, capture)
        };

        if let Some((tx, descriptor)) = capture {
            debug!(descriptor = %descriptor, "shortcut captured");
            // The requester may have given up; that is fine.
            let _ = tx.send(descriptor);
            return true;
        }

        trace!(?event, "key down");
        self.registry.dispatch(&event)
    }

    /// Arms a one-shot capture: the next key-down that is not a modifier and
    /// has a modifier held is turned into a descriptor instead of being
    /// dispatched. A second call replaces the pending capture.
    pub fn begin_capture(&self) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        self.lock().capture = Some(tx);
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::switch_layout::tests::{service, Recorder};
    use kbswitch_core::keymap::modifiers::{CTRL, LEFT_CTRL, RIGHT_ALT};
    use kbswitch_core::shortcut::codec;
    use kbswitch_core::{Chord, Command, ShortcutAction, SwitchMode};

    const VK_LCONTROL: u8 = 0xA2;
    const VK_RMENU: u8 = 0xA5;
    const VK_CONTROL: u8 = 0x11;
    const VK_SPACE: u8 = 0x20;
    const VK_K: u8 = 0x4B;

    struct Cycle(Arc<LayoutSwitchService>);

    impl ShortcutAction for Cycle {
        fn command(&self) -> Option<Command> {
            Some(Command::CycleLayout)
        }

        fn act(&self) -> bool {
            self.0.cycle_next().is_some()
        }
    }

    fn handler(mode: SwitchMode) -> (InputHandler, Arc<LayoutSwitchService>, Arc<Recorder>) {
        let (layouts, recorder) = service(&["en", "fr"], mode);
        let layouts = Arc::new(layouts);
        let registry = Arc::new(ShortcutRegistry::new());
        let trigger = codec::parse("ControlLeft,Space").unwrap();
        registry.add(Chord::new(trigger, Arc::new(Cycle(Arc::clone(&layouts)))));
        (
            InputHandler::new(registry, Arc::clone(&layouts)),
            layouts,
            recorder,
        )
    }

    #[test]
    fn test_modifier_state_tracks_down_and_up() {
        let mut state = ModifierState::default();

        state.update(VK_LCONTROL, true);
        state.update(VK_RMENU, true);
        state.update(VK_CONTROL, true);
        assert_eq!(state.mask(), LEFT_CTRL | RIGHT_ALT | CTRL);

        state.update(VK_LCONTROL, false);
        state.update(VK_SPACE, true);
        assert_eq!(state.mask(), RIGHT_ALT | CTRL);
    }

    #[test]
    fn test_chord_dispatches_while_modifier_held() {
        // Arrange
        let (handler, layouts, _) = handler(SwitchMode::Global);

        // Act
        handler.handle(RawInputEvent::key_down(VK_LCONTROL));
        let handled = handler.handle(RawInputEvent::key_down(VK_SPACE));

        // Assert
        assert!(handled);
        assert_eq!(layouts.current().as_deref(), Some("fr"));
    }

    #[test]
    fn test_released_modifier_no_longer_matches() {
        let (handler, layouts, _) = handler(SwitchMode::Global);

        handler.handle(RawInputEvent::key_down(VK_LCONTROL));
        handler.handle(RawInputEvent::key_up(VK_LCONTROL));
        let handled = handler.handle(RawInputEvent::key_down(VK_SPACE));

        assert!(!handled);
        assert_eq!(layouts.current().as_deref(), Some("en"));
    }

    #[test]
    fn test_foreground_change_reaches_layout_service() {
        let (handler, _, recorder) = handler(SwitchMode::PerApplication);

        handler.handle(RawInputEvent::ForegroundChanged {
            app_id: "editor.exe".to_string(),
        });

        assert_eq!(recorder.announced(), vec!["en"]);
    }

    #[test]
    fn test_capture_consumes_next_chord_instead_of_dispatching() {
        // Arrange
        let (handler, layouts, _) = handler(SwitchMode::Global);
        let mut rx = handler.begin_capture();

        // Act: the modifier press alone does not complete the capture.
        handler.handle(RawInputEvent::key_down(VK_LCONTROL));
        assert!(rx.try_recv().is_err());
        let consumed = handler.handle(RawInputEvent::key_down(VK_SPACE));

        // Assert
        assert!(consumed);
        assert_eq!(rx.try_recv().expect("captured"), "ControlLeft,Space");
        assert_eq!(layouts.current().as_deref(), Some("en"));
    }

    #[test]
    fn test_capture_is_one_shot() {
        let (handler, layouts, _) = handler(SwitchMode::Global);
        let _rx = handler.begin_capture();

        handler.handle(RawInputEvent::key_down(VK_LCONTROL));
        handler.handle(RawInputEvent::key_down(VK_K));
        handler.handle(RawInputEvent::key_down(VK_SPACE));

        assert_eq!(layouts.current().as_deref(), Some("fr"));
    }

    #[test]
    fn test_bare_key_does_not_complete_capture() {
        let (handler, _, _) = handler(SwitchMode::Global);
        let mut rx = handler.begin_capture();

        handler.handle(RawInputEvent::key_down(VK_K));

        assert!(rx.try_recv().is_err());
    }
}
