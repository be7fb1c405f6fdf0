//! Mock input source for unit testing.
//!
//! Allows tests to inject synthetic [`RawInputEvent`]s without requiring
//! a running Windows message loop or OS hooks.

use std::sync::{
    mpsc::{self, Sender},
    Mutex, PoisonError,
};

use super::{CaptureError, InputSource, RawInputEvent};

/// A mock implementation of [`InputSource`] that allows tests to inject events.
#[derive(Default)]
pub struct MockInputSource {
    sender: Mutex<Option<Sender<RawInputEvent>>>,
}

impl MockInputSource {
    /// Creates a new mock input source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Injects a synthetic event, as if captured from hardware.
    ///
    /// Returns `false` if the source is not running or the receiver is gone.
    pub fn inject_event(&self, event: RawInputEvent) -> bool {
        let guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }
}

impl InputSource for MockInputSource {
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError> {
        let mut guard = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        let (tx, rx) = mpsc::channel();
        *guard = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        // Dropping the sender closes the channel.
        *self.sender.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_input_source_starts_and_receives_events() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        let delivered = source.inject_event(RawInputEvent::key_down(0x41));

        // Assert
        assert!(delivered);
        let event = rx.recv().expect("should receive event");
        assert!(matches!(event, RawInputEvent::KeyDown { vk_code: 0x41, .. }));
    }

    #[test]
    fn test_mock_input_source_stop_closes_channel() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.stop();

        // Assert
        assert!(rx.recv().is_err(), "channel should be closed after stop()");
        assert!(!source.inject_event(RawInputEvent::key_up(0x41)));
    }

    #[test]
    fn test_mock_input_source_rejects_a_second_start() {
        let source = MockInputSource::new();
        let _rx = source.start().expect("start should succeed");

        assert!(matches!(source.start(), Err(CaptureError::AlreadyStarted)));
    }

    #[test]
    fn test_inject_before_start_is_not_delivered() {
        let source = MockInputSource::new();

        assert!(!source.inject_event(RawInputEvent::key_down(0x41)));
    }

    #[test]
    fn test_mock_input_source_preserves_event_order() {
        // Arrange
        let source = MockInputSource::new();
        let rx = source.start().expect("start should succeed");

        // Act
        source.inject_event(RawInputEvent::ForegroundChanged {
            app_id: "editor.exe".to_string(),
        });
        source.inject_event(RawInputEvent::key_down(0xA2));
        source.inject_event(RawInputEvent::key_up(0xA2));

        // Assert
        assert!(matches!(
            rx.recv().unwrap(),
            RawInputEvent::ForegroundChanged { ref app_id } if app_id == "editor.exe"
        ));
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::KeyDown { vk_code: 0xA2, .. }));
        assert!(matches!(rx.recv().unwrap(), RawInputEvent::KeyUp { vk_code: 0xA2, .. }));
    }
}
