//! Input capture infrastructure for the service.
//!
//! An [`InputSource`] produces [`RawInputEvent`]s on a channel: key-downs and
//! key-ups as host virtual-key codes, plus foreground-application changes.
//!
//! - On Windows, [`windows::WindowsInputSource`] installs a low-level keyboard
//!   hook (WH_KEYBOARD_LL) and a foreground WinEvent hook on a dedicated Win32
//!   message-loop thread.
//! - [`replay::ReplayInputSource`] reads a line-oriented text script, which
//!   is how the headless binary is driven on any platform.
//! - [`mock::MockInputSource`] lets tests inject events directly.
//!
//! # Why a channel?
//!
//! OS hook callbacks must return within a few hundred milliseconds or the hook
//! is removed. All processing is deferred out of the callback via an `mpsc`
//! channel and happens on the consumer side.

use std::sync::mpsc;

pub mod mock;
pub mod replay;

#[cfg(target_os = "windows")]
pub mod windows;

/// A raw input event produced by an input source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInputEvent {
    /// A key was pressed down.
    KeyDown {
        /// Windows Virtual Key code.
        vk_code: u8,
        /// Hardware scan code.
        scan_code: u16,
        /// Milliseconds since system start (from the hook struct).
        time_ms: u32,
        /// `true` if this is an extended key (e.g., right-side modifiers, numpad Enter).
        is_extended: bool,
    },
    /// A key was released.
    KeyUp {
        vk_code: u8,
        scan_code: u16,
        time_ms: u32,
        is_extended: bool,
    },
    /// A different application now has keyboard focus.
    ForegroundChanged {
        /// Stable identifier of the application (executable name on Windows).
        app_id: String,
    },
}

impl RawInputEvent {
    /// A key-down with no scan code, timestamp or extended flag.
    pub fn key_down(vk_code: u8) -> Self {
        RawInputEvent::KeyDown {
            vk_code,
            scan_code: 0,
            time_ms: 0,
            is_extended: false,
        }
    }

    /// A key-up with no scan code, timestamp or extended flag.
    pub fn key_up(vk_code: u8) -> Self {
        RawInputEvent::KeyUp {
            vk_code,
            scan_code: 0,
            time_ms: 0,
            is_extended: false,
        }
    }
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install keyboard hook: {0}")]
    KeyboardHookInstallFailed(String),
    #[error("failed to start input reader: {0}")]
    ReaderStartFailed(String),
    #[error("capture service has already been started")]
    AlreadyStarted,
}

/// Trait abstracting input event production.
///
/// The channel closes when the source stops or runs out of input.
pub trait InputSource: Send {
    /// Starts the input source and returns a receiver for captured events.
    fn start(&self) -> Result<mpsc::Receiver<RawInputEvent>, CaptureError>;
    /// Stops the input source and releases all OS resources.
    fn stop(&self);
}
