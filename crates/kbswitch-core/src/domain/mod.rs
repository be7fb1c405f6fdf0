//! Domain entities for KbSwitch.
//!
//! Pure state with no infrastructure dependencies: nothing in here talks to
//! the OS, the clock, a channel, or the filesystem. Outer layers feed events
//! in and act on the values that come back, which keeps this module testable
//! on any platform without setup.

/// Current-layout tracking — the core domain concept.
///
/// See [`layout_switch::LayoutSwitcher`] for the main type.
pub mod layout_switch;
