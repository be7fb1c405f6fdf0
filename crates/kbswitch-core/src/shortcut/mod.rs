//! The shortcut engine.
//!
//! A shortcut is a [`Chord`]: a [`Trigger`] (held modifiers plus at most one
//! ordinary key) bound to a [`ShortcutAction`]. Chords are written as
//! comma-separated descriptors such as `ControlLeft,Space` ([`codec`]) and
//! kept in priority order by a [`ShortcutRegistry`].

pub mod chord;
pub mod codec;
pub mod command;
pub mod registry;

pub use chord::{Chord, KeyEvent, Trigger};
pub use codec::{descriptor_from_key_press, parse, parse_trigger, serialize, DescriptorError};
pub use command::{Command, CommandError, NoopAction, ShortcutAction};
pub use registry::ShortcutRegistry;
