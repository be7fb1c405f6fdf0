//! Commands a chord can be bound to, and the action trait that executes them.
//!
//! A command is stored next to its descriptor as a short token:
//!
//! | token                 | command                        |
//! |-----------------------|--------------------------------|
//! | `CYCLE_LAYOUT`        | [`Command::CycleLayout`]       |
//! | `JUMP_TO_LAYOUT,<n>`  | [`Command::JumpToLayout`]`(n - 1)` |
//! | `TOGGLE_INDICATOR`    | [`Command::ToggleIndicator`]   |
//!
//! `<n>` is 1-based in the token and 0-based in the enum.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const CYCLE_LAYOUT: &str = "CYCLE_LAYOUT";
const JUMP_TO_LAYOUT: &str = "JUMP_TO_LAYOUT";
const TOGGLE_INDICATOR: &str = "TOGGLE_INDICATOR";

/// One of the built-in operations a chord can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Advance to the next enabled layout.
    CycleLayout,
    /// Select the enabled layout at this 0-based position.
    JumpToLayout(usize),
    /// Show or hide the on-screen indicator.
    ToggleIndicator,
}

/// Why a command token was not recognised.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0:?}")]
    Unknown(String),

    #[error("JUMP_TO_LAYOUT needs a layout number")]
    MissingLayoutNumber,

    #[error("invalid layout number {0:?} (expected 1 or greater)")]
    InvalidLayoutNumber(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.split(',');
        match parts.next().unwrap_or_default() {
            CYCLE_LAYOUT => Ok(Command::CycleLayout),
            TOGGLE_INDICATOR => Ok(Command::ToggleIndicator),
            JUMP_TO_LAYOUT => {
                let raw = parts.next().ok_or(CommandError::MissingLayoutNumber)?;
                match raw.trim().parse::<usize>() {
                    Ok(n) if n >= 1 => Ok(Command::JumpToLayout(n - 1)),
                    _ => Err(CommandError::InvalidLayoutNumber(raw.to_string())),
                }
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CycleLayout => f.write_str(CYCLE_LAYOUT),
            Command::JumpToLayout(index) => write!(f, "{JUMP_TO_LAYOUT},{}", index + 1),
            Command::ToggleIndicator => f.write_str(TOGGLE_INDICATOR),
        }
    }
}

/// Executable side of a chord.
///
/// `act` reports whether the action handled the key press. A `false` result
/// lets the registry try the next matching chord.
pub trait ShortcutAction: Send + Sync {
    /// The command this action runs, if any.
    fn command(&self) -> Option<Command>;

    fn act(&self) -> bool;
}

/// Action that never succeeds.
///
/// Bound to chords whose command token was not recognised, and to chords
/// built only to identify an existing registry entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAction;

impl ShortcutAction for NoopAction {
    fn command(&self) -> Option<Command> {
        None
    }

    fn act(&self) -> bool {
        false
    }
}
