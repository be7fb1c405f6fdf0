//! CommandResolver: turns command tokens into executable chord actions.
//!
//! Every action closes over the shared [`LayoutSwitchService`] and
//! [`IndicatorControl`]. An unrecognised token resolves to [`NoopAction`],
//! which leaves its chord registered but never handling anything.

use std::sync::Arc;

use kbswitch_core::{Command, NoopAction, ShortcutAction};
use tracing::{debug, warn};

use super::switch_layout::LayoutSwitchService;
use super::toggle_indicator::IndicatorControl;

/// Builds [`ShortcutAction`]s for the built-in commands.
#[derive(Clone)]
pub struct CommandResolver {
    layouts: Arc<LayoutSwitchService>,
    indicator: Arc<IndicatorControl>,
}

impl CommandResolver {
    pub fn new(layouts: Arc<LayoutSwitchService>, indicator: Arc<IndicatorControl>) -> Self {
        Self { layouts, indicator }
    }

    /// Resolves a token such as `CYCLE_LAYOUT` or `JUMP_TO_LAYOUT,2`.
    pub fn resolve(&self, token: &str) -> Arc<dyn ShortcutAction> {
        match token.parse::<Command>() {
            Ok(command) => self.action_for(command),
            Err(e) => {
                warn!(token, error = %e, "unrecognised command token; chord will do nothing");
                Arc::new(NoopAction)
            }
        }
    }

    pub fn action_for(&self, command: Command) -> Arc<dyn ShortcutAction> {
        Arc::new(CommandAction {
            command,
            layouts: Arc::clone(&self.layouts),
            indicator: Arc::clone(&self.indicator),
        })
    }
}

struct CommandAction {
    command: Command,
    layouts: Arc<LayoutSwitchService>,
    indicator: Arc<IndicatorControl>,
}

impl ShortcutAction for CommandAction {
    fn command(&self) -> Option<Command> {
        Some(self.command)
    }

    /// Layout commands succeed when a layout was resolved; the toggle
    /// succeeds when an indicator is registered.
    fn act(&self) -> bool {
        debug!(command = %self.command, "running command");
        match self.command {
            Command::CycleLayout => self.layouts.cycle_next().is_some(),
            Command::JumpToLayout(n) => self.layouts.jump_to(n).is_some(),
            Command::ToggleIndicator => self.indicator.toggle(),
        }
    }
}
