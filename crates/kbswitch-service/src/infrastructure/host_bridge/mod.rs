//! Host bridge: the one handle collaborators hold on the switching engine.
//!
//! [`SwitchEngine`] owns the shortcut registry, the layout service and the
//! indicator slot. The host feeds it input events, the indicator registers
//! itself on start and unregisters on stop, and the settings side pushes
//! [`ConfigChange`]s. Nothing is reached through globals.
//!
//! The settings-facing functions at the bottom return [`CommandResult`] so
//! every response has the same `{ success, data, error }` shape.

use std::sync::Arc;

use kbswitch_core::{LayoutSwitcher, ShortcutRegistry, SwitchMode};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, oneshot};
use tracing::info;

use crate::application::{
    handle_input::InputHandler,
    manage_shortcuts::{ShortcutBindings, ShortcutSlot},
    resolve_command::CommandResolver,
    switch_layout::{LayoutSwitchService, PreferenceStore},
    toggle_indicator::{Indicator, IndicatorControl},
};
use crate::infrastructure::{
    input_capture::RawInputEvent,
    notify::{LayoutChanged, LayoutNotifier},
    storage::config::{parse_enabled_layouts, AppConfig, ShortcutsConfig},
};

// ── Engine ────────────────────────────────────────────────────────────────────

/// A configuration edit pushed in by the settings collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigChange {
    EnabledLayouts(Vec<String>),
    Mode(SwitchMode),
    Shortcut { slot: ShortcutSlot, descriptor: String },
    IndicatorEnabled(bool),
}

/// The running shortcut engine and layout state for one session.
pub struct SwitchEngine {
    layouts: Arc<LayoutSwitchService>,
    indicator: Arc<IndicatorControl>,
    registry: Arc<ShortcutRegistry>,
    bindings: ShortcutBindings,
    input: InputHandler,
    notifier: LayoutNotifier,
    last_layout: String,
}

impl SwitchEngine {
    /// Builds the engine from configuration and registers the configured
    /// shortcuts. Nothing is announced until [`SwitchEngine::start`].
    pub fn new(config: &AppConfig, store: Arc<dyn PreferenceStore>) -> Arc<Self> {
        let switching = &config.switching;
        let notifier = LayoutNotifier::new();
        let layouts = Arc::new(LayoutSwitchService::new(
            LayoutSwitcher::new(switching.enabled_layouts.clone(), switching.mode),
            Arc::new(notifier.clone()),
            store,
        ));
        let indicator = Arc::new(IndicatorControl::new(config.service.indicator_enabled));
        let registry = Arc::new(ShortcutRegistry::new());

        let resolver = CommandResolver::new(Arc::clone(&layouts), Arc::clone(&indicator));
        let bindings = ShortcutBindings::new(Arc::clone(&registry), resolver);
        bindings.load(&config.shortcuts, switching.enabled_layouts.len());
        let input = InputHandler::new(Arc::clone(&registry), Arc::clone(&layouts));

        Arc::new(Self {
            layouts,
            indicator,
            registry,
            bindings,
            input,
            notifier,
            last_layout: switching.last_layout.clone(),
        })
    }

    /// Restores the last layout and announces it once.
    pub fn start(&self) -> Option<String> {
        let restored = self.layouts.restore(&self.last_layout);
        info!(
            layout = restored.as_deref().unwrap_or("<none>"),
            shortcuts = self.registry.len(),
            "switch engine started"
        );
        restored
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LayoutChanged> {
        self.notifier.subscribe()
    }

    pub fn register_indicator(&self, indicator: Arc<dyn Indicator>) {
        self.indicator.register(indicator);
    }

    pub fn unregister_indicator(&self) {
        self.indicator.unregister();
    }

    /// Applies a configuration edit.
    pub fn apply(&self, change: ConfigChange) {
        match change {
            ConfigChange::EnabledLayouts(layouts) => {
                let count = layouts.len();
                self.layouts.reconfigure(layouts);
                self.bindings.regenerate_jump_shortcuts(count);
            }
            ConfigChange::Mode(mode) => self.layouts.set_mode(mode),
            ConfigChange::Shortcut { slot, descriptor } => {
                self.bindings.edit(slot, &descriptor);
            }
            ConfigChange::IndicatorEnabled(enabled) => self.indicator.set_enabled(enabled),
        }
    }

    pub fn foreground_changed(&self, app_id: &str) -> Option<String> {
        self.layouts.foreground_changed(app_id)
    }

    /// Feeds one host input event. Returns `true` if a key-down was consumed.
    pub fn handle_input(&self, event: RawInputEvent) -> bool {
        self.input.handle(event)
    }

    /// Turns the next modifier chord the user presses into a descriptor.
    pub fn capture_next_shortcut(&self) -> oneshot::Receiver<String> {
        self.input.begin_capture()
    }

    pub fn current_layout(&self) -> Option<String> {
        self.layouts.current()
    }

    pub fn mode(&self) -> SwitchMode {
        self.layouts.mode()
    }

    pub fn enabled_layouts(&self) -> Vec<String> {
        self.layouts.enabled_layouts()
    }

    /// Active slots with their stored descriptors.
    pub fn bindings(&self) -> Vec<(ShortcutSlot, String)> {
        self.bindings.slots()
    }

    pub fn shortcut_descriptor(&self, slot: ShortcutSlot) -> String {
        self.bindings.descriptor(slot)
    }

    /// Snapshot of the shortcut descriptors, for persisting.
    pub fn shortcuts_config(&self) -> ShortcutsConfig {
        self.bindings.to_config()
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One shortcut slot and its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingDto {
    pub slot: String,
    pub descriptor: String,
}

/// Snapshot of the engine state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDto {
    pub current_layout: Option<String>,
    pub mode: SwitchMode,
    pub enabled_layouts: Vec<String>,
}

/// Unified response wrapper for settings calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

// ── Settings calls ────────────────────────────────────────────────────────────

pub fn get_status(engine: &SwitchEngine) -> CommandResult<StatusDto> {
    CommandResult::ok(StatusDto {
        current_layout: engine.current_layout(),
        mode: engine.mode(),
        enabled_layouts: engine.enabled_layouts(),
    })
}

pub fn get_bindings(engine: &SwitchEngine) -> CommandResult<Vec<BindingDto>> {
    let dtos = engine
        .bindings()
        .into_iter()
        .map(|(slot, descriptor)| BindingDto {
            slot: slot.to_string(),
            descriptor,
        })
        .collect();
    CommandResult::ok(dtos)
}

/// Rebinds a slot by name. The returned descriptor is the canonical form
/// actually stored, empty if `descriptor` was not a usable chord.
pub fn set_shortcut(engine: &SwitchEngine, slot: &str, descriptor: &str) -> CommandResult<BindingDto> {
    let slot = match slot.parse::<ShortcutSlot>() {
        Ok(slot) => slot,
        Err(e) => return CommandResult::err(e.to_string()),
    };
    engine.apply(ConfigChange::Shortcut {
        slot,
        descriptor: descriptor.to_string(),
    });
    CommandResult::ok(BindingDto {
        slot: slot.to_string(),
        descriptor: engine.shortcut_descriptor(slot),
    })
}

/// Replaces the enabled layouts from their comma-separated text form.
pub fn set_enabled_layouts(engine: &SwitchEngine, text: &str) -> CommandResult<Vec<String>> {
    let layouts = parse_enabled_layouts(text);
    engine.apply(ConfigChange::EnabledLayouts(layouts));
    CommandResult::ok(engine.enabled_layouts())
}

/// Switches the tracking mode by its config name.
pub fn set_mode(engine: &SwitchEngine, mode: &str) -> CommandResult<SwitchMode> {
    let mode = match mode {
        "global" => SwitchMode::Global,
        "per_application" => SwitchMode::PerApplication,
        other => {
            return CommandResult::err(format!(
                "unknown mode {other:?} (expected global or per_application)"
            ))
        }
    };
    engine.apply(ConfigChange::Mode(mode));
    CommandResult::ok(mode)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
