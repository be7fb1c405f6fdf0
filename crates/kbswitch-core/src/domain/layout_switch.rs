//! Layout-switch state machine.
//!
//! Tracks which of the enabled layouts is current, either once for the whole
//! session ([`SwitchMode::Global`]) or separately for each foreground
//! application ([`SwitchMode::PerApplication`]).
//!
//! # Index rules
//!
//! Indices are advanced without bounds checks. They are wrapped back to 0 at
//! the moment they are read, if they point past the end of the enabled list.
//! A cycle from the last layout therefore stores `len`, and the next read
//! turns that into 0.
//!
//! When the enabled list is edited, each tracked index is moved to wherever
//! its layout now sits, so the user keeps the layout they had selected rather
//! than the slot number. A layout that was removed falls back to index 0.
//!
//! # No I/O
//!
//! Every transition returns the layout it resolved to. Announcing and
//! persisting that value is the caller's job.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How the current layout is tracked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchMode {
    /// One selection shared by every application.
    #[default]
    Global,
    /// One selection per foreground application.
    PerApplication,
}

/// Current-layout state for one session.
#[derive(Debug, Clone)]
pub struct LayoutSwitcher {
    enabled_layouts: Vec<String>,
    mode: SwitchMode,
    global_index: usize,
    per_app_index: HashMap<String, usize>,
    current_application: String,
}

impl LayoutSwitcher {
    pub fn new(enabled_layouts: Vec<String>, mode: SwitchMode) -> Self {
        Self {
            enabled_layouts,
            mode,
            global_index: 0,
            per_app_index: HashMap::new(),
            current_application: String::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn mode(&self) -> SwitchMode {
        self.mode
    }

    pub fn enabled_layouts(&self) -> &[String] {
        &self.enabled_layouts
    }

    pub fn current_application(&self) -> &str {
        &self.current_application
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// Positions the global selection on `last_layout` and resolves it.
    ///
    /// Used once at session start. An unknown or disabled `last_layout`
    /// selects the first layout.
    pub fn restore(&mut self, last_layout: &str) -> Option<String> {
        self.global_index = self.position_of(last_layout).unwrap_or(0);
        self.current()
    }

    /// Records a new foreground application.
    ///
    /// Only has an effect in per-application mode. Returns the application's
    /// layout when the foreground application actually changed, so the caller
    /// can announce it; the index is not advanced.
    pub fn on_foreground_application_changed(&mut self, app_id: &str) -> Option<String> {
        if self.mode != SwitchMode::PerApplication {
            return None;
        }
        let changed = self.current_application != app_id;
        self.current_application = app_id.to_string();
        self.per_app_index.entry(app_id.to_string()).or_insert(0);
        if changed {
            self.current()
        } else {
            None
        }
    }

    /// Advances the selection by one and resolves it.
    pub fn cycle_next(&mut self) -> Option<String> {
        if let Some(index) = self.selected_index_mut() {
            *index += 1;
        }
        self.current()
    }

    /// Selects the layout at the 0-based position `n` and resolves it.
    ///
    /// An `n` past the end resolves to the first layout.
    pub fn jump_to(&mut self, n: usize) -> Option<String> {
        if let Some(index) = self.selected_index_mut() {
            *index = n;
        }
        self.current()
    }

    /// Resolves the selection for the current mode, wrapping an index that
    /// points past the end back to 0.
    ///
    /// Returns `None` only when no layouts are enabled.
    pub fn current(&mut self) -> Option<String> {
        let len = self.enabled_layouts.len();
        let index = match self.selected_index_mut() {
            Some(index) => {
                if *index >= len {
                    *index = 0;
                }
                *index
            }
            // An application that was never focused uses the first layout.
            None => 0,
        };
        self.enabled_layouts.get(index).cloned()
    }

    /// Replaces the enabled list, keeping each selection on the same layout.
    pub fn reconfigure(&mut self, new_layouts: Vec<String>) -> Option<String> {
        let remap = |index: usize| -> usize {
            Self::layout_at(&self.enabled_layouts, index)
                .and_then(|layout| new_layouts.iter().position(|l| l == layout))
                .unwrap_or(0)
        };

        let global_index = remap(self.global_index);
        let per_app_index: HashMap<String, usize> = self
            .per_app_index
            .iter()
            .map(|(app, &index)| (app.clone(), remap(index)))
            .collect();

        self.global_index = global_index;
        self.per_app_index = per_app_index;
        self.enabled_layouts = new_layouts;
        self.current()
    }

    /// Switches the tracking mode. Both sets of indices are kept as they are.
    pub fn on_mode_changed(&mut self, mode: SwitchMode) {
        self.mode = mode;
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// The index the current mode reads and writes. `None` in per-application
    /// mode before the current application has been recorded.
    fn selected_index_mut(&mut self) -> Option<&mut usize> {
        match self.mode {
            SwitchMode::Global => Some(&mut self.global_index),
            SwitchMode::PerApplication => self.per_app_index.get_mut(&self.current_application),
        }
    }

    /// Layout an index resolves to under `layouts`, applying the wrap rule.
    fn layout_at(layouts: &[String], index: usize) -> Option<&String> {
        layouts.get(index).or_else(|| layouts.first())
    }

    fn position_of(&self, layout: &str) -> Option<usize> {
        self.enabled_layouts.iter().position(|l| l == layout)
    }
}
