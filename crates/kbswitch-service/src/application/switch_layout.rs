//! LayoutSwitchService: the layout-switch state machine shared between the
//! input path and the configuration path.
//!
//! Each operation holds the lock across the read-modify-write on the
//! [`LayoutSwitcher`] and the announce/persist of the resolved layout, so
//! publications reach listeners and storage in transition order. Both side
//! effects are fire-and-forget and must not call back into this service.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use kbswitch_core::{LayoutSwitcher, SwitchMode};
use tracing::{debug, info};

/// Publishes the layout that is now current.
///
/// Infrastructure implementation is a broadcast channel; tests record calls.
pub trait LayoutBroadcaster: Send + Sync {
    fn announce(&self, layout: &str);
}

/// Persists the layout that is now current so the next session restores it.
///
/// Must not block the caller.
pub trait PreferenceStore: Send + Sync {
    fn record_last_layout(&self, layout: &str);
}

/// Thread-safe front of the layout state machine.
pub struct LayoutSwitchService {
    switcher: Mutex<LayoutSwitcher>,
    broadcaster: Arc<dyn LayoutBroadcaster>,
    store: Arc<dyn PreferenceStore>,
}

impl LayoutSwitchService {
    pub fn new(
        switcher: LayoutSwitcher,
        broadcaster: Arc<dyn LayoutBroadcaster>,
        store: Arc<dyn PreferenceStore>,
    ) -> Self {
        Self {
            switcher: Mutex::new(switcher),
            broadcaster,
            store,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LayoutSwitcher> {
        self.switcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `step` under the lock and publishes its result before the
    /// lock is released.
    fn transition(&self, step: impl FnOnce(&mut LayoutSwitcher) -> Option<String>) -> Option<String> {
        let mut switcher = self.lock();
        let resolved = step(&mut *switcher);
        let published = self.publish(resolved);
        drop(switcher);
        published
    }

    /// Announces and persists `resolved`, if any, and hands it back.
    fn publish(&self, resolved: Option<String>) -> Option<String> {
        match &resolved {
            Some(layout) => {
                info!(layout = %layout, "current layout");
                self.broadcaster.announce(layout);
                self.store.record_last_layout(layout);
            }
            None => debug!("no layouts enabled; nothing to announce"),
        }
        resolved
    }

    /// Positions the global selection on `last_layout` and announces it.
    pub fn restore(&self, last_layout: &str) -> Option<String> {
        self.transition(|switcher| switcher.restore(last_layout))
    }

    pub fn cycle_next(&self) -> Option<String> {
        self.transition(LayoutSwitcher::cycle_next)
    }

    /// Selects the 0-based position `n`.
    pub fn jump_to(&self, n: usize) -> Option<String> {
        self.transition(|switcher| switcher.jump_to(n))
    }

    /// Resolves the current layout without announcing it.
    pub fn current(&self) -> Option<String> {
        self.lock().current()
    }

    /// Records a new foreground application. Announces only in
    /// per-application mode, and only when the application changed.
    pub fn foreground_changed(&self, app_id: &str) -> Option<String> {
        self.transition(|switcher| {
            let resolved = switcher.on_foreground_application_changed(app_id);
            if resolved.is_some() {
                debug!(app_id, "foreground application changed");
            }
            resolved
        })
    }

    /// Replaces the enabled list, keeping every selection on its layout.
    pub fn reconfigure(&self, enabled_layouts: Vec<String>) -> Option<String> {
        debug!(?enabled_layouts, "enabled layouts changed");
        self.transition(|switcher| switcher.reconfigure(enabled_layouts))
    }

    pub fn set_mode(&self, mode: SwitchMode) {
        info!(?mode, "switch mode changed");
        self.lock().on_mode_changed(mode);
    }

    pub fn mode(&self) -> SwitchMode {
        self.lock().mode()
    }

    pub fn enabled_layouts(&self) -> Vec<String> {
        self.lock().enabled_layouts().to_vec()
    }
}
